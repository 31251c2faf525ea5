//! Frequency-domain embedding in quantized DCT coefficients.

use std::sync::Arc;

use log::debug;
use rustdct::{DctPlanner, TransformType2And3};

use crate::bit_iterator::{bits_to_bytes, BitIterator};
use crate::error::StegoError;
use crate::method::{report_progress, EmbeddingMethod, ProgressCallback};
use crate::payload::{Block, Payload, LENGTH_HEADER_BYTES};
use crate::pixels::PixelBuffer;
use crate::result::Result;

const BLOCK_SIZE: usize = 8;

/// Quantization step for the carrier coefficient. The worst-case DCT error
/// from rounding the block back to u8 stays below a quarter step, so the
/// embedded quarter-point survives the spatial round trip as long as no
/// pixel clips at 0 or 255.
const QUANTIZATION_STEP: f32 = 16.0;

/// Coefficient (1, 1), the lowest AC frequency in both directions.
const EMBEDDING_COEFF_INDEX: usize = BLOCK_SIZE + 1;

/// Orthonormal scale factors for the 8-point transform.
const ORTHO_DC: f32 = 0.353_553_39;
const ORTHO_AC: f32 = 0.5;

/// Hides one bit per 8x8 block in the first channel.
///
/// Each block is transformed with an orthonormal 2D DCT and coefficient
/// (1, 1) is snapped to the lower or upper quarter-point of its
/// quantization cell; extraction reads the cell fraction back. Capacity is
/// one bit per full block, so a byte takes eight blocks.
pub struct DctEmbedding {
    pixels: PixelBuffer,
    dct: Arc<dyn TransformType2And3<f32>>,
    progress: Option<ProgressCallback>,
}

impl DctEmbedding {
    pub fn new(pixels: PixelBuffer) -> Self {
        let mut planner = DctPlanner::new();
        Self::with_transform(pixels, planner.plan_dct2(BLOCK_SIZE))
    }

    /// Builds the method around a pre-planned transform, so callers that
    /// process many carriers can share one plan.
    pub fn with_transform(pixels: PixelBuffer, dct: Arc<dyn TransformType2And3<f32>>) -> Self {
        Self {
            pixels,
            dct,
            progress: None,
        }
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    pub fn into_pixels(self) -> PixelBuffer {
        self.pixels
    }

    fn blocks_x(&self) -> usize {
        self.pixels.width() as usize / BLOCK_SIZE
    }

    fn blocks_y(&self) -> usize {
        self.pixels.height() as usize / BLOCK_SIZE
    }

    fn forward_2d(&self, block: &mut [f32; BLOCK_SIZE * BLOCK_SIZE]) {
        let mut line = [0f32; BLOCK_SIZE];
        for y in 0..BLOCK_SIZE {
            line.copy_from_slice(&block[y * BLOCK_SIZE..(y + 1) * BLOCK_SIZE]);
            self.dct.process_dct2(&mut line);
            scale_forward(&mut line);
            block[y * BLOCK_SIZE..(y + 1) * BLOCK_SIZE].copy_from_slice(&line);
        }
        for x in 0..BLOCK_SIZE {
            for y in 0..BLOCK_SIZE {
                line[y] = block[y * BLOCK_SIZE + x];
            }
            self.dct.process_dct2(&mut line);
            scale_forward(&mut line);
            for y in 0..BLOCK_SIZE {
                block[y * BLOCK_SIZE + x] = line[y];
            }
        }
    }

    fn inverse_2d(&self, block: &mut [f32; BLOCK_SIZE * BLOCK_SIZE]) {
        let mut line = [0f32; BLOCK_SIZE];
        for x in 0..BLOCK_SIZE {
            for y in 0..BLOCK_SIZE {
                line[y] = block[y * BLOCK_SIZE + x];
            }
            scale_inverse(&mut line);
            self.dct.process_dct3(&mut line);
            for y in 0..BLOCK_SIZE {
                block[y * BLOCK_SIZE + x] = line[y];
            }
        }
        for y in 0..BLOCK_SIZE {
            line.copy_from_slice(&block[y * BLOCK_SIZE..(y + 1) * BLOCK_SIZE]);
            scale_inverse(&mut line);
            self.dct.process_dct3(&mut line);
            block[y * BLOCK_SIZE..(y + 1) * BLOCK_SIZE].copy_from_slice(&line);
        }
    }

    fn read_block(&self, block_x: usize, block_y: usize) -> [f32; BLOCK_SIZE * BLOCK_SIZE] {
        let mut block = [0f32; BLOCK_SIZE * BLOCK_SIZE];
        for y in 0..BLOCK_SIZE {
            for x in 0..BLOCK_SIZE {
                let px = (block_x * BLOCK_SIZE + x) as u32;
                let py = (block_y * BLOCK_SIZE + y) as u32;
                block[y * BLOCK_SIZE + x] = f32::from(self.pixels.get(px, py, 0));
            }
        }
        block
    }

    fn write_block(&mut self, block_x: usize, block_y: usize, block: &[f32; BLOCK_SIZE * BLOCK_SIZE]) {
        for y in 0..BLOCK_SIZE {
            for x in 0..BLOCK_SIZE {
                let px = (block_x * BLOCK_SIZE + x) as u32;
                let py = (block_y * BLOCK_SIZE + y) as u32;
                let value = block[y * BLOCK_SIZE + x].round().clamp(0.0, 255.0) as u8;
                self.pixels.set(px, py, 0, value);
            }
        }
    }

    fn read_bit(&self, block_x: usize, block_y: usize) -> u8 {
        let mut block = self.read_block(block_x, block_y);
        self.forward_2d(&mut block);
        let scaled = block[EMBEDDING_COEFF_INDEX] / QUANTIZATION_STEP;
        u8::from(scaled - scaled.floor() >= 0.5)
    }
}

fn scale_forward(line: &mut [f32; BLOCK_SIZE]) {
    line[0] *= ORTHO_DC;
    for value in line.iter_mut().skip(1) {
        *value *= ORTHO_AC;
    }
}

fn scale_inverse(line: &mut [f32; BLOCK_SIZE]) {
    line[0] *= 2.0 * ORTHO_DC;
    for value in line.iter_mut().skip(1) {
        *value *= ORTHO_AC;
    }
}

impl EmbeddingMethod for DctEmbedding {
    fn capacity(&self) -> usize {
        self.blocks_x() * self.blocks_y() / 8
    }

    fn embed(&mut self, payload: &Payload) -> Result<()> {
        let framed = payload.pack_and_prepare()?;
        if framed.len() > self.capacity() {
            return Err(StegoError::PayloadTooLarge {
                needed: framed.len(),
                capacity: self.capacity(),
            });
        }
        debug!(
            "dct: embedding {} bytes into {}x{} blocks",
            framed.len(),
            self.blocks_x(),
            self.blocks_y()
        );

        let total_bits = framed.len() * 8;
        let mut bits = BitIterator::new(&framed);
        let mut bits_done = 0;

        'blocks: for block_y in 0..self.blocks_y() {
            for block_x in 0..self.blocks_x() {
                let bit = match bits.next() {
                    Some(bit) => bit,
                    None => break 'blocks,
                };

                let mut block = self.read_block(block_x, block_y);
                self.forward_2d(&mut block);

                let level = (block[EMBEDDING_COEFF_INDEX] / QUANTIZATION_STEP).floor();
                let target = if bit == 1 { 0.75 } else { 0.25 };
                block[EMBEDDING_COEFF_INDEX] = (level + target) * QUANTIZATION_STEP;

                self.inverse_2d(&mut block);
                self.write_block(block_x, block_y, &block);

                bits_done += 1;
                report_progress(&self.progress, bits_done, total_bits);
            }
        }

        Ok(())
    }

    fn extract(&self, password: &str) -> Result<Vec<Block>> {
        let mut bits = Vec::new();
        let mut wanted_bits = usize::MAX;

        'blocks: for block_y in 0..self.blocks_y() {
            for block_x in 0..self.blocks_x() {
                bits.push(self.read_bit(block_x, block_y));
                if bits.len() == LENGTH_HEADER_BYTES * 8 {
                    let header = bits_to_bytes(&bits);
                    let declared =
                        u32::from_be_bytes([0, header[0], header[1], header[2]]) as usize;
                    wanted_bits = (LENGTH_HEADER_BYTES + declared) * 8;
                }
                if bits.len() >= wanted_bits {
                    break 'blocks;
                }
            }
        }

        let data = bits_to_bytes(&bits);
        Payload::unpack_and_extract(&data, password)
    }

    fn set_progress_callback(&mut self, callback: ProgressCallback) {
        self.progress = Some(callback);
    }
}
