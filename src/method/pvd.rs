//! Pixel-value-differencing embedding over horizontal pixel pairs.

use log::debug;

use crate::bit_iterator::{bits_to_bytes, BitIterator};
use crate::error::StegoError;
use crate::filter::PointFilter;
use crate::method::{report_progress, EmbeddingMethod, ProgressCallback};
use crate::payload::{Block, Payload, LENGTH_HEADER_BYTES};
use crate::pixels::PixelBuffer;
use crate::result::Result;

/// Difference ranges; the first carries one bit per pair, the rest two.
const PVD_RANGES: [(u8, u8); 8] = [
    (0, 1),
    (2, 3),
    (4, 7),
    (8, 15),
    (16, 31),
    (32, 63),
    (64, 127),
    (128, 255),
];

fn locate_range(d: u8) -> (usize, u8, u8) {
    for (index, (low, high)) in PVD_RANGES.iter().enumerate() {
        if d >= *low && d <= *high {
            return (index, *low, *high);
        }
    }
    unreachable!("the ranges cover 0..=255")
}

/// A pair may only carry bits when the full range fits around its first
/// pixel in both directions. The test depends on nothing embedding can
/// change, so embed and extract always skip the same pairs.
fn pair_eligible(p1: u8, high: u8) -> bool {
    p1 >= high && p1 <= 255 - high
}

/// Hides bits in the difference of horizontally adjacent pixels.
///
/// Each channel of each pair `(x, y)`/`(x + 1, y)` carries one or two bits
/// depending on how far the two values are apart; only the second pixel is
/// ever adjusted, and never outside the range its difference started in.
pub struct PvdEmbedding {
    pixels: PixelBuffer,
    filter: PointFilter,
    progress: Option<ProgressCallback>,
}

impl PvdEmbedding {
    pub fn new(pixels: PixelBuffer) -> Self {
        Self::with_filter(pixels, PointFilter::default())
    }

    pub fn with_filter(pixels: PixelBuffer, filter: PointFilter) -> Self {
        Self {
            pixels,
            filter,
            progress: None,
        }
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    pub fn into_pixels(self) -> PixelBuffer {
        self.pixels
    }

    /// Embeds into one channel pair on the scratch buffer; returns the
    /// number of payload bits consumed.
    fn embed_pair(
        scratch: &mut PixelBuffer,
        x: u32,
        y: u32,
        channel: usize,
        bits: &mut BitIterator<'_>,
    ) -> usize {
        let p1 = scratch.get(x, y, channel);
        let p2 = scratch.get(x + 1, y, channel);
        let d = p1.abs_diff(p2);
        let (range_index, low, high) = locate_range(d);
        if !pair_eligible(p1, high) {
            return 0;
        }

        let slot_bits = if range_index == 0 { 1 } else { 2 };
        let mut secret = 0u8;
        let mut consumed = 0;
        for i in 0..slot_bits {
            match bits.next() {
                // a slot started on the last bit is padded with zeros
                Some(bit) => {
                    secret |= bit << i;
                    consumed += 1;
                }
                None if consumed == 0 => return 0,
                None => break,
            }
        }

        let new_d = low + secret % (high - low + 1);
        let new_p2 = if p1 >= p2 { p1 - new_d } else { p1 + new_d };
        scratch.set(x + 1, y, channel, new_p2);
        consumed
    }

    fn extract_pair(&self, x: u32, y: u32, channel: usize, bits: &mut Vec<u8>) {
        let p1 = self.pixels.get(x, y, channel);
        let p2 = self.pixels.get(x + 1, y, channel);
        let d = p1.abs_diff(p2);
        let (range_index, low, high) = locate_range(d);
        if !pair_eligible(p1, high) {
            return;
        }

        let secret = d - low;
        bits.push(secret & 1);
        if range_index != 0 {
            bits.push((secret >> 1) & 1);
        }
    }
}

impl EmbeddingMethod for PvdEmbedding {
    /// An estimate; the actual yield depends on the pixel statistics and is
    /// verified during [`embed`](EmbeddingMethod::embed).
    fn capacity(&self) -> usize {
        let pairs = self.pixels.height() as usize * (self.pixels.width() as usize).saturating_sub(1);
        pairs * self.pixels.channels() * 4 / 24
    }

    fn embed(&mut self, payload: &Payload) -> Result<()> {
        let framed = payload.pack_and_prepare()?;
        if framed.len() > self.capacity() {
            return Err(StegoError::PayloadTooLarge {
                needed: framed.len(),
                capacity: self.capacity(),
            });
        }

        let (width, height) = (self.pixels.width(), self.pixels.height());
        let channels = self.pixels.channels();
        let total_bits = framed.len() * 8;
        let mut bits = BitIterator::new(&framed);
        let mut bits_done = 0;

        // mutate a scratch copy so a carrier that turns out too small for
        // its estimated capacity is left untouched
        let mut scratch = self.pixels.clone();
        'scan: for y in 0..height.saturating_sub(1) {
            for x in 0..width.saturating_sub(1) {
                if !self.filter.should_embed(&scratch, x, y) {
                    continue;
                }
                for channel in 0..channels {
                    if bits.remaining() == 0 {
                        break 'scan;
                    }
                    let consumed = Self::embed_pair(&mut scratch, x, y, channel, &mut bits);
                    if consumed > 0 {
                        bits_done += consumed;
                        report_progress(&self.progress, bits_done, total_bits);
                    }
                }
            }
        }

        if bits_done < total_bits {
            return Err(StegoError::PayloadTooLarge {
                needed: framed.len(),
                capacity: bits_done / 8,
            });
        }
        debug!("pvd: embedded {} bytes", framed.len());

        self.pixels = scratch;
        Ok(())
    }

    fn extract(&self, password: &str) -> Result<Vec<Block>> {
        let (width, height) = (self.pixels.width(), self.pixels.height());
        let channels = self.pixels.channels();

        let mut bits = Vec::new();
        let mut wanted_bits = usize::MAX;
        'scan: for y in 0..height.saturating_sub(1) {
            for x in 0..width.saturating_sub(1) {
                if !self.filter.should_embed(&self.pixels, x, y) {
                    continue;
                }
                for channel in 0..channels {
                    self.extract_pair(x, y, channel, &mut bits);
                    if wanted_bits == usize::MAX && bits.len() >= LENGTH_HEADER_BYTES * 8 {
                        let header = bits_to_bytes(&bits[..LENGTH_HEADER_BYTES * 8]);
                        let declared =
                            u32::from_be_bytes([0, header[0], header[1], header[2]]) as usize;
                        wanted_bits = (LENGTH_HEADER_BYTES + declared) * 8;
                    }
                    if bits.len() >= wanted_bits {
                        break 'scan;
                    }
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
