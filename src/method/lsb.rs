//! Least-significant-bit embedding with a keyed pixel traversal.

use log::{debug, trace};

use crate::bit_iterator::{bits_to_bytes, BitIterator};
use crate::error::StegoError;
use crate::method::{report_progress, EmbeddingMethod, ProgressCallback};
use crate::payload::{Block, Payload, LENGTH_HEADER_BYTES};
use crate::pixels::PixelBuffer;
use crate::result::Result;
use crate::sequence::{LcgSequence, PixelSequence};

/// Replaces the LSB of every channel along a key-derived pixel order.
///
/// One payload bit per channel, so an RGB carrier holds three bits per
/// pixel. The traversal key must match between embed and extract; the
/// payload password is independent of it.
pub struct LsbEmbedding {
    pixels: PixelBuffer,
    sequence: Box<dyn PixelSequence + Send>,
    progress: Option<ProgressCallback>,
}

impl LsbEmbedding {
    pub fn new(pixels: PixelBuffer) -> Self {
        Self::with_sequence(pixels, Box::new(LcgSequence::default()))
    }

    pub fn with_key(pixels: PixelBuffer, key: &str) -> Self {
        Self::with_sequence(pixels, Box::new(LcgSequence::new(key)))
    }

    pub fn with_sequence(pixels: PixelBuffer, sequence: Box<dyn PixelSequence + Send>) -> Self {
        Self {
            pixels,
            sequence,
            progress: None,
        }
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    pub fn into_pixels(self) -> PixelBuffer {
        self.pixels
    }
}

impl EmbeddingMethod for LsbEmbedding {
    fn capacity(&self) -> usize {
        self.pixels.total_pixels() * self.pixels.channels() / 8
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
            "lsb: embedding {} bytes into {} pixels",
            framed.len(),
            self.pixels.total_pixels()
        );

        let order = self.sequence.generate(self.pixels.total_pixels());
        let channels = self.pixels.channels();
        let total_bits = framed.len() * 8;
        let mut bits = BitIterator::new(&framed);
        let mut bits_done = 0;

        'outer: for pixel in order {
            for channel in 0..channels {
                let bit = match bits.next() {
                    Some(bit) => bit,
                    None => break 'outer,
                };
                let value = self.pixels.channel_value(pixel, channel);
                self.pixels
                    .set_channel_value(pixel, channel, (value & 0xFE) | bit);
                bits_done += 1;
                report_progress(&self.progress, bits_done, total_bits);
            }
        }

        Ok(())
    }

    fn extract(&self, password: &str) -> Result<Vec<Block>> {
        let order = self.sequence.generate(self.pixels.total_pixels());
        let channels = self.pixels.channels();

        // read the 3-byte header first, then only as many bits as it declares
        let mut bits = Vec::new();
        let mut wanted_bits = LENGTH_HEADER_BYTES * 8;
        'outer: for pixel in order {
            for channel in 0..channels {
                bits.push(self.pixels.channel_value(pixel, channel) & 1);
                if bits.len() == LENGTH_HEADER_BYTES * 8 {
                    let header = bits_to_bytes(&bits);
                    let declared =
                        u32::from_be_bytes([0, header[0], header[1], header[2]]) as usize;
                    wanted_bits += declared * 8;
                }
                if bits.len() >= wanted_bits {
                    break 'outer;
                }
            }
        }

        let data = bits_to_bytes(&bits);
        trace!("lsb: read {} bits from the carrier", bits.len());
        Payload::unpack_and_extract(&data, password)
    }

    fn set_progress_callback(&mut self, callback: ProgressCallback) {
        self.progress = Some(callback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixels::ColorMode;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn carrier(width: u32, height: u32) -> PixelBuffer {
        let channels = 3;
        let data = (0..width as usize * height as usize * channels)
            .map(|i| (i * 31 % 251) as u8)
            .collect();
        PixelBuffer::from_raw(width, height, ColorMode::Rgb, data).unwrap()
    }

    #[test]
    fn should_round_trip_a_message() {
        let mut method = LsbEmbedding::new(carrier(32, 32));
        let mut payload = Payload::new();
        payload.add_message("Hello World!");
        method.embed(&payload).unwrap();

        let blocks = method.extract("").unwrap();
        assert_eq!(blocks, vec![Block::Message("Hello World!".to_string())]);
    }

    #[test]
    fn should_round_trip_with_password_and_custom_key() {
        let mut method = LsbEmbedding::with_key(carrier(32, 32), "traversal key");
        let mut payload = Payload::with_password("pw");
        payload.add_message("keyed");
        method.embed(&payload).unwrap();

        let stego = LsbEmbedding::with_key(method.into_pixels(), "traversal key");
        let blocks = stego.extract("pw").unwrap();
        assert_eq!(blocks, vec![Block::Message("keyed".to_string())]);
    }

    #[test]
    fn should_not_extract_with_the_wrong_traversal_key() {
        let mut method = LsbEmbedding::with_key(carrier(32, 32), "right key");
        let mut payload = Payload::new();
        payload.add_message("hidden");
        method.embed(&payload).unwrap();

        let stego = LsbEmbedding::with_key(method.into_pixels(), "wrong key");
        assert!(stego.extract("").is_err());
    }

    #[test]
    fn should_change_each_channel_by_at_most_one() {
        let cover = carrier(32, 32);
        let mut method = LsbEmbedding::new(cover.clone());
        let mut payload = Payload::new();
        payload.add_message("subtle");
        method.embed(&payload).unwrap();

        let stego = method.into_pixels();
        for (a, b) in cover.data().iter().zip(stego.data()) {
            assert!(a.abs_diff(*b) <= 1);
        }
    }

    #[test]
    fn should_report_capacity() {
        let method = LsbEmbedding::new(carrier(32, 32));
        assert_eq!(method.capacity(), 32 * 32 * 3 / 8);
    }

    #[test]
    fn should_refuse_oversized_payloads() {
        let mut method = LsbEmbedding::new(carrier(8, 8));
        let mut payload = Payload::new();
        // incompressible data well past the 24-byte capacity
        let data: Vec<u8> = (0..4096u32).map(|i| (i.wrapping_mul(2654435761) >> 24) as u8).collect();
        payload.add_file_data("big.bin", data);
        let result = method.embed(&payload);
        assert!(matches!(result, Err(StegoError::PayloadTooLarge { .. })));
    }

    #[test]
    fn should_fail_on_a_blank_carrier() {
        let blank = PixelBuffer::new(32, 32, ColorMode::Rgb);
        let method = LsbEmbedding::new(blank);
        let result = method.extract("");
        assert!(matches!(result, Err(StegoError::EmptyPayload)));
    }

    #[test]
    fn should_report_progress() {
        let mut method = LsbEmbedding::new(carrier(32, 32));
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        method.set_progress_callback(Box::new(move |done, total| {
            assert!(done <= total);
            seen.fetch_add(1, Ordering::SeqCst);
        }));

        let mut payload = Payload::new();
        payload.add_message("progress");
        method.embed(&payload).unwrap();
        assert!(calls.load(Ordering::SeqCst) >= 1);
    }
}
