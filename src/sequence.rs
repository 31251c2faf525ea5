//! Keyed pseudo-random pixel traversal for LSB embedding.
//!
//! The order is derived purely from the key and the pixel count, so embedder
//! and extractor reproduce the identical walk without exchanging state.

use sha2::{Digest, Sha256};

pub const DEFAULT_SEQUENCE_KEY: &str = "default_lsb_key";

const LCG_MULTIPLIER: u64 = 1_664_525;
const LCG_INCREMENT: u64 = 1_013_904_223;
const LCG_MASK: u64 = 0xFFFF_FFFF;
const MAX_SWAPS: usize = 1000;

/// Produces the pixel visiting order for a carrier of `num_pixels` pixels.
pub trait PixelSequence {
    /// A permutation-free index sequence; indices may repeat across
    /// implementations but every value is `< num_pixels`.
    fn generate(&self, num_pixels: usize) -> Vec<usize>;
}

/// The default traversal: identity order shuffled by a keyed 32-bit LCG.
///
/// The key is hashed with SHA-256 and the first 8 digest bytes seed the
/// generator. A bounded number of index transpositions follows, enough to
/// decorrelate the walk from raster order while staying cheap on large
/// carriers.
pub struct LcgSequence {
    key: String,
}

impl LcgSequence {
    pub fn new(key: &str) -> Self {
        let key = if key.is_empty() {
            DEFAULT_SEQUENCE_KEY
        } else {
            key
        };
        Self {
            key: key.to_string(),
        }
    }

    fn seed(&self) -> u64 {
        let digest = Sha256::digest(self.key.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        u64::from_be_bytes(bytes)
    }
}

impl Default for LcgSequence {
    fn default() -> Self {
        Self::new(DEFAULT_SEQUENCE_KEY)
    }
}

impl PixelSequence for LcgSequence {
    fn generate(&self, num_pixels: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..num_pixels).collect();
        if num_pixels < 2 {
            return indices;
        }

        let mut state = self.seed();
        let swaps = MAX_SWAPS.min(num_pixels / 10);
        for _ in 0..swaps {
            state = (LCG_MULTIPLIER * (state & LCG_MASK) + LCG_INCREMENT) & LCG_MASK;
            let a = (state as usize) % num_pixels;
            state = (LCG_MULTIPLIER * (state & LCG_MASK) + LCG_INCREMENT) & LCG_MASK;
            let b = (state as usize) % num_pixels;
            indices.swap(a, b);
        }

        indices
    }
}
