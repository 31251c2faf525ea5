//! Point filters decide which pixel positions may carry payload bits.
//!
//! Embed and extract must run with the identical filter configuration,
//! otherwise the bit stream desynchronizes.

use crate::color;
use crate::pixels::PixelBuffer;

pub const DEFAULT_HOMOGENEITY_THRESHOLD: u32 = 30;
pub const DEFAULT_NEIGHBORHOOD: u32 = 3;

/// The closed set of embedding predicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointFilter {
    /// every position is eligible
    AcceptAll,
    /// skip flat regions to reduce visible artifacts
    SkipHomogeneous { threshold: u32, neighborhood: u32 },
}

impl Default for PointFilter {
    fn default() -> Self {
        PointFilter::AcceptAll
    }
}

impl PointFilter {
    pub fn skip_homogeneous() -> Self {
        PointFilter::SkipHomogeneous {
            threshold: DEFAULT_HOMOGENEITY_THRESHOLD,
            neighborhood: DEFAULT_NEIGHBORHOOD,
        }
    }

    /// Pure predicate over the neighborhood of `(x, y)`; never mutates state.
    pub fn should_embed(&self, pixels: &PixelBuffer, x: u32, y: u32) -> bool {
        match self {
            PointFilter::AcceptAll => true,
            PointFilter::SkipHomogeneous {
                threshold,
                neighborhood,
            } => {
                let half = neighborhood / 2;
                let x_start = x.saturating_sub(half);
                let y_start = y.saturating_sub(half);
                let x_end = (x + half + 1).min(pixels.width());
                let y_end = (y + half + 1).min(pixels.height());

                let mut region = Vec::with_capacity((*neighborhood * *neighborhood) as usize);
                for ny in y_start..y_end {
                    for nx in x_start..x_end {
                        region.push(pixels.pixel(nx, ny));
                    }
                }

                !color::is_homogeneous(&region, *threshold)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixels::ColorMode;

    fn flat_buffer(value: u8) -> PixelBuffer {
        PixelBuffer::from_raw(5, 5, ColorMode::Rgb, vec![value; 5 * 5 * 3]).unwrap()
    }

    #[test]
    fn accept_all_accepts_everything() {
        let buf = flat_buffer(128);
        for y in 0..5 {
            for x in 0..5 {
                assert!(PointFilter::AcceptAll.should_embed(&buf, x, y));
            }
        }
    }

    #[test]
    fn should_skip_flat_region() {
        let buf = flat_buffer(128);
        let filter = PointFilter::skip_homogeneous();
        assert!(!filter.should_embed(&buf, 2, 2));
        // corners have a clipped neighborhood but are just as flat
        assert!(!filter.should_embed(&buf, 0, 0));
        assert!(!filter.should_embed(&buf, 4, 4));
    }

    #[test]
    fn should_accept_textured_region() {
        let mut buf = flat_buffer(128);
        buf.set(3, 2, 0, 250);
        let filter = PointFilter::skip_homogeneous();
        assert!(filter.should_embed(&buf, 2, 2));
    }

    #[test]
    fn decisions_are_deterministic() {
        let mut buf = flat_buffer(100);
        buf.set(1, 1, 1, 200);
        let filter = PointFilter::skip_homogeneous();
        let first: Vec<bool> = (0..5)
            .flat_map(|y| (0..5).map(move |x| (x, y)))
            .map(|(x, y)| filter.should_embed(&buf, x, y))
            .collect();
        let second: Vec<bool> = (0..5)
            .flat_map(|y| (0..5).map(move |x| (x, y)))
            .map(|(x, y)| filter.should_embed(&buf, x, y))
            .collect();
        assert_eq!(first, second);
    }
}
