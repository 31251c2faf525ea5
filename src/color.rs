//! Color distance helpers used by the homogeneity analysis.

/// Sum of absolute per-channel differences.
///
/// Both slices must have the same channel count; extra channels on either
/// side are ignored.
pub fn manhattan_distance(a: &[u8], b: &[u8]) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| x.abs_diff(*y) as u32)
        .sum()
}

pub fn euclidean_distance(a: &[u8], b: &[u8]) -> f64 {
    let sum: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = *x as f64 - *y as f64;
            d * d
        })
        .sum();
    sum.sqrt()
}

/// Whether a neighborhood of pixels is flat enough to be visually uniform.
///
/// The region counts as homogeneous when no pixel pair is further apart than
/// `threshold` in Manhattan distance. Fewer than two pixels are trivially
/// homogeneous.
pub fn is_homogeneous(pixels: &[&[u8]], threshold: u32) -> bool {
    let mut max_distance = 0;
    for (i, a) in pixels.iter().enumerate() {
        for b in pixels.iter().skip(i + 1) {
            max_distance = max_distance.max(manhattan_distance(a, b));
        }
    }

    max_distance <= threshold
}

/// ITU-R BT.601 luma approximation.
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    (0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64) as u8
}
