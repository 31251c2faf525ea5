//! The decoded pixel buffer the engine operates on.
//!
//! Image file decoding and encoding stay outside the engine; the boundary
//! type here only carries 8-bit grayscale or RGB pixel data in row-major
//! order, with conversions from the `image` crate's buffers.

use image::{GrayImage, RgbImage};

use crate::error::StegoError;
use crate::result::Result;

/// Color layout of a [`PixelBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Grayscale,
    Rgb,
}

impl ColorMode {
    pub fn channels(&self) -> usize {
        match self {
            ColorMode::Grayscale => 1,
            ColorMode::Rgb => 3,
        }
    }
}

/// A rectangular grid of 8-bit pixels, 1 or 3 channels, row-major.
///
/// Each embed or extract call owns its buffer exclusively; there is no
/// sharing across calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    mode: ColorMode,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// A zero-filled buffer of the given shape.
    pub fn new(width: u32, height: u32, mode: ColorMode) -> Self {
        let len = width as usize * height as usize * mode.channels();
        Self {
            width,
            height,
            mode,
            data: vec![0; len],
        }
    }

    pub fn from_raw(width: u32, height: u32, mode: ColorMode, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * mode.channels();
        if data.len() != expected {
            return Err(StegoError::InvalidBufferSize {
                len: data.len(),
                width,
                height,
                channels: mode.channels(),
            });
        }

        Ok(Self {
            width,
            height,
            mode,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn mode(&self) -> ColorMode {
        self.mode
    }

    pub fn channels(&self) -> usize {
        self.mode.channels()
    }

    pub fn total_pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    fn index(&self, x: u32, y: u32, channel: usize) -> usize {
        (y as usize * self.width as usize + x as usize) * self.channels() + channel
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32, channel: usize) -> u8 {
        self.data[self.index(x, y, channel)]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, channel: usize, value: u8) {
        let i = self.index(x, y, channel);
        self.data[i] = value;
    }

    /// All channels of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let i = self.index(x, y, 0);
        &self.data[i..i + self.channels()]
    }

    /// Channel access by flat pixel index, used by the keyed LSB traversal.
    #[inline]
    pub fn channel_value(&self, pixel_index: usize, channel: usize) -> u8 {
        self.data[pixel_index * self.channels() + channel]
    }

    #[inline]
    pub fn set_channel_value(&mut self, pixel_index: usize, channel: usize, value: u8) {
        let i = pixel_index * self.channels() + channel;
        self.data[i] = value;
    }

    pub fn to_rgb8(&self) -> Result<RgbImage> {
        if self.mode != ColorMode::Rgb {
            return Err(StegoError::ChannelMismatch(self.channels(), 3));
        }
        // length was validated at construction time
        Ok(RgbImage::from_raw(self.width, self.height, self.data.clone())
            .expect("buffer length matches dimensions"))
    }

    pub fn to_luma8(&self) -> Result<GrayImage> {
        if self.mode != ColorMode::Grayscale {
            return Err(StegoError::ChannelMismatch(self.channels(), 1));
        }
        Ok(
            GrayImage::from_raw(self.width, self.height, self.data.clone())
                .expect("buffer length matches dimensions"),
        )
    }
}

impl From<RgbImage> for PixelBuffer {
    fn from(img: RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            mode: ColorMode::Rgb,
            data: img.into_raw(),
        }
    }
}

impl From<GrayImage> for PixelBuffer {
    fn from(img: GrayImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            mode: ColorMode::Grayscale,
            data: img.into_raw(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_index_row_major_pixel_major() {
        let mut buf = PixelBuffer::new(4, 2, ColorMode::Rgb);
        buf.set(1, 1, 2, 42);
        assert_eq!(buf.data()[(1 * 4 + 1) * 3 + 2], 42);
        assert_eq!(buf.get(1, 1, 2), 42);
        assert_eq!(buf.channel_value(5, 2), 42);
    }

    #[test]
    fn should_reject_mismatched_raw_data() {
        let result = PixelBuffer::from_raw(2, 2, ColorMode::Rgb, vec![0; 11]);
        assert!(matches!(
            result,
            Err(StegoError::InvalidBufferSize { len: 11, .. })
        ));
    }

    #[test]
    fn should_round_trip_rgb_image() {
        let img = RgbImage::from_fn(3, 2, |x, y| image::Rgb([x as u8, y as u8, 7]));
        let buf = PixelBuffer::from(img.clone());
        assert_eq!(buf.channels(), 3);
        assert_eq!(buf.pixel(2, 1), &[2, 1, 7]);
        assert_eq!(buf.to_rgb8().unwrap(), img);
    }

    #[test]
    fn should_refuse_mode_mismatch_on_conversion() {
        let buf = PixelBuffer::new(2, 2, ColorMode::Grayscale);
        assert!(matches!(
            buf.to_rgb8(),
            Err(StegoError::ChannelMismatch(1, 3))
        ));
    }
}
