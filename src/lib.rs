//! # stegopix
//!
//! A steganography engine that hides arbitrary data in raster images.
//!
//! Payloads are assembled from message and file blocks, compressed,
//! optionally encrypted with a password and framed with a length header;
//! the framed bit stream then goes through one of three embedding methods:
//!
//! - [`LsbEmbedding`]: one bit per channel LSB along a keyed pixel order
//! - [`PvdEmbedding`]: bits in the difference of horizontal pixel pairs
//! - [`DctEmbedding`]: one bit per 8x8 block in a quantized DCT coefficient
//!
//! Image file I/O stays with the caller; the engine works on a
//! [`PixelBuffer`] and hands it back when it is done.
//!
//! ## Example
//!
//! ```rust
//! use stegopix::{EmbeddingMethod, LsbEmbedding, Payload, PixelBuffer, ColorMode};
//!
//! let carrier = PixelBuffer::from_raw(
//!     64, 64, ColorMode::Rgb,
//!     (0..64 * 64 * 3).map(|i| (i % 251) as u8).collect(),
//! ).unwrap();
//!
//! let mut payload = Payload::with_password("SuperSecret42");
//! payload.add_message("Hello World!");
//!
//! let mut method = LsbEmbedding::new(carrier);
//! method.embed(&payload).unwrap();
//!
//! let blocks = method.extract("SuperSecret42").unwrap();
//! assert_eq!(blocks.len(), 1);
//! ```

pub mod bit_iterator;
pub mod color;
pub mod compression;
pub mod crypto;
pub mod error;
pub mod filter;
pub mod method;
pub mod payload;
pub mod pixels;
pub mod result;
pub mod sequence;

pub use bit_iterator::{bits_to_bytes, BitIterator, BitOrder};
pub use error::StegoError;
pub use filter::PointFilter;
pub use method::{
    DctEmbedding, EmbeddingMethod, LsbEmbedding, Method, ProgressCallback, PvdEmbedding,
};
pub use payload::{Block, Payload};
pub use pixels::{ColorMode, PixelBuffer};
pub use result::Result;
pub use sequence::{LcgSequence, PixelSequence};
