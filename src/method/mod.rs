//! The embedding methods and the dispatch surface over them.
//!
//! Every method implements [`EmbeddingMethod`] against an owned
//! [`PixelBuffer`]; the closed [`Method`] enum dispatches statically via
//! `enum_dispatch` so callers can hold heterogeneous methods without
//! trait objects.

pub mod dct;
pub mod lsb;
pub mod pvd;

use enum_dispatch::enum_dispatch;

use crate::payload::{Block, Payload};
use crate::pixels::PixelBuffer;
use crate::result::Result;

pub use dct::DctEmbedding;
pub use lsb::LsbEmbedding;
pub use pvd::PvdEmbedding;

/// Observer invoked with `(bytes_done, bytes_total)` while payload bits are
/// written into the carrier.
pub type ProgressCallback = Box<dyn Fn(usize, usize) + Send>;

/// Bits between two progress reports; completion is always reported.
pub(crate) const PROGRESS_INTERVAL_BITS: usize = 1024;

pub(crate) fn report_progress(
    callback: &Option<ProgressCallback>,
    bits_done: usize,
    bits_total: usize,
) {
    if let Some(callback) = callback {
        if bits_done == bits_total || bits_done % PROGRESS_INTERVAL_BITS == 0 {
            callback(bits_done / 8, bits_total / 8);
        }
    }
}

/// Common surface of all steganographic embedding methods.
#[enum_dispatch]
pub trait EmbeddingMethod {
    /// Maximum number of payload bytes this carrier can hold, header
    /// included.
    fn capacity(&self) -> usize;

    /// Writes the prepared payload stream into the carrier pixels.
    fn embed(&mut self, payload: &Payload) -> Result<()>;

    /// Reads the framed stream back out and runs the inbound pipeline.
    fn extract(&self, password: &str) -> Result<Vec<Block>>;

    fn set_progress_callback(&mut self, callback: ProgressCallback);
}

/// The closed set of embedding methods.
#[enum_dispatch(EmbeddingMethod)]
pub enum Method {
    Lsb(LsbEmbedding),
    Pvd(PvdEmbedding),
    Dct(DctEmbedding),
}

impl Method {
    pub fn pixels(&self) -> &PixelBuffer {
        match self {
            Method::Lsb(m) => m.pixels(),
            Method::Pvd(m) => m.pixels(),
            Method::Dct(m) => m.pixels(),
        }
    }

    pub fn into_pixels(self) -> PixelBuffer {
        match self {
            Method::Lsb(m) => m.into_pixels(),
            Method::Pvd(m) => m.into_pixels(),
            Method::Dct(m) => m.into_pixels(),
        }
    }
}
