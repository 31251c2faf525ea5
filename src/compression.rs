//! Lossless compression stage of the payload pipeline.
//!
//! The wire format carries a zlib stream, compressed at the best ratio so the
//! bit budget of small carriers goes as far as possible.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::StegoError;
use crate::result::Result;

pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data)?;

    Ok(encoder.finish()?)
}

pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|_| StegoError::DecompressionFailed)?;

    Ok(out)
}
