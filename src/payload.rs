//! Payload assembly and the framed wire format.
//!
//! Blocks are concatenated, compressed, optionally encrypted and framed with
//! a 3-byte big-endian length header:
//!
//! ```text
//! [total_len: u24 BE][ zlib | salt ‖ iv ‖ aes-256-cbc ciphertext ]
//! ```
//!
//! With a non-empty password the inner bytes are the encrypted compressed
//! stream; with an empty password they are the bare compressed stream. The
//! header counts only the inner bytes, so an extractor reads exactly three
//! bytes to learn how much carrier it still has to walk.

use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use log::debug;

use crate::compression;
use crate::crypto;
use crate::error::StegoError;
use crate::result::Result;

const TAG_MESSAGE: u8 = 1;
const TAG_FILE: u8 = 2;

pub const LENGTH_HEADER_BYTES: usize = 3;
/// The 3-byte header caps the framed stream at 2^24 - 1 bytes.
pub const MAX_FRAMED_LEN: usize = 0xFF_FFFF;

/// One self-describing unit of hidden content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// `[1][len: u32 BE][utf-8 bytes]`
    Message(String),
    /// `[2][data_len: u32 BE][name_len: u16 BE][name][data]`
    File { name: String, data: Vec<u8> },
}

impl Block {
    fn serialize(&self, out: &mut Vec<u8>) -> Result<()> {
        match self {
            Block::Message(text) => {
                let len = checked_len_u32(text.len())?;
                out.write_u8(TAG_MESSAGE)?;
                out.write_u32::<BigEndian>(len)?;
                out.extend_from_slice(text.as_bytes());
            }
            Block::File { name, data } => {
                let data_len = checked_len_u32(data.len())?;
                // the name travels in a 2-byte field
                let name_len =
                    u16::try_from(name.len()).map_err(|_| StegoError::InvalidFileName)?;
                out.write_u8(TAG_FILE)?;
                out.write_u32::<BigEndian>(data_len)?;
                out.write_u16::<BigEndian>(name_len)?;
                out.extend_from_slice(name.as_bytes());
                out.extend_from_slice(data);
            }
        }
        Ok(())
    }
}

fn checked_len_u32(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| StegoError::OversizedBlock {
        len,
        max: u32::MAX as usize,
    })
}

/// The content to hide, plus the password protecting it.
#[derive(Debug, Clone, Default)]
pub struct Payload {
    blocks: Vec<Block>,
    password: String,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_password(password: &str) -> Self {
        Self {
            blocks: Vec::new(),
            password: password.to_string(),
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn add_message(&mut self, text: &str) -> &mut Self {
        self.blocks.push(Block::Message(text.to_string()));
        self
    }

    /// Reads the file at `path` into a file block, keeping only the base name.
    pub fn add_file(&mut self, path: &Path) -> Result<&mut Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or(StegoError::InvalidFileName)?
            .to_string();
        let mut data = Vec::new();
        File::open(path)?.read_to_end(&mut data)?;

        Ok(self.add_file_data(&name, data))
    }

    pub fn add_file_data(&mut self, name: &str, data: Vec<u8>) -> &mut Self {
        self.blocks.push(Block::File {
            name: name.to_string(),
            data,
        });
        self
    }

    /// Serializes all blocks into the plain block stream.
    pub fn pack(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        for block in &self.blocks {
            block.serialize(&mut out)?;
        }
        Ok(out)
    }

    /// Runs the full outbound pipeline: pack, compress, encrypt, frame.
    ///
    /// The result is the exact byte stream an embedding method writes into
    /// the carrier, length header included.
    pub fn pack_and_prepare(&self) -> Result<Vec<u8>> {
        let packed = self.pack()?;
        let compressed = compression::compress(&packed)?;
        let inner = if self.password.is_empty() {
            compressed
        } else {
            crypto::encrypt(&compressed, &self.password)
        };

        if inner.len() > MAX_FRAMED_LEN {
            return Err(StegoError::PayloadTooLarge {
                needed: inner.len(),
                capacity: MAX_FRAMED_LEN,
            });
        }
        debug!(
            "framing {} payload bytes ({} packed, encrypted: {})",
            inner.len(),
            packed.len(),
            !self.password.is_empty()
        );

        let mut framed = Vec::with_capacity(LENGTH_HEADER_BYTES + inner.len());
        framed.write_u24::<BigEndian>(inner.len() as u32)?;
        framed.extend_from_slice(&inner);
        Ok(framed)
    }

    /// Runs the inbound pipeline over a framed stream read from a carrier.
    ///
    /// `data` may carry trailing garbage past the framed length; everything
    /// beyond the header-declared range is ignored.
    pub fn unpack_and_extract(data: &[u8], password: &str) -> Result<Vec<Block>> {
        if data.len() < LENGTH_HEADER_BYTES {
            return Err(StegoError::CorruptHeader);
        }
        let declared = Cursor::new(data).read_u24::<BigEndian>()? as usize;
        if declared == 0 {
            return Err(StegoError::EmptyPayload);
        }
        let available = data.len() - LENGTH_HEADER_BYTES;
        if declared > available {
            return Err(StegoError::TruncatedPayload {
                declared,
                available,
            });
        }

        let inner = &data[LENGTH_HEADER_BYTES..LENGTH_HEADER_BYTES + declared];
        let compressed = if password.is_empty() {
            inner.to_vec()
        } else {
            crypto::decrypt(inner, password).map_err(|_| StegoError::DecryptionFailed)?
        };
        let packed = compression::decompress(&compressed)?;

        Self::unpack(&packed)
    }

    /// Parses a plain block stream back into blocks.
    pub fn unpack(data: &[u8]) -> Result<Vec<Block>> {
        let mut blocks = Vec::new();
        let mut offset = 0usize;

        while offset < data.len() {
            let tag = data[offset];
            offset += 1;
            match tag {
                TAG_MESSAGE => {
                    let len = read_u32(data, &mut offset)? as usize;
                    let bytes = take(data, &mut offset, len)?;
                    blocks.push(Block::Message(String::from_utf8(bytes.to_vec())?));
                }
                TAG_FILE => {
                    let data_len = read_u32(data, &mut offset)? as usize;
                    let name_len = read_u16(data, &mut offset)? as usize;
                    let name = take(data, &mut offset, name_len)?;
                    let name = String::from_utf8(name.to_vec())?;
                    let file_data = take(data, &mut offset, data_len)?.to_vec();
                    blocks.push(Block::File {
                        name,
                        data: file_data,
                    });
                }
                other => return Err(StegoError::UnknownBlockType(other)),
            }
        }

        Ok(blocks)
    }
}

fn read_u32(data: &[u8], offset: &mut usize) -> Result<u32> {
    let bytes = take(data, offset, 4)?;
    Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn read_u16(data: &[u8], offset: &mut usize) -> Result<u16> {
    let bytes = take(data, offset, 2)?;
    Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
}

fn take<'a>(data: &'a [u8], offset: &mut usize, len: usize) -> Result<&'a [u8]> {
    let end = offset.checked_add(len).ok_or(StegoError::CorruptBlock)?;
    let slice = data.get(*offset..end).ok_or(StegoError::CorruptBlock)?;
    *offset = end;
    Ok(slice)
}
