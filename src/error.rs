use std::string::FromUtf8Error;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StegoError {
    /// The framed payload does not fit into the carrier with the chosen method
    #[error("Payload too large: {needed} bytes, but capacity is only {capacity} bytes")]
    PayloadTooLarge { needed: usize, capacity: usize },

    /// Represents an absent or incomplete length header. For example a carrier without any embedded data
    #[error("No valid embedded data found: length header is incomplete")]
    CorruptHeader,

    /// Represents a zero length header, nothing was embedded or the carrier is damaged
    #[error("Embedded payload length is zero")]
    EmptyPayload,

    /// The length header promises more bytes than the carrier could deliver
    #[error("Declared payload length {declared} exceeds the {available} bytes available")]
    TruncatedPayload { declared: usize, available: usize },

    /// Represents a failed decryption, most commonly a wrong password
    #[error("Decryption failed (wrong password or corrupted data)")]
    DecryptionFailed,

    /// Represents broken PKCS7 padding after decryption
    #[error("Invalid padding")]
    InvalidPadding,

    /// Represents a broken compressed stream, often a symptom of extracting with the wrong method
    #[error("Decompression failed: extracted data is corrupted or incomplete")]
    DecompressionFailed,

    /// Represents a block body that exceeds its wire length field
    #[error("Block of {len} bytes exceeds the {max} byte field limit")]
    OversizedBlock { len: usize, max: usize },

    /// Represents an unknown tag value in the block stream
    #[error("Unknown block type: {0}")]
    UnknownBlockType(u8),

    /// Represents a block whose length fields point past the end of the stream
    #[error("Malformed or truncated block")]
    CorruptBlock,

    /// Represents invalid UTF-8 text data found inside a message block
    #[error("Invalid text data found inside a message block")]
    InvalidTextData(#[from] FromUtf8Error),

    /// Represents an error caused by an invalid filename, for example an unsupported charset or empty filename
    #[error("A file with an invalid file name was provided")]
    InvalidFileName,

    /// Represents a raw pixel buffer whose length disagrees with its dimensions
    #[error("Pixel data of {len} bytes does not match {width}x{height} with {channels} channel(s)")]
    InvalidBufferSize {
        len: usize,
        width: u32,
        height: u32,
        channels: usize,
    },

    /// Represents a pixel buffer in the wrong color mode for a conversion
    #[error("Pixel buffer has {0} channel(s), expected {1}")]
    ChannelMismatch(usize, usize),

    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    IoError(#[from] std::io::Error),
}
