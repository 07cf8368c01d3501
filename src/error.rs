use crate::pngchunk::ChunkType;
use std::io;
use thiserror::Error;

//===========================================================================//

/// Errors produced while parsing, building, or exporting icon and PNG data.
#[derive(Debug, Error)]
pub enum Error {
    /// A fixed-width read ran past the end of the buffer.
    #[error(
        "Read of {width} bytes at offset {offset} is out of bounds \
         (buffer is {len} bytes)"
    )]
    OutOfBounds {
        /// Offset the read started at.
        offset: usize,
        /// Number of bytes requested.
        width: usize,
        /// Length of the buffer.
        len: usize,
    },

    /// A magic number, reserved field, or type field had the wrong value.
    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    /// A chunk's stored CRC32 does not match its type and data.
    #[error("{chunk_type} chunk CRC mismatch")]
    ChunkCrc {
        /// Type of the corrupt chunk.
        chunk_type: ChunkType,
    },

    /// A required PNG chunk is missing.
    #[error("{chunk_type} chunk not found")]
    ChunkNotFound {
        /// Type of the missing chunk.
        chunk_type: ChunkType,
    },

    /// An offset/length pair points outside of the buffer.
    #[error(
        "Range of {length} bytes at offset {offset} exceeds buffer \
         of {buffer_len} bytes"
    )]
    IndexOutOfRange {
        /// Declared start of the range.
        offset: u64,
        /// Declared length of the range.
        length: u64,
        /// Length of the buffer.
        buffer_len: usize,
    },

    /// An entry index is not smaller than the number of entries.
    #[error(
        "Invalid entry index (was {index}, but there are {count} entries)"
    )]
    InvalidIndex {
        /// The requested index.
        index: usize,
        /// Number of entries in the directory.
        count: usize,
    },

    /// The directory does not account for every byte of the file.
    #[error(
        "ICO directory describes {expected} bytes, but the file is \
         {actual} bytes"
    )]
    SizeMismatch {
        /// Bytes accounted for by the header, directory, and payloads.
        expected: u64,
        /// Actual length of the file.
        actual: u64,
    },

    /// The image is neither an uncompressed bitmap nor a PNG.
    #[error("Unsupported image format: {0}")]
    UnsupportedImageFormat(String),

    /// A descriptor rewrite target has no room for pixel data.
    #[error(
        "Buffer too small for a bitmap descriptor (was {len} bytes, but \
         must be more than 40)"
    )]
    BufferTooSmall {
        /// Length of the rejected buffer.
        len: usize,
    },

    /// An icon directory can hold at most `u16::MAX` entries.
    #[error("Too many entries in IconDir (was {0}, but max is 65535)")]
    TooManyEntries(usize),

    /// A length or offset does not fit in a 32-bit field.
    #[error("{len} bytes do not fit in a 32-bit length field")]
    DataTooLarge {
        /// The length or offset that overflowed.
        len: u64,
    },

    /// An icon must contain at least one image.
    #[error("No images to build an icon from")]
    NoImages,

    /// The pixel decoder rejected an embedded PNG.
    #[error("Malformed PNG data: {0}")]
    PngDecode(#[from] png::DecodingError),

    /// The pixel encoder failed while recompressing a PNG.
    #[error("PNG encoding failed: {0}")]
    PngEncode(#[from] png::EncodingError),

    /// An underlying read or write failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Shorthand for results carrying an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

//===========================================================================//


//===========================================================================//
