//! A library for reading, writing, and building ICO icon files, together
//! with a chunk-level codec for the PNG images they may contain.
//!
//! An ICO file is a small directory of images.  Each image is stored either
//! as a headerless BMP (a BITMAPINFOHEADER followed by pixel data) or as a
//! complete PNG file.  This crate keeps every payload in its encoded form;
//! it never decodes pixels except to recompress PNG sources while building.
//!
//! # Examples
//!
//! ## Reading an ICO file
//!
//! ```no_run
//! // Read an ICO file from disk:
//! let icon_dir = icocodec::IconDir::open("path/to/file.ico").unwrap();
//! // Print the size of each image in the ICO file:
//! for entry in icon_dir.entries() {
//!     println!("{}x{} ({})", entry.width(), entry.height(),
//!              entry.format().extension());
//! }
//! // Export the first image as a standalone BMP or PNG file:
//! let name = icon_dir.entries()[0].file_name("file");
//! icon_dir.export_image(0, name).unwrap();
//! ```
//!
//! ## Creating an ICO file
//!
//! ```no_run
//! let mut builder = icocodec::IconBuilder::new();
//! builder.add_path("path/to/image-32.png").unwrap();
//! builder.add_path("path/to/image-16.bmp").unwrap();
//! let icon_dir = builder.build().unwrap();
//! icon_dir.write_to_path("path/to/file.ico").unwrap();
//! ```

#![warn(missing_docs)]

#[macro_use]
mod macros;

mod bitmap;
mod bmpdepth;
mod builder;
mod classify;
pub mod cursor;
mod error;
mod icondir;
mod pngchunk;
mod recode;

pub use crate::bitmap::{
    BitmapFileHeader, DibHeader, BMP_SIGNATURE, DIB_HEADER_LEN,
    DIB_HEADER_MARKER, FILE_HEADER_LEN,
};
pub use crate::builder::{BuildOptions, IconBuilder};
pub use crate::classify::{classify, classify_source, ImageFormat};
pub use crate::error::{Error, Result};
pub use crate::icondir::{IconDir, IconDirEntry};
pub use crate::pngchunk::{
    chunk_crc, encode_chunk, search_idat_chunks, Chunk, ChunkType,
    IdatOffsets, Ihdr, PngImage, IEND_CHUNK, PNG_SIGNATURE,
};
pub use crate::recode::{recompress_png, PngCompression};
