use crate::bitmap::{
    BMP_SIGNATURE, DIB_HEADER_LEN, DIB_HEADER_MARKER, FILE_HEADER_LEN,
};
use crate::pngchunk::PNG_SIGNATURE;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

//===========================================================================//

/// The encoding of an image payload.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum ImageFormat {
    /// A BITMAPINFOHEADER followed by pixel data.
    Bitmap,
    /// A complete PNG stream.
    Png,
    /// Neither of the above.
    Unknown,
}

impl ImageFormat {
    /// Returns the file extension conventionally used for this format.
    pub fn extension(&self) -> &'static str {
        match *self {
            ImageFormat::Bitmap => "bmp",
            ImageFormat::Png | ImageFormat::Unknown => "png",
        }
    }
}

/// Classifies an ICO entry payload by its leading bytes.  Never fails; short
/// or empty buffers are `Unknown`.
pub fn classify(data: &[u8]) -> ImageFormat {
    if data.starts_with(&PNG_SIGNATURE) {
        ImageFormat::Png
    } else if data.len() >= DIB_HEADER_LEN
        && data.starts_with(&DIB_HEADER_MARKER)
    {
        ImageFormat::Bitmap
    } else {
        ImageFormat::Unknown
    }
}

/// Like [`classify`], but also recognizes a standalone BMP file (a
/// BITMAPFILEHEADER followed by a BITMAPINFOHEADER) as `Bitmap`.
pub fn classify_source(data: &[u8]) -> ImageFormat {
    match classify(data) {
        ImageFormat::Unknown if is_bmp_file(data) => ImageFormat::Bitmap,
        format => format,
    }
}

pub(crate) fn is_bmp_file(data: &[u8]) -> bool {
    data.len() >= FILE_HEADER_LEN + DIB_HEADER_LEN
        && data.starts_with(&BMP_SIGNATURE)
        && data[FILE_HEADER_LEN..].starts_with(&DIB_HEADER_MARKER)
}

//===========================================================================//


//===========================================================================//
