//! The BITMAPFILEHEADER and BITMAPINFOHEADER structures.
//!
//! An ICO entry stores a bitmap as a BITMAPINFOHEADER followed by pixel
//! data, without the 14-byte file header that a standalone BMP file has.
//! These types convert between the two layouts.

use crate::cursor::ByteCursor;
use crate::error::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};

//===========================================================================//

/// The size of a BITMAPFILEHEADER struct, in bytes.
pub const FILE_HEADER_LEN: usize = 14;

/// The size of a BITMAPINFOHEADER struct, in bytes.
pub const DIB_HEADER_LEN: usize = 40;

/// The first four bytes of any BITMAPINFOHEADER (its size, little-endian).
pub const DIB_HEADER_MARKER: [u8; 4] = [0x28, 0x00, 0x00, 0x00];

/// The signature of a standalone BMP file.
pub const BMP_SIGNATURE: [u8; 2] = *b"BM";

// 72 DPI, in pixels per meter.
const PRINT_RESOLUTION: u32 = 2835;

// BI_RGB: no compression.
const COMPRESSION_NONE: u32 = 0;

//===========================================================================//

/// The 14-byte header that starts a standalone BMP file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BitmapFileHeader {
    /// Total size of the BMP file, in bytes.
    pub file_size: u32,
    /// Offset from the start of the file to the pixel array.
    pub pixel_offset: u32,
}

impl BitmapFileHeader {
    /// Creates the header for a file made of this header followed by
    /// `payload_len` bytes of BITMAPINFOHEADER and pixel data.  Fails if the
    /// total does not fit in the 32-bit size field.
    pub fn for_payload(payload_len: usize) -> Result<BitmapFileHeader> {
        let file_size = payload_len
            .checked_add(FILE_HEADER_LEN)
            .and_then(|len| u32::try_from(len).ok())
            .ok_or(Error::DataTooLarge {
                len: payload_len as u64 + FILE_HEADER_LEN as u64,
            })?;
        Ok(BitmapFileHeader {
            file_size,
            pixel_offset: (FILE_HEADER_LEN + DIB_HEADER_LEN) as u32,
        })
    }

    /// Decodes the header at the start of `buffer`.
    pub fn parse(buffer: &[u8]) -> Result<BitmapFileHeader> {
        let mut reader = ByteCursor::new(buffer);
        if reader.read_bytes(2)? != BMP_SIGNATURE {
            malformed!("Invalid BMP signature");
        }
        let file_size = reader.read_u32::<LittleEndian>()?;
        let reserved_a = reader.read_u16::<LittleEndian>()?;
        let reserved_b = reader.read_u16::<LittleEndian>()?;
        if reserved_a != 0 || reserved_b != 0 {
            malformed!(
                "Invalid reserved fields in BITMAPFILEHEADER \
                 (were {} and {}, but must be 0)",
                reserved_a,
                reserved_b
            );
        }
        let pixel_offset = reader.read_u32::<LittleEndian>()?;
        Ok(BitmapFileHeader { file_size, pixel_offset })
    }

    /// Encodes the header.
    pub fn to_bytes(&self) -> [u8; FILE_HEADER_LEN] {
        let mut bytes = [0u8; FILE_HEADER_LEN];
        bytes[0..2].copy_from_slice(&BMP_SIGNATURE);
        LittleEndian::write_u32(&mut bytes[2..6], self.file_size);
        // bytes 6..10 are the two reserved fields
        LittleEndian::write_u32(&mut bytes[10..14], self.pixel_offset);
        bytes
    }
}

//===========================================================================//

/// The 40-byte BITMAPINFOHEADER that describes a bitmap's geometry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DibHeader {
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.  Positive for bottom-up rows; icon entries store
    /// twice the image height to account for the AND mask.
    pub height: i32,
    /// Number of colour planes; always 1.
    pub color_planes: u16,
    /// Bits per pixel.
    pub bits_per_pixel: u16,
    /// Compression method; 0 for uncompressed.
    pub compression: u32,
    /// Size of the raw pixel data, in bytes.
    pub raw_size: u32,
    /// Horizontal print resolution, in pixels per meter.
    pub horz_ppm: u32,
    /// Vertical print resolution, in pixels per meter.
    pub vert_ppm: u32,
    /// Number of colours in the palette.
    pub palette_size: u32,
    /// Number of important colours (0 means all).
    pub important_colors: u32,
}

impl DibHeader {
    /// Creates an uncompressed single-plane descriptor at 72 DPI.
    pub fn new(
        width: u32,
        height: u32,
        bits_per_pixel: u16,
        raw_size: u32,
        palette_size: u32,
        important_colors: u32,
    ) -> DibHeader {
        DibHeader {
            width: width as i32,
            height: height as i32,
            color_planes: 1,
            bits_per_pixel,
            compression: COMPRESSION_NONE,
            raw_size,
            horz_ppm: PRINT_RESOLUTION,
            vert_ppm: PRINT_RESOLUTION,
            palette_size,
            important_colors,
        }
    }

    /// Decodes the descriptor at the start of `buffer`.
    pub fn parse(buffer: &[u8]) -> Result<DibHeader> {
        let mut reader = ByteCursor::new(buffer);
        let header_size = reader.read_u32::<LittleEndian>()?;
        if header_size as usize != DIB_HEADER_LEN {
            malformed!(
                "Invalid BMP header size (was {}, must be {})",
                header_size,
                DIB_HEADER_LEN
            );
        }
        Ok(DibHeader {
            width: reader.read_i32::<LittleEndian>()?,
            height: reader.read_i32::<LittleEndian>()?,
            color_planes: reader.read_u16::<LittleEndian>()?,
            bits_per_pixel: reader.read_u16::<LittleEndian>()?,
            compression: reader.read_u32::<LittleEndian>()?,
            raw_size: reader.read_u32::<LittleEndian>()?,
            horz_ppm: reader.read_u32::<LittleEndian>()?,
            vert_ppm: reader.read_u32::<LittleEndian>()?,
            palette_size: reader.read_u32::<LittleEndian>()?,
            important_colors: reader.read_u32::<LittleEndian>()?,
        })
    }

    /// Returns true if the pixel data is stored uncompressed.
    pub fn is_uncompressed(&self) -> bool {
        self.compression == COMPRESSION_NONE
    }

    /// Encodes the descriptor.
    pub fn to_bytes(&self) -> [u8; DIB_HEADER_LEN] {
        let mut bytes = [0u8; DIB_HEADER_LEN];
        bytes[0..4].copy_from_slice(&DIB_HEADER_MARKER);
        LittleEndian::write_i32(&mut bytes[4..8], self.width);
        LittleEndian::write_i32(&mut bytes[8..12], self.height);
        LittleEndian::write_u16(&mut bytes[12..14], self.color_planes);
        LittleEndian::write_u16(&mut bytes[14..16], self.bits_per_pixel);
        LittleEndian::write_u32(&mut bytes[16..20], self.compression);
        LittleEndian::write_u32(&mut bytes[20..24], self.raw_size);
        LittleEndian::write_u32(&mut bytes[24..28], self.horz_ppm);
        LittleEndian::write_u32(&mut bytes[28..32], self.vert_ppm);
        LittleEndian::write_u32(&mut bytes[32..36], self.palette_size);
        LittleEndian::write_u32(&mut bytes[36..40], self.important_colors);
        bytes
    }

    /// Overwrites the first 40 bytes of `buffer` with this descriptor.
    /// Fails if `buffer` has no bytes beyond the descriptor.
    pub fn rewrite(&self, buffer: &mut [u8]) -> Result<()> {
        if buffer.len() <= DIB_HEADER_LEN {
            return Err(Error::BufferTooSmall { len: buffer.len() });
        }
        buffer[..DIB_HEADER_LEN].copy_from_slice(&self.to_bytes());
        Ok(())
    }
}

//===========================================================================//


//===========================================================================//
