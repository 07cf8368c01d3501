use crate::bitmap::{BitmapFileHeader, DibHeader, FILE_HEADER_LEN};
use crate::bmpdepth::BmpDepth;
use crate::classify::{classify_source, is_bmp_file, ImageFormat};
use crate::error::{Error, Result};
use crate::icondir::{IconDir, IconDirEntry};
use crate::pngchunk::PngImage;
use crate::recode::{recompress_png, PngCompression};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fs;
use std::path::Path;

//===========================================================================//

/// Settings that control how source images become icon entries.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BuildOptions {
    /// Compression level used when re-encoding PNG sources.
    pub png_compression: PngCompression,
    /// Whether PNG sources are decoded and re-encoded before being stored.
    /// When false, PNG sources are stored exactly as given.
    pub recompress_png: bool,
}

impl Default for BuildOptions {
    fn default() -> BuildOptions {
        BuildOptions {
            png_compression: PngCompression::Best,
            recompress_png: true,
        }
    }
}

//===========================================================================//

/// Collects BMP and PNG images and turns them into an [`IconDir`].
///
/// Entries come out sorted by width, largest first.  Images of equal width
/// keep the order they were added in.
#[derive(Clone, Debug, Default)]
pub struct IconBuilder {
    options: BuildOptions,
    sources: Vec<Vec<u8>>,
}

impl IconBuilder {
    /// Creates a builder with the default options.
    pub fn new() -> IconBuilder {
        IconBuilder::default()
    }

    /// Creates a builder with the given options.
    pub fn with_options(options: BuildOptions) -> IconBuilder {
        IconBuilder { options, sources: Vec::new() }
    }

    /// Returns the options this builder was created with.
    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Adds an encoded image: a standalone BMP file, a bare BITMAPINFOHEADER
    /// plus pixel data, or a PNG file.
    pub fn add_image<D>(&mut self, data: D) -> &mut IconBuilder
    where
        D: Into<Vec<u8>>,
    {
        self.sources.push(data.into());
        self
    }

    /// Reads an image file from disk and adds it.
    pub fn add_path<P: AsRef<Path>>(
        &mut self,
        path: P,
    ) -> Result<&mut IconBuilder> {
        let data = fs::read(path.as_ref())?;
        log::trace!(
            "Read {} bytes of image data from {}",
            data.len(),
            path.as_ref().display()
        );
        Ok(self.add_image(data))
    }

    /// Converts every added image into an entry and returns the finished
    /// directory.  Fails if no images were added, or if any image is not a
    /// supported BMP or PNG.
    pub fn build(&self) -> Result<IconDir> {
        if self.sources.is_empty() {
            return Err(Error::NoImages);
        }
        if self.sources.len() > (u16::MAX as usize) {
            return Err(Error::TooManyEntries(self.sources.len()));
        }
        let mut entries = self
            .sources
            .iter()
            .map(|data| entry_from_source(data, &self.options))
            .collect::<Result<Vec<IconDirEntry>>>()?;
        entries.sort_by_key(|entry| Reverse(entry.width()));
        log::debug!("Built icon with {} entries", entries.len());
        Ok(IconDir::from_entries(entries))
    }
}

//===========================================================================//

fn entry_from_source(
    data: &[u8],
    options: &BuildOptions,
) -> Result<IconDirEntry> {
    match classify_source(data) {
        ImageFormat::Bitmap => bitmap_entry(data),
        ImageFormat::Png => png_entry(data, options),
        ImageFormat::Unknown => {
            unsupported!("Image data is neither a BMP nor a PNG")
        }
    }
}

fn bitmap_entry(data: &[u8]) -> Result<IconDirEntry> {
    let payload = if is_bmp_file(data) {
        let header = BitmapFileHeader::parse(data)?;
        if header.file_size as usize != data.len() {
            malformed!(
                "BMP file size field (was {}) does not match data length ({})",
                header.file_size,
                data.len()
            );
        }
        &data[FILE_HEADER_LEN..]
    } else {
        data
    };
    let dib = DibHeader::parse(payload)?;
    if !dib.is_uncompressed() {
        unsupported!(
            "Compressed BMP data (compression method {}) is not supported",
            dib.compression
        );
    }
    match BmpDepth::from_bits_per_pixel(dib.bits_per_pixel) {
        Some(depth) if !depth.is_indexed() => {}
        Some(_) => unsupported!(
            "Indexed BMP data ({} bpp) is not supported",
            dib.bits_per_pixel
        ),
        None => malformed!(
            "Invalid BMP bits-per-pixel ({})",
            dib.bits_per_pixel
        ),
    }
    if dib.width <= 0 {
        malformed!("Invalid BMP width ({})", dib.width);
    }
    if dib.height <= 0 {
        unsupported!(
            "Top-down or empty BMP data (height {}) is not supported",
            dib.height
        );
    }
    // Icon bitmaps declare the combined height of the colour rows and the
    // AND mask below them.
    let stored_height = match dib.height.checked_mul(2) {
        Some(height) => height,
        None => malformed!("BMP height ({}) is too large", dib.height),
    };
    let mut stored = payload.to_vec();
    DibHeader { height: stored_height, ..dib }.rewrite(&mut stored)?;
    log::trace!(
        "Bitmap source: {}x{} {} bpp, {} bytes",
        dib.width,
        dib.height,
        dib.bits_per_pixel,
        stored.len()
    );
    Ok(IconDirEntry::new(
        dib.width as u32,
        dib.height as u32,
        0,
        1,
        dib.bits_per_pixel,
        stored,
    ))
}

fn png_entry(data: &[u8], options: &BuildOptions) -> Result<IconDirEntry> {
    let stored = if options.recompress_png {
        recompress_png(data, options.png_compression)?
    } else {
        data.to_vec()
    };
    let ihdr = PngImage::parse(&stored)?.ihdr()?;
    log::trace!(
        "PNG source: {}x{}, {} bytes stored ({} given)",
        ihdr.width,
        ihdr.height,
        stored.len(),
        data.len()
    );
    Ok(IconDirEntry::new(ihdr.width, ihdr.height, 0, 1, 32, stored))
}

//===========================================================================//


//===========================================================================//
