use crate::bitmap::{
    BitmapFileHeader, DibHeader, DIB_HEADER_LEN, FILE_HEADER_LEN,
};
use crate::builder::IconBuilder;
use crate::classify::{classify, ImageFormat};
use crate::cursor::{self, ByteCursor};
use crate::error::{Error, Result};
use byteorder::{LittleEndian, WriteBytesExt};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

//===========================================================================//

// The size of an ICONDIR header, in bytes.
const ICONDIR_LEN: usize = 6;

// The size of one ICONDIRENTRY record, in bytes.
const ICONDIRENTRY_LEN: usize = 16;

// Resource type numbers in the ICONDIR header.
const RESTYPE_ICON: u16 = 1;
const RESTYPE_CURSOR: u16 = 2;

//===========================================================================//

/// A collection of images; the contents of a single ICO file.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct IconDir {
    entries: Vec<IconDirEntry>,
}

impl IconDir {
    /// Creates a new, empty collection of icons.
    pub fn new() -> IconDir {
        IconDir { entries: Vec::new() }
    }

    pub(crate) fn from_entries(entries: Vec<IconDirEntry>) -> IconDir {
        IconDir { entries }
    }

    /// Returns the entries in this collection, in directory order.
    pub fn entries(&self) -> &[IconDirEntry] {
        &self.entries
    }

    /// Adds an entry to the end of the directory.
    pub fn add_entry(&mut self, entry: IconDirEntry) {
        self.entries.push(entry);
    }

    /// Returns the entry at `index`, or `InvalidIndex`.
    pub fn entry(&self, index: usize) -> Result<&IconDirEntry> {
        self.entries.get(index).ok_or(Error::InvalidIndex {
            index,
            count: self.entries.len(),
        })
    }

    /// Returns the raw, encoded image data of the entry at `index`.
    pub fn image_data(&self, index: usize) -> Result<&[u8]> {
        Ok(self.entry(index)?.data())
    }

    /// Parses a complete ICO file held in memory.
    ///
    /// The header must describe an icon (not a cursor) with at least one
    /// image.  The payloads must lie within `data` and, in some order, tile
    /// everything after the directory with no gaps or overlaps.
    pub fn from_bytes(data: &[u8]) -> Result<IconDir> {
        let mut reader = ByteCursor::new(data);
        let reserved = reader.read_u16::<LittleEndian>()?;
        if reserved != 0 {
            malformed!(
                "Invalid reserved field value in ICONDIR \
                 (was {}, but must be 0)",
                reserved
            );
        }
        match reader.read_u16::<LittleEndian>()? {
            RESTYPE_ICON => {}
            RESTYPE_CURSOR => malformed!("CUR files are not supported"),
            restype => malformed!("Invalid resource type ({})", restype),
        }
        let num_entries = reader.read_u16::<LittleEndian>()? as usize;
        if num_entries == 0 {
            malformed!("ICONDIR must describe at least one image");
        }
        let mut entries = Vec::<IconDirEntry>::with_capacity(num_entries);
        let mut expected_len = ICONDIR_LEN as u64;
        // (offset, length, entry index) of each payload
        let mut ranges = Vec::with_capacity(num_entries);
        for index in 0..num_entries {
            let width = reader.read_u8()?;
            let height = reader.read_u8()?;
            let num_colors = reader.read_u8()?;
            let reserved = reader.read_u8()?;
            if reserved != 0 {
                malformed!(
                    "Invalid reserved field value in ICONDIRENTRY {} \
                     (was {}, but must be 0)",
                    index,
                    reserved
                );
            }
            let color_planes = reader.read_u16::<LittleEndian>()?;
            let bits_per_pixel = reader.read_u16::<LittleEndian>()?;
            let data_size = reader.read_u32::<LittleEndian>()?;
            let data_offset = reader.read_u32::<LittleEndian>()?;
            let (start, len) = (data_offset as usize, data_size as usize);
            let payload = cursor::bytes_at(data, start, len).map_err(|_| {
                Error::IndexOutOfRange {
                    offset: data_offset as u64,
                    length: data_size as u64,
                    buffer_len: data.len(),
                }
            })?;
            log::trace!(
                "ICONDIRENTRY {}: {}x{} {} bpp, {} bytes at offset {}",
                index,
                width,
                height,
                bits_per_pixel,
                data_size,
                data_offset
            );
            expected_len += (ICONDIRENTRY_LEN as u64) + (data_size as u64);
            ranges.push((start, len, index));
            entries.push(IconDirEntry {
                width,
                height,
                num_colors,
                color_planes,
                bits_per_pixel,
                data: payload.to_vec(),
            });
        }
        if expected_len != data.len() as u64 {
            return Err(Error::SizeMismatch {
                expected: expected_len,
                actual: data.len() as u64,
            });
        }
        ranges.sort_by_key(|&(start, _, _)| start);
        let mut position = ICONDIR_LEN + ICONDIRENTRY_LEN * num_entries;
        for (start, len, index) in ranges {
            if start != position {
                malformed!(
                    "Payload of ICONDIRENTRY {} starts at offset {}, but the \
                     next unclaimed byte is at offset {}",
                    index,
                    start,
                    position
                );
            }
            position += len;
        }
        log::debug!(
            "Loaded ICO file of {} bytes with {} entries",
            data.len(),
            entries.len()
        );
        Ok(IconDir { entries })
    }

    /// Reads an ICO file from `reader` until end of input.
    pub fn read<R: Read>(mut reader: R) -> Result<IconDir> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        IconDir::from_bytes(&data)
    }

    /// Reads an ICO file of exactly `len` bytes from `reader`.  Fails if the
    /// reader runs out of data first.
    pub fn read_sized<R: Read>(reader: R, len: u64) -> Result<IconDir> {
        let mut data = Vec::new();
        reader.take(len).read_to_end(&mut data)?;
        if data.len() as u64 != len {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "Expected {} bytes, but only read {}",
                    len,
                    data.len()
                ),
            )
            .into());
        }
        IconDir::from_bytes(&data)
    }

    /// Loads an ICO file from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<IconDir> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let metadata = file.metadata()?;
        if metadata.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is a directory, not an ICO file", path.display()),
            )
            .into());
        }
        IconDir::read_sized(file, metadata.len())
    }

    /// Builds a directory from BMP and PNG images using the default
    /// [`BuildOptions`](crate::BuildOptions).
    pub fn build<I, D>(images: I) -> Result<IconDir>
    where
        I: IntoIterator<Item = D>,
        D: AsRef<[u8]>,
    {
        let mut builder = IconBuilder::new();
        for image in images {
            builder.add_image(image.as_ref());
        }
        builder.build()
    }

    /// Returns the file offset each entry's payload will be written at.
    /// Offsets are assigned in directory order right after the directory.
    /// Fails if an offset does not fit in 32 bits.
    pub fn offsets(&self) -> Result<Vec<u32>> {
        let mut data_offset =
            ICONDIR_LEN + ICONDIRENTRY_LEN * self.entries.len();
        let mut offsets = Vec::with_capacity(self.entries.len());
        for entry in self.entries.iter() {
            offsets.push(length_field(data_offset)?);
            let len = entry.data.len();
            data_offset = data_offset.checked_add(len).ok_or(
                Error::DataTooLarge {
                    len: (data_offset as u64).saturating_add(len as u64),
                },
            )?;
        }
        Ok(offsets)
    }

    /// Writes an ICO file.
    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        if self.entries.is_empty() {
            return Err(Error::NoImages);
        }
        if self.entries.len() > (u16::MAX as usize) {
            return Err(Error::TooManyEntries(self.entries.len()));
        }
        write_icondir(&mut writer, self.entries.len() as u16)?;
        for (entry, offset) in self.entries.iter().zip(self.offsets()?) {
            entry.write_record(&mut writer, offset)?;
        }
        for entry in self.entries.iter() {
            writer.write_all(&entry.data)?;
        }
        Ok(())
    }

    /// Encodes the ICO file into a new buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let len = ICONDIR_LEN
            + self
                .entries
                .iter()
                .map(|entry| ICONDIRENTRY_LEN + entry.data.len())
                .sum::<usize>();
        let mut out = Vec::with_capacity(len);
        self.write(&mut out)?;
        Ok(out)
    }

    /// Writes the ICO file to `path`, replacing any existing file.
    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    /// Returns the entry at `index` as a standalone image file.  See
    /// [`IconDirEntry::to_standalone_image`].
    pub fn standalone_image(&self, index: usize) -> Result<Vec<u8>> {
        self.entry(index)?.to_standalone_image()
    }

    /// Writes the entry at `index` to `path` as a standalone BMP or PNG file.
    pub fn export_image<P: AsRef<Path>>(
        &self,
        index: usize,
        path: P,
    ) -> Result<()> {
        let image = self.standalone_image(index)?;
        fs::write(path.as_ref(), &image)?;
        log::debug!(
            "Exported entry {} ({} bytes) to {}",
            index,
            image.len(),
            path.as_ref().display()
        );
        Ok(())
    }

    /// Returns the entry at `index` wrapped as a one-image ICO file.
    pub fn single_icon(&self, index: usize) -> Result<Vec<u8>> {
        let entry = self.entry(index)?;
        let header_len = ICONDIR_LEN + ICONDIRENTRY_LEN;
        let mut out = Vec::with_capacity(header_len + entry.data.len());
        write_icondir(&mut out, 1)?;
        entry.write_record(&mut out, header_len as u32)?;
        out.extend_from_slice(&entry.data);
        Ok(out)
    }

    /// Writes the entry at `index` to `path` as a one-image ICO file.
    pub fn export_icon<P: AsRef<Path>>(
        &self,
        index: usize,
        path: P,
    ) -> Result<()> {
        fs::write(path, self.single_icon(index)?)?;
        Ok(())
    }

    /// Exports every entry into `dir` as a standalone image, named by
    /// [`IconDirEntry::file_name`].  Returns the paths written.
    pub fn extract_to_dir<P: AsRef<Path>>(
        &self,
        dir: P,
        prefix: &str,
    ) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::with_capacity(self.entries.len());
        for (index, entry) in self.entries.iter().enumerate() {
            let path = dir.as_ref().join(entry.file_name(prefix));
            self.export_image(index, &path)?;
            paths.push(path);
        }
        Ok(paths)
    }
}

fn write_icondir<W: Write>(mut writer: W, num_entries: u16) -> io::Result<()> {
    writer.write_u16::<LittleEndian>(0)?; // reserved
    writer.write_u16::<LittleEndian>(RESTYPE_ICON)?;
    writer.write_u16::<LittleEndian>(num_entries)?;
    Ok(())
}

//===========================================================================//

/// One entry in an ICO file; a single image.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct IconDirEntry {
    width: u8,
    height: u8,
    num_colors: u8,
    color_planes: u16,
    bits_per_pixel: u16,
    data: Vec<u8>,
}

impl IconDirEntry {
    /// Creates an entry from its directory fields and encoded payload.
    /// Widths and heights above 255 are stored as 0, which ICO readers
    /// interpret as 256.
    pub fn new(
        width: u32,
        height: u32,
        num_colors: u8,
        color_planes: u16,
        bits_per_pixel: u16,
        data: Vec<u8>,
    ) -> IconDirEntry {
        IconDirEntry {
            width: dimension_byte(width),
            height: dimension_byte(height),
            num_colors,
            color_planes,
            bits_per_pixel,
            data,
        }
    }

    /// Returns the width of the image, in pixels.  A stored width of 0
    /// means 256.
    pub fn width(&self) -> u32 {
        if self.width == 0 {
            256
        } else {
            self.width as u32
        }
    }

    /// Returns the height of the image, in pixels.  A stored height of 0
    /// means 256.
    pub fn height(&self) -> u32 {
        if self.height == 0 {
            256
        } else {
            self.height as u32
        }
    }

    /// Returns the width byte exactly as stored in the directory.
    pub fn width_byte(&self) -> u8 {
        self.width
    }

    /// Returns the height byte exactly as stored in the directory.
    pub fn height_byte(&self) -> u8 {
        self.height
    }

    /// Returns the palette size hint (0 when there is no palette).
    pub fn num_colors(&self) -> u8 {
        self.num_colors
    }

    /// Returns the number of colour planes (0 or 1).
    pub fn color_planes(&self) -> u16 {
        self.color_planes
    }

    /// Returns the declared bits per pixel.
    pub fn bits_per_pixel(&self) -> u16 {
        self.bits_per_pixel
    }

    /// Returns the raw, encoded image data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the encoding of the image data.
    pub fn format(&self) -> ImageFormat {
        classify(&self.data)
    }

    /// Returns true if the image is encoded as a PNG.
    pub fn is_png(&self) -> bool {
        self.format() == ImageFormat::Png
    }

    /// Returns a file name of the form
    /// `{prefix}_icon{width}x{height}@{bits}bit.{bmp|png}`.
    pub fn file_name(&self, prefix: &str) -> String {
        format!(
            "{}_icon{}x{}@{}bit.{}",
            prefix,
            self.width(),
            self.height(),
            self.bits_per_pixel,
            self.format().extension()
        )
    }

    /// Converts the payload into a standalone image file.
    ///
    /// A bitmap payload gets a fresh BITMAPINFOHEADER (with the real image
    /// height and a raw size covering every byte after the header) and a
    /// BITMAPFILEHEADER in front.  Any other payload is returned unchanged.
    pub fn to_standalone_image(&self) -> Result<Vec<u8>> {
        if self.format() != ImageFormat::Bitmap {
            return Ok(self.data.clone());
        }
        let mut data = self.data.clone();
        let existing = DibHeader::parse(&data)?;
        let bits_per_pixel = if self.bits_per_pixel != 0 {
            self.bits_per_pixel
        } else {
            existing.bits_per_pixel
        };
        let header = BitmapFileHeader::for_payload(data.len())?;
        let raw_size =
            length_field(data.len().saturating_sub(DIB_HEADER_LEN))?;
        let dib = DibHeader::new(
            self.width(),
            self.height(),
            bits_per_pixel,
            raw_size,
            existing.palette_size,
            existing.important_colors,
        );
        dib.rewrite(&mut data)?;
        let mut out = Vec::with_capacity(FILE_HEADER_LEN + data.len());
        out.extend_from_slice(&header.to_bytes());
        out.extend_from_slice(&data);
        Ok(out)
    }

    fn write_record<W: Write>(
        &self,
        mut writer: W,
        data_offset: u32,
    ) -> Result<()> {
        let data_size = length_field(self.data.len())?;
        writer.write_u8(self.width)?;
        writer.write_u8(self.height)?;
        writer.write_u8(self.num_colors)?;
        writer.write_u8(0)?; // reserved
        writer.write_u16::<LittleEndian>(self.color_planes)?;
        writer.write_u16::<LittleEndian>(self.bits_per_pixel)?;
        writer.write_u32::<LittleEndian>(data_size)?;
        writer.write_u32::<LittleEndian>(data_offset)?;
        Ok(())
    }
}

fn length_field(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::DataTooLarge { len: len as u64 })
}

// A width/height byte of zero indicates a size of 256 or more.
fn dimension_byte(size: u32) -> u8 {
    if size > 255 {
        0
    } else {
        size as u8
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{IconDir, IconDirEntry};
    use crate::classify::{classify_source, ImageFormat};
    use crate::error::Error;
    use std::io::Cursor;

    // A 2x2, 1 bpp bitmap icon from the ico crate's test suite.
    const BMP_1BPP: &[u8] = b"\
        \x00\x00\x01\x00\x01\x00\
        \
        \x02\x02\x02\x00\x01\x00\x01\x00\
        \x40\x00\x00\x00\x16\x00\x00\x00\
        \
        \x28\x00\x00\x00\x02\x00\x00\x00\x04\x00\x00\x00\
        \x01\x00\x01\x00\x00\x00\x00\x00\x00\x00\x00\x00\
        \x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\
        \x00\x00\x00\x00\
        \
        \x55\x00\x55\x00\xff\xff\xff\x00\
        \
        \xc0\x00\x00\x00\
        \x40\x00\x00\x00\
        \
        \x40\x00\x00\x00\
        \x00\x00\x00\x00";

    // A 2x2 grayscale PNG icon from the ico crate's test suite.
    const PNG_GRAY: &[u8] = b"\
        \x00\x00\x01\x00\x01\x00\
        \
        \x02\x02\x00\x00\x00\x00\x00\x00\
        \x47\x00\x00\x00\x16\x00\x00\x00\
        \
        \x89\x50\x4e\x47\x0d\x0a\x1a\x0a\x00\x00\x00\x0d\x49\x48\x44\x52\
        \x00\x00\x00\x02\x00\x00\x00\x02\x08\x00\x00\x00\x00\x57\xdd\x52\
        \xf8\x00\x00\x00\x0e\x49\x44\x41\x54\x78\x9c\x63\xb4\x77\x60\xdc\
        \xef\x00\x00\x04\x08\x01\x81\x86\x2e\xc9\x8d\x00\x00\x00\x00\x49\
        \x45\x4e\x44\xae\x42\x60\x82";

    #[test]
    fn read_bmp_1bpp_icon() {
        let icondir = IconDir::read(Cursor::new(BMP_1BPP)).unwrap();
        assert_eq!(icondir.entries().len(), 1);
        let entry = &icondir.entries()[0];
        assert_eq!(entry.width(), 2);
        assert_eq!(entry.height(), 2);
        assert_eq!(entry.num_colors(), 2);
        assert_eq!(entry.bits_per_pixel(), 1);
        assert_eq!(entry.format(), ImageFormat::Bitmap);
        assert!(!entry.is_png());
        assert_eq!(entry.data().len(), 0x40);
        assert_eq!(icondir.offsets().unwrap(), vec![0x16]);
    }

    #[test]
    fn read_png_grayscale_icon() {
        let icondir = IconDir::from_bytes(PNG_GRAY).unwrap();
        let entry = &icondir.entries()[0];
        assert!(entry.is_png());
        assert_eq!(entry.file_name("gray"), "gray_icon2x2@0bit.png");
        assert_eq!(icondir.image_data(0).unwrap(), &PNG_GRAY[0x16..]);
    }

    #[test]
    fn round_trip_is_byte_identical() {
        for &input in &[BMP_1BPP, PNG_GRAY] {
            let icondir = IconDir::from_bytes(input).unwrap();
            assert_eq!(icondir.to_bytes().unwrap(), input.to_vec());
        }
    }

    #[test]
    fn reject_bad_headers() {
        let cases: &[&[u8]] = &[
            b"\x01\x00\x01\x00\x01\x00",
            b"\x00\x00\x02\x00\x01\x00",
            b"\x00\x00\x03\x00\x01\x00",
            b"\x00\x00\x01\x00\x00\x00",
        ];
        for &input in cases {
            match IconDir::from_bytes(input) {
                Err(Error::MalformedHeader(_)) => {}
                other => panic!("unexpected result: {:?}", other),
            }
        }
    }

    #[test]
    fn reject_nonzero_entry_reserved_byte() {
        let mut input = BMP_1BPP.to_vec();
        input[9] = 1;
        assert!(matches!(
            IconDir::from_bytes(&input),
            Err(Error::MalformedHeader(_))
        ));
    }

    #[test]
    fn truncated_directory_is_out_of_bounds() {
        assert!(matches!(
            IconDir::from_bytes(&BMP_1BPP[..12]),
            Err(Error::OutOfBounds { .. })
        ));
        assert!(matches!(
            IconDir::from_bytes(&[]),
            Err(Error::OutOfBounds { .. })
        ));
    }

    #[test]
    fn payload_past_end_is_out_of_range() {
        let input = &BMP_1BPP[..BMP_1BPP.len() - 1];
        match IconDir::from_bytes(input) {
            Err(Error::IndexOutOfRange {
                offset: 0x16, length: 0x40, ..
            }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn trailing_bytes_are_a_size_mismatch() {
        let mut input = PNG_GRAY.to_vec();
        input.extend_from_slice(b"junk");
        match IconDir::from_bytes(&input) {
            Err(Error::SizeMismatch { expected: 93, actual: 97 }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn read_sized_requires_all_bytes() {
        let icondir =
            IconDir::read_sized(Cursor::new(PNG_GRAY), PNG_GRAY.len() as u64)
                .unwrap();
        assert_eq!(icondir.entries().len(), 1);
        let result = IconDir::read_sized(Cursor::new(PNG_GRAY), 1000);
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn invalid_index() {
        let icondir = IconDir::from_bytes(PNG_GRAY).unwrap();
        match icondir.image_data(1) {
            Err(Error::InvalidIndex { index: 1, count: 1 }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(icondir.standalone_image(5).is_err());
        assert!(icondir.single_icon(1).is_err());
    }

    #[test]
    fn standalone_bitmap_gets_file_header() {
        let icondir = IconDir::from_bytes(BMP_1BPP).unwrap();
        let image = icondir.standalone_image(0).unwrap();
        assert_eq!(classify_source(&image), ImageFormat::Bitmap);
        assert_eq!(image.len(), 14 + 0x40);
        let expected_header: &[u8] =
            b"BM\x4e\x00\x00\x00\x00\x00\x00\x00\x36\x00\x00\x00";
        assert_eq!(&image[..14], expected_header);
        let expected_dib: &[u8] = b"\
            \x28\x00\x00\x00\x02\x00\x00\x00\x02\x00\x00\x00\
            \x01\x00\x01\x00\x00\x00\x00\x00\x18\x00\x00\x00\
            \x13\x0b\x00\x00\x13\x0b\x00\x00\x00\x00\x00\x00\
            \x00\x00\x00\x00";
        assert_eq!(&image[14..54], expected_dib);
        assert_eq!(&image[54..], &BMP_1BPP[0x16 + 40..]);
        // The loaded entry itself is untouched.
        assert_eq!(icondir.image_data(0).unwrap(), &BMP_1BPP[0x16..]);
    }

    #[test]
    fn standalone_png_is_unchanged() {
        let icondir = IconDir::from_bytes(PNG_GRAY).unwrap();
        let image = icondir.standalone_image(0).unwrap();
        assert_eq!(image.as_slice(), &PNG_GRAY[0x16..]);
    }

    #[test]
    fn single_icon_from_second_entry() {
        let bmp = IconDir::from_bytes(BMP_1BPP).unwrap();
        let png = IconDir::from_bytes(PNG_GRAY).unwrap();
        let mut icondir = IconDir::new();
        icondir.add_entry(bmp.entries()[0].clone());
        icondir.add_entry(png.entries()[0].clone());
        let single = icondir.single_icon(1).unwrap();
        assert_eq!(single, PNG_GRAY.to_vec());
    }

    #[test]
    fn zero_dimension_means_256() {
        let signature = b"\x89PNG\r\n\x1a\n".to_vec();
        let entry = IconDirEntry::new(256, 256, 0, 1, 32, signature);
        assert_eq!(entry.width_byte(), 0);
        assert_eq!(entry.height_byte(), 0);
        assert_eq!(entry.width(), 256);
        assert_eq!(entry.height(), 256);
        assert_eq!(entry.file_name("big"), "big_icon256x256@32bit.png");
        let mut icondir = IconDir::new();
        icondir.add_entry(entry);
        let bytes = icondir.to_bytes().unwrap();
        assert_eq!(&bytes[6..8], b"\x00\x00");
        let reloaded = IconDir::from_bytes(&bytes).unwrap();
        assert_eq!(reloaded.entries()[0].width_byte(), 0);
        assert_eq!(reloaded.entries()[0].width(), 256);
    }

    fn layout(records: &[(&[u8], u32, u32)], payloads: &[&[u8]]) -> Vec<u8> {
        let mut out = vec![0, 0, 1, 0, records.len() as u8, 0];
        for &(fields, size, offset) in records {
            out.extend_from_slice(fields);
            out.extend_from_slice(&size.to_le_bytes());
            out.extend_from_slice(&offset.to_le_bytes());
        }
        for payload in payloads {
            out.extend_from_slice(payload);
        }
        out
    }

    #[test]
    fn payloads_stored_out_of_order_are_accepted() {
        let bmp = &BMP_1BPP[0x16..];
        let png = &PNG_GRAY[0x16..];
        let bmp_fields = &BMP_1BPP[6..14];
        let png_fields = &PNG_GRAY[6..14];
        // Directory lists the bitmap first, but its bytes come last.
        let input = layout(
            &[(bmp_fields, 0x40, 38 + 0x47), (png_fields, 0x47, 38)],
            &[png, bmp],
        );
        let icondir = IconDir::from_bytes(&input).unwrap();
        assert_eq!(icondir.image_data(0).unwrap(), bmp);
        assert_eq!(icondir.image_data(1).unwrap(), png);

        // Writing puts payloads back in directory order.
        let canonical = layout(
            &[(bmp_fields, 0x40, 38), (png_fields, 0x47, 38 + 0x40)],
            &[bmp, png],
        );
        let written = icondir.to_bytes().unwrap();
        assert_ne!(written, input);
        assert_eq!(written, canonical);
        assert_eq!(IconDir::from_bytes(&written).unwrap(), icondir);
    }

    #[test]
    fn shared_payload_with_unclaimed_bytes_is_rejected() {
        let bmp = &BMP_1BPP[0x16..];
        let fields = &BMP_1BPP[6..14];
        // Both entries claim the same bytes; an equal amount of junk
        // follows, so the lengths alone still add up.
        let junk = [0xeeu8; 0x40];
        let input = layout(
            &[(fields, 0x40, 38), (fields, 0x40, 38)],
            &[bmp, &junk],
        );
        match IconDir::from_bytes(&input) {
            Err(Error::MalformedHeader(_)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn payload_inside_directory_is_rejected() {
        let png = &PNG_GRAY[0x16..];
        let fields = &PNG_GRAY[6..14];
        let mut input = layout(&[(fields, 0x47, 0x10)], &[png]);
        assert!(matches!(
            IconDir::from_bytes(&input),
            Err(Error::MalformedHeader(_))
        ));
        input[18] = 0x16;
        assert!(IconDir::from_bytes(&input).is_ok());
    }

    #[test]
    fn write_empty_icon_set_fails() {
        let icondir = IconDir::new();
        assert!(matches!(icondir.to_bytes(), Err(Error::NoImages)));
    }
}

//===========================================================================//
