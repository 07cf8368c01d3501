//! Chunk-level PNG container codec.
//!
//! This module only understands the container: the signature, the
//! length/type/data/CRC framing of each chunk, and the placement rules for
//! the critical chunks.  Pixel data inside IDAT chunks is left compressed.

use crate::cursor;
use crate::error::{Error, Result};
use byteorder::{BigEndian, WriteBytesExt};
use std::fmt;
use std::io::{self, Write};

//===========================================================================//

/// The signature that all PNG files start with.
pub const PNG_SIGNATURE: [u8; 8] =
    [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// The IEND chunk is always exactly these bytes.
pub const IEND_CHUNK: [u8; 12] = [
    0x00, 0x00, 0x00, 0x00, b'I', b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82,
];

// Length, type, and CRC fields around each chunk's data.
const LENGTH_LEN: usize = 4;
const TYPE_LEN: usize = 4;
const CRC_LEN: usize = 4;

// The IHDR chunk always carries exactly this many data bytes.
const IHDR_DATA_LEN: usize = 13;

// Chunk lengths are limited to 2^31 - 1.
const MAX_CHUNK_LEN: u32 = 0x7fff_ffff;

//===========================================================================//

/// A four-character PNG chunk type code.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct ChunkType(pub [u8; 4]);

impl ChunkType {
    /// The image header chunk.
    pub const IHDR: ChunkType = ChunkType(*b"IHDR");
    /// The palette chunk.
    pub const PLTE: ChunkType = ChunkType(*b"PLTE");
    /// A compressed image data chunk.
    pub const IDAT: ChunkType = ChunkType(*b"IDAT");
    /// The end-of-image marker chunk.
    pub const IEND: ChunkType = ChunkType(*b"IEND");

    /// Returns the raw type code bytes.
    pub fn bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Returns true if decoders must understand this chunk (the ancillary
    /// bit, bit 5 of the first byte, is clear).
    pub fn is_critical(&self) -> bool {
        self.0[0] & 0x20 == 0
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &byte in self.0.iter() {
            if byte.is_ascii_graphic() {
                write!(f, "{}", byte as char)?;
            } else {
                write!(f, "\\x{:02x}", byte)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkType({})", self)
    }
}

//===========================================================================//

/// Computes the CRC32 of a chunk, covering its type code and data.
pub fn chunk_crc(chunk_type: ChunkType, data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type.bytes());
    hasher.update(data);
    hasher.finalize()
}

/// Encodes one complete chunk: big-endian length, type code, data, and
/// big-endian CRC32.  Fails if `data` is longer than 2^31 - 1 bytes.
pub fn encode_chunk(chunk_type: ChunkType, data: &[u8]) -> Result<Vec<u8>> {
    Ok(Chunk::new(chunk_type, data.to_vec())?.to_bytes())
}

//===========================================================================//

/// One chunk of a PNG stream.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Chunk {
    chunk_type: ChunkType,
    data: Vec<u8>,
    crc: u32,
}

impl Chunk {
    /// Creates a chunk with a freshly computed CRC.  Fails if `data` is
    /// longer than 2^31 - 1 bytes.
    pub fn new(chunk_type: ChunkType, data: Vec<u8>) -> Result<Chunk> {
        if data.len() > MAX_CHUNK_LEN as usize {
            return Err(Error::DataTooLarge { len: data.len() as u64 });
        }
        let crc = chunk_crc(chunk_type, &data);
        Ok(Chunk { chunk_type, data, crc })
    }

    /// Reads the chunk whose type tag begins at `type_offset`, verifying
    /// that the tag is `expected` and that the stored CRC matches.
    pub(crate) fn read_at(
        buffer: &[u8],
        type_offset: usize,
        expected: ChunkType,
    ) -> Result<Chunk> {
        if type_offset < LENGTH_LEN {
            return Err(Error::IndexOutOfRange {
                offset: type_offset as u64,
                length: LENGTH_LEN as u64,
                buffer_len: buffer.len(),
            });
        }
        let start = type_offset - LENGTH_LEN;
        let mut reader = cursor::ByteCursor::at(buffer, start);
        let length = reader.read_u32::<BigEndian>()?;
        if length > MAX_CHUNK_LEN {
            malformed!(
                "{} chunk length {} exceeds 2^31 - 1",
                expected,
                length
            );
        }
        let tag = reader.read_bytes(TYPE_LEN)?;
        if tag != expected.bytes() {
            malformed!(
                "Expected {} chunk at offset {}",
                expected,
                type_offset
            );
        }
        let data_offset = reader.position();
        if reader.remaining() < length as usize + CRC_LEN {
            return Err(Error::IndexOutOfRange {
                offset: data_offset as u64,
                length: length as u64 + CRC_LEN as u64,
                buffer_len: buffer.len(),
            });
        }
        let data = reader.read_bytes(length as usize)?.to_vec();
        let crc = reader.read_u32::<BigEndian>()?;
        let chunk = Chunk { chunk_type: expected, data, crc };
        if !chunk.crc_matches() {
            return Err(Error::ChunkCrc { chunk_type: expected });
        }
        log::trace!(
            "{} chunk at offset {}: {} data bytes",
            expected,
            type_offset - LENGTH_LEN,
            length
        );
        Ok(chunk)
    }

    /// Returns the chunk's type code.
    pub fn chunk_type(&self) -> ChunkType {
        self.chunk_type
    }

    /// Returns the chunk's data bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the declared data length.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the chunk carries no data (as IEND never does).
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the CRC stored alongside the chunk.
    pub fn crc(&self) -> u32 {
        self.crc
    }

    /// Returns true if the stored CRC matches the type code and data.
    pub fn crc_matches(&self) -> bool {
        chunk_crc(self.chunk_type, &self.data) == self.crc
    }

    // Every constructor caps the data at MAX_CHUNK_LEN, so this is lossless.
    fn length_field(&self) -> u32 {
        self.data.len() as u32
    }

    /// Total encoded size, including the length, type, and CRC fields.
    pub fn encoded_len(&self) -> usize {
        LENGTH_LEN + TYPE_LEN + self.data.len() + CRC_LEN
    }

    /// Encodes the chunk with its stored CRC into a new buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&self.length_field().to_be_bytes());
        out.extend_from_slice(self.chunk_type.bytes());
        out.extend_from_slice(&self.data);
        out.extend_from_slice(&self.crc.to_be_bytes());
        out
    }

    /// Writes the chunk with its stored CRC.
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_u32::<BigEndian>(self.length_field())?;
        writer.write_all(self.chunk_type.bytes())?;
        writer.write_all(&self.data)?;
        writer.write_u32::<BigEndian>(self.crc)?;
        Ok(())
    }
}

//===========================================================================//

/// The fields of an IHDR chunk.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Ihdr {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Bits per sample (or per palette index).
    pub bit_depth: u8,
    /// PNG colour type code (0, 2, 3, 4, or 6).
    pub color_type: u8,
    /// Compression method; always 0.
    pub compression: u8,
    /// Filter method; always 0.
    pub filter: u8,
    /// Interlace method: 0 for none, 1 for Adam7.
    pub interlace: u8,
}

impl Ihdr {
    /// Decodes the 13 data bytes of an IHDR chunk.  Unlike the rest of the
    /// ICO format, the dimensions are stored big-endian.
    pub fn parse(data: &[u8]) -> Result<Ihdr> {
        if data.len() != IHDR_DATA_LEN {
            malformed!(
                "Invalid IHDR length (was {}, but must be {})",
                data.len(),
                IHDR_DATA_LEN
            );
        }
        let mut reader = cursor::ByteCursor::new(data);
        Ok(Ihdr {
            width: reader.read_u32::<BigEndian>()?,
            height: reader.read_u32::<BigEndian>()?,
            bit_depth: reader.read_u8()?,
            color_type: reader.read_u8()?,
            compression: reader.read_u8()?,
            filter: reader.read_u8()?,
            interlace: reader.read_u8()?,
        })
    }

    /// Bits per pixel implied by the colour type and bit depth.
    pub fn bits_per_pixel(&self) -> u16 {
        let channels: u16 = match self.color_type {
            2 => 3,
            4 => 2,
            6 => 4,
            _ => 1,
        };
        channels * self.bit_depth as u16
    }
}

//===========================================================================//

/// Lazily yields the offsets of every `IDAT` type tag in a buffer.
///
/// After each match the search resumes past the end of the chunk that the
/// match belongs to, so compressed data inside an already-located chunk is
/// never rescanned.  The scan is bounded only by the buffer length.
#[derive(Clone, Debug)]
pub struct IdatOffsets<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> Iterator for IdatOffsets<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let rest = self.buffer.get(self.position..)?;
        let found = self.position + find_tag(rest, ChunkType::IDAT)?;
        let chunk_end = found
            .checked_sub(LENGTH_LEN)
            .and_then(|start| {
                cursor::read_u32_at::<BigEndian>(self.buffer, start).ok()
            })
            .and_then(|length| {
                found.checked_add(TYPE_LEN + length as usize + CRC_LEN)
            });
        self.position = match chunk_end {
            Some(end) => end.min(self.buffer.len()),
            None => found + TYPE_LEN,
        };
        Some(found)
    }
}

/// Returns the offsets of every `IDAT` type tag in `buffer`.
pub fn search_idat_chunks(buffer: &[u8]) -> IdatOffsets<'_> {
    IdatOffsets { buffer, position: 0 }
}

fn find_tag(haystack: &[u8], chunk_type: ChunkType) -> Option<usize> {
    haystack.windows(TYPE_LEN).position(|window| window == chunk_type.bytes())
}

//===========================================================================//

/// A validated PNG stream, split into chunks.
///
/// Only the critical chunks (IHDR, an optional PLTE, every IDAT, and IEND)
/// are retained.  IDAT chunks are kept separate so that the framing of the
/// compressed stream is preserved.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PngImage {
    chunks: Vec<Chunk>,
}

impl PngImage {
    /// Parses and validates a complete PNG stream.
    ///
    /// The stream is walked chunk by chunk using each chunk's declared
    /// length.  IHDR must come first and appear once, an optional PLTE must
    /// precede the first IDAT, at least one IDAT is required, and a single
    /// empty IEND must end the stream.  Ancillary chunks are checked and
    /// then dropped.
    pub fn parse(buffer: &[u8]) -> Result<PngImage> {
        if !buffer.starts_with(&PNG_SIGNATURE) {
            malformed!("Invalid PNG signature");
        }
        let mut chunks = Vec::<Chunk>::new();
        let mut position = PNG_SIGNATURE.len();
        let mut seen_idat = false;
        let mut seen_iend = false;
        while position < buffer.len() {
            if seen_iend {
                malformed!(
                    "IEND must be the last chunk (found data at offset {})",
                    position
                );
            }
            if buffer.len() - position < LENGTH_LEN + TYPE_LEN + CRC_LEN {
                malformed!("Truncated chunk at offset {}", position);
            }
            let type_offset = position + LENGTH_LEN;
            let mut tag = [0u8; TYPE_LEN];
            tag.copy_from_slice(&buffer[type_offset..type_offset + TYPE_LEN]);
            let chunk_type = ChunkType(tag);
            if chunks.is_empty() && chunk_type != ChunkType::IHDR {
                if find_tag(buffer, ChunkType::IHDR).is_some() {
                    malformed!(
                        "IHDR must be the first chunk (found {} first)",
                        chunk_type
                    );
                }
                return Err(Error::ChunkNotFound {
                    chunk_type: ChunkType::IHDR,
                });
            }
            let chunk = Chunk::read_at(buffer, type_offset, chunk_type)?;
            position += chunk.encoded_len();
            match chunk_type {
                ChunkType::IHDR => {
                    if !chunks.is_empty() {
                        malformed!(
                            "Duplicate IHDR chunk at offset {}",
                            type_offset - LENGTH_LEN
                        );
                    }
                    Ihdr::parse(chunk.data())?;
                }
                ChunkType::PLTE => {
                    if seen_idat {
                        malformed!("PLTE must come before the first IDAT");
                    }
                    let is_palette =
                        |chunk: &Chunk| chunk.chunk_type == ChunkType::PLTE;
                    if chunks.iter().any(is_palette) {
                        malformed!("Duplicate PLTE chunk");
                    }
                }
                ChunkType::IDAT => seen_idat = true,
                ChunkType::IEND => {
                    if !chunk.is_empty() {
                        malformed!("IEND must carry no data");
                    }
                    seen_iend = true;
                }
                other if other.is_critical() => {
                    malformed!("Unknown critical chunk {}", other);
                }
                other => {
                    log::trace!("Skipping ancillary {} chunk", other);
                    continue;
                }
            }
            chunks.push(chunk);
        }
        if chunks.is_empty() {
            return Err(Error::ChunkNotFound { chunk_type: ChunkType::IHDR });
        }
        if !seen_idat {
            return Err(Error::ChunkNotFound { chunk_type: ChunkType::IDAT });
        }
        if !seen_iend {
            return Err(Error::ChunkNotFound { chunk_type: ChunkType::IEND });
        }
        log::debug!(
            "Parsed PNG stream of {} bytes into {} chunks",
            buffer.len(),
            chunks.len()
        );
        Ok(PngImage { chunks })
    }

    /// Returns the retained chunks, in stream order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Returns the decoded IHDR fields.
    pub fn ihdr(&self) -> Result<Ihdr> {
        Ihdr::parse(self.chunks[0].data())
    }

    /// Returns the palette chunk, if the stream has one.
    pub fn palette(&self) -> Option<&Chunk> {
        self.chunks.iter().find(|chunk| chunk.chunk_type() == ChunkType::PLTE)
    }

    /// Returns the data of each IDAT chunk, in order and unconcatenated.
    pub fn idat_payloads(&self) -> Vec<&[u8]> {
        self.chunks
            .iter()
            .filter(|chunk| chunk.chunk_type() == ChunkType::IDAT)
            .map(Chunk::data)
            .collect()
    }

    /// Writes the signature and the retained chunks.
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(&PNG_SIGNATURE)?;
        for chunk in self.chunks.iter() {
            chunk.write(&mut writer)?;
        }
        Ok(())
    }

    /// Encodes the signature and the retained chunks into a new buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let len = PNG_SIGNATURE.len()
            + self.chunks.iter().map(Chunk::encoded_len).sum::<usize>();
        let mut out = Vec::with_capacity(len);
        out.extend_from_slice(&PNG_SIGNATURE);
        for chunk in self.chunks.iter() {
            out.extend_from_slice(&chunk.to_bytes());
        }
        out
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{
        chunk_crc, encode_chunk, search_idat_chunks, Chunk, ChunkType,
        PngImage, IEND_CHUNK, PNG_SIGNATURE,
    };
    use crate::error::Error;
    use proptest::prelude::*;

    // A 2x2 grayscale image from the ico crate's test suite.
    const GRAY_2X2: &[u8] = b"\
        \x89\x50\x4e\x47\x0d\x0a\x1a\x0a\x00\x00\x00\x0d\x49\x48\x44\x52\
        \x00\x00\x00\x02\x00\x00\x00\x02\x08\x00\x00\x00\x00\x57\xdd\x52\
        \xf8\x00\x00\x00\x0e\x49\x44\x41\x54\x78\x9c\x63\xb4\x77\x60\xdc\
        \xef\x00\x00\x04\x08\x01\x81\x86\x2e\xc9\x8d\x00\x00\x00\x00\x49\
        \x45\x4e\x44\xae\x42\x60\x82";

    fn ihdr_data(width: u32, height: u32) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&width.to_be_bytes());
        data.extend_from_slice(&height.to_be_bytes());
        data.extend_from_slice(&[8, 6, 0, 0, 0]);
        data
    }

    fn assemble(chunks: &[(ChunkType, &[u8])]) -> Vec<u8> {
        let mut out = PNG_SIGNATURE.to_vec();
        for &(chunk_type, data) in chunks {
            out.extend(encode_chunk(chunk_type, data).unwrap());
        }
        out.extend_from_slice(&IEND_CHUNK);
        out
    }

    #[test]
    fn iend_constant_matches_crc() {
        assert_eq!(
            encode_chunk(ChunkType::IEND, &[]).unwrap(),
            IEND_CHUNK.to_vec()
        );
        assert_eq!(chunk_crc(ChunkType::IEND, &[]), 0xAE42_6082);
    }

    #[test]
    fn chunk_type_display() {
        assert_eq!(ChunkType::IDAT.to_string(), "IDAT");
        assert_eq!(ChunkType(*b"a\x00bc").to_string(), "a\\x00bc");
        assert!(ChunkType::PLTE.is_critical());
        assert!(!ChunkType(*b"tEXt").is_critical());
    }

    #[test]
    fn parse_gray_png() {
        let png = PngImage::parse(GRAY_2X2).unwrap();
        let types: Vec<ChunkType> =
            png.chunks().iter().map(|chunk| chunk.chunk_type()).collect();
        assert_eq!(
            types,
            vec![ChunkType::IHDR, ChunkType::IDAT, ChunkType::IEND]
        );
        let ihdr = png.ihdr().unwrap();
        assert_eq!((ihdr.width, ihdr.height), (2, 2));
        assert_eq!(ihdr.bits_per_pixel(), 8);
        assert_eq!(png.idat_payloads().len(), 1);
        assert!(png.palette().is_none());
        assert_eq!(png.to_bytes(), GRAY_2X2.to_vec());
    }

    #[test]
    fn multiple_idat_chunks_stay_separate() {
        let ihdr = ihdr_data(1, 1);
        let input = assemble(&[
            (ChunkType::IHDR, &ihdr),
            (ChunkType::IDAT, b"first"),
            (ChunkType::IDAT, b"second"),
            (ChunkType::IDAT, b"third"),
        ]);
        let png = PngImage::parse(&input).unwrap();
        assert_eq!(
            png.idat_payloads(),
            vec![&b"first"[..], &b"second"[..], &b"third"[..]]
        );
        assert_eq!(png.chunks().len(), 5);
        let mut written = Vec::new();
        png.write(&mut written).unwrap();
        assert_eq!(written, input);
    }

    #[test]
    fn idat_search_is_lazy_and_skips_consumed_data() {
        let ihdr = ihdr_data(1, 1);
        // The first IDAT's data contains the tag itself, which must not be
        // reported as a separate chunk.
        let input = assemble(&[
            (ChunkType::IHDR, &ihdr),
            (ChunkType::IDAT, b"xxIDATxx"),
            (ChunkType::IDAT, b"yy"),
        ]);
        let offsets: Vec<usize> = search_idat_chunks(&input).collect();
        assert_eq!(offsets, vec![37, 57]);
        let mut lazy = search_idat_chunks(&input);
        assert_eq!(lazy.next(), Some(37));
        let png = PngImage::parse(&input).unwrap();
        assert_eq!(png.idat_payloads(), vec![&b"xxIDATxx"[..], &b"yy"[..]]);
    }

    #[test]
    fn palette_chunk_is_retained() {
        let ihdr = ihdr_data(1, 1);
        let input = assemble(&[
            (ChunkType::IHDR, &ihdr),
            (ChunkType::PLTE, b"\xff\x00\x00"),
            (ChunkType::IDAT, b"data"),
        ]);
        let png = PngImage::parse(&input).unwrap();
        assert_eq!(png.palette().unwrap().data(), b"\xff\x00\x00");
        assert_eq!(png.chunks()[1].chunk_type(), ChunkType::PLTE);
    }

    #[test]
    fn corrupt_palette_fails() {
        let ihdr = ihdr_data(1, 1);
        let mut input = assemble(&[
            (ChunkType::IHDR, &ihdr),
            (ChunkType::PLTE, b"\xff\x00\x00"),
            (ChunkType::IDAT, b"data"),
        ]);
        input[41] ^= 0x01;
        match PngImage::parse(&input) {
            Err(Error::ChunkCrc { chunk_type: ChunkType::PLTE }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn every_data_byte_is_covered_by_crc() {
        // IHDR data spans 16..29 and IDAT data spans 41..55.
        let data_bytes = (16..29).chain(41..55);
        for index in data_bytes {
            let mut input = GRAY_2X2.to_vec();
            input[index] ^= 0x10;
            match PngImage::parse(&input) {
                Err(Error::ChunkCrc { .. }) => {}
                other => {
                    panic!("byte {}: unexpected result: {:?}", index, other)
                }
            }
        }
    }

    #[test]
    fn missing_chunks_are_reported() {
        let ihdr = ihdr_data(1, 1);
        let no_idat = assemble(&[(ChunkType::IHDR, &ihdr)]);
        match PngImage::parse(&no_idat) {
            Err(Error::ChunkNotFound { chunk_type: ChunkType::IDAT }) => {}
            other => panic!("unexpected result: {:?}", other),
        }

        let mut no_iend = GRAY_2X2.to_vec();
        no_iend.truncate(no_iend.len() - IEND_CHUNK.len());
        match PngImage::parse(&no_iend) {
            Err(Error::ChunkNotFound { chunk_type: ChunkType::IEND }) => {}
            other => panic!("unexpected result: {:?}", other),
        }

        let mut trailing = GRAY_2X2.to_vec();
        trailing.push(0);
        match PngImage::parse(&trailing) {
            Err(Error::MalformedHeader(_)) => {}
            other => panic!("unexpected result: {:?}", other),
        }

        let mut no_ihdr = PNG_SIGNATURE.to_vec();
        no_ihdr.extend(encode_chunk(ChunkType::IDAT, b"data").unwrap());
        no_ihdr.extend_from_slice(&IEND_CHUNK);
        match PngImage::parse(&no_ihdr) {
            Err(Error::ChunkNotFound { chunk_type: ChunkType::IHDR }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn bad_signature_fails() {
        let mut input = GRAY_2X2.to_vec();
        input[1] = b'Q';
        assert!(matches!(
            PngImage::parse(&input),
            Err(Error::MalformedHeader(_))
        ));
        assert!(PngImage::parse(&[]).is_err());
    }

    #[test]
    fn truncated_idat_is_out_of_range() {
        let ihdr = ihdr_data(1, 1);
        let mut input = PNG_SIGNATURE.to_vec();
        input.extend(encode_chunk(ChunkType::IHDR, &ihdr).unwrap());
        // Declares 100 data bytes but provides 4.
        input.extend_from_slice(b"\x00\x00\x00\x64IDATdata");
        input.extend_from_slice(&IEND_CHUNK);
        assert!(matches!(
            PngImage::parse(&input),
            Err(Error::IndexOutOfRange { .. })
        ));
    }

    fn assert_malformed(input: &[u8]) {
        match PngImage::parse(input) {
            Err(Error::MalformedHeader(_)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn second_iend_is_rejected() {
        let ihdr = ihdr_data(1, 1);
        let mut input = PNG_SIGNATURE.to_vec();
        input.extend(encode_chunk(ChunkType::IHDR, &ihdr).unwrap());
        input.extend(encode_chunk(ChunkType::IDAT, b"one").unwrap());
        input.extend_from_slice(&IEND_CHUNK);
        input.extend(encode_chunk(ChunkType::IDAT, b"two").unwrap());
        input.extend_from_slice(&IEND_CHUNK);
        assert_malformed(&input);
    }

    #[test]
    fn second_ihdr_is_rejected() {
        let ihdr = ihdr_data(1, 1);
        let input = assemble(&[
            (ChunkType::IHDR, &ihdr),
            (ChunkType::IDAT, b"data"),
            (ChunkType::IHDR, &ihdr),
        ]);
        assert_malformed(&input);
    }

    #[test]
    fn palette_after_image_data_is_rejected() {
        let ihdr = ihdr_data(1, 1);
        let input = assemble(&[
            (ChunkType::IHDR, &ihdr),
            (ChunkType::IDAT, b"data"),
            (ChunkType::PLTE, b"\xff\x00\x00"),
        ]);
        assert_malformed(&input);
    }

    #[test]
    fn iend_with_data_is_rejected() {
        let ihdr = ihdr_data(1, 1);
        let mut input = PNG_SIGNATURE.to_vec();
        input.extend(encode_chunk(ChunkType::IHDR, &ihdr).unwrap());
        input.extend(encode_chunk(ChunkType::IDAT, b"data").unwrap());
        input.extend(encode_chunk(ChunkType::IEND, b"junk").unwrap());
        assert_malformed(&input);
    }

    #[test]
    fn stray_bytes_between_chunks_are_rejected() {
        let ihdr = ihdr_data(1, 1);
        let mut input = PNG_SIGNATURE.to_vec();
        input.extend(encode_chunk(ChunkType::IHDR, &ihdr).unwrap());
        input.extend_from_slice(b"\x00\x00");
        input.extend(encode_chunk(ChunkType::IDAT, b"data").unwrap());
        input.extend_from_slice(&IEND_CHUNK);
        assert!(PngImage::parse(&input).is_err());
    }

    #[test]
    fn tags_inside_ancillary_chunks_are_ignored() {
        let ihdr = ihdr_data(1, 1);
        let text = ChunkType(*b"tEXt");
        let input = assemble(&[
            (ChunkType::IHDR, &ihdr),
            (text, b"Comment\x00has IDAT and PLTE and IEND words"),
            (ChunkType::IDAT, b"data"),
        ]);
        let png = PngImage::parse(&input).unwrap();
        let types: Vec<ChunkType> =
            png.chunks().iter().map(Chunk::chunk_type).collect();
        assert_eq!(
            types,
            vec![ChunkType::IHDR, ChunkType::IDAT, ChunkType::IEND]
        );
        assert_eq!(png.idat_payloads(), vec![&b"data"[..]]);
        assert!(png.palette().is_none());
    }

    #[test]
    fn unknown_critical_chunk_is_rejected() {
        let ihdr = ihdr_data(1, 1);
        let input = assemble(&[
            (ChunkType::IHDR, &ihdr),
            (ChunkType(*b"ABCD"), b"?"),
            (ChunkType::IDAT, b"data"),
        ]);
        assert_malformed(&input);
    }

    // Data and CRC bytes of IHDR (16..33), IDAT (41..59) and IEND (67..71).
    fn checked_bytes() -> Vec<usize> {
        (16..33).chain(41..59).chain(67..71).collect()
    }

    proptest! {
        #[test]
        fn any_bit_flip_in_data_or_crc_fails_the_crc(
            index in proptest::sample::select(checked_bytes()),
            bit in 0u8..8,
        ) {
            let mut input = GRAY_2X2.to_vec();
            input[index] ^= 1 << bit;
            let result = PngImage::parse(&input);
            prop_assert!(
                matches!(result, Err(Error::ChunkCrc { .. })),
                "byte {} bit {}: {:?}",
                index,
                bit,
                result
            );
        }
    }
}

//===========================================================================//
