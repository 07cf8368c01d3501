//! Bounds-checked integer extraction over in-memory buffers.
//!
//! Every fixed-width read in this crate goes through these helpers, so a
//! truncated or lying file produces an [`Error::OutOfBounds`] instead of a
//! panic.

use crate::error::{Error, Result};
use byteorder::ByteOrder;

//===========================================================================//

/// Returns `width` bytes starting at `offset`, or `OutOfBounds`.
pub fn bytes_at(buffer: &[u8], offset: usize, width: usize) -> Result<&[u8]> {
    offset
        .checked_add(width)
        .and_then(|end| buffer.get(offset..end))
        .ok_or(Error::OutOfBounds { offset, width, len: buffer.len() })
}

/// Reads a `u8` at `offset`.
pub fn read_u8_at(buffer: &[u8], offset: usize) -> Result<u8> {
    Ok(bytes_at(buffer, offset, 1)?[0])
}

/// Reads a `u16` at `offset` with byte order `E`.
pub fn read_u16_at<E: ByteOrder>(buffer: &[u8], offset: usize) -> Result<u16> {
    Ok(E::read_u16(bytes_at(buffer, offset, 2)?))
}

/// Reads a `u32` at `offset` with byte order `E`.
pub fn read_u32_at<E: ByteOrder>(buffer: &[u8], offset: usize) -> Result<u32> {
    Ok(E::read_u32(bytes_at(buffer, offset, 4)?))
}

/// Reads an `i32` at `offset` with byte order `E`.
pub fn read_i32_at<E: ByteOrder>(buffer: &[u8], offset: usize) -> Result<i32> {
    Ok(E::read_i32(bytes_at(buffer, offset, 4)?))
}

//===========================================================================//

/// A sequential reader over a borrowed buffer.
#[derive(Clone, Debug)]
pub struct ByteCursor<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> ByteCursor<'a> {
    /// Creates a cursor positioned at the start of `buffer`.
    pub fn new(buffer: &'a [u8]) -> ByteCursor<'a> {
        ByteCursor { buffer, position: 0 }
    }

    /// Creates a cursor positioned at `position`.  The position is only
    /// checked when reading.
    pub fn at(buffer: &'a [u8], position: usize) -> ByteCursor<'a> {
        ByteCursor { buffer, position }
    }

    /// Returns the current offset into the buffer.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns the number of bytes left after the current position.
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    /// Reads one byte and advances.
    pub fn read_u8(&mut self) -> Result<u8> {
        let value = read_u8_at(self.buffer, self.position)?;
        self.position += 1;
        Ok(value)
    }

    /// Reads a `u16` with byte order `E` and advances.
    pub fn read_u16<E: ByteOrder>(&mut self) -> Result<u16> {
        let value = read_u16_at::<E>(self.buffer, self.position)?;
        self.position += 2;
        Ok(value)
    }

    /// Reads a `u32` with byte order `E` and advances.
    pub fn read_u32<E: ByteOrder>(&mut self) -> Result<u32> {
        let value = read_u32_at::<E>(self.buffer, self.position)?;
        self.position += 4;
        Ok(value)
    }

    /// Reads a `i32` with byte order `E` and advances.
    pub fn read_i32<E: ByteOrder>(&mut self) -> Result<i32> {
        let value = read_i32_at::<E>(self.buffer, self.position)?;
        self.position += 4;
        Ok(value)
    }

    /// Borrows the next `len` bytes and advances past them.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let bytes = bytes_at(self.buffer, self.position, len)?;
        self.position += len;
        Ok(bytes)
    }
}

//===========================================================================//


//===========================================================================//
