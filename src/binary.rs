//! Bounded little-endian reads over byte slices.
//!
//! Every multi-byte read checks the slice length first and reports an
//! [`ResourceError::OutOfBounds`] instead of panicking.

use crate::error::{ResourceError, ResourceResult};

fn check(bytes: &[u8], offset: usize, wanted: usize) -> ResourceResult<()> {
    match offset.checked_add(wanted) {
        Some(end) if end <= bytes.len() => Ok(()),
        _ => Err(ResourceError::OutOfBounds {
            offset,
            wanted,
            length: bytes.len(),
        }),
    }
}

pub fn read_u8(bytes: &[u8], offset: usize) -> ResourceResult<u8> {
    check(bytes, offset, 1)?;
    Ok(bytes[offset])
}

pub fn read_u16_le(bytes: &[u8], offset: usize) -> ResourceResult<u16> {
    check(bytes, offset, 2)?;
    Ok(u16::from_le_bytes([bytes[offset], bytes[offset + 1]]))
}

pub fn read_slice(bytes: &[u8], offset: usize, length: usize) -> ResourceResult<&[u8]> {
    check(bytes, offset, length)?;
    Ok(&bytes[offset..offset + length])
}

/// Forward-only reader used by the logic decoder
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(bytes: &'a [u8]) -> ByteCursor<'a> {
        ByteCursor { bytes, pos: 0 }
    }

    pub fn at(bytes: &'a [u8], pos: usize) -> ByteCursor<'a> {
        ByteCursor { bytes, pos }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    pub fn u8(&mut self) -> ResourceResult<u8> {
        let v = read_u8(self.bytes, self.pos)?;
        self.pos += 1;
        Ok(v)
    }

    pub fn u16_le(&mut self) -> ResourceResult<u16> {
        let v = read_u16_le(self.bytes, self.pos)?;
        self.pos += 2;
        Ok(v)
    }

    pub fn i16_le(&mut self) -> ResourceResult<i16> {
        Ok(self.u16_le()? as i16)
    }
}
