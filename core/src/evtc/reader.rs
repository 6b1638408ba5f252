//! Little-endian cursor over an in-memory byte buffer.
//!
//! All EVTC tables use little-endian byte order. The cursor checks bounds on
//! every read and reports truncation with the absolute position that was
//! needed, which makes "declared table length runs past the buffer" errors
//! precise.

use super::ParseError;

pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Absolute position of the cursor.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Borrow `len` bytes and advance.
    pub fn bytes(&mut self, len: usize) -> Result<&'a [u8], ParseError> {
        let needed = self.pos + len;
        if needed > self.buf.len() {
            return Err(ParseError::Truncated {
                needed,
                available: self.buf.len(),
            });
        }
        let slice = &self.buf[self.pos..needed];
        self.pos = needed;
        Ok(slice)
    }

    pub fn skip(&mut self, len: usize) -> Result<(), ParseError> {
        self.bytes(len).map(|_| ())
    }

    pub fn u8(&mut self) -> Result<u8, ParseError> {
        Ok(self.bytes(1)?[0])
    }

    pub fn u16_le(&mut self) -> Result<u16, ParseError> {
        let b = self.bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn i16_le(&mut self) -> Result<i16, ParseError> {
        let b = self.bytes(2)?;
        Ok(i16::from_le_bytes([b[0], b[1]]))
    }

    pub fn u32_le(&mut self) -> Result<u32, ParseError> {
        let b = self.bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn i32_le(&mut self) -> Result<i32, ParseError> {
        let b = self.bytes(4)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn f32_le(&mut self) -> Result<f32, ParseError> {
        Ok(f32::from_bits(self.u32_le()?))
    }

    pub fn u64_le(&mut self) -> Result<u64, ParseError> {
        let b = self.bytes(8)?;
        Ok(u64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    pub fn i64_le(&mut self) -> Result<i64, ParseError> {
        Ok(self.u64_le()? as i64)
    }
}
