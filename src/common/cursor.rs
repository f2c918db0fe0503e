//! Bounds-checked sequential reader over a byte slice.

use super::config::WORD_SIZE;
use super::{Error, Result, Rid};

/// Reads fixed-width words and length-prefixed strings from a buffer.
///
/// Every read checks the remaining length and fails with
/// `Error::MalformedTuple` instead of panicking, so it is safe to point at
/// caller-supplied tuple buffers.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Start reading at `pos`.
    pub fn at(buf: &'a [u8], pos: usize) -> Self {
        Self { buf, pos }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    /// Take the next `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(Error::MalformedTuple(format!(
                "need {} bytes at offset {}, only {} left",
                n,
                self.pos,
                self.remaining()
            )));
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn read_word(&mut self) -> Result<[u8; WORD_SIZE]> {
        let bytes = self.read_bytes(WORD_SIZE)?;
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_word().map(u32::from_le_bytes)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_word().map(i32::from_le_bytes)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.read_word().map(f32::from_le_bytes)
    }

    pub fn read_rid(&mut self) -> Result<Rid> {
        let page_num = self.read_u32()?;
        let slot_num = self.read_u32()?;
        Ok(Rid::new(page_num, slot_num))
    }

    /// Read a 4-byte length prefix and return the bytes that follow it.
    pub fn read_varchar(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u32()? as usize;
        self.read_bytes(len)
    }
}
