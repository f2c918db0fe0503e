//! Null-indicator bitset shared by tuple encoding and scan projection.

use super::{Error, Result};

/// MSB-first bitset with one bit per attribute, `ceil(n / 8)` bytes long.
///
/// Bit `i` lives in byte `i / 8` at mask `0x80 >> (i % 8)`; a set bit means
/// the attribute is NULL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NullBitmap {
    bits: Vec<u8>,
    len: usize,
}

impl NullBitmap {
    /// All-not-null bitmap for `len` attributes.
    pub fn new(len: usize) -> Self {
        Self {
            bits: vec![0u8; Self::byte_len(len)],
            len,
        }
    }

    /// Bytes needed for `len` attributes.
    #[inline]
    pub const fn byte_len(len: usize) -> usize {
        len.div_ceil(8)
    }

    /// Copy the bitmap prefix of a tuple buffer.
    ///
    /// # Errors
    /// Returns `Error::MalformedTuple` if `data` is shorter than the bitmap.
    pub fn from_bytes(len: usize, data: &[u8]) -> Result<Self> {
        let n = Self::byte_len(len);
        if data.len() < n {
            return Err(Error::MalformedTuple(format!(
                "null bitmap needs {} bytes, buffer has {}",
                n,
                data.len()
            )));
        }
        Ok(Self {
            bits: data[..n].to_vec(),
            len,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_null(&self, i: usize) -> bool {
        debug_assert!(i < self.len);
        self.bits[i / 8] & (0x80 >> (i % 8)) != 0
    }

    #[inline]
    pub fn set_null(&mut self, i: usize) {
        debug_assert!(i < self.len);
        self.bits[i / 8] |= 0x80 >> (i % 8);
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }
}
