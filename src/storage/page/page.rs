//! Page - the fundamental 4KB unit of storage.
//!
//! A [`Page`] is a raw 4KB byte array that serves as the unit of I/O
//! between disk and memory. Record pages and B+-tree nodes are typed views
//! over a `Page`; this type only knows bytes and words.

use crate::common::config::{PAGE_SIZE, WORD_SIZE};

/// A page of data (4KB, 4KB-aligned).
///
/// # Word accessors
/// All fixed-width fields are 4-byte little-endian words. The accessors
/// index the backing array directly, so an out-of-range offset panics
/// instead of touching memory outside the page.
///
/// # Trailer words
/// Page formats keep their metadata at the end of the page, counted
/// backward. [`Page::trailer_offset`] converts "the k-th word from the end"
/// into a byte offset so formats can name their fields.
///
/// # Clone Implementation
/// `Page` does NOT implement `Clone` in production code (copying 4KB should
/// be explicit). A `#[cfg(test)]` Clone is provided for tests.
///
/// # Example
/// ```
/// use slotdb::storage::page::Page;
///
/// let mut page = Page::new();
/// page.write_u32(8, 0xDEAD_BEEF);
/// assert_eq!(page.read_u32(8), 0xDEAD_BEEF);
/// assert_eq!(page.read_i32(Page::trailer_offset(1)), 0);
/// ```
#[repr(align(4096))]
pub struct Page {
    data: [u8; PAGE_SIZE],
}

impl Page {
    /// Create a new zeroed page.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: [0u8; PAGE_SIZE],
        }
    }

    /// Get immutable slice of page data.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Get mutable slice of page data.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Byte offset of the `k`-th word counted backward from the end
    /// (`k = 1` is the last word).
    #[inline]
    pub const fn trailer_offset(k: usize) -> usize {
        PAGE_SIZE - k * WORD_SIZE
    }

    #[inline]
    fn word(&self, offset: usize) -> [u8; WORD_SIZE] {
        let w = &self.data[offset..offset + WORD_SIZE];
        [w[0], w[1], w[2], w[3]]
    }

    #[inline]
    pub fn read_u32(&self, offset: usize) -> u32 {
        u32::from_le_bytes(self.word(offset))
    }

    #[inline]
    pub fn write_u32(&mut self, offset: usize, value: u32) {
        self.data[offset..offset + WORD_SIZE].copy_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn read_i32(&self, offset: usize) -> i32 {
        i32::from_le_bytes(self.word(offset))
    }

    #[inline]
    pub fn write_i32(&mut self, offset: usize, value: i32) {
        self.data[offset..offset + WORD_SIZE].copy_from_slice(&value.to_le_bytes());
    }

    /// Borrow `len` bytes starting at `offset`.
    #[inline]
    pub fn bytes(&self, offset: usize, len: usize) -> &[u8] {
        &self.data[offset..offset + len]
    }

    /// Copy `src` into the page at `offset`.
    #[inline]
    pub fn write_bytes(&mut self, offset: usize, src: &[u8]) {
        self.data[offset..offset + src.len()].copy_from_slice(src);
    }

    /// Move `len` bytes from `src` to `dest` within the page (ranges may overlap).
    #[inline]
    pub fn move_bytes(&mut self, src: usize, dest: usize, len: usize) {
        self.data.copy_within(src..src + len, dest);
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

// Clone only available in tests - forces explicit copying in production
#[cfg(test)]
impl Clone for Page {
    fn clone(&self) -> Self {
        let mut new_page = Page::new();
        new_page.data.copy_from_slice(&self.data);
        new_page
    }
}

// ============================================================================
// TESTS
// ============================================================================
