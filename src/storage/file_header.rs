//! Hidden file header stored in the first page of every file.
//!
//! The header holds the I/O counters, the page count, and the root page
//! number used by index files. It is invisible to callers: page numbers
//! handed out by [`FileHandle`](super::FileHandle) start after it.

use crate::common::config::WORD_SIZE;
use crate::common::PageId;

/// Metadata stored at the beginning of page 0.
///
/// # Layout (24 bytes)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       4     read_count
/// 4       4     write_count
/// 8       4     append_count
/// 12      4     page_count (data pages, header excluded)
/// 16      4     root (PageId, 0xFFFFFFFF = none)
/// 20      4     checksum (CRC32 of bytes 0..20)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub read_count: u32,
    pub write_count: u32,
    pub append_count: u32,
    pub page_count: u32,
    pub root: PageId,
}

impl Default for FileHeader {
    fn default() -> Self {
        Self {
            read_count: 0,
            write_count: 0,
            append_count: 0,
            page_count: 0,
            root: PageId::INVALID,
        }
    }
}

impl FileHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = 6 * WORD_SIZE;

    pub const OFFSET_READ_COUNT: usize = 0;
    pub const OFFSET_WRITE_COUNT: usize = 4;
    pub const OFFSET_APPEND_COUNT: usize = 8;
    pub const OFFSET_PAGE_COUNT: usize = 12;
    pub const OFFSET_ROOT: usize = 16;
    pub const OFFSET_CHECKSUM: usize = 20;

    fn read_word(data: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3],
        ])
    }

    /// Read a header from the beginning of a byte slice.
    ///
    /// Returns `None` if the stored checksum does not match.
    ///
    /// # Panics
    /// Panics if `data.len() < FileHeader::SIZE`.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        assert!(data.len() >= Self::SIZE, "buffer too small for FileHeader");

        let stored = Self::read_word(data, Self::OFFSET_CHECKSUM);
        if stored != Self::compute_checksum(data) {
            return None;
        }

        Some(Self {
            read_count: Self::read_word(data, Self::OFFSET_READ_COUNT),
            write_count: Self::read_word(data, Self::OFFSET_WRITE_COUNT),
            append_count: Self::read_word(data, Self::OFFSET_APPEND_COUNT),
            page_count: Self::read_word(data, Self::OFFSET_PAGE_COUNT),
            root: PageId::new(Self::read_word(data, Self::OFFSET_ROOT)),
        })
    }

    /// Write this header, including its checksum, to the beginning of a byte slice.
    ///
    /// # Panics
    /// Panics if `data.len() < FileHeader::SIZE`.
    pub fn write_to(&self, data: &mut [u8]) {
        assert!(data.len() >= Self::SIZE, "buffer too small for FileHeader");

        let fields = [
            (Self::OFFSET_READ_COUNT, self.read_count),
            (Self::OFFSET_WRITE_COUNT, self.write_count),
            (Self::OFFSET_APPEND_COUNT, self.append_count),
            (Self::OFFSET_PAGE_COUNT, self.page_count),
            (Self::OFFSET_ROOT, self.root.0),
        ];
        for (offset, value) in fields {
            data[offset..offset + WORD_SIZE].copy_from_slice(&value.to_le_bytes());
        }

        let checksum = Self::compute_checksum(data);
        data[Self::OFFSET_CHECKSUM..Self::OFFSET_CHECKSUM + WORD_SIZE]
            .copy_from_slice(&checksum.to_le_bytes());
    }

    /// CRC32 of the header fields preceding the checksum word.
    pub fn compute_checksum(data: &[u8]) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&data[..Self::OFFSET_CHECKSUM]);
        hasher.finalize()
    }
}

// ============================================================================
// TESTS
// ============================================================================
