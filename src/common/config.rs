//! Configuration constants for slotdb.
//!
//! Every on-disk structure is described in terms of these constants. All
//! fixed-width fields are 4-byte little-endian words.

/// Size of a page in bytes (4KB).
///
/// # Memory Layout
/// With 4KB pages and 32-bit page numbers:
/// - Max pages: 2^32 - 1 (u32::MAX is reserved as the "no page" sentinel)
/// - Max file size: ~16TB
pub const PAGE_SIZE: usize = 4096;

/// Width of every fixed-size field (offsets, lengths, page numbers, ints, floats).
pub const WORD_SIZE: usize = 4;

/// Number of hidden pages at the start of every file (the file header).
pub const FILE_HEADER_PAGES: u32 = 1;

// ============================================================================
// Record pages
// ============================================================================

/// Record page trailer: `slotCount`, then `freeSpaceOffset` in the last word.
pub const RECORD_TRAILER_SIZE: usize = 2 * WORD_SIZE;

/// One slot directory entry: `(recordOffset: i32, recordLength: i32)`.
pub const SLOT_SIZE: usize = 2 * WORD_SIZE;

/// Bytes of a tombstone: an embedded `(pageNum, slotNum)` pair.
///
/// Also the minimum footprint of any record, so that every live slot can
/// later be rewritten as a tombstone without growing.
pub const TOMBSTONE_SIZE: usize = 2 * WORD_SIZE;

/// Largest record payload a fresh page can hold (one slot, no other records).
pub const MAX_RECORD_SIZE: usize = PAGE_SIZE - RECORD_TRAILER_SIZE - SLOT_SIZE;

// ============================================================================
// B+-tree pages
// ============================================================================

/// B+-tree trailer: `leftSibling`, `rightSibling`, `isLeaf`, `freeSpaceOffset`.
///
/// Internal nodes leave the sibling words unused so both node kinds have
/// the same capacity.
pub const NODE_TRAILER_SIZE: usize = 4 * WORD_SIZE;

/// Bytes available for entries on a B+-tree node.
pub const NODE_CAPACITY: usize = PAGE_SIZE - NODE_TRAILER_SIZE;

/// Largest internal-node entry `(key, rid, child)` the index accepts.
///
/// Capping entries at a quarter of a node guarantees that splitting an
/// overflowing node at its byte median leaves two non-empty halves that fit.
pub const MAX_INDEX_ENTRY: usize = NODE_CAPACITY / 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_is_power_of_two() {
        assert!(PAGE_SIZE.is_power_of_two());
        assert_eq!(PAGE_SIZE, 4096);
    }

    #[test]
    fn test_layout_sizes() {
        assert_eq!(MAX_RECORD_SIZE, 4096 - 16);
        assert_eq!(NODE_CAPACITY, 4080);
        assert_eq!(MAX_INDEX_ENTRY, 1020);
        assert!(TOMBSTONE_SIZE <= MAX_RECORD_SIZE);
    }
}
