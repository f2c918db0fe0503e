//! Record identifier type.

use std::fmt;

use super::config::WORD_SIZE;
use super::PageId;

/// Address of a record: `(pageNum, slotNum)`.
///
/// A RID stays valid for the whole life of its record, even when an update
/// relocates the bytes to another page. Inside index keys it breaks ties
/// between equal attribute values, so the derived ordering (page, then
/// slot) is part of the on-disk sort order.
///
/// # Example
/// ```
/// use slotdb::Rid;
///
/// assert!(Rid::new(1, 9) < Rid::new(2, 0));
/// assert!(Rid::new(1, 0) < Rid::new(1, 1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Rid {
    pub page_num: u32,
    pub slot_num: u32,
}

impl Rid {
    /// Encoded size: two words.
    pub const SIZE: usize = 2 * WORD_SIZE;

    #[inline]
    pub fn new(page_num: u32, slot_num: u32) -> Self {
        Self { page_num, slot_num }
    }

    /// The page holding this record's slot.
    #[inline]
    pub fn page_id(&self) -> PageId {
        PageId::new(self.page_num)
    }

    /// Encode as `pageNum ++ slotNum`, little-endian.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[..WORD_SIZE].copy_from_slice(&self.page_num.to_le_bytes());
        out[WORD_SIZE..].copy_from_slice(&self.slot_num.to_le_bytes());
        out
    }

    /// Decode from the first [`Rid::SIZE`] bytes of `data`.
    ///
    /// # Panics
    /// Panics if `data.len() < Rid::SIZE`.
    pub fn from_bytes(data: &[u8]) -> Self {
        assert!(data.len() >= Self::SIZE, "buffer too small for Rid");
        let page_num = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
        let slot_num = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
        Self { page_num, slot_num }
    }
}

impl fmt::Display for Rid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.page_num, self.slot_num)
    }
}
