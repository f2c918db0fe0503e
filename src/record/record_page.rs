//! Slotted record page.
//!
//! # Layout
//! ```text
//! ┌──────────────────────────────┬──────────┬──────────────────┬───────────┬────────────┐
//! │ records, packed from 0 ──▶   │   free   │ ◀── slot dir     │ slotCount │ freeSpace  │
//! │                              │          │ [slot n-1 .. 0]  │  (word)   │ Offset     │
//! └──────────────────────────────┴──────────┴──────────────────┴───────────┴────────────┘
//! 0                     freeSpaceOffset                                   PAGE_SIZE
//! ```
//!
//! Slot `i` is `(recordOffset: i32, recordLength: i32)`:
//! - `recordOffset == -1` → free slot, reusable by inserts
//! - `recordLength == -1` → tombstone: the 8 bytes at `recordOffset` are
//!   the [`Rid`] the record moved to
//!
//! Records are always packed: deleting or shrinking one shifts every later
//! record backward so the free region stays contiguous.

use crate::common::config::{PAGE_SIZE, RECORD_TRAILER_SIZE, SLOT_SIZE, TOMBSTONE_SIZE, WORD_SIZE};
use crate::common::{Error, PageId, Result, Rid};
use crate::storage::page::Page;

const FREE_OFFSET: i32 = -1;
const TOMBSTONE_LENGTH: i32 = -1;

/// Decoded state of one slot directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    Free,
    Live { offset: usize, len: usize },
    Tombstone { offset: usize, target: Rid },
}

impl Slot {
    /// Bytes this slot occupies in the record region.
    fn footprint(&self) -> Option<(usize, usize)> {
        match *self {
            Slot::Free => None,
            Slot::Live { offset, len } => Some((offset, len)),
            Slot::Tombstone { offset, .. } => Some((offset, TOMBSTONE_SIZE)),
        }
    }
}

/// A record page read from disk, with named trailer and slot accessors.
pub(crate) struct RecordPage {
    id: PageId,
    page: Page,
}

impl RecordPage {
    const FREE_SPACE_OFFSET: usize = Page::trailer_offset(1);
    const SLOT_COUNT: usize = Page::trailer_offset(2);

    /// A fresh page with no records and no slots.
    pub fn empty(id: PageId) -> Self {
        Self {
            id,
            page: Page::new(),
        }
    }

    pub fn from_page(id: PageId, page: Page) -> Self {
        Self { id, page }
    }

    pub fn id(&self) -> PageId {
        self.id
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    // ========================================================================
    // Trailer
    // ========================================================================

    pub fn free_space_offset(&self) -> usize {
        self.page.read_u32(Self::FREE_SPACE_OFFSET) as usize
    }

    fn set_free_space_offset(&mut self, offset: usize) {
        self.page.write_u32(Self::FREE_SPACE_OFFSET, offset as u32);
    }

    pub fn slot_count(&self) -> usize {
        self.page.read_u32(Self::SLOT_COUNT) as usize
    }

    fn set_slot_count(&mut self, count: usize) {
        self.page.write_u32(Self::SLOT_COUNT, count as u32);
    }

    /// Start of the slot directory (its lowest byte).
    fn directory_start(&self) -> usize {
        PAGE_SIZE - RECORD_TRAILER_SIZE - self.slot_count() * SLOT_SIZE
    }

    /// Bytes between the packed records and the slot directory.
    pub fn free_space(&self) -> usize {
        self.directory_start().saturating_sub(self.free_space_offset())
    }

    // ========================================================================
    // Slot directory
    // ========================================================================

    #[inline]
    fn slot_position(slot_num: usize) -> usize {
        PAGE_SIZE - RECORD_TRAILER_SIZE - (slot_num + 1) * SLOT_SIZE
    }

    fn raw_slot(&self, slot_num: usize) -> (i32, i32) {
        let pos = Self::slot_position(slot_num);
        (self.page.read_i32(pos), self.page.read_i32(pos + WORD_SIZE))
    }

    fn set_raw_slot(&mut self, slot_num: usize, offset: i32, length: i32) {
        let pos = Self::slot_position(slot_num);
        self.page.write_i32(pos, offset);
        self.page.write_i32(pos + WORD_SIZE, length);
    }

    fn corrupted(&self, reason: String) -> Error {
        Error::CorruptedPage {
            page: self.id.0,
            reason,
        }
    }

    /// Decode slot `slot_num`.
    ///
    /// # Errors
    /// - `Error::RecordNotFound` if the slot number is past the directory
    /// - `Error::CorruptedPage` if the entry points outside the record region
    pub fn slot(&self, slot_num: usize) -> Result<Slot> {
        if slot_num >= self.slot_count() {
            return Err(Error::RecordNotFound(Rid::new(self.id.0, slot_num as u32)));
        }

        let (offset, length) = self.raw_slot(slot_num);
        if offset == FREE_OFFSET {
            return Ok(Slot::Free);
        }

        let fso = self.free_space_offset();
        let span = if length == TOMBSTONE_LENGTH {
            TOMBSTONE_SIZE as i64
        } else {
            length as i64
        };
        if offset < 0 || span < 0 || offset as i64 + span > fso as i64 {
            return Err(self.corrupted(format!(
                "slot {} ({}, {}) outside record region ending at {}",
                slot_num, offset, length, fso
            )));
        }

        let offset = offset as usize;
        if length == TOMBSTONE_LENGTH {
            let target = Rid::from_bytes(self.page.bytes(offset, TOMBSTONE_SIZE));
            Ok(Slot::Tombstone { offset, target })
        } else {
            Ok(Slot::Live {
                offset,
                len: length as usize,
            })
        }
    }

    /// Bytes of a live record.
    pub fn record_bytes(&self, offset: usize, len: usize) -> &[u8] {
        self.page.bytes(offset, len)
    }

    fn find_free_slot(&self) -> Option<usize> {
        (0..self.slot_count()).find(|&i| self.raw_slot(i).0 == FREE_OFFSET)
    }

    /// Whether a record of `len` bytes fits, reusing a free slot if one exists
    /// or growing the directory by one slot otherwise.
    pub fn can_hold(&self, len: usize) -> bool {
        let needed = match self.find_free_slot() {
            Some(_) => len,
            None => len + SLOT_SIZE,
        };
        self.free_space() >= needed
    }

    /// Append `record` at the free-space offset and return its slot number.
    ///
    /// Callers check [`RecordPage::can_hold`] first.
    pub fn insert(&mut self, record: &[u8]) -> usize {
        debug_assert!(self.can_hold(record.len()));

        let slot_num = match self.find_free_slot() {
            Some(slot) => slot,
            None => {
                let slot = self.slot_count();
                self.set_slot_count(slot + 1);
                slot
            }
        };

        let offset = self.free_space_offset();
        self.page.write_bytes(offset, record);
        self.set_raw_slot(slot_num, offset as i32, record.len() as i32);
        self.set_free_space_offset(offset + record.len());
        slot_num
    }

    // ========================================================================
    // Compaction
    // ========================================================================

    /// Move the record bytes in `[from, freeSpaceOffset)` by `delta` and fix
    /// up every slot that pointed into that range.
    ///
    /// A negative `delta` closes a hole just before `from`; a positive one
    /// opens a gap there. The caller guarantees the gap fits.
    fn shift(&mut self, from: usize, delta: isize) {
        let fso = self.free_space_offset();
        let dest = (from as isize + delta) as usize;
        self.page.move_bytes(from, dest, fso - from);

        for slot_num in 0..self.slot_count() {
            let (offset, length) = self.raw_slot(slot_num);
            if offset != FREE_OFFSET && offset as usize >= from {
                self.set_raw_slot(slot_num, offset + delta as i32, length);
            }
        }

        self.set_free_space_offset((fso as isize + delta) as usize);
    }

    /// Compact the bytes of `slot_num` out of the page and mark the slot free.
    ///
    /// # Errors
    /// Returns `Error::RecordNotFound` if the slot is already free.
    pub fn remove(&mut self, slot_num: usize) -> Result<()> {
        let slot = self.slot(slot_num)?;
        let (offset, len) = slot
            .footprint()
            .ok_or_else(|| Error::RecordNotFound(Rid::new(self.id.0, slot_num as u32)))?;

        self.shift(offset + len, -(len as isize));
        self.set_raw_slot(slot_num, FREE_OFFSET, 0);
        Ok(())
    }

    /// Replace the live record in `slot_num` with `record`, in place.
    ///
    /// Shrinking always succeeds. Growing succeeds when the page's free space
    /// covers the extra bytes; later records shift forward to make room.
    /// Returns `false` (page untouched) when the record does not fit.
    pub fn resize_in_place(&mut self, slot_num: usize, record: &[u8]) -> Result<bool> {
        let (offset, old_len) = match self.slot(slot_num)? {
            Slot::Live { offset, len } => (offset, len),
            _ => return Err(Error::RecordNotFound(Rid::new(self.id.0, slot_num as u32))),
        };
        let new_len = record.len();

        if new_len > old_len {
            let growth = new_len - old_len;
            if self.free_space() < growth {
                return Ok(false);
            }
            self.shift(offset + old_len, growth as isize);
            self.page.write_bytes(offset, record);
        } else {
            self.page.write_bytes(offset, record);
            if new_len < old_len {
                self.shift(offset + old_len, -((old_len - new_len) as isize));
            }
        }

        self.set_raw_slot(slot_num, offset as i32, new_len as i32);
        Ok(true)
    }

    /// Replace the live record in `slot_num` with a tombstone pointing at
    /// `target`, releasing the rest of its bytes.
    pub fn make_tombstone(&mut self, slot_num: usize, target: Rid) -> Result<()> {
        let (offset, len) = match self.slot(slot_num)? {
            Slot::Live { offset, len } => (offset, len),
            Slot::Tombstone { offset, .. } => (offset, TOMBSTONE_SIZE),
            Slot::Free => return Err(Error::RecordNotFound(Rid::new(self.id.0, slot_num as u32))),
        };
        debug_assert!(len >= TOMBSTONE_SIZE);

        self.page.write_bytes(offset, &target.to_bytes());
        if len > TOMBSTONE_SIZE {
            self.shift(offset + len, -((len - TOMBSTONE_SIZE) as isize));
        }
        self.set_raw_slot(slot_num, offset as i32, TOMBSTONE_LENGTH);
        Ok(())
    }
}
