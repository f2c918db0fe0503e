//! B+-tree node pages.
//!
//! # Layout
//! ```text
//! Leaf:     [ key rid | key rid | ... ] free [ left | right | isLeaf | fso ]
//! Internal: [ child | key rid child | ... ] free [ - | - | isLeaf | fso ]
//!                                                          PAGE_SIZE ┘
//! ```
//!
//! Entries are packed from offset 0 up to the free-space offset and have no
//! slot directory, so every search walks them linearly. The sibling words
//! are reserved on internal nodes too, which gives both kinds the same
//! capacity.

use crate::common::config::{NODE_CAPACITY, WORD_SIZE};
use crate::common::{AttrType, ByteCursor, Error, PageId, Result};
use crate::index::btree::key::{IndexKey, Probe};
use crate::storage::page::Page;

/// Size of a child pointer.
pub(crate) const CHILD_SIZE: usize = WORD_SIZE;

/// A decoded internal-node entry: separator key, the child to its right,
/// and the byte span `[start, end)` of `(key, rid, child)`.
#[derive(Debug, Clone)]
pub(crate) struct InternalEntry {
    pub key: IndexKey,
    pub child: PageId,
    pub start: usize,
    pub end: usize,
}

/// Child chosen by an internal-node search.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Route {
    pub child: PageId,
    /// Where the child pointer itself is stored.
    pub child_offset: usize,
    /// Offset at which a new separator to the child's right belongs.
    pub insert_offset: usize,
    /// Bytes to remove if the child is dropped from this node.
    pub dead_span: (usize, usize),
}

/// A B+-tree node read from disk.
pub(crate) struct Node {
    id: PageId,
    page: Page,
}

impl Node {
    const FREE_SPACE_OFFSET: usize = Page::trailer_offset(1);
    const IS_LEAF: usize = Page::trailer_offset(2);
    const RIGHT_SIBLING: usize = Page::trailer_offset(3);
    const LEFT_SIBLING: usize = Page::trailer_offset(4);

    /// An empty leaf with no siblings.
    pub fn new_leaf(id: PageId) -> Self {
        let mut node = Self {
            id,
            page: Page::new(),
        };
        node.page.write_u32(Self::IS_LEAF, 1);
        node.set_right_sibling(PageId::INVALID);
        node.set_left_sibling(PageId::INVALID);
        node
    }

    /// An internal node holding `content` (`child (key rid child)*`).
    pub fn new_internal(id: PageId, content: &[u8]) -> Self {
        let mut node = Self {
            id,
            page: Page::new(),
        };
        node.page.write_u32(Self::LEFT_SIBLING, PageId::INVALID.0);
        node.page.write_u32(Self::RIGHT_SIBLING, PageId::INVALID.0);
        node.set_content(content);
        node
    }

    /// Wrap a page read from disk, checking its trailer.
    ///
    /// # Errors
    /// Returns `Error::CorruptedPage` if the trailer is out of range.
    pub fn from_page(id: PageId, page: Page) -> Result<Self> {
        let node = Self { id, page };
        let fso = node.free_space_offset();
        let is_leaf = node.page.read_u32(Self::IS_LEAF);
        if fso > NODE_CAPACITY || is_leaf > 1 {
            return Err(node.corrupted(format!("bad trailer: fso={} isLeaf={}", fso, is_leaf)));
        }
        if is_leaf == 0 && fso < CHILD_SIZE {
            return Err(node.corrupted("internal node without a child".to_string()));
        }
        Ok(node)
    }

    pub fn id(&self) -> PageId {
        self.id
    }

    pub fn set_id(&mut self, id: PageId) {
        self.id = id;
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    fn corrupted(&self, reason: String) -> Error {
        Error::CorruptedPage {
            page: self.id.0,
            reason,
        }
    }

    // ========================================================================
    // Trailer
    // ========================================================================

    pub fn is_leaf(&self) -> bool {
        self.page.read_u32(Self::IS_LEAF) == 1
    }

    pub fn free_space_offset(&self) -> usize {
        self.page.read_u32(Self::FREE_SPACE_OFFSET) as usize
    }

    fn set_free_space_offset(&mut self, offset: usize) {
        self.page.write_u32(Self::FREE_SPACE_OFFSET, offset as u32);
    }

    pub fn free_space(&self) -> usize {
        NODE_CAPACITY - self.free_space_offset()
    }

    pub fn right_sibling(&self) -> PageId {
        PageId::new(self.page.read_u32(Self::RIGHT_SIBLING))
    }

    pub fn set_right_sibling(&mut self, page: PageId) {
        self.page.write_u32(Self::RIGHT_SIBLING, page.0);
    }

    pub fn left_sibling(&self) -> PageId {
        PageId::new(self.page.read_u32(Self::LEFT_SIBLING))
    }

    pub fn set_left_sibling(&mut self, page: PageId) {
        self.page.write_u32(Self::LEFT_SIBLING, page.0);
    }

    // ========================================================================
    // Content
    // ========================================================================

    /// Packed entries, `[0, freeSpaceOffset)`.
    pub fn content(&self) -> &[u8] {
        self.page.bytes(0, self.free_space_offset())
    }

    /// Replace all entries with `content`.
    pub fn set_content(&mut self, content: &[u8]) {
        debug_assert!(content.len() <= NODE_CAPACITY);
        self.page.write_bytes(0, content);
        self.set_free_space_offset(content.len());
    }

    /// Open a gap at `offset` and copy `bytes` into it. The caller checks
    /// that the node has room.
    pub fn insert_bytes(&mut self, offset: usize, bytes: &[u8]) {
        let fso = self.free_space_offset();
        debug_assert!(offset <= fso && bytes.len() <= self.free_space());
        self.page.move_bytes(offset, offset + bytes.len(), fso - offset);
        self.page.write_bytes(offset, bytes);
        self.set_free_space_offset(fso + bytes.len());
    }

    /// Close the gap `[start, end)`.
    pub fn remove_bytes(&mut self, start: usize, end: usize) {
        let fso = self.free_space_offset();
        debug_assert!(start <= end && end <= fso);
        self.page.move_bytes(end, start, fso - end);
        self.set_free_space_offset(fso - (end - start));
    }

    fn read_child(&self, offset: usize) -> PageId {
        PageId::new(self.page.read_u32(offset))
    }

    pub fn set_child(&mut self, offset: usize, child: PageId) {
        self.page.write_u32(offset, child.0);
    }

    /// Decode the key at `offset` and return it with its encoded length.
    pub fn key_at(&self, ty: AttrType, offset: usize) -> Result<(IndexKey, usize)> {
        let mut cursor = ByteCursor::at(self.content(), offset);
        let key = IndexKey::decode(ty, &mut cursor)
            .map_err(|e| self.corrupted(format!("undecodable key at {}: {}", offset, e)))?;
        Ok((key, cursor.position() - offset))
    }

    // ========================================================================
    // Leaf entries
    // ========================================================================

    /// All `(key, offset, len)` entries of a leaf.
    pub fn leaf_entries(&self, ty: AttrType) -> Result<Vec<(IndexKey, usize, usize)>> {
        let fso = self.free_space_offset();
        let mut entries = Vec::new();
        let mut offset = 0;
        while offset < fso {
            let (key, len) = self.key_at(ty, offset)?;
            entries.push((key, offset, len));
            offset += len;
        }
        Ok(entries)
    }

    /// Offset of the first leaf entry the probe reaches, with that entry
    /// (or `None` if the probe passes every entry and lands at the end).
    pub fn leaf_search(
        &self,
        ty: AttrType,
        probe: Probe<'_>,
    ) -> Result<(usize, Option<(IndexKey, usize)>)> {
        let fso = self.free_space_offset();
        let mut offset = 0;
        while offset < fso {
            let (key, len) = self.key_at(ty, offset)?;
            if probe.reached(&key) {
                return Ok((offset, Some((key, len))));
            }
            offset += len;
        }
        Ok((fso, None))
    }

    // ========================================================================
    // Internal entries
    // ========================================================================

    pub fn first_child(&self) -> PageId {
        self.read_child(0)
    }

    /// Every `(key, rid, child)` entry of an internal node, in order.
    pub fn internal_entries(&self, ty: AttrType) -> Result<Vec<InternalEntry>> {
        let fso = self.free_space_offset();
        let mut entries = Vec::new();
        let mut offset = CHILD_SIZE;
        while offset < fso {
            let (key, len) = self.key_at(ty, offset)?;
            let child_offset = offset + len;
            if child_offset + CHILD_SIZE > fso {
                return Err(self.corrupted(format!("truncated entry at {}", offset)));
            }
            entries.push(InternalEntry {
                key,
                child: self.read_child(child_offset),
                start: offset,
                end: child_offset + CHILD_SIZE,
            });
            offset = child_offset + CHILD_SIZE;
        }
        Ok(entries)
    }

    /// Pick the child to descend into: the one left of the first separator
    /// the probe reaches.
    pub fn route(&self, ty: AttrType, probe: Probe<'_>) -> Result<Route> {
        let entries = self.internal_entries(ty)?;
        let stop = entries
            .iter()
            .position(|entry| probe.reached(&entry.key))
            .unwrap_or(entries.len());

        let route = if stop == 0 {
            Route {
                child: self.first_child(),
                child_offset: 0,
                insert_offset: entries.first().map_or(self.free_space_offset(), |e| e.start),
                // Dropping the first child takes the first separator with it.
                dead_span: (0, entries.first().map_or(CHILD_SIZE, |e| e.end - CHILD_SIZE)),
            }
        } else {
            let entry = &entries[stop - 1];
            Route {
                child: entry.child,
                child_offset: entry.end - CHILD_SIZE,
                insert_offset: entry.end,
                dead_span: (entry.start, entry.end),
            }
        };
        Ok(route)
    }

    /// Whether an internal node is down to a single child pointer.
    pub fn has_single_child(&self) -> bool {
        self.free_space_offset() == CHILD_SIZE
    }
}

/// Encode `(key, rid, child)` for an internal node.
pub(crate) fn internal_entry(key: &IndexKey, child: PageId) -> Vec<u8> {
    let mut out = Vec::with_capacity(key.encoded_len() + CHILD_SIZE);
    key.encode_into(&mut out);
    out.extend_from_slice(&child.0.to_le_bytes());
    out
}

/// Encode `(key, rid)` for a leaf.
pub(crate) fn leaf_entry(key: &IndexKey) -> Vec<u8> {
    let mut out = Vec::with_capacity(key.encoded_len());
    key.encode_into(&mut out);
    out
}
