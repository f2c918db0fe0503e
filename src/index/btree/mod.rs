//! Disk-resident B+-tree over composite `(value, rid)` keys.
//!
//! # Structure
//! ```text
//!                    ┌──────────────────────┐
//!                    │ root (internal)      │  root page number lives in
//!                    │ c0 (k1,r1) c1 ...    │  the hidden file header
//!                    └──────────────────────┘
//!                     /          |          \
//!          ┌────────┐    ┌────────┐    ┌────────┐
//!          │ leaf   │◀──▶│ leaf   │◀──▶│ leaf   │   doubly linked
//!          └────────┘    └────────┘    └────────┘
//! ```
//!
//! Leaves hold every `(value, rid)` entry inline. Separators are copies of
//! leaf keys, and a key equal to a separator lives in the separator's right
//! subtree.
//!
//! # Deletion
//! Nodes are never merged or rebalanced. A leaf that becomes empty is
//! unlinked from its siblings and dropped from its parent; an internal node
//! left with a single child is replaced by that child. Abandoned pages are
//! not reused.
//!
//! # Failure atomicity
//! A split or collapse writes several pages in sequence. An I/O error
//! partway through leaves the earlier writes in place.

mod delete;
mod insert;
mod key;
mod node;
mod print;
mod scan;

use std::path::Path;

use crate::common::{PageId, Result};
use crate::storage::{FileHandle, IoCounters, PagedFileManager};

pub use scan::IndexScan;

use node::Node;

/// Index file lifecycle operations.
#[derive(Debug, Default, Clone, Copy)]
pub struct IndexManager {
    pfm: PagedFileManager,
}

impl IndexManager {
    pub fn new() -> Self {
        Self {
            pfm: PagedFileManager::new(),
        }
    }

    /// Create an empty index file. The tree has no root until the first insert.
    ///
    /// # Errors
    /// Returns `Error::FileExists` if the path already exists.
    pub fn create_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.pfm.create_file(path)
    }

    pub fn destroy_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.pfm.destroy_file(path)
    }

    pub fn open_file<P: AsRef<Path>>(&self, path: P) -> Result<IndexFile> {
        let handle = self.pfm.open_file(path)?;
        Ok(IndexFile { handle })
    }

    pub fn close_file(&self, index: IndexFile) -> Result<()> {
        self.pfm.close_file(index.handle)
    }
}

/// An open index file.
///
/// Every operation names the indexed [`Attribute`](crate::common::Attribute);
/// its type decides how keys are compared and decoded. Using one file with
/// two different attribute types is a caller error.
pub struct IndexFile {
    handle: FileHandle,
}

impl IndexFile {
    /// Root page, or `PageId::INVALID` for a tree that was never inserted into.
    pub fn root(&self) -> PageId {
        self.handle.root()
    }

    pub fn collect_counter_values(&self) -> IoCounters {
        self.handle.collect_counter_values()
    }

    fn load(&mut self, page_id: PageId) -> Result<Node> {
        let page = self.handle.read_page(page_id)?;
        Node::from_page(page_id, page)
    }

    fn store(&mut self, node: &Node) -> Result<()> {
        self.handle.write_page(node.id(), node.page())
    }

    /// Append `node` as a new page and give it the new page's id.
    fn append(&mut self, node: &mut Node) -> Result<PageId> {
        let page_id = self.handle.append_page(node.page())?;
        node.set_id(page_id);
        Ok(page_id)
    }

    fn set_root(&mut self, root: PageId) -> Result<()> {
        self.handle.set_root(root)
    }

    /// Walk the leaf chain from the leftmost leaf, collecting every key.
    #[cfg(test)]
    fn leaf_keys(&mut self, ty: crate::common::AttrType) -> Result<Vec<key::IndexKey>> {
        let mut page_id = self.root();
        if !page_id.is_valid() {
            return Ok(Vec::new());
        }
        let mut node = self.load(page_id)?;
        while !node.is_leaf() {
            page_id = node.first_child();
            node = self.load(page_id)?;
        }

        let mut keys = Vec::new();
        loop {
            keys.extend(node.leaf_entries(ty)?.into_iter().map(|(k, _, _)| k));
            let next = node.right_sibling();
            if !next.is_valid() {
                return Ok(keys);
            }
            node = self.load(next)?;
        }
    }
}
