use tracing::{debug, trace};

use super::key::{IndexKey, Probe};
use super::node::Node;
use super::IndexFile;
use crate::common::{AttrType, Attribute, Error, PageId, Result, Rid, Value};

/// What happened below a node during a delete.
#[derive(Debug, PartialEq, Eq)]
enum DeleteOutcome {
    NotFound,
    Deleted,
    /// A non-root leaf lost its last entry and was unlinked from its siblings.
    PageEmptied,
    /// An internal node dropped to one child; the parent should point at it.
    CollapsedTo(PageId),
}

impl IndexFile {
    /// Delete `(key, rid)`.
    ///
    /// # Errors
    /// - `Error::TypeMismatch` if `key` does not match `attr`
    /// - `Error::KeyNotFound` if the pair is not in the index
    pub fn delete_entry(&mut self, attr: &Attribute, key: &Value, rid: Rid) -> Result<()> {
        key.check_type(attr.attr_type)?;
        let key = IndexKey::new(key.clone(), rid);

        let root = self.root();
        if !root.is_valid() {
            return Err(Error::KeyNotFound);
        }

        match self.delete_from(attr.attr_type, root, &key)? {
            DeleteOutcome::NotFound => return Err(Error::KeyNotFound),
            DeleteOutcome::Deleted | DeleteOutcome::PageEmptied => {}
            DeleteOutcome::CollapsedTo(child) => {
                self.set_root(child)?;
                debug!(old = root.0, new = child.0, "collapsed root");
            }
        }

        trace!(%key, "deleted index entry");
        Ok(())
    }

    fn delete_from(
        &mut self,
        ty: AttrType,
        page_id: PageId,
        key: &IndexKey,
    ) -> Result<DeleteOutcome> {
        let mut node = self.load(page_id)?;
        if node.is_leaf() {
            return self.delete_from_leaf(ty, node, key);
        }

        let route = node.route(ty, Probe::Above(key))?;
        match self.delete_from(ty, route.child, key)? {
            outcome @ (DeleteOutcome::NotFound | DeleteOutcome::Deleted) => Ok(outcome),
            DeleteOutcome::CollapsedTo(child) => {
                node.set_child(route.child_offset, child);
                self.store(&node)?;
                Ok(DeleteOutcome::Deleted)
            }
            DeleteOutcome::PageEmptied => {
                let (start, end) = route.dead_span;
                node.remove_bytes(start, end);
                if node.has_single_child() {
                    let survivor = node.first_child();
                    debug!(page = page_id.0, survivor = survivor.0, "collapsed internal node");
                    return Ok(DeleteOutcome::CollapsedTo(survivor));
                }
                self.store(&node)?;
                Ok(DeleteOutcome::Deleted)
            }
        }
    }

    fn delete_from_leaf(
        &mut self,
        ty: AttrType,
        mut node: Node,
        key: &IndexKey,
    ) -> Result<DeleteOutcome> {
        let (offset, found) = node.leaf_search(ty, Probe::AtLeast(key))?;
        let len = match found {
            Some((existing, len)) if existing == *key => len,
            _ => return Ok(DeleteOutcome::NotFound),
        };

        node.remove_bytes(offset, offset + len);
        // The emptied leaf keeps its right pointer so a scan parked on it
        // can still move on.
        self.store(&node)?;

        if node.free_space_offset() > 0 || node.id() == self.root() {
            return Ok(DeleteOutcome::Deleted);
        }

        let (left, right) = (node.left_sibling(), node.right_sibling());
        if left.is_valid() {
            let mut neighbor = self.load(left)?;
            neighbor.set_right_sibling(right);
            self.store(&neighbor)?;
        }
        if right.is_valid() {
            let mut neighbor = self.load(right)?;
            neighbor.set_left_sibling(left);
            self.store(&neighbor)?;
        }

        debug!(page = node.id().0, "unlinked empty leaf");
        Ok(DeleteOutcome::PageEmptied)
    }
}
