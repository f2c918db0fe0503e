use tracing::{debug, trace};

use super::key::{IndexKey, Probe};
use super::node::{internal_entry, leaf_entry, Node, CHILD_SIZE};
use super::IndexFile;
use crate::common::config::MAX_INDEX_ENTRY;
use crate::common::{AttrType, Attribute, ByteCursor, Error, PageId, Result, Rid, Value};

/// Result of inserting below a node. A split hands the parent a new
/// separator and the page to its right.
enum InsertOutcome {
    Done,
    Split { separator: IndexKey, page: PageId },
}

/// `content` with `entry` spliced in at `offset`.
fn spliced(content: &[u8], offset: usize, entry: &[u8]) -> Vec<u8> {
    let mut scratch = Vec::with_capacity(content.len() + entry.len());
    scratch.extend_from_slice(&content[..offset]);
    scratch.extend_from_slice(entry);
    scratch.extend_from_slice(&content[offset..]);
    scratch
}

impl IndexFile {
    /// Insert `(key, rid)`.
    ///
    /// # Errors
    /// - `Error::TypeMismatch` if `key` does not match `attr`
    /// - `Error::KeyTooLarge` if the entry exceeds `MAX_INDEX_ENTRY`
    /// - `Error::DuplicateKey` if the exact `(key, rid)` pair is already present
    pub fn insert_entry(&mut self, attr: &Attribute, key: &Value, rid: Rid) -> Result<()> {
        key.check_type(attr.attr_type)?;
        let key = IndexKey::new(key.clone(), rid);
        let entry_size = key.encoded_len() + CHILD_SIZE;
        if entry_size > MAX_INDEX_ENTRY {
            return Err(Error::KeyTooLarge {
                size: entry_size,
                max: MAX_INDEX_ENTRY,
            });
        }

        let root = self.root();
        if !root.is_valid() {
            let mut leaf = Node::new_leaf(PageId::INVALID);
            leaf.set_content(&leaf_entry(&key));
            let root = self.append(&mut leaf)?;
            self.set_root(root)?;
            debug!(root = root.0, "created root leaf");
            return Ok(());
        }

        if let InsertOutcome::Split { separator, page } =
            self.insert_into(attr.attr_type, root, &key)?
        {
            let mut content = root.0.to_le_bytes().to_vec();
            content.extend(internal_entry(&separator, page));
            let mut new_root = Node::new_internal(PageId::INVALID, &content);
            let new_root_id = self.append(&mut new_root)?;
            self.set_root(new_root_id)?;
            debug!(old = root.0, new = new_root_id.0, "grew new root");
        }

        trace!(%key, "inserted index entry");
        Ok(())
    }

    fn insert_into(
        &mut self,
        ty: AttrType,
        page_id: PageId,
        key: &IndexKey,
    ) -> Result<InsertOutcome> {
        let mut node = self.load(page_id)?;
        if node.is_leaf() {
            return self.insert_into_leaf(ty, node, key);
        }

        let route = node.route(ty, Probe::Above(key))?;
        match self.insert_into(ty, route.child, key)? {
            InsertOutcome::Done => Ok(InsertOutcome::Done),
            InsertOutcome::Split { separator, page } => {
                let entry = internal_entry(&separator, page);
                if entry.len() <= node.free_space() {
                    node.insert_bytes(route.insert_offset, &entry);
                    self.store(&node)?;
                    Ok(InsertOutcome::Done)
                } else {
                    self.split_internal(ty, node, route.insert_offset, &entry)
                }
            }
        }
    }

    fn insert_into_leaf(
        &mut self,
        ty: AttrType,
        mut node: Node,
        key: &IndexKey,
    ) -> Result<InsertOutcome> {
        let (offset, found) = node.leaf_search(ty, Probe::AtLeast(key))?;
        if matches!(&found, Some((existing, _)) if existing == key) {
            return Err(Error::DuplicateKey);
        }

        let entry = leaf_entry(key);
        if entry.len() <= node.free_space() {
            node.insert_bytes(offset, &entry);
            self.store(&node)?;
            return Ok(InsertOutcome::Done);
        }
        self.split_leaf(ty, node, offset, &entry)
    }

    /// Split an overflowing leaf at its byte median. The first key of the
    /// new right leaf is copied up as the separator.
    fn split_leaf(
        &mut self,
        ty: AttrType,
        mut node: Node,
        offset: usize,
        entry: &[u8],
    ) -> Result<InsertOutcome> {
        let scratch = spliced(node.content(), offset, entry);
        let half = scratch.len() / 2;

        let mut cursor = ByteCursor::new(&scratch);
        while cursor.position() < half {
            IndexKey::decode(ty, &mut cursor)?;
        }
        let (left, right) = scratch.split_at(cursor.position());
        let separator = IndexKey::decode(ty, &mut ByteCursor::new(right))?;

        let old_right = node.right_sibling();
        let mut sibling = Node::new_leaf(PageId::INVALID);
        sibling.set_content(right);
        sibling.set_left_sibling(node.id());
        sibling.set_right_sibling(old_right);
        let sibling_id = self.append(&mut sibling)?;

        node.set_content(left);
        node.set_right_sibling(sibling_id);
        self.store(&node)?;

        if old_right.is_valid() {
            let mut neighbor = self.load(old_right)?;
            neighbor.set_left_sibling(sibling_id);
            self.store(&neighbor)?;
        }

        debug!(page = node.id().0, sibling = sibling_id.0, %separator, "split leaf");
        Ok(InsertOutcome::Split {
            separator,
            page: sibling_id,
        })
    }

    /// Split an overflowing internal node. The entry straddling the byte
    /// median moves up: its key becomes the separator and its child starts
    /// the new right node.
    fn split_internal(
        &mut self,
        ty: AttrType,
        mut node: Node,
        offset: usize,
        entry: &[u8],
    ) -> Result<InsertOutcome> {
        let scratch = spliced(node.content(), offset, entry);
        let half = scratch.len() / 2;

        let mut cursor = ByteCursor::at(&scratch, CHILD_SIZE);
        let (separator, start, end) = loop {
            let start = cursor.position();
            let key = IndexKey::decode(ty, &mut cursor)?;
            cursor.read_u32()?;
            if cursor.position() > half {
                break (key, start, cursor.position());
            }
        };

        let mut sibling = Node::new_internal(PageId::INVALID, &scratch[end - CHILD_SIZE..]);
        let sibling_id = self.append(&mut sibling)?;

        node.set_content(&scratch[..start]);
        self.store(&node)?;

        debug!(page = node.id().0, sibling = sibling_id.0, %separator, "split internal node");
        Ok(InsertOutcome::Split {
            separator,
            page: sibling_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::open_index;
    use super::*;
    use crate::common::config::NODE_CAPACITY;
    use tempfile::tempdir;

    fn int_attr() -> Attribute {
        Attribute::int("age")
    }

    #[test]
    fn test_first_insert_creates_root_leaf() {
        let dir = tempdir().unwrap();
        let mut index = open_index(&dir);
        assert_eq!(index.root(), PageId::INVALID);

        index.insert_entry(&int_attr(), &Value::Int(5), Rid::new(1, 0)).unwrap();
        assert_eq!(index.root(), PageId::new(0));

        let root = index.load(index.root()).unwrap();
        assert!(root.is_leaf());
        assert_eq!(root.free_space_offset(), 12);
    }

    #[test]
    fn test_duplicate_pair_rejected_but_duplicate_value_allowed() {
        let dir = tempdir().unwrap();
        let mut index = open_index(&dir);
        let attr = int_attr();

        index.insert_entry(&attr, &Value::Int(5), Rid::new(1, 0)).unwrap();
        index.insert_entry(&attr, &Value::Int(5), Rid::new(1, 1)).unwrap();
        assert!(matches!(
            index.insert_entry(&attr, &Value::Int(5), Rid::new(1, 0)),
            Err(Error::DuplicateKey)
        ));
    }

    #[test]
    fn test_type_and_size_checks() {
        let dir = tempdir().unwrap();
        let mut index = open_index(&dir);

        assert!(matches!(
            index.insert_entry(&int_attr(), &Value::Real(1.0), Rid::new(0, 0)),
            Err(Error::TypeMismatch { .. })
        ));

        let attr = Attribute::varchar("name", 2000);
        let long = Value::varchar(vec![b'x'; MAX_INDEX_ENTRY]);
        assert!(matches!(
            index.insert_entry(&attr, &long, Rid::new(0, 0)),
            Err(Error::KeyTooLarge { .. })
        ));
    }

    #[test]
    fn test_leaf_split() {
        let dir = tempdir().unwrap();
        let mut index = open_index(&dir);
        let attr = int_attr();

        // 12-byte entries: 340 fill one leaf exactly
        let per_leaf = NODE_CAPACITY / 12;
        for i in 0..=per_leaf as i32 {
            index.insert_entry(&attr, &Value::Int(i), Rid::new(0, i as u32)).unwrap();
        }

        let root = index.load(index.root()).unwrap();
        assert!(!root.is_leaf());
        let entries = root.internal_entries(AttrType::Int).unwrap();
        assert_eq!(entries.len(), 1);

        let left = index.load(root.first_child()).unwrap();
        let right = index.load(entries[0].child).unwrap();
        assert!(left.is_leaf() && right.is_leaf());
        assert_eq!(left.right_sibling(), right.id());
        assert_eq!(right.left_sibling(), left.id());
        assert_eq!(right.right_sibling(), PageId::INVALID);

        let left_keys = left.leaf_entries(AttrType::Int).unwrap();
        let right_keys = right.leaf_entries(AttrType::Int).unwrap();
        assert_eq!(left_keys.len() + right_keys.len(), per_leaf + 1);
        // Separator is a copy of the right leaf's first key
        assert_eq!(entries[0].key, right_keys[0].0);

        let all = index.leaf_keys(AttrType::Int).unwrap();
        let expected: Vec<IndexKey> = (0..=per_leaf as i32)
            .map(|i| IndexKey::new(Value::Int(i), Rid::new(0, i as u32)))
            .collect();
        assert_eq!(all, expected);

        // Every key is still reachable by a descent from the new root
        for i in 0..=per_leaf as i32 {
            let value = Value::Int(i);
            let hits: Vec<Rid> = index
                .scan(&attr, Some(&value), Some(&value), true, true)
                .unwrap()
                .map(|entry| entry.unwrap().0)
                .collect();
            assert_eq!(hits, vec![Rid::new(0, i as u32)]);
        }
    }

    #[test]
    fn test_split_relinks_right_neighbor() {
        let dir = tempdir().unwrap();
        let mut index = open_index(&dir);
        let attr = int_attr();

        for i in 0..1000 {
            index.insert_entry(&attr, &Value::Int(i), Rid::new(0, 0)).unwrap();
        }
        // Fill the leftmost leaf again so it splits next to an existing neighbor
        for i in 0..400 {
            index.insert_entry(&attr, &Value::Int(0), Rid::new(1, i)).unwrap();
        }

        let mut page_id = index.root();
        let mut node = index.load(page_id).unwrap();
        while !node.is_leaf() {
            page_id = node.first_child();
            node = index.load(page_id).unwrap();
        }
        let mut previous = PageId::INVALID;
        loop {
            assert_eq!(node.left_sibling(), previous);
            previous = node.id();
            let next = node.right_sibling();
            if !next.is_valid() {
                break;
            }
            node = index.load(next).unwrap();
        }
        assert_eq!(index.leaf_keys(AttrType::Int).unwrap().len(), 1400);
    }

    #[test]
    fn test_internal_split_grows_tree() {
        let dir = tempdir().unwrap();
        let mut index = open_index(&dir);
        let attr = Attribute::varchar("name", 1000);

        // ~500-byte keys: a few per leaf and a handful per internal node
        let mut expected = Vec::new();
        for i in 0..200u32 {
            let value = Value::varchar(format!("{:04}{}", i, "k".repeat(496)));
            index.insert_entry(&attr, &value, Rid::new(i, 0)).unwrap();
            expected.push(IndexKey::new(value, Rid::new(i, 0)));
        }

        let mut depth = 1;
        let mut node = index.load(index.root()).unwrap();
        while !node.is_leaf() {
            depth += 1;
            node = index.load(node.first_child()).unwrap();
        }
        assert!(depth >= 3);
        assert_eq!(index.leaf_keys(AttrType::VarChar).unwrap(), expected);
    }
}
