//! Composite index keys.
//!
//! Every entry in the tree is keyed by `(value, rid)`. The RID breaks ties
//! between equal attribute values, so duplicates are allowed while every
//! key stays unique.

use std::fmt;

use crate::common::{AttrType, ByteCursor, Result, Rid, Value};

/// `(attribute value, rid)`, ordered by value, then page, then slot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct IndexKey {
    pub value: Value,
    pub rid: Rid,
}

impl IndexKey {
    pub fn new(value: Value, rid: Rid) -> Self {
        Self { value, rid }
    }

    /// Bytes of the key on a page: the value's wire format then the RID.
    pub fn encoded_len(&self) -> usize {
        self.value.encoded_len() + Rid::SIZE
    }

    pub fn encode_into(&self, out: &mut Vec<u8>) {
        self.value.encode_into(out);
        out.extend_from_slice(&self.rid.to_bytes());
    }

    pub fn decode(ty: AttrType, cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let value = Value::decode(ty, cursor)?;
        let rid = cursor.read_rid()?;
        Ok(Self { value, rid })
    }
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.value, self.rid)
    }
}

/// Where a search should stop inside a node.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Probe<'a> {
    /// First entry `>= key`.
    AtLeast(&'a IndexKey),
    /// First entry `> key`.
    Above(&'a IndexKey),
    /// First entry whose value is `>= value` (inclusive) or `> value`,
    /// regardless of RID.
    ValueFrom { value: &'a Value, inclusive: bool },
}

impl Probe<'_> {
    /// Whether `key` is at or past the search target.
    pub fn reached(&self, key: &IndexKey) -> bool {
        match *self {
            Probe::AtLeast(target) => key >= target,
            Probe::Above(target) => key > target,
            Probe::ValueFrom { value, inclusive: true } => key.value >= *value,
            Probe::ValueFrom { value, inclusive: false } => key.value > *value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(v: i32, page: u32, slot: u32) -> IndexKey {
        IndexKey::new(Value::Int(v), Rid::new(page, slot))
    }

    #[test]
    fn test_ordering_by_value_then_rid() {
        assert!(key(1, 9, 9) < key(2, 0, 0));
        assert!(key(5, 1, 0) < key(5, 1, 1));
        assert!(key(5, 1, 9) < key(5, 2, 0));
        assert_eq!(key(5, 1, 1), key(5, 1, 1));
    }

    #[test]
    fn test_wire_format() {
        let k = IndexKey::new(Value::varchar("ab"), Rid::new(3, 4));
        let mut out = Vec::new();
        k.encode_into(&mut out);
        assert_eq!(out.len(), k.encoded_len());
        assert_eq!(out, vec![2, 0, 0, 0, b'a', b'b', 3, 0, 0, 0, 4, 0, 0, 0]);

        let decoded = IndexKey::decode(AttrType::VarChar, &mut ByteCursor::new(&out)).unwrap();
        assert_eq!(decoded, k);
    }

    #[test]
    fn test_value_probe_ignores_rid() {
        let five = Value::Int(5);
        let inclusive = Probe::ValueFrom { value: &five, inclusive: true };
        let exclusive = Probe::ValueFrom { value: &five, inclusive: false };

        assert!(inclusive.reached(&key(5, 0, 0)));
        assert!(!exclusive.reached(&key(5, 99, 99)));
        assert!(exclusive.reached(&key(6, 0, 0)));
        assert!(!inclusive.reached(&key(4, 99, 99)));
    }

    #[test]
    fn test_key_probes() {
        let target = key(5, 1, 1);
        assert!(Probe::AtLeast(&target).reached(&key(5, 1, 1)));
        assert!(!Probe::Above(&target).reached(&key(5, 1, 1)));
        assert!(Probe::Above(&target).reached(&key(5, 1, 2)));
    }
}
