//! Range scan over the leaf chain.

use super::key::Probe;
use super::IndexFile;
use crate::common::{AttrType, Attribute, PageId, Result, Rid, ScanIterator, Value};

#[derive(Debug, Clone, Copy)]
enum ScanState {
    Unstarted,
    Active {
        page: PageId,
        offset: usize,
        /// Leaf free-space offset seen by the previous call.
        last_fso: usize,
        /// Length of the entry returned by the previous call.
        last_len: usize,
    },
    Exhausted,
}

/// Cursor over the entries of an [`IndexFile`] between two bounds, in
/// `(value, rid)` order. Yields each entry's RID with its encoded value.
///
/// The entry just returned may be deleted through [`IndexScan::index_mut`]
/// without disturbing the scan: the next call notices that the leaf shrank
/// and steps back over the removed bytes.
pub struct IndexScan<'a> {
    index: &'a mut IndexFile,
    attr_type: AttrType,
    low: Option<Value>,
    high: Option<Value>,
    low_inclusive: bool,
    high_inclusive: bool,
    state: ScanState,
}

impl IndexFile {
    /// Scan entries with `low <(=) value <(=) high`. A `None` bound is open.
    ///
    /// # Errors
    /// Returns `Error::TypeMismatch` if a bound does not match `attr`.
    pub fn scan(
        &mut self,
        attr: &Attribute,
        low: Option<&Value>,
        high: Option<&Value>,
        low_inclusive: bool,
        high_inclusive: bool,
    ) -> Result<IndexScan<'_>> {
        for bound in [low, high].into_iter().flatten() {
            bound.check_type(attr.attr_type)?;
        }
        Ok(IndexScan {
            index: self,
            attr_type: attr.attr_type,
            low: low.cloned(),
            high: high.cloned(),
            low_inclusive,
            high_inclusive,
            state: ScanState::Unstarted,
        })
    }
}

impl IndexScan<'_> {
    /// The index being scanned, for deleting entries mid-scan.
    pub fn index_mut(&mut self) -> &mut IndexFile {
        &mut *self.index
    }

    fn low_probe(&self) -> Option<Probe<'_>> {
        self.low.as_ref().map(|value| Probe::ValueFrom {
            value,
            inclusive: self.low_inclusive,
        })
    }

    /// Descend to the first entry that satisfies the low bound.
    fn start(&mut self) -> Result<ScanState> {
        let mut page_id = self.index.root();
        if !page_id.is_valid() {
            return Ok(ScanState::Exhausted);
        }

        loop {
            let node = self.index.load(page_id)?;
            if node.is_leaf() {
                let offset = match self.low_probe() {
                    Some(probe) => node.leaf_search(self.attr_type, probe)?.0,
                    None => 0,
                };
                return Ok(ScanState::Active {
                    page: page_id,
                    offset,
                    last_fso: node.free_space_offset(),
                    last_len: 0,
                });
            }
            page_id = match self.low_probe() {
                Some(probe) => node.route(self.attr_type, probe)?.child,
                None => node.first_child(),
            };
        }
    }

    fn past_high(&self, value: &Value) -> bool {
        match &self.high {
            None => false,
            Some(high) if self.high_inclusive => value > high,
            Some(high) => value >= high,
        }
    }

    fn advance(&mut self) -> Result<Option<(Rid, Vec<u8>)>> {
        loop {
            let (page, offset, last_fso, last_len) = match self.state {
                ScanState::Exhausted => return Ok(None),
                ScanState::Unstarted => {
                    self.state = self.start()?;
                    continue;
                }
                ScanState::Active {
                    page,
                    offset,
                    last_fso,
                    last_len,
                } => (page, offset, last_fso, last_len),
            };

            let node = self.index.load(page)?;
            let fso = node.free_space_offset();
            let offset = if fso < last_fso {
                offset.saturating_sub(last_len)
            } else {
                offset
            };

            if offset >= fso {
                let next = node.right_sibling();
                self.state = if next.is_valid() {
                    ScanState::Active {
                        page: next,
                        offset: 0,
                        last_fso: 0,
                        last_len: 0,
                    }
                } else {
                    ScanState::Exhausted
                };
                continue;
            }

            let (key, len) = node.key_at(self.attr_type, offset)?;
            if self.past_high(&key.value) {
                self.state = ScanState::Exhausted;
                return Ok(None);
            }

            self.state = ScanState::Active {
                page,
                offset: offset + len,
                last_fso: fso,
                last_len: len,
            };
            return Ok(Some((key.rid, key.value.to_bytes())));
        }
    }
}

impl ScanIterator for IndexScan<'_> {
    fn next_entry(&mut self) -> Result<Option<(Rid, Vec<u8>)>> {
        let next = self.advance();
        if next.is_err() {
            self.state = ScanState::Exhausted;
        }
        next
    }

    fn close(&mut self) -> Result<()> {
        self.state = ScanState::Exhausted;
        Ok(())
    }
}

impl Iterator for IndexScan<'_> {
    type Item = Result<(Rid, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().transpose()
    }
}
