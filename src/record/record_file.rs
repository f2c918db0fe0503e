//! Record files - slotted-page heap files of tuples.
//!
//! The [`RecordFileManager`] owns file lifecycle; an open file is a
//! [`RecordFile`] that inserts, reads, updates, deletes, and scans records
//! addressed by [`Rid`].

use std::path::Path;

use tracing::{debug, trace};

use crate::common::tuple::format_tuple;
use crate::common::{attribute_position, Attribute, CompOp, Error, PageId, Result, Rid, Value};
use crate::record::record_format::{decode_record, encode_record, mark_forwarded, project_record};
use crate::record::record_page::{RecordPage, Slot};
use crate::record::RecordScan;
use crate::storage::{FileHandle, IoCounters, PagedFileManager};

/// Record file lifecycle operations.
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordFileManager {
    pfm: PagedFileManager,
}

impl RecordFileManager {
    pub fn new() -> Self {
        Self {
            pfm: PagedFileManager::new(),
        }
    }

    /// Create an empty record file.
    ///
    /// # Errors
    /// Returns `Error::FileExists` if the path already exists.
    pub fn create_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.pfm.create_file(path)
    }

    pub fn destroy_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.pfm.destroy_file(path)
    }

    pub fn open_file<P: AsRef<Path>>(&self, path: P) -> Result<RecordFile> {
        let handle = self.pfm.open_file(path)?;
        Ok(RecordFile::new(handle))
    }

    pub fn close_file(&self, file: RecordFile) -> Result<()> {
        self.pfm.close_file(file.handle)
    }

    /// Render a tuple as `name: value` pairs separated by tabs.
    pub fn print_record(&self, attrs: &[Attribute], data: &[u8]) -> Result<String> {
        format_tuple(attrs, data)
    }
}

/// A live record: the page holding it and the span of its bytes.
pub(crate) struct Located {
    pub page: RecordPage,
    pub offset: usize,
    pub len: usize,
}

impl Located {
    pub fn bytes(&self) -> &[u8] {
        self.page.record_bytes(self.offset, self.len)
    }
}

/// An open record file.
///
/// # Record addressing
/// A [`Rid`] stays valid until the record is deleted. When an update no
/// longer fits on the record's page, the record moves and its home slot
/// becomes a tombstone holding the new address. Reads follow the tombstone
/// transparently, and the chain is never longer than one hop.
pub struct RecordFile {
    handle: FileHandle,
    /// Where the free-space search for the next insert begins.
    last_page: PageId,
}

impl RecordFile {
    fn new(handle: FileHandle) -> Self {
        let last_page = match handle.page_count() {
            0 => PageId::new(0),
            n => PageId::new(n - 1),
        };
        Self { handle, last_page }
    }

    // ========================================================================
    // Page access
    // ========================================================================

    pub(crate) fn page_count(&self) -> u32 {
        self.handle.page_count()
    }

    pub(crate) fn load(&mut self, page_id: PageId) -> Result<RecordPage> {
        let page = self.handle.read_page(page_id)?;
        Ok(RecordPage::from_page(page_id, page))
    }

    fn store(&mut self, page: &RecordPage) -> Result<()> {
        self.handle.write_page(page.id(), page.page())
    }

    /// Read the page and slot `rid` names. Free slots and missing pages are
    /// `RecordNotFound`.
    fn load_slot(&mut self, rid: Rid) -> Result<(RecordPage, Slot)> {
        let page = match self.load(rid.page_id()) {
            Err(Error::PageNotFound(_)) => return Err(Error::RecordNotFound(rid)),
            other => other?,
        };
        match page.slot(rid.slot_num as usize)? {
            Slot::Free => Err(Error::RecordNotFound(rid)),
            slot => Ok((page, slot)),
        }
    }

    /// Follow tombstones from `rid` to the live record.
    pub(crate) fn locate(&mut self, rid: Rid) -> Result<Located> {
        let mut current = rid;
        loop {
            let (page, slot) = self.load_slot(current)?;
            match slot {
                Slot::Live { offset, len } => return Ok(Located { page, offset, len }),
                Slot::Tombstone { target, .. } => {
                    trace!(from = %current, to = %target, "following tombstone");
                    current = target;
                }
                Slot::Free => return Err(Error::RecordNotFound(rid)),
            }
        }
    }

    /// Put `record` on the first page, from `start` onward and wrapping,
    /// that can hold it. Appends a page if none can.
    fn place(&mut self, record: &[u8], start: PageId) -> Result<Rid> {
        let count = self.handle.page_count();
        for i in 0..count {
            let page_id = PageId::new((start.0 % count + i) % count);
            let mut page = self.load(page_id)?;
            if page.can_hold(record.len()) {
                let slot = page.insert(record);
                self.store(&page)?;
                self.last_page = page_id;
                return Ok(Rid::new(page_id.0, slot as u32));
            }
        }

        let mut page = RecordPage::empty(PageId::new(count));
        let slot = page.insert(record);
        let page_id = self.handle.append_page(page.page())?;
        debug!(page = page_id.0, "appended record page");
        self.last_page = page_id;
        Ok(Rid::new(page_id.0, slot as u32))
    }

    // ========================================================================
    // Record operations
    // ========================================================================

    /// Insert a tuple and return its address.
    ///
    /// # Errors
    /// - `Error::MalformedTuple` if `data` does not match `attrs`
    /// - `Error::RecordTooLarge` if the record cannot fit on an empty page
    pub fn insert_record(&mut self, attrs: &[Attribute], data: &[u8]) -> Result<Rid> {
        let record = encode_record(attrs, data)?;
        let rid = self.place(&record, self.last_page)?;
        trace!(%rid, len = record.len(), "inserted record");
        Ok(rid)
    }

    /// Read the tuple at `rid`.
    ///
    /// # Errors
    /// Returns `Error::RecordNotFound` if the record was deleted or never existed.
    pub fn read_record(&mut self, attrs: &[Attribute], rid: Rid) -> Result<Vec<u8>> {
        let located = self.locate(rid)?;
        decode_record(attrs, located.bytes())
    }

    /// Read one attribute of the tuple at `rid`, as a one-attribute tuple
    /// (a single null-indicator byte followed by the field if not null).
    pub fn read_attribute(&mut self, attrs: &[Attribute], rid: Rid, name: &str) -> Result<Vec<u8>> {
        let position = attribute_position(attrs, name)?;
        let located = self.locate(rid)?;
        project_record(attrs, located.bytes(), &[position])
    }

    /// Delete the record at `rid`, compacting its bytes out of the page.
    ///
    /// A tombstone is deleted together with the record it points to.
    pub fn delete_record(&mut self, rid: Rid) -> Result<()> {
        let (mut page, slot) = self.load_slot(rid)?;

        if let Slot::Tombstone { target, .. } = slot {
            self.delete_record(target)?;
            // The target may have lived on this page.
            page = self.load(rid.page_id())?;
        }

        page.remove(rid.slot_num as usize)?;
        self.store(&page)?;
        trace!(%rid, "deleted record");
        Ok(())
    }

    /// Replace the tuple at `rid`. The record keeps its address.
    pub fn update_record(&mut self, attrs: &[Attribute], rid: Rid, data: &[u8]) -> Result<()> {
        let mut record = encode_record(attrs, data)?;
        let (mut page, slot) = self.load_slot(rid)?;
        let slot_num = rid.slot_num as usize;

        match slot {
            Slot::Live { .. } => {
                if page.resize_in_place(slot_num, &record)? {
                    self.store(&page)?;
                    trace!(%rid, len = record.len(), "updated record in place");
                    return Ok(());
                }

                mark_forwarded(&mut record);
                let new_rid = self.place(&record, PageId::new(rid.page_num + 1))?;
                page = self.load(rid.page_id())?;
                page.make_tombstone(slot_num, new_rid)?;
                self.store(&page)?;
                debug!(%rid, %new_rid, "relocated record behind tombstone");
            }
            Slot::Tombstone { target, .. } => {
                mark_forwarded(&mut record);
                let mut target_page = self.load(target.page_id())?;
                if target_page.resize_in_place(target.slot_num as usize, &record)? {
                    self.store(&target_page)?;
                    trace!(%rid, %target, "updated relocated record in place");
                    return Ok(());
                }

                let new_rid = self.place(&record, PageId::new(target.page_num + 1))?;
                self.delete_record(target)?;
                page = self.load(rid.page_id())?;
                page.make_tombstone(slot_num, new_rid)?;
                self.store(&page)?;
                debug!(%rid, from = %target, to = %new_rid, "relocated record again");
            }
            Slot::Free => return Err(Error::RecordNotFound(rid)),
        }
        Ok(())
    }

    /// Start a sequential scan.
    ///
    /// Yields every record whose `condition_attribute` compares to `value`
    /// under `op`, projected to `projected` (in that order). With
    /// `CompOp::NoOp` every record matches and `condition_attribute` is
    /// ignored. NULL fields, and a `None` comparison value, never match.
    ///
    /// # Errors
    /// - `Error::AttributeNotFound` for an unknown condition or projected attribute
    /// - `Error::TypeMismatch` if `value` does not match the condition attribute
    pub fn scan(
        &mut self,
        attrs: &[Attribute],
        condition_attribute: &str,
        op: CompOp,
        value: Option<&Value>,
        projected: &[&str],
    ) -> Result<RecordScan<'_>> {
        let condition = match op {
            CompOp::NoOp => None,
            _ => {
                let position = attribute_position(attrs, condition_attribute)?;
                if let Some(value) = value {
                    value.check_type(attrs[position].attr_type)?;
                }
                Some((position, op, value.cloned()))
            }
        };
        let projection = projected
            .iter()
            .map(|name| attribute_position(attrs, name))
            .collect::<Result<Vec<_>>>()?;

        Ok(RecordScan::new(self, attrs.to_vec(), condition, projection))
    }

    pub fn collect_counter_values(&self) -> IoCounters {
        self.handle.collect_counter_values()
    }
}
