//! Paged file - fixed-size page I/O over a single file.
//!
//! The [`PagedFileManager`] creates, destroys, opens, and closes files; an
//! open file is a [`FileHandle`] that reads, writes, and appends pages.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::common::config::{FILE_HEADER_PAGES, PAGE_SIZE};
use crate::common::{Error, PageId, Result};
use crate::storage::file_header::FileHeader;
use crate::storage::page::Page;
use crate::storage::IoCounters;

/// File lifecycle operations.
///
/// This is a plain value rather than a global: construct one where files
/// are managed and pass it by reference.
#[derive(Debug, Default, Clone, Copy)]
pub struct PagedFileManager;

impl PagedFileManager {
    pub fn new() -> Self {
        Self
    }

    /// Create a new file holding only the hidden header page.
    ///
    /// # Errors
    /// Returns `Error::FileExists` if the path already exists.
    pub fn create_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut file = match OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(Error::FileExists(path.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };

        let mut header_page = Page::new();
        FileHeader::default().write_to(header_page.as_mut_slice());
        file.write_all(header_page.as_slice())?;
        file.sync_all()?;

        debug!(path = %path.display(), "created paged file");
        Ok(())
    }

    /// Delete a file.
    ///
    /// # Errors
    /// Returns `Error::FileNotFound` if the path does not exist.
    pub fn destroy_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        match fs::remove_file(path) {
            Ok(()) => {
                debug!(path = %path.display(), "destroyed paged file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(Error::FileNotFound(path.to_path_buf()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Open an existing file.
    ///
    /// # Errors
    /// - `Error::FileNotFound` if the path does not exist
    /// - `Error::CorruptedHeader` if the header page is missing or fails its checksum
    pub fn open_file<P: AsRef<Path>>(&self, path: P) -> Result<FileHandle> {
        FileHandle::open(path.as_ref())
    }

    /// Close a file, persisting its header and syncing it to disk.
    ///
    /// Consumes the handle, so a closed handle cannot be used again.
    pub fn close_file(&self, handle: FileHandle) -> Result<()> {
        handle.close()
    }
}

/// An open paged file.
///
/// # File Layout
/// ```text
/// ┌──────────┬─────────┬─────────┬─────────┐
/// │ Header   │ Page 0  │ Page 1  │  ...    │
/// │ (hidden) │ (4KB)   │ (4KB)   │         │
/// └──────────┴─────────┴─────────┴─────────┘
/// Offset:  0     4096      8192     ...
/// ```
///
/// Caller page N is located at file offset `(N + 1) × PAGE_SIZE`.
///
/// # Thread Safety
/// Single-threaded: every operation takes `&mut self` and runs to
/// completion with blocking I/O. There is no page cache; every read and
/// write goes to the file.
///
/// # Durability
/// Pages are written through to the OS immediately and synced on close.
/// The root pointer is written to the header as soon as it changes.
#[derive(Debug)]
pub struct FileHandle {
    file: File,
    path: PathBuf,
    header: FileHeader,
}

impl FileHandle {
    fn open(path: &Path) -> Result<Self> {
        let mut file = match OpenOptions::new().read(true).write(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::FileNotFound(path.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };

        let file_size = file.metadata()?.len();
        if file_size < PAGE_SIZE as u64 {
            return Err(Error::CorruptedHeader);
        }

        let mut header_page = Page::new();
        file.seek(SeekFrom::Start(0))?;
        file.read_exact(header_page.as_mut_slice())?;
        let mut header =
            FileHeader::from_bytes(header_page.as_slice()).ok_or(Error::CorruptedHeader)?;

        // The file length is authoritative: a session that appended pages
        // but never closed left a stale count in the header.
        let pages_on_disk = (file_size / PAGE_SIZE as u64) as u32 - FILE_HEADER_PAGES;
        if pages_on_disk != header.page_count {
            debug!(
                path = %path.display(),
                header = header.page_count,
                on_disk = pages_on_disk,
                "page count in header is stale"
            );
            header.page_count = pages_on_disk;
        }

        debug!(path = %path.display(), pages = header.page_count, "opened paged file");
        Ok(Self {
            file,
            path: path.to_path_buf(),
            header,
        })
    }

    fn close(mut self) -> Result<()> {
        self.write_header()?;
        self.file.sync_all()?;
        debug!(
            path = %self.path.display(),
            counters = %self.collect_counter_values(),
            "closed paged file"
        );
        Ok(())
    }

    #[inline]
    fn file_offset(page_id: PageId) -> u64 {
        (page_id.0 as u64 + FILE_HEADER_PAGES as u64) * PAGE_SIZE as u64
    }

    fn write_header(&mut self) -> Result<()> {
        let mut header_page = Page::new();
        self.header.write_to(header_page.as_mut_slice());
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(header_page.as_slice())?;
        Ok(())
    }

    /// Read a page from disk.
    ///
    /// # Errors
    /// Returns `Error::PageNotFound` if the page doesn't exist.
    pub fn read_page(&mut self, page_id: PageId) -> Result<Page> {
        if page_id.0 >= self.header.page_count {
            return Err(Error::PageNotFound(page_id.0));
        }

        self.file.seek(SeekFrom::Start(Self::file_offset(page_id)))?;
        let mut page = Page::new();
        self.file.read_exact(page.as_mut_slice())?;

        self.header.read_count = self.header.read_count.wrapping_add(1);
        trace!(page = page_id.0, "read page");
        Ok(page)
    }

    /// Overwrite an existing page.
    ///
    /// # Errors
    /// Returns `Error::PageNotFound` if the page hasn't been appended yet.
    pub fn write_page(&mut self, page_id: PageId, page: &Page) -> Result<()> {
        if page_id.0 >= self.header.page_count {
            return Err(Error::PageNotFound(page_id.0));
        }

        self.file.seek(SeekFrom::Start(Self::file_offset(page_id)))?;
        self.file.write_all(page.as_slice())?;

        self.header.write_count = self.header.write_count.wrapping_add(1);
        trace!(page = page_id.0, "wrote page");
        Ok(())
    }

    /// Append `page` as a new page at the end of the file.
    ///
    /// Returns the `PageId` of the new page.
    pub fn append_page(&mut self, page: &Page) -> Result<PageId> {
        let page_id = PageId::new(self.header.page_count);

        self.file.seek(SeekFrom::Start(Self::file_offset(page_id)))?;
        self.file.write_all(page.as_slice())?;

        self.header.page_count += 1;
        self.header.append_count = self.header.append_count.wrapping_add(1);
        trace!(page = page_id.0, "appended page");
        Ok(page_id)
    }

    /// Number of data pages (the header page is not counted).
    #[inline]
    pub fn page_count(&self) -> u32 {
        self.header.page_count
    }

    /// Root page recorded in the header (`PageId::INVALID` if none).
    #[inline]
    pub fn root(&self) -> PageId {
        self.header.root
    }

    /// Record a new root page and persist the header immediately.
    pub fn set_root(&mut self, root: PageId) -> Result<()> {
        self.header.root = root;
        self.write_header()
    }

    /// Snapshot of the read/write/append counters.
    pub fn collect_counter_values(&self) -> IoCounters {
        IoCounters {
            reads: self.header.read_count,
            writes: self.header.write_count,
            appends: self.header.append_count,
        }
    }

    /// Path this handle was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
