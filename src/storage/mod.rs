//! Storage layer - paged file I/O.
//!
//! This module handles persistent storage:
//! - [`PagedFileManager`] / [`FileHandle`] - File lifecycle and page I/O
//! - [`page`] - The raw page buffer
//! - [`IoCounters`] - Page operation counters

mod file_header;
pub mod page;
mod paged_file;
mod stats;

pub use paged_file::{FileHandle, PagedFileManager};
pub use stats::IoCounters;
