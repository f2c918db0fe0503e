//! Record layer - slotted-page heap files.
//!
//! - [`RecordFileManager`] / [`RecordFile`] - File lifecycle and record operations
//! - [`RecordScan`] - Filtered, projected sequential scan

mod record_file;
mod record_format;
mod record_page;
mod scan;

pub use record_file::{RecordFile, RecordFileManager};
pub use scan::RecordScan;
