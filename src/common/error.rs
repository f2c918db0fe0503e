//! Error types for slotdb.

use std::path::PathBuf;

use thiserror::Error;

use super::{AttrType, Rid};

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in slotdb.
///
/// Exhausted scans are not errors: they end with `Ok(None)`.
///
/// A failure in the middle of a multi-page change (for example a split that
/// appended its new page but could not write the parent) is not rolled
/// back; the pages already written stay written.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from page read/write/append.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `create_file` on a path that already exists.
    #[error("file already exists: {}", .0.display())]
    FileExists(PathBuf),

    /// `open_file`/`destroy_file` on a path that does not exist.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Requested page is beyond the end of the file.
    #[error("page {0} not found")]
    PageNotFound(u32),

    /// The slot is free (never used or already deleted).
    #[error("record {0} not found")]
    RecordNotFound(Rid),

    /// No index entry with this `(key, rid)` pair.
    #[error("index entry not found")]
    KeyNotFound,

    /// The index already holds this exact `(key, rid)` pair.
    #[error("duplicate index entry")]
    DuplicateKey,

    /// Record payload cannot fit even on an empty page.
    #[error("record of {size} bytes exceeds page capacity of {max} bytes")]
    RecordTooLarge { size: usize, max: usize },

    /// Index entry too large for a B+-tree node.
    #[error("index entry of {size} bytes exceeds maximum of {max} bytes")]
    KeyTooLarge { size: usize, max: usize },

    /// Named attribute is not part of the record descriptor.
    #[error("attribute not found: {0}")]
    AttributeNotFound(String),

    /// A value's type does not match the attribute it is used with.
    #[error("type mismatch: expected {expected:?}, got {actual:?}")]
    TypeMismatch { expected: AttrType, actual: AttrType },

    /// A caller-supplied tuple or key buffer is truncated or inconsistent.
    #[error("malformed tuple: {0}")]
    MalformedTuple(String),

    /// Hidden header page failed its checksum.
    #[error("corrupted file header")]
    CorruptedHeader,

    /// A page's trailer or contents are inconsistent.
    #[error("corrupted page {page}: {reason}")]
    CorruptedPage { page: u32, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::PageNotFound(42);
        assert_eq!(format!("{}", err), "page 42 not found");

        let err = Error::RecordNotFound(Rid::new(3, 1));
        assert_eq!(format!("{}", err), "record (3,1) not found");

        let err = Error::RecordTooLarge { size: 5000, max: 4080 };
        assert_eq!(
            format!("{}", err),
            "record of 5000 bytes exceeds page capacity of 4080 bytes"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();

        match err {
            Error::Io(_) => {} // Success
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_io_error_has_source() {
        use std::error::Error as _;

        let err: Error = std::io::Error::other("disk").into();
        assert!(err.source().is_some());
        assert!(Error::KeyNotFound.source().is_none());
    }
}
