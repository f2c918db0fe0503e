//! Pull-based iterator contract shared by record and index scans.

use super::{Result, Rid};

/// A cursor that yields `(Rid, buffer)` pairs until exhausted.
///
/// For record scans the buffer is a projected tuple; for index scans it is
/// the encoded key. Exhaustion is `Ok(None)`, never an error, and every call
/// after that keeps returning `Ok(None)`.
///
/// Query operators consume scans through this trait:
/// ```ignore
/// while let Some((rid, data)) = scan.next_entry()? {
///     // ...
/// }
/// scan.close()?;
/// ```
pub trait ScanIterator {
    /// Advance to the next matching entry.
    fn next_entry(&mut self) -> Result<Option<(Rid, Vec<u8>)>>;

    /// Stop the scan. Later `next_entry` calls return `Ok(None)`.
    fn close(&mut self) -> Result<()>;
}
