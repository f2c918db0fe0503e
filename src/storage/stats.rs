//! Page I/O counters.

use std::fmt;

/// A point-in-time snapshot of a file handle's page operation counters.
///
/// Counters cover data pages only; header maintenance is not counted. They
/// are persisted in the file header on close, so they accumulate across
/// sessions. Used for diagnostics, never for correctness.
///
/// # Example
/// ```
/// use slotdb::IoCounters;
///
/// let before = IoCounters { reads: 4, writes: 2, appends: 1 };
/// let after = IoCounters { reads: 7, writes: 2, appends: 3 };
/// assert_eq!(after.since(&before), IoCounters { reads: 3, writes: 0, appends: 2 });
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IoCounters {
    pub reads: u32,
    pub writes: u32,
    pub appends: u32,
}

impl IoCounters {
    /// Operations performed between `earlier` and `self`. Counters wrap at
    /// `u32::MAX`, so the difference wraps too.
    pub fn since(&self, earlier: &IoCounters) -> IoCounters {
        IoCounters {
            reads: self.reads.wrapping_sub(earlier.reads),
            writes: self.writes.wrapping_sub(earlier.writes),
            appends: self.appends.wrapping_sub(earlier.appends),
        }
    }

    /// Total page operations.
    pub fn total(&self) -> u64 {
        self.reads as u64 + self.writes as u64 + self.appends as u64
    }
}

impl fmt::Display for IoCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "reads={} writes={} appends={}",
            self.reads, self.writes, self.appends
        )
    }
}
