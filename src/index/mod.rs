//! Index layer.
//!
//! - [`btree`] - Disk-resident B+-tree with duplicate-value support and
//!   delete-safe range scans

pub mod btree;

pub use btree::{IndexFile, IndexManager, IndexScan};
