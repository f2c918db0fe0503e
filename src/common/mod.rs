//! Common types and utilities shared across slotdb.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration constants
//! - Error types
//! - Identifiers (PageId, Rid)
//! - Attribute descriptors, typed values, and the external tuple format
//! - The scan iterator contract

mod attribute;
pub mod config;
mod cursor;
pub mod error;
mod null_bitmap;
mod page_id;
mod rid;
mod scan;
pub mod tuple;
mod value;

pub use attribute::{attribute_position, AttrType, Attribute};
pub use cursor::ByteCursor;
pub use error::{Error, Result};
pub use null_bitmap::NullBitmap;
pub use page_id::PageId;
pub use rid::Rid;
pub use scan::ScanIterator;
pub use value::{CompOp, Value};
