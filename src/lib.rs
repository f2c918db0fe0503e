//! slotdb - an embedded storage engine built from two structures over a
//! shared paged file.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            slotdb                               │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌────────────────────────────┐  ┌──────────────────────────┐   │
//! │  │  Record Layer (record/)    │  │  Index Layer (index/)    │   │
//! │  │  slotted pages, tombstones │  │  B+-tree, (value, rid)   │   │
//! │  │  RecordFile + RecordScan   │  │  IndexFile + IndexScan   │   │
//! │  └────────────────────────────┘  └──────────────────────────┘   │
//! │                 ↓                             ↓                 │
//! │  ┌─────────────────────────────────────────────────────────┐    │
//! │  │           Storage Layer (storage/)                      │    │
//! │  │   PagedFileManager + FileHandle + hidden header page    │    │
//! │  └─────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything is single-threaded and synchronous. There is no page cache:
//! every page access is a read or write on the underlying file.
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, Rid, Value, Error, config)
//! - [`storage`] - Paged file I/O
//! - [`record`] - Record files
//! - [`index`] - B+-tree indexes
//!
//! # Quick Start
//! ```no_run
//! use slotdb::common::tuple::encode_tuple;
//! use slotdb::{Attribute, CompOp, IndexManager, RecordFileManager, ScanIterator, Value};
//!
//! # fn main() -> slotdb::Result<()> {
//! let attrs = vec![Attribute::varchar("name", 50), Attribute::int("age")];
//!
//! let rfm = RecordFileManager::new();
//! rfm.create_file("people.db")?;
//! let mut people = rfm.open_file("people.db")?;
//! let tuple = encode_tuple(&attrs, &[Some(Value::varchar("Tom")), Some(Value::Int(25))])?;
//! let rid = people.insert_record(&attrs, &tuple)?;
//!
//! let im = IndexManager::new();
//! im.create_file("people_age.idx")?;
//! let mut ages = im.open_file("people_age.idx")?;
//! ages.insert_entry(&attrs[1], &Value::Int(25), rid)?;
//!
//! let mut scan = ages.scan(&attrs[1], Some(&Value::Int(18)), None, true, true)?;
//! while let Some((rid, _key)) = scan.next_entry()? {
//!     println!("{}", rfm.print_record(&attrs, &people.read_record(&attrs, rid)?)?);
//! }
//! scan.close()?;
//!
//! let mut adults = people.scan(&attrs, "age", CompOp::Ge, Some(&Value::Int(18)), &["name"])?;
//! while let Some((_rid, name)) = adults.next_entry()? {
//!     assert_eq!(name[0], 0); // not null
//! }
//! # Ok(())
//! # }
//! ```

pub mod common;
pub mod index;
pub mod record;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::PAGE_SIZE;
pub use common::{AttrType, Attribute, CompOp, Error, PageId, Result, Rid, ScanIterator, Value};

pub use index::{IndexFile, IndexManager, IndexScan};
pub use record::{RecordFile, RecordFileManager, RecordScan};
pub use storage::{FileHandle, IoCounters, PagedFileManager};
