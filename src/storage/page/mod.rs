//! Page buffer type.
//!
//! - [`Page`] - The raw 4KB data container with word accessors
//!
//! Record-page and B+-tree node layouts are views over `Page` defined in
//! [`crate::record`] and [`crate::index`].

#[allow(clippy::module_inception)]
mod page;

pub use page::Page;
