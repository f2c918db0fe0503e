//! Attribute descriptors.

use std::fmt;

use super::{Error, Result};

/// Type of an attribute.
///
/// Uses `#[repr(u8)]` so the discriminant is stable if it is ever persisted.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrType {
    /// 4-byte signed integer.
    Int = 0,
    /// 4-byte IEEE-754 float.
    Real = 1,
    /// 4-byte length prefix followed by raw bytes.
    VarChar = 2,
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrType::Int => write!(f, "int"),
            AttrType::Real => write!(f, "real"),
            AttrType::VarChar => write!(f, "varchar"),
        }
    }
}

/// One column of a record descriptor.
///
/// `length` is the declared width: 4 for numbers, the maximum byte length
/// for strings. It is informational; the on-page format is always
/// length-prefixed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    pub name: String,
    pub attr_type: AttrType,
    pub length: u32,
}

impl Attribute {
    pub fn new(name: impl Into<String>, attr_type: AttrType, length: u32) -> Self {
        Self {
            name: name.into(),
            attr_type,
            length,
        }
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, AttrType::Int, 4)
    }

    pub fn real(name: impl Into<String>) -> Self {
        Self::new(name, AttrType::Real, 4)
    }

    pub fn varchar(name: impl Into<String>, max_len: u32) -> Self {
        Self::new(name, AttrType::VarChar, max_len)
    }
}

/// Position of the attribute called `name` in `attrs`.
///
/// # Errors
/// Returns `Error::AttributeNotFound` if no attribute has that name.
pub fn attribute_position(attrs: &[Attribute], name: &str) -> Result<usize> {
    attrs
        .iter()
        .position(|a| a.name == name)
        .ok_or_else(|| Error::AttributeNotFound(name.to_string()))
}
