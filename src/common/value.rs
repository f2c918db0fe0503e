//! Typed attribute values and comparison operators.

use std::cmp::Ordering;
use std::fmt;

use super::config::WORD_SIZE;
use super::{AttrType, ByteCursor, Error, Result};

/// A single non-null attribute value.
///
/// Wire format (shared by tuples, on-page records, and index keys):
/// - `Int` → 4-byte little-endian `i32`
/// - `Real` → 4-byte little-endian IEEE-754 `f32`
/// - `VarChar` → 4-byte length prefix ++ raw bytes
///
/// Values order numerically for numbers (`f32::total_cmp` for reals) and
/// byte-lexicographically for strings. Values of different types order by
/// type, which only matters if a caller mixes types; the index rejects that.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i32),
    Real(f32),
    VarChar(Vec<u8>),
}

impl Value {
    pub fn varchar(s: impl AsRef<[u8]>) -> Self {
        Value::VarChar(s.as_ref().to_vec())
    }

    pub fn attr_type(&self) -> AttrType {
        match self {
            Value::Int(_) => AttrType::Int,
            Value::Real(_) => AttrType::Real,
            Value::VarChar(_) => AttrType::VarChar,
        }
    }

    /// Fail with `Error::TypeMismatch` unless this value has type `expected`.
    pub fn check_type(&self, expected: AttrType) -> Result<()> {
        let actual = self.attr_type();
        if actual != expected {
            return Err(Error::TypeMismatch { expected, actual });
        }
        Ok(())
    }

    /// Size of the encoded value in bytes.
    pub fn encoded_len(&self) -> usize {
        match self {
            Value::Int(_) | Value::Real(_) => WORD_SIZE,
            Value::VarChar(bytes) => WORD_SIZE + bytes.len(),
        }
    }

    pub fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            Value::Int(v) => out.extend_from_slice(&v.to_le_bytes()),
            Value::Real(v) => out.extend_from_slice(&v.to_le_bytes()),
            Value::VarChar(bytes) => {
                out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
                out.extend_from_slice(bytes);
            }
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut out);
        out
    }

    /// Read one value of type `ty` from `cursor`.
    pub fn decode(ty: AttrType, cursor: &mut ByteCursor<'_>) -> Result<Value> {
        Ok(match ty {
            AttrType::Int => Value::Int(cursor.read_i32()?),
            AttrType::Real => Value::Real(cursor.read_f32()?),
            AttrType::VarChar => Value::VarChar(cursor.read_varchar()?.to_vec()),
        })
    }

    /// Decode a value that must occupy all of `data`.
    pub fn from_bytes(ty: AttrType, data: &[u8]) -> Result<Value> {
        let mut cursor = ByteCursor::new(data);
        let value = Self::decode(ty, &mut cursor)?;
        if cursor.remaining() != 0 {
            return Err(Error::MalformedTuple(format!(
                "{} trailing bytes after {} value",
                cursor.remaining(),
                ty
            )));
        }
        Ok(value)
    }

    /// Byte length of the encoded value of type `ty` at the cursor, without
    /// consuming it.
    pub fn peek_len(ty: AttrType, cursor: &ByteCursor<'_>) -> Result<usize> {
        match ty {
            AttrType::Int | AttrType::Real => Ok(WORD_SIZE),
            AttrType::VarChar => {
                let len = cursor.clone().read_u32()? as usize;
                Ok(WORD_SIZE + len)
            }
        }
    }

    /// Evaluate `self <op> rhs`. `CompOp::NoOp` is always true.
    pub fn satisfies(&self, op: CompOp, rhs: &Value) -> bool {
        let ord = self.cmp(rhs);
        match op {
            CompOp::Eq => ord == Ordering::Equal,
            CompOp::Lt => ord == Ordering::Less,
            CompOp::Le => ord != Ordering::Greater,
            CompOp::Gt => ord == Ordering::Greater,
            CompOp::Ge => ord != Ordering::Less,
            CompOp::Ne => ord != Ordering::Equal,
            CompOp::NoOp => true,
        }
    }

    fn type_rank(&self) -> u8 {
        self.attr_type() as u8
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Real(a), Value::Real(b)) => a.total_cmp(b),
            (Value::VarChar(a), Value::VarChar(b)) => a.cmp(b),
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Real(v) => write!(f, "{}", v),
            Value::VarChar(bytes) => write!(f, "{}", String::from_utf8_lossy(bytes)),
        }
    }
}

/// Comparison operator for scan conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompOp {
    /// `=`
    Eq,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `!=`
    Ne,
    /// No condition: every record matches.
    NoOp,
}
