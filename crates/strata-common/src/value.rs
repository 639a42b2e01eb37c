//! Runtime value representation for Strata
//!
//! The `Value` enum is the row-at-a-time view of a column position. It's used
//! for:
//! - Literals folded into constant blocks
//! - Reading a block position without knowing its element type
//! - Assertions in tests
//!
//! Hot loops never go through `Value`; they read typed vectors directly.

use crate::element_type::ElementType;
use bytes::Bytes;
use std::fmt;

/// Runtime value representation
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// NULL value, or an absent position
    #[default]
    Null,

    Boolean(bool),

    /// 32-bit signed integer
    Int(i32),
    /// 64-bit signed integer
    Long(i64),
    /// 64-bit unsigned integer, decoded
    UnsignedLong(u64),

    /// 32-bit floating point
    Float(f32),
    /// 64-bit floating point
    Double(f64),

    /// Byte string
    Bytes(Bytes),

    /// All values of a multi-valued position, in stored order
    Multi(Vec<Value>),
}

impl Value {
    /// Returns the element type of the vector that would carry this value
    pub fn element_type(&self) -> ElementType {
        match self {
            Value::Null => ElementType::Null,
            Value::Boolean(_) => ElementType::Boolean,
            Value::Int(_) => ElementType::Int,
            Value::Long(_) | Value::UnsignedLong(_) => ElementType::Long,
            Value::Float(_) => ElementType::Float,
            Value::Double(_) => ElementType::Double,
            Value::Bytes(_) => ElementType::Bytes,
            Value::Multi(values) => values
                .first()
                .map(|v| v.element_type())
                .unwrap_or(ElementType::Null),
        }
    }

    /// Returns true if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to convert this value to an i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i as i64),
            Value::Long(i) => Some(*i),
            Value::UnsignedLong(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    /// Try to convert this value to an f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Long(i) => Some(*i as f64),
            Value::UnsignedLong(u) => Some(*u as f64),
            Value::Float(f) => Some(*f as f64),
            Value::Double(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Long(i) => write!(f, "{}", i),
            Value::UnsignedLong(u) => write!(f, "{}", u),
            Value::Float(n) => write!(f, "{}", n),
            Value::Double(n) => write!(f, "{}", n),
            Value::Bytes(b) => match std::str::from_utf8(b) {
                Ok(s) => write!(f, "{}", s),
                Err(_) => write!(f, "<{} bytes>", b.len()),
            },
            Value::Multi(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Long(i)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::UnsignedLong(u)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Double(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Bytes(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}
