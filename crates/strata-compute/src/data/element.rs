//! Binding between Rust primitives and element types.
//!
//! `TypedVector<T>` and `TypedBlock<T>` are written once over `T: Element`
//! and monomorphized per primitive; the dynamic `Vector` and `Block` enums
//! wrap them with a runtime `ElementType` tag.

use std::fmt;

use bytes::Bytes;
use strata_common::{ElementType, Value};

use super::block::{Block, TypedBlock};
use super::unsigned_long;
use super::vector::{TypedVector, Vector};

/// A primitive value that a vector can hold.
pub trait Element: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// The element type of every vector of this primitive.
    const ELEMENT_TYPE: ElementType;

    /// Convert to the dynamic row representation.
    fn to_value(&self) -> Value;

    /// Extract from the dynamic row representation.
    ///
    /// Returns `None` when the value belongs to another element type.
    fn from_value(value: &Value) -> Option<Self>;

    fn into_vector(vector: TypedVector<Self>) -> Vector;

    fn into_block(block: TypedBlock<Self>) -> Block;

    fn from_vector(vector: &Vector) -> Option<&TypedVector<Self>>;

    fn from_block(block: &Block) -> Option<&TypedBlock<Self>>;
}

macro_rules! impl_element {
    ($ty:ty, $variant:ident, $to_value:expr, $from_value:expr) => {
        impl Element for $ty {
            const ELEMENT_TYPE: ElementType = ElementType::$variant;

            fn to_value(&self) -> Value {
                ($to_value)(self)
            }

            fn from_value(value: &Value) -> Option<Self> {
                ($from_value)(value)
            }

            fn into_vector(vector: TypedVector<Self>) -> Vector {
                Vector::$variant(vector)
            }

            fn into_block(block: TypedBlock<Self>) -> Block {
                Block::$variant(block)
            }

            fn from_vector(vector: &Vector) -> Option<&TypedVector<Self>> {
                match vector {
                    Vector::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn from_block(block: &Block) -> Option<&TypedBlock<Self>> {
                match block {
                    Block::$variant(b) => Some(b),
                    _ => None,
                }
            }
        }
    };
}

impl_element!(
    i32,
    Int,
    |v: &i32| Value::Int(*v),
    |v: &Value| match v {
        Value::Int(i) => Some(*i),
        _ => None,
    }
);

impl_element!(
    i64,
    Long,
    |v: &i64| Value::Long(*v),
    |v: &Value| match v {
        Value::Long(i) => Some(*i),
        Value::UnsignedLong(u) => Some(unsigned_long::encode(*u)),
        _ => None,
    }
);

impl_element!(
    f64,
    Double,
    |v: &f64| Value::Double(*v),
    |v: &Value| match v {
        Value::Double(f) => Some(*f),
        _ => None,
    }
);

impl_element!(
    f32,
    Float,
    |v: &f32| Value::Float(*v),
    |v: &Value| match v {
        Value::Float(f) => Some(*f),
        _ => None,
    }
);

impl_element!(
    bool,
    Boolean,
    |v: &bool| Value::Boolean(*v),
    |v: &Value| match v {
        Value::Boolean(b) => Some(*b),
        _ => None,
    }
);

impl_element!(
    Bytes,
    Bytes,
    |v: &Bytes| Value::Bytes(v.clone()),
    |v: &Value| match v {
        Value::Bytes(b) => Some(b.clone()),
        _ => None,
    }
);
