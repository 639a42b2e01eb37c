//! Vector - the core unit of columnar computation
//!
//! A Vector is an immutable, fixed-length, positionally indexed column of a
//! single element type. It never holds nulls or multiple values per position;
//! that envelope is added by `Block`.
//!
//! Vectors are either array-backed or constant. A constant vector stores one
//! value and answers every position with it, so filtering it only changes
//! its position count.

use std::sync::Arc;

use bytes::Bytes;
use strata_common::{ElementType, Error, Result, Value};

use super::block::{Block, TypedBlock};
use super::doc::DocVector;
use super::element::Element;

/// The type of vector storage
#[derive(Debug, Clone)]
enum VectorData<T> {
    /// One value per position
    Array(Arc<[T]>),
    /// One value repeated for all positions
    Constant(T),
}

/// A vector of one primitive element type
#[derive(Debug, Clone)]
pub struct TypedVector<T: Element> {
    data: VectorData<T>,
    position_count: usize,
}

pub type IntVector = TypedVector<i32>;
pub type LongVector = TypedVector<i64>;
pub type DoubleVector = TypedVector<f64>;
pub type FloatVector = TypedVector<f32>;
pub type BooleanVector = TypedVector<bool>;
pub type BytesVector = TypedVector<Bytes>;

impl<T: Element> TypedVector<T> {
    /// Create an array-backed vector, one position per value
    pub fn from_values(values: Vec<T>) -> Self {
        let position_count = values.len();
        TypedVector {
            data: VectorData::Array(values.into()),
            position_count,
        }
    }

    /// Create a vector that answers `value` at each of `position_count` positions
    pub fn constant(value: T, position_count: usize) -> Self {
        TypedVector {
            data: VectorData::Constant(value),
            position_count,
        }
    }

    pub fn empty() -> Self {
        Self::from_values(Vec::new())
    }

    pub fn element_type(&self) -> ElementType {
        T::ELEMENT_TYPE
    }

    pub fn position_count(&self) -> usize {
        self.position_count
    }

    pub fn is_constant(&self) -> bool {
        matches!(self.data, VectorData::Constant(_))
    }

    /// The repeated value of a constant vector
    pub fn constant_value(&self) -> Option<&T> {
        match &self.data {
            VectorData::Constant(value) => Some(value),
            VectorData::Array(_) => None,
        }
    }

    /// Value at `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position >= position_count()`.
    pub fn get(&self, position: usize) -> &T {
        assert!(
            position < self.position_count,
            "position {} out of range for {} positions",
            position,
            self.position_count
        );
        match &self.data {
            VectorData::Array(values) => &values[position],
            VectorData::Constant(value) => value,
        }
    }

    /// Checked variant of [`get`](Self::get)
    pub fn try_get(&self, position: usize) -> Result<&T> {
        if position >= self.position_count {
            return Err(Error::PositionOutOfRange {
                position,
                position_count: self.position_count,
            });
        }
        Ok(self.get(position))
    }

    pub fn get_value(&self, position: usize) -> Value {
        self.get(position).to_value()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.position_count).map(move |position| match &self.data {
            VectorData::Array(values) => &values[position],
            VectorData::Constant(value) => value,
        })
    }

    /// Keep the values at `positions`, in that order. Positions may repeat.
    ///
    /// Constant vectors stay constant; only the position count changes.
    pub fn filter(&self, positions: &[usize]) -> Self {
        match &self.data {
            VectorData::Constant(value) => {
                debug_assert!(positions.iter().all(|&p| p < self.position_count));
                Self::constant(value.clone(), positions.len())
            }
            VectorData::Array(values) => {
                Self::from_values(positions.iter().map(|&p| values[p].clone()).collect())
            }
        }
    }

    /// Apply `f` to every value. A constant vector maps to a constant vector.
    pub fn map<U: Element>(&self, f: impl Fn(&T) -> U) -> TypedVector<U> {
        match &self.data {
            VectorData::Constant(value) => TypedVector::constant(f(value), self.position_count),
            VectorData::Array(values) => TypedVector::from_values(values.iter().map(f).collect()),
        }
    }

    /// View this vector as a block with one value per position and no nulls
    pub fn as_block(&self) -> TypedBlock<T> {
        TypedBlock::from_vector(self.clone())
    }

    pub fn into_block(self) -> TypedBlock<T> {
        TypedBlock::from_vector(self)
    }

    pub fn to_values(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

impl TypedVector<i32> {
    pub fn get_int(&self, position: usize) -> i32 {
        *self.get(position)
    }
}

impl TypedVector<i64> {
    pub fn get_long(&self, position: usize) -> i64 {
        *self.get(position)
    }
}

impl TypedVector<f64> {
    pub fn get_double(&self, position: usize) -> f64 {
        *self.get(position)
    }
}

impl TypedVector<f32> {
    pub fn get_float(&self, position: usize) -> f32 {
        *self.get(position)
    }
}

impl TypedVector<bool> {
    pub fn get_boolean(&self, position: usize) -> bool {
        *self.get(position)
    }

    /// True when every position holds `true`
    pub fn all_true(&self) -> bool {
        self.iter().all(|b| *b)
    }
}

impl TypedVector<Bytes> {
    pub fn get_bytes(&self, position: usize) -> &Bytes {
        self.get(position)
    }
}

/// Vectors are equal when they hold the same values, whatever their storage
impl<T: Element> PartialEq for TypedVector<T> {
    fn eq(&self, other: &Self) -> bool {
        self.position_count == other.position_count && self.iter().eq(other.iter())
    }
}

impl<T: Element> FromIterator<T> for TypedVector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_values(iter.into_iter().collect())
    }
}

/// A vector of any element type
#[derive(Debug, Clone, PartialEq)]
pub enum Vector {
    Int(IntVector),
    Long(LongVector),
    Double(DoubleVector),
    Float(FloatVector),
    Boolean(BooleanVector),
    Bytes(BytesVector),
    Doc(DocVector),
}

macro_rules! each_vector {
    ($self:expr, $v:ident => $body:expr) => {
        match $self {
            Vector::Int($v) => $body,
            Vector::Long($v) => $body,
            Vector::Double($v) => $body,
            Vector::Float($v) => $body,
            Vector::Boolean($v) => $body,
            Vector::Bytes($v) => $body,
            Vector::Doc($v) => $body,
        }
    };
}

impl Vector {
    pub fn element_type(&self) -> ElementType {
        each_vector!(self, v => v.element_type())
    }

    pub fn position_count(&self) -> usize {
        each_vector!(self, v => v.position_count())
    }

    pub fn is_constant(&self) -> bool {
        each_vector!(self, v => v.is_constant())
    }

    pub fn filter(&self, positions: &[usize]) -> Vector {
        match self {
            Vector::Int(v) => Vector::Int(v.filter(positions)),
            Vector::Long(v) => Vector::Long(v.filter(positions)),
            Vector::Double(v) => Vector::Double(v.filter(positions)),
            Vector::Float(v) => Vector::Float(v.filter(positions)),
            Vector::Boolean(v) => Vector::Boolean(v.filter(positions)),
            Vector::Bytes(v) => Vector::Bytes(v.filter(positions)),
            Vector::Doc(v) => Vector::Doc(v.filter(positions)),
        }
    }

    /// Wrap into a block whose positions hold exactly one value each
    pub fn as_block(&self) -> Block {
        match self {
            Vector::Int(v) => Block::Int(v.as_block()),
            Vector::Long(v) => Block::Long(v.as_block()),
            Vector::Double(v) => Block::Double(v.as_block()),
            Vector::Float(v) => Block::Float(v.as_block()),
            Vector::Boolean(v) => Block::Boolean(v.as_block()),
            Vector::Bytes(v) => Block::Bytes(v.as_block()),
            Vector::Doc(v) => Block::Doc(v.as_block()),
        }
    }

    /// Value at `position` as a dynamic `Value`
    pub fn get_value(&self, position: usize) -> Value {
        each_vector!(self, v => v.get_value(position))
    }

    /// Narrow to the typed vector of `T`
    pub fn as_typed<T: Element>(&self) -> Result<&TypedVector<T>> {
        T::from_vector(self).ok_or(Error::ElementTypeMismatch {
            expected: T::ELEMENT_TYPE,
            actual: self.element_type(),
        })
    }

    pub fn as_int(&self) -> Result<&IntVector> {
        self.as_typed()
    }

    pub fn as_long(&self) -> Result<&LongVector> {
        self.as_typed()
    }

    pub fn as_double(&self) -> Result<&DoubleVector> {
        self.as_typed()
    }

    pub fn as_float(&self) -> Result<&FloatVector> {
        self.as_typed()
    }

    pub fn as_boolean(&self) -> Result<&BooleanVector> {
        self.as_typed()
    }

    pub fn as_bytes(&self) -> Result<&BytesVector> {
        self.as_typed()
    }

    pub fn as_doc(&self) -> Result<&DocVector> {
        match self {
            Vector::Doc(v) => Ok(v),
            other => Err(Error::ElementTypeMismatch {
                expected: ElementType::Doc,
                actual: other.element_type(),
            }),
        }
    }
}

impl<T: Element> From<TypedVector<T>> for Vector {
    fn from(vector: TypedVector<T>) -> Self {
        T::into_vector(vector)
    }
}

impl From<DocVector> for Vector {
    fn from(vector: DocVector) -> Self {
        Vector::Doc(vector)
    }
}
