//! Block - a vector plus per-position value counts and nulls
//!
//! Each position of a block holds zero, one, or many values of the block's
//! element type. A position with zero values is null. The values of all
//! positions are laid out back to back in one vector, and
//! `first_value_indexes[p]..first_value_indexes[p + 1]` is the range owned
//! by position `p`.
//!
//! A block wrapping a vector directly has neither indexes nor a null mask:
//! every position holds exactly the one value at the same index.

use std::sync::Arc;

use bytes::Bytes;
use strata_common::{ElementType, Error, Result, Value};

use super::builder::BlockBuilder;
use super::doc::DocBlock;
use super::element::Element;
use super::mask::NullMask;
use super::vector::{TypedVector, Vector};

/// A block of one primitive element type
#[derive(Debug, Clone)]
pub struct TypedBlock<T: Element> {
    values: TypedVector<T>,
    /// `position_count + 1` offsets into `values`; `None` when each
    /// position owns exactly the value at its own index
    first_value_indexes: Option<Arc<[usize]>>,
    nulls: Option<NullMask>,
    position_count: usize,
}

pub type IntBlock = TypedBlock<i32>;
pub type LongBlock = TypedBlock<i64>;
pub type DoubleBlock = TypedBlock<f64>;
pub type FloatBlock = TypedBlock<f32>;
pub type BooleanBlock = TypedBlock<bool>;
pub type BytesBlock = TypedBlock<Bytes>;

impl<T: Element> TypedBlock<T> {
    /// Wrap a vector: one value per position, no nulls
    pub fn from_vector(values: TypedVector<T>) -> Self {
        let position_count = values.position_count();
        TypedBlock {
            values,
            first_value_indexes: None,
            nulls: None,
            position_count,
        }
    }

    /// Assemble from parts built by [`BlockBuilder`].
    ///
    /// `first_value_indexes` starts at 0, is non-decreasing, and ends at the
    /// value count. A position is null exactly when its range is empty.
    pub(crate) fn from_parts(
        values: TypedVector<T>,
        first_value_indexes: Vec<usize>,
        nulls: Option<NullMask>,
    ) -> Self {
        let position_count = first_value_indexes.len().saturating_sub(1);
        debug_assert_eq!(first_value_indexes.last().copied().unwrap_or(0), values.position_count());
        debug_assert!(first_value_indexes.windows(2).enumerate().all(|(p, w)| {
            let is_null = nulls.as_ref().is_some_and(|m| m.is_null(p));
            (w[1] == w[0]) == is_null
        }));
        TypedBlock {
            values,
            first_value_indexes: Some(first_value_indexes.into()),
            nulls,
            position_count,
        }
    }

    pub fn builder(estimated_positions: usize) -> BlockBuilder<T> {
        BlockBuilder::with_capacity(estimated_positions)
    }

    pub fn element_type(&self) -> ElementType {
        T::ELEMENT_TYPE
    }

    pub fn position_count(&self) -> usize {
        self.position_count
    }

    /// Total number of values across all positions
    pub fn total_value_count(&self) -> usize {
        self.values.position_count()
    }

    /// The backing values, laid out position by position
    pub fn values(&self) -> &TypedVector<T> {
        &self.values
    }

    fn check_position(&self, position: usize) {
        assert!(
            position < self.position_count,
            "position {} out of range for {} positions",
            position,
            self.position_count
        );
    }

    /// Index of the first value of `position` in [`values`](Self::values)
    pub fn first_value_index(&self, position: usize) -> usize {
        self.check_position(position);
        match &self.first_value_indexes {
            Some(indexes) => indexes[position],
            None => position,
        }
    }

    /// Number of values at `position`; 0 when null
    pub fn value_count(&self, position: usize) -> usize {
        self.check_position(position);
        match &self.first_value_indexes {
            Some(indexes) => indexes[position + 1] - indexes[position],
            None => 1,
        }
    }

    pub fn is_null(&self, position: usize) -> bool {
        self.check_position(position);
        self.nulls.as_ref().is_some_and(|m| m.is_null(position))
    }

    pub fn may_have_nulls(&self) -> bool {
        self.nulls.is_some()
    }

    pub fn null_count(&self) -> usize {
        self.nulls.as_ref().map_or(0, |m| m.null_count())
    }

    /// True when some position holds more than one value
    pub fn may_have_multivalued_fields(&self) -> bool {
        self.total_value_count() > self.position_count - self.null_count()
    }

    /// The backing vector when every position holds exactly one value
    pub fn as_vector(&self) -> Option<&TypedVector<T>> {
        if self.first_value_indexes.is_none() && self.nulls.is_none() {
            Some(&self.values)
        } else {
            None
        }
    }

    /// True when the block is a constant vector in disguise
    pub fn is_constant(&self) -> bool {
        self.as_vector().is_some_and(|v| v.is_constant())
    }

    /// Value at `value_index` in the backing vector (not a position)
    pub fn get(&self, value_index: usize) -> &T {
        self.values.get(value_index)
    }

    /// The values of one position, in stored order
    pub fn position_values(&self, position: usize) -> impl Iterator<Item = &T> + '_ {
        let start = self.first_value_index(position);
        let end = start + self.value_count(position);
        (start..end).map(move |i| self.values.get(i))
    }

    /// Position as a dynamic value: `Null`, a scalar, or `Multi`
    pub fn get_value(&self, position: usize) -> Value {
        match self.value_count(position) {
            0 => Value::Null,
            1 => self.values.get(self.first_value_index(position)).to_value(),
            _ => Value::Multi(self.position_values(position).map(T::to_value).collect()),
        }
    }

    /// Keep `positions`, in that order. Positions may repeat.
    pub fn filter(&self, positions: &[usize]) -> Self {
        if let Some(vector) = self.as_vector() {
            return vector.filter(positions).into_block();
        }
        let mut builder = BlockBuilder::with_capacity(positions.len());
        for &position in positions {
            match self.value_count(position) {
                0 => {
                    builder.append_null();
                }
                _ => {
                    builder.begin_positions_entry();
                    for value in self.position_values(position) {
                        builder.append_value(value.clone());
                    }
                    builder.end_positions_entry();
                }
            }
        }
        builder.build()
    }

    /// Apply `f` to every value, keeping positions, nulls and constant-ness
    pub fn map_values<U: Element>(&self, f: impl Fn(&T) -> U) -> TypedBlock<U> {
        TypedBlock {
            values: self.values.map(f),
            first_value_indexes: self.first_value_indexes.clone(),
            nulls: self.nulls.clone(),
            position_count: self.position_count,
        }
    }
}

impl TypedBlock<i32> {
    pub fn get_int(&self, value_index: usize) -> i32 {
        *self.get(value_index)
    }
}

impl TypedBlock<i64> {
    pub fn get_long(&self, value_index: usize) -> i64 {
        *self.get(value_index)
    }
}

impl TypedBlock<f64> {
    pub fn get_double(&self, value_index: usize) -> f64 {
        *self.get(value_index)
    }
}

impl TypedBlock<f32> {
    pub fn get_float(&self, value_index: usize) -> f32 {
        *self.get(value_index)
    }
}

impl TypedBlock<bool> {
    pub fn get_boolean(&self, value_index: usize) -> bool {
        *self.get(value_index)
    }
}

impl TypedBlock<Bytes> {
    pub fn get_bytes(&self, value_index: usize) -> &Bytes {
        self.get(value_index)
    }
}

/// Blocks are equal when every position reads the same, whatever the layout
impl<T: Element> PartialEq for TypedBlock<T> {
    fn eq(&self, other: &Self) -> bool {
        self.position_count == other.position_count
            && (0..self.position_count).all(|p| self.get_value(p) == other.get_value(p))
    }
}

/// A block where every position is null
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantNullBlock {
    position_count: usize,
}

impl ConstantNullBlock {
    pub fn new(position_count: usize) -> Self {
        ConstantNullBlock { position_count }
    }

    pub fn position_count(&self) -> usize {
        self.position_count
    }
}

/// Several blocks over the same positions, read as one tuple per position
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeBlock {
    blocks: Vec<Block>,
    position_count: usize,
}

impl CompositeBlock {
    pub fn new(blocks: Vec<Block>) -> Result<Self> {
        let position_count = blocks
            .first()
            .map(Block::position_count)
            .ok_or_else(|| Error::Internal("composite block needs at least one block".into()))?;
        for block in &blocks {
            if block.position_count() != position_count {
                return Err(Error::PositionCountMismatch {
                    expected: position_count,
                    actual: block.position_count(),
                });
            }
        }
        Ok(CompositeBlock {
            blocks,
            position_count,
        })
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn position_count(&self) -> usize {
        self.position_count
    }

    pub fn filter(&self, positions: &[usize]) -> CompositeBlock {
        CompositeBlock {
            blocks: self.blocks.iter().map(|b| b.filter(positions)).collect(),
            position_count: positions.len(),
        }
    }
}

/// A block of any element type
#[derive(Debug, Clone)]
pub enum Block {
    Int(IntBlock),
    Long(LongBlock),
    Double(DoubleBlock),
    Float(FloatBlock),
    Boolean(BooleanBlock),
    Bytes(BytesBlock),
    Null(ConstantNullBlock),
    Doc(DocBlock),
    Composite(CompositeBlock),
}

macro_rules! each_typed_block {
    ($self:expr, $b:ident => $body:expr, $null:ident => $on_null:expr, $doc:ident => $on_doc:expr, $composite:ident => $on_composite:expr) => {
        match $self {
            Block::Int($b) => $body,
            Block::Long($b) => $body,
            Block::Double($b) => $body,
            Block::Float($b) => $body,
            Block::Boolean($b) => $body,
            Block::Bytes($b) => $body,
            Block::Null($null) => $on_null,
            Block::Doc($doc) => $on_doc,
            Block::Composite($composite) => $on_composite,
        }
    };
}

impl Block {
    /// A block answering `value` at each of `position_count` positions.
    ///
    /// Scalars become constant vector blocks and `Value::Null` becomes a
    /// `ConstantNullBlock`. A multi-valued literal is materialized.
    pub fn constant(value: &Value, position_count: usize) -> Result<Block> {
        Ok(match value {
            Value::Null => Block::constant_null(position_count),
            Value::Boolean(v) => Block::Boolean(TypedVector::constant(*v, position_count).into_block()),
            Value::Int(v) => Block::Int(TypedVector::constant(*v, position_count).into_block()),
            Value::Long(_) | Value::UnsignedLong(_) => {
                let v = i64::from_value(value).unwrap_or_default();
                Block::Long(TypedVector::constant(v, position_count).into_block())
            }
            Value::Float(v) => Block::Float(TypedVector::constant(*v, position_count).into_block()),
            Value::Double(v) => Block::Double(TypedVector::constant(*v, position_count).into_block()),
            Value::Bytes(v) => Block::Bytes(TypedVector::constant(v.clone(), position_count).into_block()),
            Value::Multi(_) => {
                let values = vec![value.clone(); position_count];
                Block::from_values(value.element_type(), &values)?
            }
        })
    }

    pub fn constant_null(position_count: usize) -> Block {
        Block::Null(ConstantNullBlock::new(position_count))
    }

    /// Build a block of `element_type` from row values. `Value::Null` is a
    /// null position and `Value::Multi` a multi-valued one.
    pub fn from_values(element_type: ElementType, values: &[Value]) -> Result<Block> {
        Ok(match element_type {
            ElementType::Int => Block::Int(build_typed(values)?),
            ElementType::Long => Block::Long(build_typed(values)?),
            ElementType::Double => Block::Double(build_typed(values)?),
            ElementType::Float => Block::Float(build_typed(values)?),
            ElementType::Boolean => Block::Boolean(build_typed(values)?),
            ElementType::Bytes => Block::Bytes(build_typed(values)?),
            ElementType::Null => {
                if let Some(v) = values.iter().find(|v| !v.is_null()) {
                    return Err(Error::ElementTypeMismatch {
                        expected: ElementType::Null,
                        actual: v.element_type(),
                    });
                }
                Block::constant_null(values.len())
            }
            other => {
                return Err(Error::Internal(format!(
                    "cannot build a [{}] block from values",
                    other
                )))
            }
        })
    }

    pub fn element_type(&self) -> ElementType {
        each_typed_block!(self,
            b => b.element_type(),
            _n => ElementType::Null,
            _d => ElementType::Doc,
            _c => ElementType::Composite)
    }

    pub fn position_count(&self) -> usize {
        each_typed_block!(self,
            b => b.position_count(),
            n => n.position_count(),
            d => d.position_count(),
            c => c.position_count())
    }

    pub fn total_value_count(&self) -> usize {
        each_typed_block!(self,
            b => b.total_value_count(),
            _n => 0,
            d => d.position_count(),
            c => c.position_count())
    }

    pub fn first_value_index(&self, position: usize) -> usize {
        each_typed_block!(self,
            b => b.first_value_index(position),
            _n => 0,
            _d => position,
            _c => position)
    }

    pub fn value_count(&self, position: usize) -> usize {
        each_typed_block!(self,
            b => b.value_count(position),
            _n => 0,
            _d => 1,
            _c => 1)
    }

    pub fn is_null(&self, position: usize) -> bool {
        each_typed_block!(self,
            b => b.is_null(position),
            _n => true,
            _d => false,
            _c => false)
    }

    pub fn may_have_nulls(&self) -> bool {
        each_typed_block!(self,
            b => b.may_have_nulls(),
            n => n.position_count() > 0,
            _d => false,
            _c => false)
    }

    pub fn null_count(&self) -> usize {
        each_typed_block!(self,
            b => b.null_count(),
            n => n.position_count(),
            _d => 0,
            _c => 0)
    }

    pub fn may_have_multivalued_fields(&self) -> bool {
        each_typed_block!(self,
            b => b.may_have_multivalued_fields(),
            _n => false,
            _d => false,
            _c => false)
    }

    pub fn is_constant(&self) -> bool {
        each_typed_block!(self,
            b => b.is_constant(),
            _n => true,
            d => d.as_vector().is_constant(),
            _c => false)
    }

    /// The backing vector when every position holds exactly one value
    pub fn as_vector(&self) -> Option<Vector> {
        match self {
            Block::Int(b) => b.as_vector().cloned().map(Vector::Int),
            Block::Long(b) => b.as_vector().cloned().map(Vector::Long),
            Block::Double(b) => b.as_vector().cloned().map(Vector::Double),
            Block::Float(b) => b.as_vector().cloned().map(Vector::Float),
            Block::Boolean(b) => b.as_vector().cloned().map(Vector::Boolean),
            Block::Bytes(b) => b.as_vector().cloned().map(Vector::Bytes),
            Block::Doc(d) => Some(Vector::Doc(d.as_vector().clone())),
            Block::Null(_) | Block::Composite(_) => None,
        }
    }

    pub fn get_value(&self, position: usize) -> Value {
        each_typed_block!(self,
            b => b.get_value(position),
            _n => Value::Null,
            d => d.as_vector().get_value(position),
            c => Value::Multi(c.blocks.iter().map(|b| b.get_value(position)).collect()))
    }

    /// Keep `positions`, in that order. Positions may repeat.
    pub fn filter(&self, positions: &[usize]) -> Block {
        match self {
            Block::Int(b) => Block::Int(b.filter(positions)),
            Block::Long(b) => Block::Long(b.filter(positions)),
            Block::Double(b) => Block::Double(b.filter(positions)),
            Block::Float(b) => Block::Float(b.filter(positions)),
            Block::Boolean(b) => Block::Boolean(b.filter(positions)),
            Block::Bytes(b) => Block::Bytes(b.filter(positions)),
            Block::Null(_) => Block::constant_null(positions.len()),
            Block::Doc(d) => Block::Doc(d.filter(positions)),
            Block::Composite(c) => Block::Composite(c.filter(positions)),
        }
    }

    /// Narrow to the typed block of `T`
    pub fn as_typed<T: Element>(&self) -> Result<&TypedBlock<T>> {
        T::from_block(self).ok_or(Error::ElementTypeMismatch {
            expected: T::ELEMENT_TYPE,
            actual: self.element_type(),
        })
    }

    pub fn as_int(&self) -> Result<&IntBlock> {
        self.as_typed()
    }

    pub fn as_long(&self) -> Result<&LongBlock> {
        self.as_typed()
    }

    pub fn as_double(&self) -> Result<&DoubleBlock> {
        self.as_typed()
    }

    pub fn as_float(&self) -> Result<&FloatBlock> {
        self.as_typed()
    }

    pub fn as_boolean(&self) -> Result<&BooleanBlock> {
        self.as_typed()
    }

    pub fn as_bytes(&self) -> Result<&BytesBlock> {
        self.as_typed()
    }

    pub fn as_doc(&self) -> Result<&DocBlock> {
        match self {
            Block::Doc(d) => Ok(d),
            other => Err(Error::ElementTypeMismatch {
                expected: ElementType::Doc,
                actual: other.element_type(),
            }),
        }
    }

    pub fn as_composite(&self) -> Result<&CompositeBlock> {
        match self {
            Block::Composite(c) => Ok(c),
            other => Err(Error::ElementTypeMismatch {
                expected: ElementType::Composite,
                actual: other.element_type(),
            }),
        }
    }
}

/// Blocks are equal when their element types match and every position reads
/// the same
impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.element_type() == other.element_type()
            && self.position_count() == other.position_count()
            && (0..self.position_count()).all(|p| self.get_value(p) == other.get_value(p))
    }
}

impl<T: Element> From<TypedBlock<T>> for Block {
    fn from(block: TypedBlock<T>) -> Self {
        T::into_block(block)
    }
}

impl From<ConstantNullBlock> for Block {
    fn from(block: ConstantNullBlock) -> Self {
        Block::Null(block)
    }
}

fn build_typed<T: Element>(values: &[Value]) -> Result<TypedBlock<T>> {
    let mismatch = |value: &Value| Error::ElementTypeMismatch {
        expected: T::ELEMENT_TYPE,
        actual: value.element_type(),
    };
    let mut builder = BlockBuilder::<T>::with_capacity(values.len());
    for value in values {
        match value {
            Value::Null => {
                builder.append_null();
            }
            Value::Multi(items) => {
                builder.begin_positions_entry();
                for item in items {
                    builder.append_value(T::from_value(item).ok_or_else(|| mismatch(item))?);
                }
                builder.end_positions_entry();
            }
            scalar => {
                builder.append_value(T::from_value(scalar).ok_or_else(|| mismatch(scalar))?);
            }
        }
    }
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::vector::{DoubleVector, LongVector};

    fn multi_valued() -> LongBlock {
        let mut builder = LongBlock::builder(4);
        builder.append_value(1);
        builder.append_null();
        builder.begin_positions_entry();
        builder.append_value(2).append_value(3).append_value(4);
        builder.end_positions_entry();
        builder.append_value(5);
        builder.build()
    }

    #[test]
    fn test_vector_backed_block() {
        let block = LongVector::from_values(vec![1, 2, 3]).into_block();
        assert_eq!(block.position_count(), 3);
        assert_eq!(block.value_count(2), 1);
        assert_eq!(block.first_value_index(2), 2);
        assert!(!block.may_have_nulls());
        assert!(!block.may_have_multivalued_fields());
        assert!(block.as_vector().is_some());
    }

    #[test]
    fn test_multi_valued_positions() {
        let block = multi_valued();
        assert_eq!(block.position_count(), 4);
        assert_eq!(block.total_value_count(), 5);
        assert_eq!(block.value_count(0), 1);
        assert_eq!(block.value_count(1), 0);
        assert!(block.is_null(1));
        assert_eq!(block.value_count(2), 3);
        assert_eq!(block.first_value_index(3), 4);
        assert!(block.may_have_multivalued_fields());
        assert!(block.as_vector().is_none());

        let counted: usize = (0..block.position_count()).map(|p| block.value_count(p)).sum();
        assert_eq!(counted, block.total_value_count());
        assert_eq!(
            block.get_value(2),
            Value::Multi(vec![Value::Long(2), Value::Long(3), Value::Long(4)])
        );
    }

    #[test]
    fn test_filter_multi_valued() {
        let filtered = multi_valued().filter(&[2, 1, 0]);
        assert_eq!(filtered.position_count(), 3);
        assert_eq!(filtered.value_count(0), 3);
        assert!(filtered.is_null(1));
        assert_eq!(filtered.get_value(2), Value::Long(1));
    }

    #[test]
    fn test_constant_block() {
        let block = Block::constant(&Value::Double(1.5), 10).unwrap();
        assert!(block.is_constant());
        assert_eq!(block.element_type(), ElementType::Double);
        assert_eq!(block.filter(&[3, 4]).position_count(), 2);

        let nulls = Block::constant(&Value::Null, 3).unwrap();
        assert_eq!(nulls.element_type(), ElementType::Null);
        assert!(nulls.is_null(2));
        assert_eq!(nulls.total_value_count(), 0);
    }

    #[test]
    fn test_from_values_round_trip() {
        let rows = vec![
            Value::Int(1),
            Value::Null,
            Value::Multi(vec![Value::Int(2), Value::Int(3)]),
        ];
        let block = Block::from_values(ElementType::Int, &rows).unwrap();
        let read: Vec<Value> = (0..3).map(|p| block.get_value(p)).collect();
        assert_eq!(read, rows);
    }

    #[test]
    fn test_from_values_rejects_wrong_type() {
        let err = Block::from_values(ElementType::Long, &[Value::Double(1.0)]).unwrap_err();
        assert!(matches!(
            err,
            Error::ElementTypeMismatch {
                expected: ElementType::Long,
                actual: ElementType::Double
            }
        ));
    }

    #[test]
    fn test_narrowing_mismatch() {
        let block: Block = DoubleVector::constant(1.0, 2).into_block().into();
        assert!(block.as_double().is_ok());
        assert!(block.as_long().is_err());
    }

    #[test]
    fn test_map_values_keeps_layout() {
        let doubled = multi_valued().map_values(|v| (*v as f64) * 2.0);
        assert_eq!(doubled.position_count(), 4);
        assert!(doubled.is_null(1));
        assert_eq!(doubled.get_value(3), Value::Double(10.0));
    }

    #[test]
    fn test_composite_block() {
        let a: Block = LongVector::from_values(vec![1, 2]).into_block().into();
        let b = Block::constant(&Value::from("x"), 2).unwrap();
        let composite = CompositeBlock::new(vec![a, b]).unwrap();
        assert_eq!(composite.block_count(), 2);
        let block = Block::Composite(composite);
        assert_eq!(
            block.get_value(1),
            Value::Multi(vec![Value::Long(2), Value::from("x")])
        );

        let short: Block = LongVector::from_values(vec![1]).into_block().into();
        let long: Block = LongVector::from_values(vec![1, 2]).into_block().into();
        assert!(CompositeBlock::new(vec![short, long]).is_err());
    }
}
