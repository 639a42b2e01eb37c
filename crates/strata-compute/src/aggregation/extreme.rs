//! Min and max.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use strata_common::{DataType, ElementType, Result, Value};

use crate::data::{Block, Element, TypedBlock};

use super::sum::mismatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    Min,
    Max,
}

impl Extreme {
    /// An unordered value (NaN) wins over everything, from either side.
    fn pick<T: PartialOrd + Copy>(self, current: Option<T>, candidate: T) -> Option<T> {
        match current {
            None => Some(candidate),
            Some(current) if is_unordered(&current) => Some(current),
            Some(_) if is_unordered(&candidate) => Some(candidate),
            Some(current) => {
                let replace = match self {
                    Extreme::Min => candidate < current,
                    Extreme::Max => candidate > current,
                };
                Some(if replace { candidate } else { current })
            }
        }
    }
}

fn is_unordered<T: PartialOrd>(value: &T) -> bool {
    value.partial_cmp(value).is_none()
}

/// Smallest or largest value seen so far. `unsigned_long` and `datetime`
/// values ride in the `Long` variant; the unsigned encoding keeps their
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtremeState {
    Int(Option<i32>),
    Long(Option<i64>),
    Double(Option<f64>),
}

fn scan<T: Element + PartialOrd + Copy>(
    extreme: Extreme,
    current: Option<T>,
    block: &TypedBlock<T>,
    values: Range<usize>,
) -> Option<T> {
    if values.is_empty() {
        return current;
    }
    if let Some(constant) = block.values().constant_value() {
        return extreme.pick(current, *constant);
    }
    values.fold(current, |acc, i| extreme.pick(acc, *block.get(i)))
}

impl ExtremeState {
    pub fn for_input(input: DataType) -> Option<ExtremeState> {
        match input {
            DataType::Integer => Some(ExtremeState::Int(None)),
            DataType::Long | DataType::UnsignedLong | DataType::Datetime => Some(ExtremeState::Long(None)),
            DataType::Double => Some(ExtremeState::Double(None)),
            _ => None,
        }
    }

    pub fn add_range(&mut self, extreme: Extreme, block: &Block, range: Range<usize>) -> Result<()> {
        if matches!(block, Block::Null(_)) {
            return Ok(());
        }
        match self {
            ExtremeState::Int(current) => *current = scan(extreme, *current, block.as_int()?, range),
            ExtremeState::Long(current) => *current = scan(extreme, *current, block.as_long()?, range),
            ExtremeState::Double(current) => match block {
                Block::Double(b) => *current = scan(extreme, *current, b, range),
                other => return Err(mismatch(ElementType::Double, other)),
            },
        }
        Ok(())
    }

    pub fn merge(&mut self, extreme: Extreme, other: &ExtremeState) -> bool {
        match (self, other) {
            (ExtremeState::Int(current), ExtremeState::Int(Some(v))) => *current = extreme.pick(*current, *v),
            (ExtremeState::Long(current), ExtremeState::Long(Some(v))) => *current = extreme.pick(*current, *v),
            (ExtremeState::Double(current), ExtremeState::Double(Some(v))) => {
                *current = extreme.pick(*current, *v)
            }
            (ExtremeState::Int(_), ExtremeState::Int(None))
            | (ExtremeState::Long(_), ExtremeState::Long(None))
            | (ExtremeState::Double(_), ExtremeState::Double(None)) => {}
            _ => return false,
        }
        true
    }

    pub fn finish(&self) -> Value {
        match self {
            ExtremeState::Int(v) => v.map_or(Value::Null, Value::Int),
            ExtremeState::Long(v) => v.map_or(Value::Null, Value::Long),
            ExtremeState::Double(v) => v.map_or(Value::Null, Value::Double),
        }
    }

    pub fn result_element_type(&self) -> ElementType {
        match self {
            ExtremeState::Int(_) => ElementType::Int,
            ExtremeState::Long(_) => ElementType::Long,
            ExtremeState::Double(_) => ElementType::Double,
        }
    }

    pub fn input_name(&self) -> &'static str {
        match self {
            ExtremeState::Int(_) => "ints",
            ExtremeState::Long(_) => "longs",
            ExtremeState::Double(_) => "doubles",
        }
    }
}
