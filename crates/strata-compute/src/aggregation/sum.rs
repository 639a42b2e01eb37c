//! Exact integral sums and compensated floating point sums.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use strata_common::{DataType, ElementType, Error, Result, Value};

use crate::data::{unsigned_long, Block, Element, TypedBlock};
use crate::expression::EvaluationFailure;
use crate::warnings::Warnings;

/// Kahan summation: `delta` carries the low-order bits lost by the last add
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CompensatedSum {
    value: f64,
    delta: f64,
}

impl CompensatedSum {
    pub fn add(&mut self, value: f64) {
        let corrected = value - self.delta;
        let sum = self.value + corrected;
        self.delta = (sum - self.value) - corrected;
        self.value = sum;
    }

    pub fn merge(&mut self, other: &CompensatedSum) {
        self.add(other.value);
        self.add(-other.delta);
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Sum the integral values in `values`, widening to `i128`. Returns the
/// total and how many values went in.
pub(crate) fn integral_sum<T: Element + Copy + Into<i128>>(
    block: &TypedBlock<T>,
    values: Range<usize>,
) -> (i128, u64) {
    let count = values.len() as u64;
    if let Some(&constant) = block.values().constant_value() {
        let constant: i128 = constant.into();
        return (constant * count as i128, count);
    }
    (values.map(|i| Into::<i128>::into(*block.get(i))).sum(), count)
}

pub(crate) fn unsigned_sum(block: &TypedBlock<i64>, values: Range<usize>) -> (u128, u64) {
    let count = values.len() as u64;
    if let Some(constant) = block.values().constant_value() {
        return (unsigned_long::decode(*constant) as u128 * count as u128, count);
    }
    (
        values
            .map(|i| unsigned_long::decode(block.get_long(i)) as u128)
            .sum(),
        count,
    )
}

pub(crate) fn add_doubles(sum: &mut CompensatedSum, block: &TypedBlock<f64>, values: Range<usize>) -> u64 {
    let count = values.len() as u64;
    for i in values {
        sum.add(block.get_double(i));
    }
    count
}

pub(crate) fn mismatch(expected: ElementType, block: &Block) -> Error {
    Error::ElementTypeMismatch {
        expected,
        actual: block.element_type(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SumState {
    /// `integer` and `long` inputs
    Long { sum: i128, values: u64 },
    UnsignedLong { sum: u128, values: u64 },
    Double { sum: CompensatedSum, values: u64 },
}

impl SumState {
    pub fn for_input(input: DataType) -> Option<SumState> {
        match input {
            DataType::Integer | DataType::Long => Some(SumState::Long { sum: 0, values: 0 }),
            DataType::UnsignedLong => Some(SumState::UnsignedLong { sum: 0, values: 0 }),
            DataType::Double => Some(SumState::Double {
                sum: CompensatedSum::default(),
                values: 0,
            }),
            _ => None,
        }
    }

    pub fn add_range(&mut self, block: &Block, range: Range<usize>) -> Result<()> {
        if matches!(block, Block::Null(_)) {
            return Ok(());
        }
        match self {
            SumState::Long { sum, values } => {
                let (added, count) = match block {
                    Block::Int(b) => integral_sum(b, range),
                    Block::Long(b) => integral_sum(b, range),
                    other => return Err(mismatch(ElementType::Long, other)),
                };
                *sum += added;
                *values += count;
            }
            SumState::UnsignedLong { sum, values } => {
                let (added, count) = unsigned_sum(block.as_long()?, range);
                *sum += added;
                *values += count;
            }
            SumState::Double { sum, values } => {
                *values += add_doubles(sum, block.as_double()?, range);
            }
        }
        Ok(())
    }

    /// Merge a state built from the same input representation
    pub fn merge(&mut self, other: &SumState) -> bool {
        match (self, other) {
            (SumState::Long { sum, values }, SumState::Long { sum: s, values: v }) => {
                *sum += s;
                *values += v;
            }
            (SumState::UnsignedLong { sum, values }, SumState::UnsignedLong { sum: s, values: v }) => {
                *sum += s;
                *values += v;
            }
            (SumState::Double { sum, values }, SumState::Double { sum: s, values: v }) => {
                sum.merge(s);
                *values += v;
            }
            _ => return false,
        }
        true
    }

    /// Final total; a total the result type cannot hold is null plus an
    /// overflow warning
    pub fn finish(&self, warnings: Option<&Warnings>) -> Value {
        let overflow = |data_type: DataType| {
            if let Some(warnings) = warnings {
                warnings.register_failure(&EvaluationFailure::Overflow(data_type));
            }
            Value::Null
        };
        match self {
            SumState::Long { values: 0, .. }
            | SumState::UnsignedLong { values: 0, .. }
            | SumState::Double { values: 0, .. } => Value::Null,
            SumState::Long { sum, .. } => match i64::try_from(*sum) {
                Ok(total) => Value::Long(total),
                Err(_) => overflow(DataType::Long),
            },
            SumState::UnsignedLong { sum, .. } => match u64::try_from(*sum) {
                Ok(total) => Value::UnsignedLong(total),
                Err(_) => overflow(DataType::UnsignedLong),
            },
            SumState::Double { sum, .. } => Value::Double(sum.value()),
        }
    }

    pub fn result_element_type(&self) -> ElementType {
        match self {
            SumState::Long { .. } | SumState::UnsignedLong { .. } => ElementType::Long,
            SumState::Double { .. } => ElementType::Double,
        }
    }

    pub fn input_name(&self) -> &'static str {
        match self {
            SumState::Long { .. } => "longs",
            SumState::UnsignedLong { .. } => "unsigned longs",
            SumState::Double { .. } => "doubles",
        }
    }
}
