//! Average, kept as sum and count until finalized.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use strata_common::{DataType, ElementType, Result, Value};

use crate::data::Block;

use super::sum::{add_doubles, integral_sum, mismatch, unsigned_sum, CompensatedSum};

/// Sum and value count; the average is taken at the end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvgState {
    Integral { sum: i128, count: u64 },
    UnsignedLong { sum: u128, count: u64 },
    Double { sum: CompensatedSum, count: u64 },
}

impl AvgState {
    pub fn for_input(input: DataType) -> Option<AvgState> {
        match input {
            DataType::Integer | DataType::Long => Some(AvgState::Integral { sum: 0, count: 0 }),
            DataType::UnsignedLong => Some(AvgState::UnsignedLong { sum: 0, count: 0 }),
            DataType::Double => Some(AvgState::Double {
                sum: CompensatedSum::default(),
                count: 0,
            }),
            _ => None,
        }
    }

    pub fn add_range(&mut self, block: &Block, range: Range<usize>) -> Result<()> {
        if matches!(block, Block::Null(_)) {
            return Ok(());
        }
        match self {
            AvgState::Integral { sum, count } => {
                let (added, n) = match block {
                    Block::Int(b) => integral_sum(b, range),
                    Block::Long(b) => integral_sum(b, range),
                    other => return Err(mismatch(ElementType::Long, other)),
                };
                *sum += added;
                *count += n;
            }
            AvgState::UnsignedLong { sum, count } => {
                let (added, n) = unsigned_sum(block.as_long()?, range);
                *sum += added;
                *count += n;
            }
            AvgState::Double { sum, count } => {
                *count += add_doubles(sum, block.as_double()?, range);
            }
        }
        Ok(())
    }

    pub fn merge(&mut self, other: &AvgState) -> bool {
        match (self, other) {
            (AvgState::Integral { sum, count }, AvgState::Integral { sum: s, count: c }) => {
                *sum += s;
                *count += c;
            }
            (AvgState::UnsignedLong { sum, count }, AvgState::UnsignedLong { sum: s, count: c }) => {
                *sum += s;
                *count += c;
            }
            (AvgState::Double { sum, count }, AvgState::Double { sum: s, count: c }) => {
                sum.merge(s);
                *count += c;
            }
            _ => return false,
        }
        true
    }

    pub fn finish(&self) -> Value {
        match self {
            AvgState::Integral { count: 0, .. }
            | AvgState::UnsignedLong { count: 0, .. }
            | AvgState::Double { count: 0, .. } => Value::Null,
            AvgState::Integral { sum, count } => Value::Double(*sum as f64 / *count as f64),
            AvgState::UnsignedLong { sum, count } => Value::Double(*sum as f64 / *count as f64),
            AvgState::Double { sum, count } => Value::Double(sum.value() / *count as f64),
        }
    }

    pub fn input_name(&self) -> &'static str {
        match self {
            AvgState::Integral { .. } => "longs",
            AvgState::UnsignedLong { .. } => "unsigned longs",
            AvgState::Double { .. } => "doubles",
        }
    }
}
