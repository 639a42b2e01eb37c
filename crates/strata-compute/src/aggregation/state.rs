//! Aggregation state and its serialized intermediate form.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use strata_common::{DataType, ElementType, Error, Result, Value};
use tracing::warn;

use crate::data::Block;
use crate::warnings::Warnings;

use super::avg::AvgState;
use super::count::CountState;
use super::extreme::{Extreme, ExtremeState};
use super::sum::SumState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationKind {
    Count,
    Sum,
    Min,
    Max,
    Avg,
}

impl AggregationKind {
    pub fn name(&self) -> &'static str {
        match self {
            AggregationKind::Count => "count",
            AggregationKind::Sum => "sum",
            AggregationKind::Min => "min",
            AggregationKind::Max => "max",
            AggregationKind::Avg => "avg",
        }
    }

    pub fn from_name(name: &str) -> Option<AggregationKind> {
        match name.to_ascii_lowercase().as_str() {
            "count" => Some(AggregationKind::Count),
            "sum" => Some(AggregationKind::Sum),
            "min" => Some(AggregationKind::Min),
            "max" => Some(AggregationKind::Max),
            "avg" => Some(AggregationKind::Avg),
            _ => None,
        }
    }
}

impl fmt::Display for AggregationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Partial result of one aggregate.
///
/// This is what crosses unit boundaries: it is cloned, merged and
/// serialized, never shared mutably.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregatorState {
    Count(CountState),
    Sum(SumState),
    Min(ExtremeState),
    Max(ExtremeState),
    Avg(AvgState),
}

impl AggregatorState {
    /// Empty state for `kind` over values of `input`.
    ///
    /// `count` accepts any input, or none at all.
    pub fn new(kind: AggregationKind, input: Option<DataType>) -> Result<Self> {
        let unsupported = |data_type: DataType| Error::UnsupportedAggregation {
            function: kind.name().to_string(),
            data_type,
        };
        if kind == AggregationKind::Count {
            return Ok(AggregatorState::Count(CountState::default()));
        }
        let input = input.ok_or_else(|| unsupported(DataType::Null))?;
        let state = match kind {
            AggregationKind::Count => None,
            AggregationKind::Sum => SumState::for_input(input).map(AggregatorState::Sum),
            AggregationKind::Min => ExtremeState::for_input(input).map(AggregatorState::Min),
            AggregationKind::Max => ExtremeState::for_input(input).map(AggregatorState::Max),
            AggregationKind::Avg => AvgState::for_input(input).map(AggregatorState::Avg),
        };
        state.ok_or_else(|| unsupported(input))
    }

    pub fn kind(&self) -> AggregationKind {
        match self {
            AggregatorState::Count(_) => AggregationKind::Count,
            AggregatorState::Sum(_) => AggregationKind::Sum,
            AggregatorState::Min(_) => AggregationKind::Min,
            AggregatorState::Max(_) => AggregationKind::Max,
            AggregatorState::Avg(_) => AggregationKind::Avg,
        }
    }

    /// `"count"`, `"sum of longs"`, `"max of doubles"`, ...
    pub fn describe(&self) -> String {
        match self {
            AggregatorState::Count(_) => "count".to_string(),
            AggregatorState::Sum(s) => format!("sum of {}", s.input_name()),
            AggregatorState::Min(s) => format!("min of {}", s.input_name()),
            AggregatorState::Max(s) => format!("max of {}", s.input_name()),
            AggregatorState::Avg(s) => format!("avg of {}", s.input_name()),
        }
    }

    /// Add the values with indexes in `values` (value indexes, not positions)
    pub fn add_values(&mut self, block: &Block, values: Range<usize>) -> Result<()> {
        match self {
            AggregatorState::Count(s) => {
                s.add_range(values);
                Ok(())
            }
            AggregatorState::Sum(s) => s.add_range(block, values),
            AggregatorState::Min(s) => s.add_range(Extreme::Min, block, values),
            AggregatorState::Max(s) => s.add_range(Extreme::Max, block, values),
            AggregatorState::Avg(s) => s.add_range(block, values),
        }
    }

    /// Add every value of `block`
    pub fn add_block(&mut self, block: &Block) -> Result<()> {
        self.add_values(block, 0..block.total_value_count())
    }

    /// Add the values of one position of `block`
    pub fn add_position(&mut self, block: &Block, position: usize) -> Result<()> {
        let first = block.first_value_index(position);
        self.add_values(block, first..first + block.value_count(position))
    }

    /// Fold `other` into this state
    pub fn merge(&mut self, other: &AggregatorState) -> Result<()> {
        let merged = match (&mut *self, other) {
            (AggregatorState::Count(a), AggregatorState::Count(b)) => {
                a.merge(b);
                true
            }
            (AggregatorState::Sum(a), AggregatorState::Sum(b)) => a.merge(b),
            (AggregatorState::Min(a), AggregatorState::Min(b)) => a.merge(Extreme::Min, b),
            (AggregatorState::Max(a), AggregatorState::Max(b)) => a.merge(Extreme::Max, b),
            (AggregatorState::Avg(a), AggregatorState::Avg(b)) => a.merge(b),
            _ => false,
        };
        if !merged {
            warn!(
                expected = %self.describe(),
                actual = %other.describe(),
                "refusing to merge incompatible aggregation state"
            );
            return Err(Error::IncompatibleState {
                expected: self.describe(),
                actual: other.describe(),
            });
        }
        Ok(())
    }

    /// The final value
    pub fn finish(&self, warnings: Option<&Warnings>) -> Value {
        match self {
            AggregatorState::Count(s) => s.finish(),
            AggregatorState::Sum(s) => s.finish(warnings),
            AggregatorState::Min(s) | AggregatorState::Max(s) => s.finish(),
            AggregatorState::Avg(s) => s.finish(),
        }
    }

    pub fn result_element_type(&self) -> ElementType {
        match self {
            AggregatorState::Count(_) => ElementType::Long,
            AggregatorState::Sum(s) => s.result_element_type(),
            AggregatorState::Min(s) | AggregatorState::Max(s) => s.result_element_type(),
            AggregatorState::Avg(_) => ElementType::Double,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
