//! Aggregator functions and the factories that create them.

use std::fmt;

use strata_common::{DataType, Result};

use crate::data::Block;
use crate::warnings::Warnings;

use super::count::CountState;
use super::state::{AggregationKind, AggregatorState};

/// Accumulates one aggregate over a stream of blocks.
///
/// One instance lives on one evaluation unit; partial results travel
/// between units as [`AggregatorState`].
pub trait AggregatorFunction: Send + fmt::Debug {
    /// Consume every value of `block`. Empty blocks are fine.
    fn add_raw_input(&mut self, block: &Block) -> Result<()>;

    /// Merge a partial result from another unit
    fn add_intermediate_input(&mut self, state: &AggregatorState) -> Result<()>;

    fn evaluate_intermediate(&self) -> AggregatorState;

    /// A one-position block holding the result
    fn evaluate_final(&self) -> Result<Block>;

    fn describe(&self) -> String;
}

/// Creates independent aggregator functions of one kind and input type
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatorFunctionFactory {
    kind: AggregationKind,
    input_type: Option<DataType>,
    empty: AggregatorState,
}

impl AggregatorFunctionFactory {
    /// `count` of anything
    pub const COUNT: AggregatorFunctionFactory = AggregatorFunctionFactory {
        kind: AggregationKind::Count,
        input_type: None,
        empty: AggregatorState::Count(CountState { count: 0 }),
    };

    /// Fails when `kind` cannot aggregate `input_type`
    pub fn new(kind: AggregationKind, input_type: Option<DataType>) -> Result<Self> {
        Ok(AggregatorFunctionFactory {
            kind,
            input_type,
            empty: AggregatorState::new(kind, input_type)?,
        })
    }

    pub fn kind(&self) -> AggregationKind {
        self.kind
    }

    pub fn input_type(&self) -> Option<DataType> {
        self.input_type
    }

    pub fn describe(&self) -> String {
        self.empty.describe()
    }

    /// Fresh, empty state
    pub fn empty_state(&self) -> AggregatorState {
        self.empty.clone()
    }

    pub fn create(&self, warnings: Option<Warnings>) -> GlobalAggregatorFunction {
        GlobalAggregatorFunction {
            state: self.empty_state(),
            warnings,
        }
    }
}

/// Aggregates everything it sees into one state
#[derive(Debug, Clone)]
pub struct GlobalAggregatorFunction {
    state: AggregatorState,
    warnings: Option<Warnings>,
}

impl GlobalAggregatorFunction {
    pub fn state(&self) -> &AggregatorState {
        &self.state
    }
}

impl AggregatorFunction for GlobalAggregatorFunction {
    fn add_raw_input(&mut self, block: &Block) -> Result<()> {
        self.state.add_block(block)
    }

    fn add_intermediate_input(&mut self, state: &AggregatorState) -> Result<()> {
        self.state.merge(state)
    }

    fn evaluate_intermediate(&self) -> AggregatorState {
        self.state.clone()
    }

    fn evaluate_final(&self) -> Result<Block> {
        let value = self.state.finish(self.warnings.as_ref());
        Block::from_values(self.state.result_element_type(), &[value])
    }

    fn describe(&self) -> String {
        self.state.describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DoubleVector, LongVector};
    use strata_common::{ElementType, Value};

    #[test]
    fn test_count_factory() {
        assert_eq!(AggregatorFunctionFactory::COUNT.describe(), "count");
        let mut count = AggregatorFunctionFactory::COUNT.create(None);
        count
            .add_raw_input(&LongVector::from_values(vec![1, 2, 3]).into_block().into())
            .unwrap();
        let result = count.evaluate_final().unwrap();
        assert_eq!(result.element_type(), ElementType::Long);
        assert_eq!(result.position_count(), 1);
        assert_eq!(result.as_long().unwrap().get_long(0), 3);
    }

    #[test]
    fn test_factory_rejects_unsupported_input() {
        assert!(AggregatorFunctionFactory::new(AggregationKind::Min, Some(DataType::Keyword)).is_err());
        let sum = AggregatorFunctionFactory::new(AggregationKind::Sum, Some(DataType::Double)).unwrap();
        assert_eq!(sum.describe(), "sum of doubles");
    }

    #[test]
    fn test_empty_sum_is_typed_null() {
        let sum = AggregatorFunctionFactory::new(AggregationKind::Sum, Some(DataType::Double))
            .unwrap()
            .create(None);
        let result = sum.evaluate_final().unwrap();
        assert_eq!(result.element_type(), ElementType::Double);
        assert!(result.is_null(0));
    }

    #[test]
    fn test_intermediate_merge() {
        let factory = AggregatorFunctionFactory::new(AggregationKind::Max, Some(DataType::Double)).unwrap();
        let mut a = factory.create(None);
        let mut b = factory.create(None);
        a.add_raw_input(&DoubleVector::from_values(vec![1.0, 8.0]).into_block().into())
            .unwrap();
        b.add_raw_input(&DoubleVector::constant(3.0, 10).into_block().into())
            .unwrap();
        a.add_intermediate_input(&b.evaluate_intermediate()).unwrap();
        assert_eq!(a.evaluate_final().unwrap().get_value(0), Value::Double(8.0));
    }
}
