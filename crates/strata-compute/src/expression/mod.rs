//! Expression evaluation over pages
//!
//! Evaluators turn a whole page into one result block at a time. A planner
//! hands this layer resolved operand types; binary operators resolve once
//! and then evaluate every page they see with the same kernel.

pub mod arithmetic;
pub mod binary;
pub mod cast;
pub mod evaluator;
pub mod multivalue;

use std::fmt;

use strata_common::{Result, Value};

use crate::data::{Block, Page};

pub use arithmetic::EvaluationFailure;
pub use binary::{resolve, BinaryOperator, ResolvedBinary};
pub use cast::cast_block;
pub use evaluator::{binary_on_channels, BinaryEvaluator};
pub use multivalue::{FirstValue, MultiValueSelector, NullOnMultiValue};

/// Evaluates an expression against a page, producing one block with the
/// page's position count
pub trait ExpressionEvaluator: Send + Sync + fmt::Debug {
    fn eval(&self, page: &Page) -> Result<Block>;
}

/// Reads a block straight off the page
#[derive(Debug, Clone, Copy)]
pub struct ChannelEvaluator {
    channel: usize,
}

impl ChannelEvaluator {
    pub fn new(channel: usize) -> Self {
        ChannelEvaluator { channel }
    }
}

impl ExpressionEvaluator for ChannelEvaluator {
    fn eval(&self, page: &Page) -> Result<Block> {
        Ok(page.block(self.channel)?.clone())
    }
}

/// A literal folded into a constant block per page
#[derive(Debug, Clone)]
pub struct LiteralEvaluator {
    value: Value,
}

impl LiteralEvaluator {
    pub fn new(value: Value) -> Self {
        LiteralEvaluator { value }
    }
}

impl ExpressionEvaluator for LiteralEvaluator {
    fn eval(&self, page: &Page) -> Result<Block> {
        Block::constant(&self.value, page.position_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::LongVector;
    use strata_common::Error;

    #[test]
    fn test_channel_evaluator() {
        let block: Block = LongVector::from_values(vec![4, 5]).into_block().into();
        let page = Page::new(vec![block.clone()]).unwrap();
        assert_eq!(ChannelEvaluator::new(0).eval(&page).unwrap(), block);
        assert!(matches!(
            ChannelEvaluator::new(1).eval(&page),
            Err(Error::ChannelOutOfBounds { channel: 1, .. })
        ));
    }

    #[test]
    fn test_literal_evaluator() {
        let page = Page::empty(3);
        let block = LiteralEvaluator::new(Value::UnsignedLong(u64::MAX)).eval(&page).unwrap();
        assert!(block.is_constant());
        assert_eq!(block.position_count(), 3);
        assert_eq!(block.as_long().unwrap().get_long(0), i64::MAX);
    }
}
