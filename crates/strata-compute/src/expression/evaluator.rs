//! Evaluation of resolved binary operators over pages.

use std::sync::Arc;

use bytes::Bytes;
use strata_common::{DataType, Error, Result};

use crate::data::{Block, BlockBuilder, Element, Page, TypedBlock, TypedVector};
use crate::driver::context::{Checkpoint, DriverContext};
use crate::warnings::Warnings;

use super::arithmetic::{
    arithmetic_kernel, comparison_kernel, unsigned_long_kernel, CheckedArithmetic, EvaluationFailure,
    Kernel,
};
use super::binary::ResolvedBinary;
use super::cast::cast_block;
use super::multivalue::{MultiValueSelector, NullOnMultiValue};
use super::ExpressionEvaluator;

/// Evaluates `lhs <op> rhs` position by position.
///
/// A position whose evaluation fails becomes null and its failure is
/// recorded as a warning. Null operands give null results.
#[derive(Debug)]
pub struct BinaryEvaluator {
    resolved: ResolvedBinary,
    lhs: Box<dyn ExpressionEvaluator>,
    rhs: Box<dyn ExpressionEvaluator>,
    warnings: Warnings,
    selector: Arc<dyn MultiValueSelector>,
    checkpoint: Checkpoint,
}

impl BinaryEvaluator {
    pub fn new(
        resolved: ResolvedBinary,
        lhs: Box<dyn ExpressionEvaluator>,
        rhs: Box<dyn ExpressionEvaluator>,
        context: &DriverContext,
    ) -> Self {
        let warnings = context.warnings_for(&resolved.source);
        BinaryEvaluator {
            resolved,
            lhs,
            rhs,
            warnings,
            selector: Arc::new(NullOnMultiValue),
            checkpoint: context.checkpoint(),
        }
    }

    /// Replace how multi-valued positions are reduced
    pub fn with_selector(mut self, selector: Arc<dyn MultiValueSelector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn resolved(&self) -> &ResolvedBinary {
        &self.resolved
    }

    /// Apply the operator to two blocks already in the common type
    pub fn apply(&self, lhs: &Block, rhs: &Block) -> Result<Block> {
        let position_count = lhs.position_count();
        if rhs.position_count() != position_count {
            return Err(Error::PositionCountMismatch {
                expected: position_count,
                actual: rhs.position_count(),
            });
        }
        if matches!(lhs, Block::Null(_)) || matches!(rhs, Block::Null(_)) {
            return Ok(Block::constant_null(position_count));
        }

        let operator = self.resolved.operator;
        match self.resolved.common_type {
            DataType::Integer => self.numeric(lhs.as_int()?, rhs.as_int()?),
            DataType::Long => self.numeric(lhs.as_long()?, rhs.as_long()?),
            DataType::Double => self.numeric(lhs.as_double()?, rhs.as_double()?),
            DataType::UnsignedLong if operator.is_arithmetic() => {
                let kernel = unsigned_long_kernel(operator).ok_or_else(|| self.no_kernel())?;
                self.run(lhs.as_long()?, rhs.as_long()?, kernel)
            }
            DataType::UnsignedLong | DataType::Datetime => self.compare::<i64>(lhs.as_long()?, rhs.as_long()?),
            DataType::Boolean => self.compare::<bool>(lhs.as_boolean()?, rhs.as_boolean()?),
            DataType::Keyword | DataType::Text | DataType::Ip | DataType::Version => {
                self.compare::<Bytes>(lhs.as_bytes()?, rhs.as_bytes()?)
            }
            _ => Err(self.no_kernel()),
        }
    }

    fn no_kernel(&self) -> Error {
        Error::Internal(format!(
            "no [{}] evaluator for [{}]",
            self.resolved.operator, self.resolved.common_type
        ))
    }

    fn numeric<T: CheckedArithmetic>(&self, lhs: &TypedBlock<T>, rhs: &TypedBlock<T>) -> Result<Block> {
        let operator = self.resolved.operator;
        if operator.is_arithmetic() {
            let kernel = arithmetic_kernel::<T>(operator).ok_or_else(|| self.no_kernel())?;
            self.run(lhs, rhs, kernel)
        } else {
            self.compare(lhs, rhs)
        }
    }

    fn compare<T: Element + PartialOrd>(&self, lhs: &TypedBlock<T>, rhs: &TypedBlock<T>) -> Result<Block> {
        let kernel = comparison_kernel::<T>(self.resolved.operator).ok_or_else(|| self.no_kernel())?;
        self.run(lhs, rhs, kernel)
    }

    fn run<T: Element, R: Element>(
        &self,
        lhs: &TypedBlock<T>,
        rhs: &TypedBlock<T>,
        kernel: Kernel<T, R>,
    ) -> Result<Block> {
        let position_count = lhs.position_count();

        if let (Some(l), Some(r)) = (lhs.as_vector(), rhs.as_vector()) {
            if let (Some(a), Some(b)) = (l.constant_value(), r.constant_value()) {
                return Ok(match kernel(a, b) {
                    Ok(value) => TypedVector::constant(value, position_count).into_block().into(),
                    Err(failure) => {
                        if position_count > 0 {
                            self.warnings
                                .register_failures(&failure, position_count as u64);
                        }
                        Block::constant_null(position_count)
                    }
                });
            }

            let mut builder = BlockBuilder::with_capacity(position_count);
            for position in 0..position_count {
                self.checkpoint.at(position)?;
                self.append(&mut builder, kernel(l.get(position), r.get(position)));
            }
            return Ok(builder.build().into());
        }

        let mut builder = BlockBuilder::with_capacity(position_count);
        for position in 0..position_count {
            self.checkpoint.at(position)?;
            let Some(a) = self.single_value(lhs, position) else {
                builder.append_null();
                continue;
            };
            let Some(b) = self.single_value(rhs, position) else {
                builder.append_null();
                continue;
            };
            self.append(&mut builder, kernel(a, b));
        }
        Ok(builder.build().into())
    }

    fn single_value<'a, T: Element>(&self, block: &'a TypedBlock<T>, position: usize) -> Option<&'a T> {
        let first = block.first_value_index(position);
        match block.value_count(position) {
            0 => None,
            1 => Some(block.get(first)),
            count => self
                .selector
                .select(first, count, &self.warnings)
                .map(|index| block.get(index)),
        }
    }

    fn append<R: Element>(&self, builder: &mut BlockBuilder<R>, result: std::result::Result<R, EvaluationFailure>) {
        match result {
            Ok(value) => {
                builder.append_value(value);
            }
            Err(failure) => {
                self.warnings.register_failure(&failure);
                builder.append_null();
            }
        }
    }
}

impl ExpressionEvaluator for BinaryEvaluator {
    fn eval(&self, page: &Page) -> Result<Block> {
        let lhs = self.lhs.eval(page)?;
        let rhs = self.rhs.eval(page)?;
        let lhs = cast_block(&lhs, self.resolved.lhs_type, self.resolved.common_type)?;
        let rhs = cast_block(&rhs, self.resolved.rhs_type, self.resolved.common_type)?;
        self.apply(&lhs, &rhs)
    }
}

/// Shorthand for building an evaluator over two page channels
pub fn binary_on_channels(
    resolved: ResolvedBinary,
    lhs_channel: usize,
    rhs_channel: usize,
    context: &DriverContext,
) -> BinaryEvaluator {
    BinaryEvaluator::new(
        resolved,
        Box::new(super::ChannelEvaluator::new(lhs_channel)),
        Box::new(super::ChannelEvaluator::new(rhs_channel)),
        context,
    )
}
