//! Strata Compute - columnar execution core
//!
//! Typed vectors and their nullable, multi-valued blocks; binary operators
//! that resolve once and evaluate page by page; mergeable aggregators; and
//! the single-threaded drivers that move pages through them.

pub mod aggregation;
pub mod data;
pub mod driver;
pub mod expression;
pub mod warnings;

pub use aggregation::{
    AggregationKind, Aggregator, AggregatorFunction, AggregatorFunctionFactory, AggregatorState,
    GroupedState,
};
pub use data::{Block, BlockBuilder, Page, Vector};
pub use driver::{Driver, DriverContext};
pub use expression::{resolve, BinaryEvaluator, BinaryOperator, ExpressionEvaluator};
pub use warnings::{LoggingWarningSink, WarningCollector, WarningSink, Warnings};
