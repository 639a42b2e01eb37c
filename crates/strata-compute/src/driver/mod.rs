//! Evaluation units.
//!
//! A [`Driver`] pulls pages from a [`PageSource`], pushes them through a
//! chain of [`PageOperator`]s and hands the survivors to a [`PageSink`].
//! Each driver runs on one thread; drivers of the same query share a
//! [`DriverContext`].

pub mod aggregation;
pub mod context;
#[allow(clippy::module_inception)]
pub mod driver;
pub mod operator;

pub use aggregation::{AggregateSpec, AggregationOperator, HashAggregationOperator};
pub use context::{CancellationToken, Checkpoint, DriverContext};
pub use driver::{Driver, DriverStats};
pub use operator::{
    CollectingSink, EvalOperator, FilterOperator, PageOperator, PageSink, PageSource, PagesSource,
    SinkResult,
};
