//! Aggregation framework
//!
//! A factory creates independent aggregator functions; each consumes blocks
//! on one evaluation unit, hands out a serializable intermediate state, and
//! merges states from other units. Merging is commutative and associative,
//! so the final result does not depend on how input was partitioned.

pub mod aggregator;
pub mod avg;
pub mod count;
pub mod extreme;
pub mod function;
pub mod grouping;
pub mod state;
pub mod sum;

pub use aggregator::Aggregator;
pub use function::{AggregatorFunction, AggregatorFunctionFactory, GlobalAggregatorFunction};
pub use grouping::{GroupedState, GroupingAggregatorFunction, LongBlockHash};
pub use state::{AggregationKind, AggregatorState};
