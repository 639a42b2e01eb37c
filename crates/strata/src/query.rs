//! What the engine runs on every evaluation unit.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strata_common::{Error, Result};
use strata_compute::aggregation::{AggregatorState, GroupedState};
use strata_compute::data::Page;
use strata_compute::driver::{
    AggregateSpec, AggregationOperator, DriverContext, HashAggregationOperator, PageOperator,
};

type OperatorFactory = Arc<dyn Fn(&DriverContext) -> Box<dyn PageOperator> + Send + Sync>;

/// A chain of page operators followed by an optional aggregation.
///
/// Operators are built per unit, so each unit owns its own evaluators.
#[derive(Clone, Default)]
pub struct Query {
    operators: Vec<OperatorFactory>,
    aggregates: Vec<AggregateSpec>,
    group_channel: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operator to the chain
    #[must_use]
    pub fn with_operator<F>(mut self, factory: F) -> Self
    where
        F: Fn(&DriverContext) -> Box<dyn PageOperator> + Send + Sync + 'static,
    {
        self.operators.push(Arc::new(factory));
        self
    }

    #[must_use]
    pub fn with_aggregate(mut self, aggregate: AggregateSpec) -> Self {
        self.aggregates.push(aggregate);
        self
    }

    /// Group the aggregates by a LONG channel
    #[must_use]
    pub fn group_by(mut self, channel: usize) -> Self {
        self.group_channel = Some(channel);
        self
    }

    pub fn aggregates(&self) -> &[AggregateSpec] {
        &self.aggregates
    }

    pub fn group_channel(&self) -> Option<usize> {
        self.group_channel
    }

    pub fn is_aggregation(&self) -> bool {
        !self.aggregates.is_empty() || self.group_channel.is_some()
    }

    pub(crate) fn operators(&self, context: &DriverContext) -> Vec<Box<dyn PageOperator>> {
        self.operators.iter().map(|factory| factory(context)).collect()
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("operators", &self.operators.len())
            .field("aggregates", &self.aggregates)
            .field("group_channel", &self.group_channel)
            .finish()
    }
}

/// Output of one unit before merging
#[derive(Debug)]
pub(crate) enum UnitOutput {
    Pages(Vec<Page>),
    Aggregation(AggregationOperator),
    Grouped(HashAggregationOperator),
}

impl UnitOutput {
    pub(crate) fn empty(query: &Query, context: &DriverContext) -> Self {
        match query.group_channel {
            Some(channel) => {
                UnitOutput::Grouped(HashAggregationOperator::new(channel, &query.aggregates, context))
            }
            None if query.is_aggregation() => {
                UnitOutput::Aggregation(AggregationOperator::new(&query.aggregates, context))
            }
            None => UnitOutput::Pages(Vec::new()),
        }
    }

    /// Fold `other` into `self`. Aggregations cross over as intermediate
    /// state only.
    pub(crate) fn merge(mut self, other: UnitOutput) -> Result<UnitOutput> {
        let name = self.name();
        match (&mut self, other) {
            (UnitOutput::Pages(pages), UnitOutput::Pages(more)) => pages.extend(more),
            (UnitOutput::Aggregation(sink), UnitOutput::Aggregation(other)) => {
                sink.merge(&other.evaluate_intermediate())?
            }
            (UnitOutput::Grouped(sink), UnitOutput::Grouped(other)) => {
                sink.merge(&other.evaluate_intermediate())?
            }
            (_, other) => {
                return Err(Error::Internal(format!(
                    "cannot merge unit outputs {} and {}",
                    name,
                    other.name()
                )))
            }
        }
        Ok(self)
    }

    pub(crate) fn merge_partial(&mut self, partial: &PartialState) -> Result<()> {
        match (self, partial) {
            (UnitOutput::Aggregation(sink), PartialState::Aggregation(states)) => sink.merge(states),
            (UnitOutput::Grouped(sink), PartialState::Grouped(state)) => sink.merge(state),
            (output, partial) => Err(Error::IncompatibleState {
                expected: output.name().to_string(),
                actual: partial.name().to_string(),
            }),
        }
    }

    pub(crate) fn into_partial(self) -> Result<PartialState> {
        match self {
            UnitOutput::Aggregation(sink) => Ok(PartialState::Aggregation(sink.evaluate_intermediate())),
            UnitOutput::Grouped(sink) => Ok(PartialState::Grouped(sink.evaluate_intermediate())),
            UnitOutput::Pages(_) => Err(Error::Internal(
                "a query without aggregates has no partial state".to_string(),
            )),
        }
    }

    pub(crate) fn finish(self) -> Result<Vec<Page>> {
        match self {
            UnitOutput::Pages(pages) => Ok(pages),
            UnitOutput::Aggregation(sink) => Ok(vec![sink.evaluate_final()?]),
            UnitOutput::Grouped(sink) => Ok(vec![sink.evaluate_final()?]),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            UnitOutput::Pages(_) => "pages",
            UnitOutput::Aggregation(_) => "aggregation",
            UnitOutput::Grouped(_) => "grouped aggregation",
        }
    }
}

/// Intermediate aggregation state of one unit, for shipping to the unit
/// that finalizes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartialState {
    Aggregation(Vec<AggregatorState>),
    Grouped(GroupedState),
}

impl PartialState {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn name(&self) -> &'static str {
        match self {
            PartialState::Aggregation(_) => "aggregation",
            PartialState::Grouped(_) => "grouped aggregation",
        }
    }
}
