//! Sinks that aggregate the pages of one unit

use strata_common::{Error, Result, Source};

use crate::aggregation::{
    Aggregator, AggregatorFunctionFactory, AggregatorState, GroupedState, GroupingAggregatorFunction,
    LongBlockHash,
};
use crate::data::{Block, Page};

use super::context::DriverContext;
use super::operator::{PageSink, SinkResult};

/// An aggregate to compute and the channel it reads
#[derive(Debug, Clone)]
pub struct AggregateSpec {
    pub factory: AggregatorFunctionFactory,
    pub channel: usize,
}

impl AggregateSpec {
    pub fn new(factory: AggregatorFunctionFactory, channel: usize) -> Self {
        AggregateSpec { factory, channel }
    }

    fn source(&self) -> Source {
        Source::synthetic(format!("{}(#{})", self.factory.kind(), self.channel))
    }
}

/// Ungrouped aggregation: one row of results
#[derive(Debug)]
pub struct AggregationOperator {
    aggregators: Vec<Aggregator>,
    finished: bool,
}

impl AggregationOperator {
    pub fn new(specs: &[AggregateSpec], context: &DriverContext) -> Self {
        let aggregators = specs
            .iter()
            .map(|spec| {
                let warnings = context.warnings_for(&spec.source());
                Aggregator::from_factory(&spec.factory, spec.channel, Some(warnings))
            })
            .collect();
        AggregationOperator {
            aggregators,
            finished: false,
        }
    }

    pub fn aggregator_count(&self) -> usize {
        self.aggregators.len()
    }

    /// One state per aggregate, in declaration order
    pub fn evaluate_intermediate(&self) -> Vec<AggregatorState> {
        self.aggregators.iter().map(Aggregator::evaluate_intermediate).collect()
    }

    /// Merge the states of another unit with the same aggregates
    pub fn merge(&mut self, states: &[AggregatorState]) -> Result<()> {
        if states.len() != self.aggregators.len() {
            return Err(Error::IncompatibleState {
                expected: format!("{} states", self.aggregators.len()),
                actual: format!("{} states", states.len()),
            });
        }
        for (aggregator, state) in self.aggregators.iter_mut().zip(states) {
            aggregator.merge(state)?;
        }
        Ok(())
    }

    /// One-position page, one channel per aggregate
    pub fn evaluate_final(&self) -> Result<Page> {
        let blocks = self
            .aggregators
            .iter()
            .map(Aggregator::evaluate_final)
            .collect::<Result<Vec<Block>>>()?;
        Page::with_position_count(1, blocks)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl PageSink for AggregationOperator {
    fn sink(&mut self, page: &Page) -> Result<SinkResult> {
        for aggregator in &mut self.aggregators {
            aggregator.process_page(page)?;
        }
        Ok(SinkResult::NeedData)
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}

/// Aggregation grouped by one LONG (or INT) key channel
#[derive(Debug)]
pub struct HashAggregationOperator {
    group_channel: usize,
    hash: LongBlockHash,
    aggregators: Vec<(GroupingAggregatorFunction, usize)>,
}

impl HashAggregationOperator {
    pub fn new(group_channel: usize, specs: &[AggregateSpec], context: &DriverContext) -> Self {
        let aggregators = specs
            .iter()
            .map(|spec| {
                let warnings = context.warnings_for(&spec.source());
                (
                    GroupingAggregatorFunction::new(&spec.factory, Some(warnings)),
                    spec.channel,
                )
            })
            .collect();
        HashAggregationOperator {
            group_channel,
            hash: LongBlockHash::new(),
            aggregators,
        }
    }

    pub fn group_count(&self) -> usize {
        self.hash.group_count()
    }

    pub fn evaluate_intermediate(&self) -> GroupedState {
        let groups = self.hash.group_count();
        GroupedState {
            keys: self.hash.keys().to_vec(),
            states: self
                .aggregators
                .iter()
                .map(|(function, _)| function.evaluate_intermediate(groups))
                .collect(),
        }
    }

    /// Merge another unit's groups, matching them by key
    pub fn merge(&mut self, other: &GroupedState) -> Result<()> {
        if other.states.len() != self.aggregators.len() {
            return Err(Error::IncompatibleState {
                expected: format!("{} grouped aggregates", self.aggregators.len()),
                actual: format!("{} grouped aggregates", other.states.len()),
            });
        }
        if let Some(states) = other.states.iter().find(|s| s.len() != other.keys.len()) {
            return Err(Error::IncompatibleState {
                expected: format!("{} groups", other.keys.len()),
                actual: format!("{} groups", states.len()),
            });
        }
        for (position, key) in other.keys.iter().enumerate() {
            let group = self.hash.id_for(*key) as usize;
            for ((function, _), states) in self.aggregators.iter_mut().zip(&other.states) {
                function.add_intermediate_input(group, &states[position])?;
            }
        }
        Ok(())
    }

    /// Group keys in channel 0, then one channel per aggregate
    pub fn evaluate_final(&self) -> Result<Page> {
        let groups = self.hash.group_count();
        let mut blocks = Vec::with_capacity(self.aggregators.len() + 1);
        blocks.push(Block::from(self.hash.keys_block()));
        for (function, _) in &self.aggregators {
            blocks.push(function.evaluate_final(groups)?);
        }
        Page::with_position_count(groups, blocks)
    }
}

impl PageSink for HashAggregationOperator {
    fn sink(&mut self, page: &Page) -> Result<SinkResult> {
        let group_ids = self.hash.add(page.block(self.group_channel)?)?;
        for (function, channel) in &mut self.aggregators {
            function.add_raw_input(&group_ids, page.block(*channel)?)?;
        }
        Ok(SinkResult::NeedData)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::AggregationKind;
    use crate::data::LongVector;
    use strata_common::{DataType, Value};

    fn page(keys: Vec<i64>, values: Vec<i64>) -> Page {
        Page::new(vec![
            LongVector::from_values(keys).into_block().into(),
            LongVector::from_values(values).into_block().into(),
        ])
        .unwrap()
    }

    fn specs() -> Vec<AggregateSpec> {
        let sum = AggregatorFunctionFactory::new(AggregationKind::Sum, Some(DataType::Long)).unwrap();
        vec![
            AggregateSpec::new(AggregatorFunctionFactory::COUNT, 1),
            AggregateSpec::new(sum, 1),
        ]
    }

    #[test]
    fn test_ungrouped_merge() {
        let context = DriverContext::default();
        let mut a = AggregationOperator::new(&specs(), &context);
        let mut b = AggregationOperator::new(&specs(), &context);
        a.sink(&page(vec![0, 0], vec![1, 2])).unwrap();
        b.sink(&page(vec![0], vec![10])).unwrap();
        a.merge(&b.evaluate_intermediate()).unwrap();

        let result = a.evaluate_final().unwrap();
        assert_eq!(result.row(0), vec![Value::Long(3), Value::Long(13)]);
    }

    #[test]
    fn test_merge_rejects_shape_mismatch() {
        let context = DriverContext::default();
        let mut a = AggregationOperator::new(&specs(), &context);
        let b = AggregationOperator::new(&specs()[..1], &context);
        assert!(matches!(
            a.merge(&b.evaluate_intermediate()),
            Err(Error::IncompatibleState { .. })
        ));
    }

    #[test]
    fn test_grouped_merge_matches_keys() {
        let context = DriverContext::default();
        let mut a = HashAggregationOperator::new(0, &specs(), &context);
        let mut b = HashAggregationOperator::new(0, &specs(), &context);
        a.sink(&page(vec![1, 2, 1], vec![5, 6, 7])).unwrap();
        b.sink(&page(vec![3, 2], vec![100, 200])).unwrap();
        a.merge(&b.evaluate_intermediate()).unwrap();

        let result = a.evaluate_final().unwrap();
        assert_eq!(result.position_count(), 3);
        assert_eq!(result.row(0), vec![Value::Long(1), Value::Long(2), Value::Long(12)]);
        assert_eq!(result.row(1), vec![Value::Long(2), Value::Long(2), Value::Long(206)]);
        assert_eq!(result.row(2), vec![Value::Long(3), Value::Long(1), Value::Long(100)]);
    }
}
