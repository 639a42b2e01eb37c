//! Binding of an aggregator function to its input channel.

use strata_common::Result;

use crate::data::{Block, Page};

use super::function::{AggregatorFunction, AggregatorFunctionFactory};
use super::state::AggregatorState;
use crate::warnings::Warnings;

/// An aggregator function bound to the page channel it reads
#[derive(Debug)]
pub struct Aggregator {
    function: Box<dyn AggregatorFunction>,
    channel: usize,
}

impl Aggregator {
    pub fn new(function: Box<dyn AggregatorFunction>, channel: usize) -> Self {
        Aggregator { function, channel }
    }

    pub fn from_factory(factory: &AggregatorFunctionFactory, channel: usize, warnings: Option<Warnings>) -> Self {
        Self::new(Box::new(factory.create(warnings)), channel)
    }

    pub fn channel(&self) -> usize {
        self.channel
    }

    pub fn process_page(&mut self, page: &Page) -> Result<()> {
        self.function.add_raw_input(page.block(self.channel)?)
    }

    pub fn merge(&mut self, state: &AggregatorState) -> Result<()> {
        self.function.add_intermediate_input(state)
    }

    pub fn evaluate_intermediate(&self) -> AggregatorState {
        self.function.evaluate_intermediate()
    }

    pub fn evaluate_final(&self) -> Result<Block> {
        self.function.evaluate_final()
    }

    pub fn describe(&self) -> String {
        self.function.describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::LongVector;
    use strata_common::Error;

    #[test]
    fn test_reads_its_channel() {
        let page = Page::new(vec![
            LongVector::from_values(vec![1, 2]).into_block().into(),
            Block::constant_null(2),
        ])
        .unwrap();
        let mut on_values = Aggregator::from_factory(&AggregatorFunctionFactory::COUNT, 0, None);
        let mut on_nulls = Aggregator::from_factory(&AggregatorFunctionFactory::COUNT, 1, None);
        on_values.process_page(&page).unwrap();
        on_nulls.process_page(&page).unwrap();
        assert_eq!(on_values.evaluate_final().unwrap().as_long().unwrap().get_long(0), 2);
        assert_eq!(on_nulls.evaluate_final().unwrap().as_long().unwrap().get_long(0), 0);

        let mut missing = Aggregator::from_factory(&AggregatorFunctionFactory::COUNT, 5, None);
        assert!(matches!(missing.process_page(&page), Err(Error::ChannelOutOfBounds { .. })));
    }
}
