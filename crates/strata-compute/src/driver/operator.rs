//! Page sources, operators and sinks

use std::collections::VecDeque;

use strata_common::Result;

use crate::data::{Block, Page};
use crate::expression::ExpressionEvaluator;

/// Result of sinking a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkResult {
    /// Need more data
    NeedData,
    /// Sink is finished
    Finished,
}

/// Produces the pages a driver consumes
pub trait PageSource: Send {
    /// The next page, or `None` when exhausted
    fn next_page(&mut self) -> Result<Option<Page>>;
}

/// Transforms one page into at most one page
pub trait PageOperator: Send {
    /// `None` when nothing of the page survives
    fn process(&mut self, page: Page) -> Result<Option<Page>>;
}

/// Consumes the pages that leave the operator chain
pub trait PageSink: Send {
    fn sink(&mut self, page: &Page) -> Result<SinkResult>;

    /// Called when all data has been sunk
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Replays a fixed list of pages
#[derive(Debug, Default)]
pub struct PagesSource {
    pages: VecDeque<Page>,
}

impl PagesSource {
    pub fn new(pages: impl IntoIterator<Item = Page>) -> Self {
        PagesSource {
            pages: pages.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.pages.len()
    }
}

impl PageSource for PagesSource {
    fn next_page(&mut self) -> Result<Option<Page>> {
        Ok(self.pages.pop_front())
    }
}

/// Appends the result of an expression as a new channel
#[derive(Debug)]
pub struct EvalOperator {
    evaluator: Box<dyn ExpressionEvaluator>,
}

impl EvalOperator {
    pub fn new(evaluator: Box<dyn ExpressionEvaluator>) -> Self {
        EvalOperator { evaluator }
    }
}

impl PageOperator for EvalOperator {
    fn process(&mut self, page: Page) -> Result<Option<Page>> {
        let block = self.evaluator.eval(&page)?;
        Ok(Some(page.append_block(block)?))
    }
}

/// Keeps positions where a boolean predicate holds exactly `true`.
///
/// Null, false and multi-valued predicate positions are dropped.
#[derive(Debug)]
pub struct FilterOperator {
    predicate: Box<dyn ExpressionEvaluator>,
}

impl FilterOperator {
    pub fn new(predicate: Box<dyn ExpressionEvaluator>) -> Self {
        FilterOperator { predicate }
    }
}

impl PageOperator for FilterOperator {
    fn process(&mut self, page: Page) -> Result<Option<Page>> {
        let mask = self.predicate.eval(&page)?;
        if let Block::Null(_) = mask {
            return Ok(None);
        }
        let mask = mask.as_boolean()?;
        if let Some(vector) = mask.as_vector() {
            if let Some(&all) = vector.constant_value() {
                return Ok(all.then_some(page));
            }
        }
        let positions: Vec<usize> = (0..mask.position_count())
            .filter(|&p| mask.value_count(p) == 1 && mask.get_boolean(mask.first_value_index(p)))
            .collect();
        if positions.is_empty() {
            return Ok(None);
        }
        if positions.len() == page.position_count() {
            return Ok(Some(page));
        }
        Ok(Some(page.filter(&positions)))
    }
}

/// Keeps every page it is given
#[derive(Debug, Default)]
pub struct CollectingSink {
    pages: Vec<Page>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }
}

impl PageSink for CollectingSink {
    fn sink(&mut self, page: &Page) -> Result<SinkResult> {
        self.pages.push(page.clone());
        Ok(SinkResult::NeedData)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{BooleanBlock, LongVector};
    use crate::expression::{ChannelEvaluator, LiteralEvaluator};
    use strata_common::Value;

    fn page() -> Page {
        let mut flags = BooleanBlock::builder(4);
        flags.append_value(true);
        flags.append_null();
        flags.append_values([true, true]);
        flags.append_value(true);
        Page::new(vec![
            LongVector::from_values(vec![1, 2, 3, 4]).into_block().into(),
            flags.build().into(),
        ])
        .unwrap()
    }

    #[test]
    fn test_filter_keeps_single_true() {
        let mut filter = FilterOperator::new(Box::new(ChannelEvaluator::new(1)));
        let out = filter.process(page()).unwrap().unwrap();
        assert_eq!(out.position_count(), 2);
        assert_eq!(out.row(1)[0], Value::Long(4));
    }

    #[test]
    fn test_constant_predicate() {
        let mut none = FilterOperator::new(Box::new(LiteralEvaluator::new(Value::Boolean(false))));
        assert!(none.process(page()).unwrap().is_none());
        let mut all = FilterOperator::new(Box::new(LiteralEvaluator::new(Value::Boolean(true))));
        assert_eq!(all.process(page()).unwrap().unwrap().position_count(), 4);
        let mut null = FilterOperator::new(Box::new(LiteralEvaluator::new(Value::Null)));
        assert!(null.process(page()).unwrap().is_none());
    }

    #[test]
    fn test_eval_appends_channel() {
        let mut eval = EvalOperator::new(Box::new(LiteralEvaluator::new(Value::Int(7))));
        let out = eval.process(page()).unwrap().unwrap();
        assert_eq!(out.block_count(), 3);
        assert_eq!(out.row(0)[2], Value::Int(7));
    }

    #[test]
    fn test_pages_source_drains() {
        let mut source = PagesSource::new(vec![page(), page()]);
        assert!(source.next_page().unwrap().is_some());
        assert_eq!(source.remaining(), 1);
        assert!(source.next_page().unwrap().is_some());
        assert!(source.next_page().unwrap().is_none());
    }
}
