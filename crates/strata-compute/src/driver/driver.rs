//! Driver - one single-threaded evaluation unit

use strata_common::{Error, Result};
use tracing::{debug, info};

use super::context::DriverContext;
use super::operator::{PageOperator, PageSink, PageSource, SinkResult};

/// Counters of one driver run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStats {
    pub pages_in: usize,
    pub positions_in: usize,
    pub pages_out: usize,
    pub positions_out: usize,
}

impl DriverStats {
    /// Totals of two runs
    pub fn merged(&self, other: &DriverStats) -> DriverStats {
        DriverStats {
            pages_in: self.pages_in + other.pages_in,
            positions_in: self.positions_in + other.positions_in,
            pages_out: self.pages_out + other.pages_out,
            positions_out: self.positions_out + other.positions_out,
        }
    }
}

/// Moves pages from a source through operators into a sink
pub struct Driver<S: PageSink> {
    context: DriverContext,
    /// The data source
    source: Box<dyn PageSource>,
    /// Chain of operators
    operators: Vec<Box<dyn PageOperator>>,
    /// The final sink
    sink: S,
}

impl<S: PageSink> Driver<S> {
    pub fn new(
        context: DriverContext,
        source: Box<dyn PageSource>,
        operators: Vec<Box<dyn PageOperator>>,
        sink: S,
    ) -> Self {
        Driver {
            context,
            source,
            operators,
            sink,
        }
    }

    pub fn context(&self) -> &DriverContext {
        &self.context
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Run to completion. On cancellation returns `Error::Cancelled` and
    /// the sink's contents must be discarded.
    pub fn run(&mut self) -> Result<DriverStats> {
        let mut stats = DriverStats::default();
        debug!(operators = self.operators.len(), "driver starting");

        let result = self.drain(&mut stats);
        if let Err(Error::Cancelled) = &result {
            debug!(pages_in = stats.pages_in, "driver cancelled");
        }
        result?;
        self.sink.finish()?;

        info!(
            pages_in = stats.pages_in,
            positions_in = stats.positions_in,
            pages_out = stats.pages_out,
            positions_out = stats.positions_out,
            "driver finished"
        );
        Ok(stats)
    }

    fn drain(&mut self, stats: &mut DriverStats) -> Result<()> {
        loop {
            self.context.cancellation().check()?;
            let Some(page) = self.source.next_page()? else {
                return Ok(());
            };
            stats.pages_in += 1;
            stats.positions_in += page.position_count();

            let mut current = Some(page);
            for op in &mut self.operators {
                match current {
                    Some(page) => current = op.process(page)?,
                    None => break,
                }
            }
            let Some(page) = current else {
                continue;
            };

            stats.pages_out += 1;
            stats.positions_out += page.position_count();
            if self.sink.sink(&page)? == SinkResult::Finished {
                return Ok(());
            }
        }
    }
}

impl<S: PageSink + std::fmt::Debug> std::fmt::Debug for Driver<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("operators", &self.operators.len())
            .field("sink", &self.sink)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{LongVector, Page};
    use crate::aggregation::AggregatorFunctionFactory;
    use crate::driver::aggregation::{AggregateSpec, AggregationOperator};
    use crate::driver::operator::{CollectingSink, FilterOperator, PagesSource};
    use crate::expression::{resolve, BinaryEvaluator, BinaryOperator, ChannelEvaluator, LiteralEvaluator};
    use strata_common::{DataType, Source, Value};

    fn pages() -> Vec<Page> {
        (0..3)
            .map(|i| {
                Page::new(vec![LongVector::from_values(vec![i, i + 10]).into_block().into()])
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_counts_pages() {
        let context = DriverContext::default();
        let sink = AggregationOperator::new(&[AggregateSpec::new(AggregatorFunctionFactory::COUNT, 0)], &context);
        let mut driver = Driver::new(context, Box::new(PagesSource::new(pages())), vec![], sink);
        let stats = driver.run().unwrap();
        assert_eq!(stats.pages_in, 3);
        assert_eq!(stats.positions_in, 6);

        let sink = driver.into_sink();
        assert!(sink.is_finished());
        assert_eq!(sink.evaluate_final().unwrap().row(0), vec![Value::Long(6)]);
    }

    #[test]
    fn test_filter_drops_positions() {
        let context = DriverContext::default();
        let resolved = resolve(
            BinaryOperator::Gt,
            &Source::synthetic("x > 5"),
            DataType::Long,
            DataType::Long,
        )
        .unwrap();
        let predicate = BinaryEvaluator::new(
            resolved,
            Box::new(ChannelEvaluator::new(0)),
            Box::new(LiteralEvaluator::new(Value::Long(5))),
            &context,
        );
        let mut driver = Driver::new(
            context,
            Box::new(PagesSource::new(pages())),
            vec![Box::new(FilterOperator::new(Box::new(predicate))) as Box<dyn PageOperator>],
            CollectingSink::new(),
        );
        let stats = driver.run().unwrap();
        assert_eq!(stats.pages_out, 3);
        assert_eq!(stats.positions_out, 3);
        let kept: Vec<Value> = driver.sink().pages().iter().map(|page| page.row(0)[0].clone()).collect();
        assert_eq!(kept, vec![Value::Long(10), Value::Long(11), Value::Long(12)]);
    }

    #[test]
    fn test_cancelled_before_first_page() {
        let context = DriverContext::default();
        context.cancellation().cancel();
        let mut driver = Driver::new(
            context,
            Box::new(PagesSource::new(pages())),
            vec![],
            CollectingSink::new(),
        );
        assert!(matches!(driver.run(), Err(Error::Cancelled)));
        assert!(driver.sink().pages().is_empty());
    }
}
