//! Strata - columnar vector/block execution core
//!
//! Strata evaluates expressions and aggregations over columnar pages:
//! - Typed vectors with constant specialization, wrapped in nullable,
//!   multi-valued blocks
//! - Binary operators that resolve once and turn row failures into nulls
//!   plus capped, deduplicated warnings
//! - Aggregators whose intermediate states merge in any order
//! - Single-threaded drivers, run side by side on a rayon pool
//!
//! # Example
//!
//! ```rust
//! use strata::compute::aggregation::AggregatorFunctionFactory;
//! use strata::compute::data::{LongVector, Page};
//! use strata::compute::driver::AggregateSpec;
//! use strata::{Engine, Query};
//!
//! let engine = Engine::new().unwrap();
//! let query = Query::new().with_aggregate(AggregateSpec::new(AggregatorFunctionFactory::COUNT, 0));
//! let unit = |n: i64| vec![Page::new(vec![LongVector::from_values((0..n).collect()).into_block().into()]).unwrap()];
//!
//! let result = engine.execute(&query, vec![unit(7), unit(13)]).unwrap();
//! assert_eq!(result.scalar(), Some(strata::common::Value::Long(20)));
//! ```

pub mod query;

pub use strata_common as common;
pub use strata_compute as compute;

pub use query::{PartialState, Query};

use std::sync::Arc;

use rayon::prelude::*;
use strata_common::{logging, ComputeConfig, Error, Result, Value};
use strata_compute::data::Page;
use strata_compute::driver::{
    CollectingSink, Driver, DriverContext, DriverStats, PageOperator, PageSink, PageSource,
    PagesSource,
};
use strata_compute::warnings::LoggingWarningSink;
use tracing::{debug, info};

use query::UnitOutput;

/// Runs queries over independent evaluation units
pub struct Engine {
    config: Arc<ComputeConfig>,
    pool: rayon::ThreadPool,
}

impl Engine {
    /// Create an engine with the default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ComputeConfig::default())
    }

    pub fn with_config(config: ComputeConfig) -> Result<Self> {
        config.validate()?;
        logging::init_with_level(&config.log_filter);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallelism)
            .thread_name(|index| format!("strata-unit-{index}"))
            .build()
            .map_err(|e| Error::Internal(format!("failed to build thread pool: {e}")))?;
        Ok(Engine {
            config: Arc::new(config),
            pool,
        })
    }

    pub fn config(&self) -> &ComputeConfig {
        &self.config
    }

    /// A fresh per-query context; cancel its token to stop the query
    pub fn context(&self) -> DriverContext {
        DriverContext::new(self.config.clone())
    }

    /// Run `query` with one unit per page list and merge the results
    pub fn execute(&self, query: &Query, units: Vec<Vec<Page>>) -> Result<QueryResult> {
        self.execute_in(self.context(), query, units)
    }

    /// Like [`Engine::execute`], under a caller-supplied context
    pub fn execute_in(
        &self,
        context: DriverContext,
        query: &Query,
        units: Vec<Vec<Page>>,
    ) -> Result<QueryResult> {
        info!(units = units.len(), ?query, "executing query");
        let unit_count = units.len();
        let merged = self.pool.install(|| {
            units
                .into_par_iter()
                .map(|pages| run_unit(&context, query, pages))
                .try_reduce_with(|a, b| {
                    let stats = a.1.merged(&b.1);
                    Ok((a.0.merge(b.0)?, stats))
                })
        });
        let (output, stats) = match merged {
            Some(result) => result?,
            None => (UnitOutput::empty(query, &context), DriverStats::default()),
        };
        debug!(units = unit_count, pages_in = stats.pages_in, "units merged");
        self.finish_output(&context, output)
    }

    /// Run one unit of an aggregation and return its intermediate state
    pub fn execute_partial(
        &self,
        context: &DriverContext,
        query: &Query,
        pages: Vec<Page>,
    ) -> Result<PartialState> {
        let (output, _) = run_unit(context, query, pages)?;
        output.into_partial()
    }

    /// Merge intermediate states of an aggregation and finalize
    pub fn finish(
        &self,
        context: &DriverContext,
        query: &Query,
        partials: &[PartialState],
    ) -> Result<QueryResult> {
        let mut output = UnitOutput::empty(query, context);
        for partial in partials {
            output.merge_partial(partial)?;
        }
        self.finish_output(context, output)
    }

    fn finish_output(&self, context: &DriverContext, output: UnitOutput) -> Result<QueryResult> {
        context.cancellation().check()?;
        let pages = output.finish()?;

        let collector = context.warnings();
        collector.publish(&LoggingWarningSink);
        let warnings = collector
            .messages()
            .into_iter()
            .map(|(_, message)| message)
            .collect();

        let result = QueryResult { pages, warnings };
        info!(
            rows = result.row_count(),
            warnings = result.warnings.len(),
            "query finished"
        );
        Ok(result)
    }
}

fn run_unit(context: &DriverContext, query: &Query, pages: Vec<Page>) -> Result<(UnitOutput, DriverStats)> {
    let source: Box<dyn PageSource> = Box::new(PagesSource::new(pages));
    let operators = query.operators(context);
    match UnitOutput::empty(query, context) {
        UnitOutput::Pages(_) => {
            let (sink, stats) = drive(context, source, operators, CollectingSink::new())?;
            Ok((UnitOutput::Pages(sink.into_pages()), stats))
        }
        UnitOutput::Aggregation(sink) => {
            let (sink, stats) = drive(context, source, operators, sink)?;
            Ok((UnitOutput::Aggregation(sink), stats))
        }
        UnitOutput::Grouped(sink) => {
            let (sink, stats) = drive(context, source, operators, sink)?;
            Ok((UnitOutput::Grouped(sink), stats))
        }
    }
}

fn drive<S: PageSink>(
    context: &DriverContext,
    source: Box<dyn PageSource>,
    operators: Vec<Box<dyn PageOperator>>,
    sink: S,
) -> Result<(S, DriverStats)> {
    let mut driver = Driver::new(context.clone(), source, operators, sink);
    let stats = driver.run()?;
    Ok((driver.into_sink(), stats))
}

/// Pages and warnings of a finished query
#[derive(Debug, Clone)]
pub struct QueryResult {
    /// Result pages, in unit order for queries without aggregates
    pub pages: Vec<Page>,
    /// User-visible warning lines
    pub warnings: Vec<String>,
}

impl QueryResult {
    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.pages.iter().map(Page::position_count).sum()
    }

    /// Check if result is empty
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Every row of every page
    pub fn rows(&self) -> Vec<Vec<Value>> {
        self.pages.iter().flat_map(Page::to_rows).collect()
    }

    /// Get a single value (first row, first column)
    pub fn scalar(&self) -> Option<Value> {
        self.pages
            .iter()
            .find(|page| !page.is_empty())
            .and_then(|page| page.row(0).into_iter().next())
    }
}
