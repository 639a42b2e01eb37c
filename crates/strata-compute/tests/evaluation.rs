//! Binary operators across page boundaries and evaluation units.

use std::sync::Arc;

use strata_common::{ComputeConfig, DataType, Error, Location, Source, Value};
use strata_compute::data::{LongVector, Page};
use strata_compute::driver::{CancellationToken, DriverContext};
use strata_compute::expression::binary_on_channels;
use strata_compute::warnings::{RecordingWarningSink, WarningCollector};
use strata_compute::{resolve, BinaryOperator, Block, ExpressionEvaluator};

fn longs(values: Vec<i64>) -> Block {
    LongVector::from_values(values).into_block().into()
}

fn add_at(location: Location, context: &DriverContext) -> impl ExpressionEvaluator {
    let source = Source::new(location, "a + b");
    let resolved = resolve(BinaryOperator::Add, &source, DataType::Long, DataType::Long).unwrap();
    binary_on_channels(resolved, 0, 1, context)
}

#[test]
fn unsigned_long_only_combines_with_itself() {
    let source = Source::new(Location::new(1, 7), "x + y");
    let err = resolve(BinaryOperator::Add, &source, DataType::UnsignedLong, DataType::Long).unwrap_err();
    assert_eq!(
        err.to_string(),
        "first argument of [x + y] is [unsigned_long] and second is [long]. \
         [unsigned_long] can only be operated on together with another [unsigned_long]"
    );
    let err: Error = err.into();
    assert!(matches!(err, Error::Resolution(_)));
}

#[test]
fn overflow_is_null_with_one_warning_across_pages() {
    let context = DriverContext::default();
    let add = add_at(Location::new(2, 4), &context);
    for _ in 0..3 {
        let page = Page::new(vec![longs(vec![i64::MAX, 40]), longs(vec![1, 2])]).unwrap();
        let result = add.eval(&page).unwrap();
        assert!(result.is_null(0));
        assert_eq!(result.get_value(1), Value::Long(42));
    }

    let warnings = context.warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings.snapshot()[0].occurrences, 3);

    let sink = RecordingWarningSink::default();
    warnings.publish(&sink);
    assert_eq!(
        sink.messages(),
        vec![
            "Line 2:5: evaluation of [a + b] failed, treating result as null. Only first 20 failures recorded."
                .to_string(),
            "Line 2:5: arithmetic error: long overflow".to_string(),
        ]
    );
}

#[test]
fn warning_cap_holds_across_threads() {
    let config = Arc::new(ComputeConfig::default().with_max_warnings(5));
    let collector = Arc::new(WarningCollector::from_config(&config));

    std::thread::scope(|scope| {
        for unit in 0..8 {
            let context =
                DriverContext::with_parts(config.clone(), collector.clone(), CancellationToken::new());
            scope.spawn(move || {
                for line in 0..4 {
                    let add = add_at(Location::new(line, unit), &context);
                    let page = Page::new(vec![longs(vec![i64::MAX]), longs(vec![i64::MAX])]).unwrap();
                    assert!(add.eval(&page).unwrap().is_null(0));
                }
            });
        }
    });

    assert_eq!(collector.len(), 5);
    assert_eq!(collector.dropped(), 8 * 4 - 5);
    let total: u64 = collector.snapshot().iter().map(|w| w.occurrences).sum();
    assert_eq!(total, 5);
}

#[test]
fn cancelled_context_stops_evaluation() {
    let context = DriverContext::new(Arc::new(ComputeConfig::default().with_checkpoint_interval(16)));
    let add = add_at(Location::new(1, 0), &context);
    let page = Page::new(vec![longs((0..100).collect()), longs((0..100).collect())]).unwrap();
    assert!(add.eval(&page).is_ok());

    context.cancellation().cancel();
    assert!(matches!(add.eval(&page), Err(Error::Cancelled)));
}
