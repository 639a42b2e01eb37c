//! End-to-end runs through the engine.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use strata::common::{ComputeConfig, DataType, Error, Location, Source, Value};
use strata::compute::aggregation::{AggregationKind, AggregatorFunctionFactory};
use strata::compute::data::{LongVector, Page};
use strata::compute::driver::{AggregateSpec, EvalOperator, FilterOperator};
use strata::compute::expression::{binary_on_channels, LiteralEvaluator};
use strata::compute::{resolve, BinaryEvaluator, BinaryOperator};
use strata::{Engine, PartialState, Query};

fn engine() -> Engine {
    Engine::with_config(ComputeConfig::default().with_parallelism(4)).unwrap()
}

fn page(keys: &[i64], values: &[i64]) -> Page {
    Page::new(vec![
        LongVector::from_values(keys.to_vec()).into_block().into(),
        LongVector::from_values(values.to_vec()).into_block().into(),
    ])
    .unwrap()
}

fn factory(kind: AggregationKind) -> AggregatorFunctionFactory {
    AggregatorFunctionFactory::new(kind, Some(DataType::Long)).unwrap()
}

/// `keys * 1 + values` appended as channel 2
fn add_columns() -> Query {
    Query::new().with_operator(|context| {
        let source = Source::new(Location::new(1, 7), "k + v");
        let resolved = resolve(BinaryOperator::Add, &source, DataType::Long, DataType::Long).unwrap();
        Box::new(EvalOperator::new(Box::new(binary_on_channels(resolved, 0, 1, context))))
    })
}

#[test]
fn count_across_units() {
    let query = Query::new().with_aggregate(AggregateSpec::new(AggregatorFunctionFactory::COUNT, 1));
    let units = vec![vec![page(&[0; 7], &[1; 7])], vec![page(&[0; 13], &[1; 13])], vec![]];
    let result = engine().execute(&query, units).unwrap();
    assert_eq!(result.scalar(), Some(Value::Long(20)));
    assert!(result.warnings.is_empty());
}

#[test]
fn no_units_is_an_empty_aggregation() {
    let query = Query::new()
        .with_aggregate(AggregateSpec::new(AggregatorFunctionFactory::COUNT, 0))
        .with_aggregate(AggregateSpec::new(factory(AggregationKind::Sum), 0));
    let result = engine().execute(&query, Vec::new()).unwrap();
    assert_eq!(result.rows(), vec![vec![Value::Long(0), Value::Null]]);
}

#[test]
fn overflow_surfaces_one_warning() {
    let query = add_columns().with_aggregate(AggregateSpec::new(AggregatorFunctionFactory::COUNT, 2));
    let units = (0..6)
        .map(|_| vec![page(&[i64::MAX, 1], &[1, 1])])
        .collect();
    let result = engine().execute(&query, units).unwrap();

    // the overflowing position is null and not counted
    assert_eq!(result.scalar(), Some(Value::Long(6)));
    assert_eq!(
        result.warnings,
        vec![
            "Line 1:8: evaluation of [k + v] failed, treating result as null. Only first 20 failures recorded."
                .to_string(),
            "Line 1:8: arithmetic error: long overflow".to_string(),
        ]
    );
}

#[test]
fn filter_and_collect_keeps_unit_order() {
    let query = Query::new().with_operator(|context| {
        let source = Source::synthetic("k >= 10");
        let resolved = resolve(BinaryOperator::Gte, &source, DataType::Long, DataType::Long).unwrap();
        let predicate = BinaryEvaluator::new(
            resolved,
            Box::new(strata::compute::expression::ChannelEvaluator::new(0)),
            Box::new(LiteralEvaluator::new(Value::Long(10))),
            context,
        );
        Box::new(FilterOperator::new(Box::new(predicate)))
    });
    let units = vec![
        vec![page(&[5, 10, 15], &[0, 1, 2])],
        vec![page(&[1, 2], &[3, 4])],
        vec![page(&[20], &[5])],
    ];
    let result = engine().execute(&query, units).unwrap();
    let kept: Vec<Value> = result.rows().into_iter().map(|row| row[1].clone()).collect();
    assert_eq!(kept, vec![Value::Long(1), Value::Long(2), Value::Long(5)]);
}

#[test]
fn grouped_partials_survive_json() {
    let engine = engine();
    let query = Query::new()
        .group_by(0)
        .with_aggregate(AggregateSpec::new(factory(AggregationKind::Sum), 1))
        .with_aggregate(AggregateSpec::new(factory(AggregationKind::Avg), 1));

    let mut rng = StdRng::seed_from_u64(42);
    let units: Vec<Vec<Page>> = (0..5)
        .map(|_| {
            let keys: Vec<i64> = (0..50).map(|_| rng.gen_range(0..4)).collect();
            let values: Vec<i64> = (0..50).map(|_| rng.gen_range(0..100)).collect();
            vec![page(&keys, &values)]
        })
        .collect();

    let expected = sorted(engine.execute(&query, units.clone()).unwrap().rows());

    let context = engine.context();
    let partials: Vec<PartialState> = units
        .into_iter()
        .rev()
        .map(|pages| {
            let json = engine.execute_partial(&context, &query, pages).unwrap().to_json().unwrap();
            PartialState::from_json(&json).unwrap()
        })
        .collect();
    let result = engine.finish(&context, &query, &partials).unwrap();
    assert_eq!(sorted(result.rows()), expected);
}

#[test]
fn partial_kinds_must_match() {
    let engine = engine();
    let context = engine.context();
    let grouped = Query::new()
        .group_by(0)
        .with_aggregate(AggregateSpec::new(AggregatorFunctionFactory::COUNT, 1));
    let global = Query::new().with_aggregate(AggregateSpec::new(AggregatorFunctionFactory::COUNT, 1));

    let partial = engine
        .execute_partial(&context, &grouped, vec![page(&[1], &[1])])
        .unwrap();
    let err = engine.finish(&context, &global, &[partial]).unwrap_err();
    assert!(matches!(err, Error::IncompatibleState { .. }));
}

#[test]
fn cancelled_query_fails() {
    let engine = engine();
    let context = engine.context();
    context.cancellation().cancel();
    let query = Query::new().with_aggregate(AggregateSpec::new(AggregatorFunctionFactory::COUNT, 0));
    let err = engine
        .execute_in(context, &query, vec![vec![page(&[1], &[1])]])
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled));
}

#[test]
fn invalid_config_is_rejected() {
    let err = Engine::with_config(ComputeConfig::default().with_parallelism(0)).err();
    assert!(matches!(err, Some(Error::InvalidConfig(_))));
}

fn sorted(mut rows: Vec<Vec<Value>>) -> Vec<Vec<Value>> {
    rows.sort_by_key(|row| row[0].as_i64());
    rows
}
