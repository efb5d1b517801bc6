#![allow(dead_code)]

//! Shared fixtures for the continuous-query integration suites: tuple
//! factories, hand-built evaluators standing in for the analyzer's compiled
//! expressions, and row comparison helpers.

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use velobql::velo::bql::error::{BqlError, BqlResult};
use velobql::velo::bql::execution::{
    AggregateExpr, AliasedRelation, ContinuousQueryPlan, EmitSpec, EmitterKind, Evaluator,
    LogicalPlan, OutputPath, Projection, RangeUnit, RelationKind, Tuple, Value, ValueMap,
};
use velobql::velo::bql::udf::DefaultFunctionRegistry;

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// `n` tuples on stream "src", one second apart, with payload `{"int": i+1}`.
pub fn test_tuples(n: usize) -> Vec<Tuple> {
    (0..n)
        .map(|i| {
            let mut data = ValueMap::new();
            data.insert("int".to_string(), Value::Int(i as i64 + 1));
            Tuple::new("src", data, base_time() + Duration::seconds(i as i64))
        })
        .collect()
}

/// Build a result row from a JSON object literal.
pub fn row(json: serde_json::Value) -> ValueMap {
    match Value::from(json) {
        Value::Map(map) => map,
        other => panic!("expected a JSON object, got {:?}", other),
    }
}

/// Assert two row sets are equal modulo ordering (row order within one
/// `process` call is unspecified).
pub fn assert_rows_eq(mut actual: Vec<ValueMap>, mut expected: Vec<ValueMap>, context: &str) {
    sort_rows(&mut actual);
    sort_rows(&mut expected);
    assert_eq!(actual, expected, "row mismatch in {}", context);
}

pub fn sort_rows(rows: &mut [ValueMap]) {
    rows.sort_by(|a, b| Value::Map(a.clone()).total_cmp(&Value::Map(b.clone())));
}

/// Evaluator returning a fixed value.
#[derive(Debug, Clone)]
pub struct Const(pub Value);

impl Evaluator for Const {
    fn eval(&self, _row: &ValueMap) -> BqlResult<Value> {
        Ok(self.0.clone())
    }
}

/// Evaluator reading a (possibly nested) key path from the joined row.
#[derive(Debug, Clone)]
pub struct Field(pub Vec<String>);

impl Evaluator for Field {
    fn eval(&self, top: &ValueMap) -> BqlResult<Value> {
        let mut current: Option<&Value> = None;
        for (i, key) in self.0.iter().enumerate() {
            let next = if i == 0 {
                top.get(key)
            } else {
                match current {
                    Some(Value::Map(map)) => map.get(key),
                    _ => None,
                }
            };
            current = Some(next.ok_or_else(|| {
                BqlError::eval_error(format!("field '{}' not found", self.0.join(".")))
            })?);
        }
        current
            .cloned()
            .ok_or_else(|| BqlError::eval_error("empty field path"))
    }
}

/// Integer addition of two sub-expressions.
#[derive(Debug)]
pub struct Add(pub Arc<dyn Evaluator>, pub Arc<dyn Evaluator>);

impl Evaluator for Add {
    fn eval(&self, row: &ValueMap) -> BqlResult<Value> {
        match (self.0.eval(row)?, self.1.eval(row)?) {
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a + b)),
            (a, b) => Err(BqlError::eval_error(format!(
                "cannot add {} and {}",
                a.type_name(),
                b.type_name()
            ))),
        }
    }
}

/// Structural equality of two sub-expressions.
#[derive(Debug)]
pub struct Equals(pub Arc<dyn Evaluator>, pub Arc<dyn Evaluator>);

impl Evaluator for Equals {
    fn eval(&self, row: &ValueMap) -> BqlResult<Value> {
        Ok(Value::Bool(self.0.eval(row)? == self.1.eval(row)?))
    }
}

pub fn constant(value: Value) -> Arc<dyn Evaluator> {
    Arc::new(Const(value))
}

pub fn field(path: &[&str]) -> Arc<dyn Evaluator> {
    Arc::new(Field(path.iter().map(|s| s.to_string()).collect()))
}

pub fn add(a: Arc<dyn Evaluator>, b: Arc<dyn Evaluator>) -> Arc<dyn Evaluator> {
    Arc::new(Add(a, b))
}

pub fn plus_int(expr: Arc<dyn Evaluator>, delta: i64) -> Arc<dyn Evaluator> {
    add(expr, constant(Value::Int(delta)))
}

pub fn equals(a: Arc<dyn Evaluator>, b: Arc<dyn Evaluator>) -> Arc<dyn Evaluator> {
    Arc::new(Equals(a, b))
}

pub fn stream_relation(
    name: &str,
    alias: &str,
    range_value: i64,
    range_unit: RangeUnit,
) -> AliasedRelation {
    AliasedRelation {
        name: name.to_string(),
        alias: alias.to_string(),
        kind: RelationKind::Stream,
        range_value,
        range_unit,
    }
}

pub fn projection(alias: &str, evaluator: Arc<dyn Evaluator>) -> Projection {
    Projection {
        alias: OutputPath::key(alias),
        evaluator,
        has_aggregate: false,
        aggregates: HashMap::new(),
    }
}

pub fn path_projection(path: OutputPath, evaluator: Arc<dyn Evaluator>) -> Projection {
    Projection {
        alias: path,
        evaluator,
        has_aggregate: false,
        aggregates: HashMap::new(),
    }
}

/// A projection with one aggregate call staged under `synthetic_column`.
pub fn aggregate_projection(
    alias: &str,
    evaluator: Arc<dyn Evaluator>,
    synthetic_column: &str,
    input: Arc<dyn Evaluator>,
    function: &str,
) -> Projection {
    let mut aggregates = HashMap::new();
    aggregates.insert(
        synthetic_column.to_string(),
        AggregateExpr {
            input,
            function: function.to_string(),
        },
    );
    Projection {
        alias: OutputPath::key(alias),
        evaluator,
        has_aggregate: true,
        aggregates,
    }
}

/// A minimal plan over the given relations with default emitter behavior.
pub fn select_plan(
    projections: Vec<Projection>,
    relations: Vec<AliasedRelation>,
    emitter_kind: EmitterKind,
) -> LogicalPlan {
    LogicalPlan {
        projections,
        filter: None,
        group_list: Vec::new(),
        having: None,
        relations,
        emit_intervals: Vec::new(),
        emitter_kind,
        grouping_stmt: false,
    }
}

pub fn every_tuples(source: &str, interval: i64) -> EmitSpec {
    EmitSpec {
        source: source.to_string(),
        interval,
        unit: RangeUnit::Tuples,
    }
}

pub fn build(plan: LogicalPlan) -> ContinuousQueryPlan {
    ContinuousQueryPlan::new(plan, &DefaultFunctionRegistry::new())
        .expect("plan should build")
}
