//! Continuous-query execution core for BQL streaming SQL.
//!
//! This library implements the stream-to-relation-to-stream processing cycle
//! for a single compiled `SELECT` statement: windowed buffering of input
//! tuples, relational evaluation over the cross product of all window
//! contents, and differential emission of result rows.

pub mod velo;

// Re-export main API
pub use velo::bql::error::{BqlError, BqlResult};
pub use velo::bql::execution::{
    ContinuousQueryPlan, EmitterKind, Evaluator, LogicalPlan, Tuple, Value, ValueMap,
};
pub use velo::bql::udf::{AggregateFunction, DefaultFunctionRegistry, FunctionRegistry};

// Version and feature info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const FEATURES: &[&str] = &[
    "count_windows",
    "time_windows",
    "cross_joins",       // multi-relation FROM clauses incl. self-joins
    "grouped_aggregation",
    "differential_emitters", // ISTREAM / DSTREAM / RSTREAM
    "emit_gates",        // EVERY n TUPLES, per-source or wildcard
];
