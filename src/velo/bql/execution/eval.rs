//! Evaluator contract consumed by the execution core.

use super::types::{Value, ValueMap};
use crate::velo::bql::error::BqlResult;
use std::fmt;

/// A compiled expression evaluated against a joined row.
///
/// Evaluators are produced by the plan analyzer outside this crate; the
/// execution core treats them as opaque. An evaluator must be pure on its
/// input row. It may read nested paths and the per-alias metadata entries the
/// cross-product driver writes (see [`super::types::metadata_key`]), which is
/// how meta-accessors such as `ts()` are implemented.
pub trait Evaluator: fmt::Debug + Send + Sync {
    /// Evaluate this expression against a row
    fn eval(&self, row: &ValueMap) -> BqlResult<Value>;
}
