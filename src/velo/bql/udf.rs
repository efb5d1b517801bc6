//! Function registry surface consumed by the execution core.
//!
//! Scalar functions are compiled into evaluators by the analyzer before a
//! plan reaches this crate, so only aggregate dispatch matters here: the plan
//! captures each aggregate call's function name and resolves it against a
//! [`FunctionRegistry`] at construction time.

use crate::velo::bql::error::BqlResult;
use crate::velo::bql::execution::types::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// An aggregate function folding the staged inputs of one group into a scalar
pub trait AggregateFunction: fmt::Debug + Send + Sync {
    fn apply(&self, inputs: &[Value]) -> BqlResult<Value>;
}

/// Lookup of aggregate functions by name (case-insensitive)
pub trait FunctionRegistry: fmt::Debug + Send + Sync {
    fn aggregate(&self, name: &str) -> Option<Arc<dyn AggregateFunction>>;
}

/// Counts the collected inputs, NULLs included
#[derive(Debug, Clone, Copy)]
pub struct CountAggregate;

impl AggregateFunction for CountAggregate {
    fn apply(&self, inputs: &[Value]) -> BqlResult<Value> {
        Ok(Value::Int(inputs.len() as i64))
    }
}

/// Registry holding the built-in aggregates.
///
/// `count` is the only aggregate shipped with the engine; embedding code
/// registers further functions under their BQL names.
#[derive(Debug, Clone)]
pub struct DefaultFunctionRegistry {
    aggregates: HashMap<String, Arc<dyn AggregateFunction>>,
}

impl DefaultFunctionRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            aggregates: HashMap::new(),
        };
        registry.register_aggregate("count", Arc::new(CountAggregate));
        registry
    }

    pub fn register_aggregate(&mut self, name: &str, function: Arc<dyn AggregateFunction>) {
        self.aggregates.insert(name.to_lowercase(), function);
    }
}

impl Default for DefaultFunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRegistry for DefaultFunctionRegistry {
    fn aggregate(&self, name: &str) -> Option<Arc<dyn AggregateFunction>> {
        self.aggregates.get(&name.to_lowercase()).cloned()
    }
}
