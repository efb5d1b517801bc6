// Continuous BQL query support
// Provides windowed, differentially-emitting execution of SELECT statements

pub mod error;
pub mod execution;
pub mod udf;

// Re-export main API
pub use error::{BqlError, BqlResult};
pub use execution::{ContinuousQueryPlan, LogicalPlan, Tuple, Value, ValueMap};
pub use udf::{AggregateFunction, DefaultFunctionRegistry, FunctionRegistry};
