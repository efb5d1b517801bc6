pub mod diff;
pub mod emit;
pub mod eval;
pub mod group;
pub mod logical;
pub mod output;
pub mod plan;
pub mod product;
pub mod types;
pub mod window;

pub use eval::Evaluator;
pub use logical::{
    AggregateExpr, AliasedRelation, EmitSpec, EmitterKind, LogicalPlan, OutputPath, PathStep,
    Projection, RangeUnit, RelationKind, EMIT_ANY_SOURCE,
};
pub use plan::ContinuousQueryPlan;
pub use types::{
    metadata_key, Tuple, Value, ValueMap, META_PROC_TIMESTAMP, META_TIMESTAMP, META_TRACE,
};
