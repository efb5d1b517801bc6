//! Logical-plan descriptor types consumed from the BQL analyzer.
//!
//! A [`LogicalPlan`] is the immutable description of one `SELECT` statement:
//! which relations participate and with which windows, how output columns are
//! computed, and how results are emitted. The analyzer builds it; this crate
//! only executes it.

use super::eval::Evaluator;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// How a relation in the FROM clause is fed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationKind {
    /// An ordinary named stream
    Stream,
    /// A user-defined stream function instance
    Udsf,
}

/// Unit of a window range or an emit interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeUnit {
    Tuples,
    Seconds,
}

/// Output mode of a continuous query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmitterKind {
    /// Emit rows newly appearing in the current result relation (ISTREAM)
    InsertStream,
    /// Emit rows that disappeared from the result relation (DSTREAM)
    DeleteStream,
    /// Emit the whole current result relation (RSTREAM)
    AllStream,
}

/// One windowed relation in the FROM clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasedRelation {
    pub name: String,
    /// Unique identifier of this relation's buffer; equals `name` unless the
    /// statement renames it with AS
    pub alias: String,
    pub kind: RelationKind,
    pub range_value: i64,
    pub range_unit: RangeUnit,
}

impl AliasedRelation {
    /// The input name a tuple must carry to enter this relation's buffer.
    ///
    /// Stream relations match on the stream name alone, so a self-join sees
    /// the same tuple under every alias. UDSF instances are addressed per
    /// alias, matching how the topology names their outputs.
    pub fn match_key(&self) -> String {
        match self.kind {
            RelationKind::Stream => self.name.clone(),
            RelationKind::Udsf => format!("{}/{}", self.name, self.alias),
        }
    }
}

/// Selector meaning "any input stream" in emit specs
pub const EMIT_ANY_SOURCE: &str = "*";

/// One `EVERY n TUPLES [IN source]` clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitSpec {
    /// Input stream name, or [`EMIT_ANY_SOURCE`] for stream-independent rules
    pub source: String,
    pub interval: i64,
    pub unit: RangeUnit,
}

/// One step of an output path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathStep {
    Key(String),
    Index(usize),
}

/// Where a projection writes its value in the output row
///
/// Paths may be nested (`a.c`, `a["d"]`, `b[1]`); assignment creates
/// intermediate maps and arrays as needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputPath {
    pub steps: Vec<PathStep>,
}

impl OutputPath {
    pub fn new(steps: Vec<PathStep>) -> Self {
        Self { steps }
    }

    /// A plain top-level column path
    pub fn key(name: impl Into<String>) -> Self {
        Self {
            steps: vec![PathStep::Key(name.into())],
        }
    }
}

impl fmt::Display for OutputPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            match step {
                PathStep::Key(k) if i == 0 => write!(f, "{}", k)?,
                PathStep::Key(k) => write!(f, ".{}", k)?,
                PathStep::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

/// One aggregate call inside a projection: the evaluator for its input
/// expression plus the name of the aggregate function to fold with
#[derive(Debug, Clone)]
pub struct AggregateExpr {
    pub input: Arc<dyn Evaluator>,
    pub function: String,
}

/// One SELECT list entry
#[derive(Debug, Clone)]
pub struct Projection {
    /// Output path; anonymous expressions get synthetic `col_1`, `col_2`, ...
    /// names from the analyzer in declaration order
    pub alias: OutputPath,
    /// Evaluator for the whole expression; aggregate references inside it
    /// resolve through the synthetic keys in `aggregates`
    pub evaluator: Arc<dyn Evaluator>,
    /// Whether the expression contains any aggregate call
    pub has_aggregate: bool,
    /// Aggregate calls keyed by their synthetic column name
    pub aggregates: HashMap<String, AggregateExpr>,
}

/// The compiled description of one continuous SELECT statement
#[derive(Debug, Clone)]
pub struct LogicalPlan {
    pub projections: Vec<Projection>,
    pub filter: Option<Arc<dyn Evaluator>>,
    /// GROUP BY expressions, in clause order
    pub group_list: Vec<Arc<dyn Evaluator>>,
    /// HAVING clause; plans carrying one are refused by this executor
    pub having: Option<Arc<dyn Evaluator>>,
    pub relations: Vec<AliasedRelation>,
    /// Empty means the default rule: fire on every input
    pub emit_intervals: Vec<EmitSpec>,
    pub emitter_kind: EmitterKind,
    pub grouping_stmt: bool,
}
