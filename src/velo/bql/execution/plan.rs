//! Continuous-query execution plan: the stream-to-relation-to-stream cycle
//! for one compiled SELECT statement.
//!
//! After each input tuple the plan
//! - updates the window buffers so they hold exactly the current relation
//!   contents,
//! - asks the emit gate whether this input triggers an evaluation,
//! - runs the SELECT over the cross product of all buffers, and
//! - diffs the results against the previous run to produce the rows the
//!   configured emitter mode calls for.

use super::diff;
use super::emit::EmitGate;
use super::eval::Evaluator;
use super::group::{GroupAccumulator, GroupSet};
use super::logical::{EmitterKind, LogicalPlan, OutputPath};
use super::output::assign_output_value;
use super::product::for_each_joined_row;
use super::types::{Tuple, ValueMap};
use super::window::WindowSet;
use crate::velo::bql::error::{BqlError, BqlResult};
use crate::velo::bql::udf::{AggregateFunction, FunctionRegistry};
use std::collections::HashMap;
use std::mem;
use std::sync::Arc;

/// One aggregate column of a projection, with its function resolved
#[derive(Debug, Clone)]
struct PreparedAggregate {
    input: Arc<dyn Evaluator>,
    function_name: String,
    function: Arc<dyn AggregateFunction>,
}

/// A projection whose aggregate calls are resolved against the registry
#[derive(Debug, Clone)]
struct PreparedProjection {
    alias: OutputPath,
    evaluator: Arc<dyn Evaluator>,
    has_aggregate: bool,
    aggregates: HashMap<String, PreparedAggregate>,
}

/// Executes one continuous SELECT statement over a stream of input tuples.
///
/// The plan owns its window buffers, emit counters and the current/previous
/// result sets. [`process`](Self::process) is synchronous and not re-entrant;
/// the enclosing topology serializes calls to one plan instance.
#[derive(Debug)]
pub struct ContinuousQueryPlan {
    projections: Vec<PreparedProjection>,
    filter: Option<Arc<dyn Evaluator>>,
    group_list: Vec<Arc<dyn Evaluator>>,
    grouping: bool,
    emitter_kind: EmitterKind,
    gate: EmitGate,
    windows: WindowSet,
    /// Synthetic aggregate column names across all projections
    synthetic_columns: Vec<String>,
    /// Results of the last evaluation run
    cur_results: Vec<ValueMap>,
    /// Results of the run before that, for differential emission
    prev_results: Vec<ValueMap>,
}

impl ContinuousQueryPlan {
    /// Whether this executor can run the given plan. HAVING clauses are not
    /// supported here.
    pub fn can_build(plan: &LogicalPlan) -> bool {
        plan.having.is_none()
    }

    /// Build the runtime state for a compiled plan.
    ///
    /// Fails on time-based emit intervals, non-positive ranges or intervals,
    /// and aggregate function names the registry does not know.
    pub fn new(plan: LogicalPlan, registry: &dyn FunctionRegistry) -> BqlResult<Self> {
        let gate = EmitGate::new(&plan.emit_intervals)?;
        let windows = WindowSet::new(plan.relations)?;

        let mut projections = Vec::with_capacity(plan.projections.len());
        let mut synthetic_columns = Vec::new();
        for proj in plan.projections {
            let mut aggregates = HashMap::with_capacity(proj.aggregates.len());
            for (column, agg) in proj.aggregates {
                let function = registry.aggregate(&agg.function).ok_or_else(|| {
                    BqlError::aggregate_error(&agg.function, "not registered as an aggregate")
                })?;
                synthetic_columns.push(column.clone());
                aggregates.insert(
                    column,
                    PreparedAggregate {
                        input: agg.input,
                        function_name: agg.function,
                        function,
                    },
                );
            }
            projections.push(PreparedProjection {
                alias: proj.alias,
                evaluator: proj.evaluator,
                has_aggregate: proj.has_aggregate,
                aggregates,
            });
        }

        Ok(Self {
            projections,
            filter: plan.filter,
            group_list: plan.group_list,
            grouping: plan.grouping_stmt,
            emitter_kind: plan.emitter_kind,
            gate,
            windows,
            synthetic_columns,
            cur_results: Vec::new(),
            prev_results: Vec::new(),
        })
    }

    /// Feed one input tuple and return the rows to emit for it.
    ///
    /// An empty result means the gate did not fire or the differential was
    /// empty; row order within one call is unspecified. After an error the
    /// plan stays usable: the window update that already happened is kept, and
    /// the result sets behave as if this tuple's evaluation had been skipped.
    pub fn process(&mut self, tuple: &Tuple) -> BqlResult<Vec<ValueMap>> {
        // stream-to-relation: buffers are updated before the gate decision,
        // so a non-firing input still advances the windows
        self.windows.insert(tuple)?;
        self.windows.evict(tuple.timestamp);

        if !self.gate.should_fire(&tuple.input_name) {
            return Ok(Vec::new());
        }
        log::debug!("emit gate fired for input '{}'", tuple.input_name);

        // relation-to-relation: run the SELECT over the buffer contents
        self.evaluate_windows()?;

        // relation-to-stream: diff against the previous run
        Ok(diff::emitted_rows(
            self.emitter_kind,
            &self.cur_results,
            &self.prev_results,
        ))
    }

    /// Run the query over the current buffers, swapping result sets on
    /// success.
    ///
    /// On error the partial output becomes `prev_results`: the next run then
    /// writes into storage that is guaranteed distinct from `cur_results`,
    /// which keeps its rows from before this call.
    fn evaluate_windows(&mut self) -> BqlResult<()> {
        // reuse the previous run's allocation for the new output
        let mut output = mem::take(&mut self.prev_results);
        output.clear();

        match self.run_select(&mut output) {
            Ok(()) => {
                self.prev_results = mem::replace(&mut self.cur_results, output);
                Ok(())
            }
            Err(e) => {
                log::warn!("evaluation failed, keeping previous results: {}", e);
                self.prev_results = output;
                Err(e)
            }
        }
    }

    fn run_select(&self, output: &mut Vec<ValueMap>) -> BqlResult<()> {
        let mut groups = GroupSet::new();
        {
            let projections = &self.projections;
            let filter = self.filter.as_deref();
            let group_list = &self.group_list;
            let synthetic_columns = &self.synthetic_columns;
            let grouping = self.grouping;

            let mut on_row = |row: &ValueMap| -> BqlResult<()> {
                if let Some(filter) = filter {
                    let result = filter
                        .eval(row)
                        .map_err(|e| BqlError::filter_error(e.to_string()))?;
                    // a NULL filter result drops the row like `false`
                    if !result.to_bool()? {
                        return Ok(());
                    }
                }
                if grouping {
                    Self::stage_group_row(projections, group_list, synthetic_columns, &mut groups, row)
                } else {
                    output.push(Self::project_row(projections, row)?);
                    Ok(())
                }
            };
            for_each_joined_row(self.windows.buffers(), &mut on_row)?;
        }

        if self.grouping {
            for group in groups.groups.iter_mut() {
                output.push(self.finalize_group(group)?);
            }
        }
        Ok(())
    }

    /// Non-grouping mode: evaluate every projection against the joined row
    /// and assemble the output row.
    fn project_row(
        projections: &[PreparedProjection],
        row: &ValueMap,
    ) -> BqlResult<ValueMap> {
        let mut result = ValueMap::new();
        for proj in projections {
            let value = proj
                .evaluator
                .eval(row)
                .map_err(|e| BqlError::projection_error(proj.alias.to_string(), e.to_string()))?;
            assign_output_value(&mut result, &proj.alias, value)?;
        }
        Ok(result)
    }

    /// Grouping mode: compute the group key for the joined row and stage the
    /// aggregate inputs on the matching group.
    fn stage_group_row(
        projections: &[PreparedProjection],
        group_list: &[Arc<dyn Evaluator>],
        synthetic_columns: &[String],
        groups: &mut GroupSet,
        row: &ValueMap,
    ) -> BqlResult<()> {
        let mut key = Vec::with_capacity(group_list.len());
        for eval in group_list {
            let value = eval
                .eval(row)
                .map_err(|e| BqlError::group_key_error(e.to_string()))?;
            key.push(value);
        }
        let group = groups.find_or_create(key, row, synthetic_columns);

        // collect the aggregate input expressions, e.g. `a` and `b/2` for
        // `SELECT count(a) + max(b/2)`
        for proj in projections {
            if !proj.has_aggregate {
                continue;
            }
            for (column, agg) in &proj.aggregates {
                let value = agg.input.eval(row).map_err(|e| {
                    BqlError::aggregate_error(&agg.function_name, e.to_string())
                })?;
                group
                    .agg_inputs
                    .entry(column.clone())
                    .or_default()
                    .push(value);
            }
        }
        Ok(())
    }

    /// Fold each aggregate column into a scalar on the group's representative
    /// row, then evaluate the projections against it.
    fn finalize_group(&self, group: &mut GroupAccumulator) -> BqlResult<ValueMap> {
        let mut result = ValueMap::new();
        for proj in &self.projections {
            if proj.has_aggregate {
                for (column, agg) in &proj.aggregates {
                    let inputs = group.agg_inputs.remove(column).unwrap_or_default();
                    let value = agg.function.apply(&inputs).map_err(|e| {
                        BqlError::aggregate_error(&agg.function_name, e.to_string())
                    })?;
                    // aggregate references in the projection evaluator resolve
                    // through this synthetic column
                    group.row.insert(column.clone(), value);
                }
            }
            let value = proj
                .evaluator
                .eval(&group.row)
                .map_err(|e| BqlError::projection_error(proj.alias.to_string(), e.to_string()))?;
            assign_output_value(&mut result, &proj.alias, value)?;
        }
        Ok(result)
    }
}
