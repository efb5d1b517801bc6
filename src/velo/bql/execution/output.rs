//! Output-row assembly: writing projected values under nested paths.

use super::logical::{OutputPath, PathStep};
use super::types::{Value, ValueMap};
use crate::velo::bql::error::{BqlError, BqlResult};

/// Write `value` into `row` at `path`, creating intermediate maps and arrays
/// as needed. Sparse array writes pad the gap with NULLs; descending into an
/// existing value of the wrong shape fails.
pub fn assign_output_value(row: &mut ValueMap, path: &OutputPath, value: Value) -> BqlResult<()> {
    let steps = path.steps.as_slice();
    if steps.is_empty() {
        return Err(BqlError::plan_error("projection has an empty output path"));
    }
    let key = match &steps[0] {
        PathStep::Key(k) => k,
        PathStep::Index(_) => {
            return Err(BqlError::projection_error(
                path.to_string(),
                "output paths must start with a map key",
            ));
        }
    };
    let rest = &steps[1..];
    if rest.is_empty() {
        row.insert(key.clone(), value);
        return Ok(());
    }
    let slot = row
        .entry(key.clone())
        .or_insert_with(|| empty_container(&rest[0]));
    assign_into(slot, rest, value, path)
}

fn empty_container(step: &PathStep) -> Value {
    match step {
        PathStep::Key(_) => Value::Map(ValueMap::new()),
        PathStep::Index(_) => Value::Array(Vec::new()),
    }
}

fn assign_into(
    container: &mut Value,
    steps: &[PathStep],
    value: Value,
    path: &OutputPath,
) -> BqlResult<()> {
    let step = &steps[0];
    let rest = &steps[1..];
    match step {
        PathStep::Key(k) => {
            let map = match container {
                Value::Map(m) => m,
                other => {
                    return Err(BqlError::projection_error(
                        path.to_string(),
                        format!("cannot write key '{}' into {}", k, other.type_name()),
                    ));
                }
            };
            if rest.is_empty() {
                map.insert(k.clone(), value);
                return Ok(());
            }
            let slot = map
                .entry(k.clone())
                .or_insert_with(|| empty_container(&rest[0]));
            assign_into(slot, rest, value, path)
        }
        PathStep::Index(idx) => {
            let array = match container {
                Value::Array(a) => a,
                other => {
                    return Err(BqlError::projection_error(
                        path.to_string(),
                        format!("cannot write index [{}] into {}", idx, other.type_name()),
                    ));
                }
            };
            if array.len() <= *idx {
                array.resize(idx + 1, Value::Null);
            }
            if rest.is_empty() {
                array[*idx] = value;
                return Ok(());
            }
            // a padded NULL slot becomes a fresh container on descent
            if matches!(array[*idx], Value::Null) {
                array[*idx] = empty_container(&rest[0]);
            }
            assign_into(&mut array[*idx], rest, value, path)
        }
    }
}
