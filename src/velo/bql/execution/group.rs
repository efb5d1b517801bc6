//! Aggregate staging state for grouped queries.

use super::types::{Value, ValueMap};
use std::collections::HashMap;

/// Staged state for one set of joined rows sharing GROUP BY values
#[derive(Debug, Clone)]
pub struct GroupAccumulator {
    /// The group key values, in GROUP BY clause order
    pub key: Vec<Value>,
    /// Collected inputs for each synthetic aggregate column
    pub agg_inputs: HashMap<String, Vec<Value>>,
    /// Representative row for evaluating non-aggregate projections; within a
    /// group those are assumed identical across member rows
    pub row: ValueMap,
}

/// All groups accumulated during a single evaluation run
#[derive(Debug, Default)]
pub struct GroupSet {
    pub groups: Vec<GroupAccumulator>,
}

impl GroupSet {
    pub fn new() -> Self {
        Self { groups: Vec::new() }
    }

    /// Find the group with this key, creating it when absent.
    ///
    /// Lookup is deep structural equality on the key array (NULL keys compare
    /// equal to NULL keys). A new group takes a copy of `row` as its
    /// representative and an empty input vector per synthetic column.
    pub fn find_or_create(
        &mut self,
        key: Vec<Value>,
        row: &ValueMap,
        synthetic_columns: &[String],
    ) -> &mut GroupAccumulator {
        if let Some(idx) = self.groups.iter().position(|g| g.key == key) {
            return &mut self.groups[idx];
        }
        let mut agg_inputs = HashMap::with_capacity(synthetic_columns.len());
        for column in synthetic_columns {
            agg_inputs.insert(column.clone(), Vec::new());
        }
        self.groups.push(GroupAccumulator {
            key,
            agg_inputs,
            row: row.clone(),
        });
        let idx = self.groups.len() - 1;
        &mut self.groups[idx]
    }
}
