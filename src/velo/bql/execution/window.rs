//! Per-relation input buffers and window maintenance.
//!
//! Each relation in the FROM clause owns an [`InputBuffer`]: the tuples that
//! currently fall inside its window, ordered by arrival. [`WindowSet`] routes
//! incoming tuples into the matching buffers and evicts entries that left the
//! window, turning the unbounded input streams into finite relations.

use super::logical::{AliasedRelation, RangeUnit};
use super::types::{Tuple, Value, ValueMap};
use crate::velo::bql::error::{BqlError, BqlResult};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::mem;

/// A windowed queue of tuples for one participating relation
#[derive(Debug, Clone)]
pub struct InputBuffer {
    /// Buffered tuples in arrival order; each holds its data nested under the
    /// relation alias
    pub tuples: Vec<Tuple>,
    pub range_value: i64,
    pub range_unit: RangeUnit,
}

impl InputBuffer {
    pub fn new(range_value: i64, range_unit: RangeUnit) -> Self {
        let tuples = match range_unit {
            // required capacity is known up front for count windows
            RangeUnit::Tuples => Vec::with_capacity(range_value as usize + 1),
            RangeUnit::Seconds => Vec::new(),
        };
        Self {
            tuples,
            range_value,
            range_unit,
        }
    }

    /// Drop tuples that lie outside the window, relative to the event time of
    /// the tuple that triggered this update.
    pub fn evict(&mut self, current: DateTime<Utc>) {
        match self.range_unit {
            RangeUnit::Tuples => {
                let len = self.tuples.len();
                let keep = self.range_value as usize;
                if len > keep {
                    // keep the trailing `range_value` entries in order:
                    // {a, b, c, d} => {b, c, d}
                    self.tuples.drain(..len - keep);
                }
            }
            RangeUnit::Seconds => {
                // event time, not wall clock; the boundary is inclusive
                let range = Duration::seconds(self.range_value);
                self.tuples
                    .retain(|t| current.signed_duration_since(t.timestamp) <= range);
            }
        }
    }
}

/// All window buffers of one plan, keyed by relation alias
#[derive(Debug)]
pub struct WindowSet {
    buffers: HashMap<String, InputBuffer>,
    relations: Vec<AliasedRelation>,
}

impl WindowSet {
    pub fn new(relations: Vec<AliasedRelation>) -> BqlResult<Self> {
        let mut buffers = HashMap::with_capacity(relations.len());
        for rel in &relations {
            if rel.range_value <= 0 {
                return Err(BqlError::window_error(format!(
                    "relation '{}' declares a non-positive range {}",
                    rel.alias, rel.range_value
                )));
            }
            buffers.insert(
                rel.alias.clone(),
                InputBuffer::new(rel.range_value, rel.range_unit),
            );
        }
        Ok(Self { buffers, relations })
    }

    pub fn buffers(&self) -> &HashMap<String, InputBuffer> {
        &self.buffers
    }

    /// Append `tuple` to every buffer whose relation matches its input name,
    /// nesting the payload under the relation alias.
    ///
    /// A self-join matches more than one relation; every insertion gets its
    /// own copy so sibling buffers never alias each other's nested data. When
    /// no relation matches, the buffers are left untouched and the call fails.
    pub fn insert(&mut self, tuple: &Tuple) -> BqlResult<()> {
        let num_matches = self
            .relations
            .iter()
            .filter(|rel| rel.match_key() == tuple.input_name)
            .count();
        if num_matches == 0 {
            let known = self.relations.iter().map(|r| r.match_key()).collect();
            return Err(BqlError::unknown_input(&tuple.input_name, known));
        }
        for rel in &self.relations {
            if rel.match_key() != tuple.input_name {
                continue;
            }
            let mut entry = tuple.clone();
            let mut nested = ValueMap::new();
            nested.insert(rel.alias.clone(), Value::Map(mem::take(&mut entry.data)));
            entry.data = nested;
            if let Some(buffer) = self.buffers.get_mut(&rel.alias) {
                buffer.tuples.push(entry);
            }
        }
        Ok(())
    }

    /// Evict out-of-window tuples from every buffer.
    pub fn evict(&mut self, current: DateTime<Utc>) {
        for buffer in self.buffers.values_mut() {
            buffer.evict(current);
        }
    }
}
