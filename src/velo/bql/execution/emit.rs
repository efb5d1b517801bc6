//! Emit gate: per-source counters deciding when an input triggers evaluation.

use super::logical::{EmitSpec, RangeUnit, EMIT_ANY_SOURCE};
use crate::velo::bql::error::{BqlError, BqlResult};
use std::collections::HashMap;

/// Counter-based decision whether an incoming tuple should trigger a run of
/// the query over the current window contents.
///
/// A wildcard rule covers `RSTREAM` and `EVERY n TUPLES` emitters and, when
/// present, takes precedence over per-source rules. Per-source rules implement
/// multi-source emitters like `EVERY 2 TUPLES IN src1, 3 TUPLES IN src2`,
/// where each source rolls its own counter.
#[derive(Debug, Clone)]
pub struct EmitGate {
    /// selector (input name or wildcard) to interval, in tuples
    rules: HashMap<String, i64>,
    counters: HashMap<String, i64>,
}

impl EmitGate {
    /// Build the gate from the plan's emit specs. With no specs the gate
    /// fires on every input. Time-based intervals need a timer source rather
    /// than counters and are refused here.
    pub fn new(specs: &[EmitSpec]) -> BqlResult<Self> {
        let mut rules = HashMap::with_capacity(specs.len().max(1));
        let mut counters = HashMap::with_capacity(specs.len().max(1));
        if specs.is_empty() {
            rules.insert(EMIT_ANY_SOURCE.to_string(), 1);
            counters.insert(EMIT_ANY_SOURCE.to_string(), 0);
        }
        for spec in specs {
            if spec.unit == RangeUnit::Seconds {
                return Err(BqlError::unsupported("time-based emit intervals"));
            }
            if spec.interval <= 0 {
                return Err(BqlError::plan_error(format!(
                    "emit interval for '{}' must be positive, got {}",
                    spec.source, spec.interval
                )));
            }
            rules.insert(spec.source.clone(), spec.interval);
            counters.insert(spec.source.clone(), 0);
        }
        Ok(Self { rules, counters })
    }

    /// Decide whether the tuple that arrived on `input_name` triggers an
    /// evaluation. Advances exactly one counter; the counter resets when it
    /// reaches its interval.
    pub fn should_fire(&mut self, input_name: &str) -> bool {
        if self.rules.contains_key(EMIT_ANY_SOURCE) {
            return self.advance(EMIT_ANY_SOURCE);
        }
        if self.rules.contains_key(input_name) {
            return self.advance(input_name);
        }
        // no wildcard rule and no rule for this source: never fire
        false
    }

    fn advance(&mut self, key: &str) -> bool {
        let interval = self.rules[key];
        let counter = self.counters.entry(key.to_string()).or_insert(0);
        *counter += 1;
        if *counter % interval == 0 {
            *counter = 0;
            return true;
        }
        false
    }
}
