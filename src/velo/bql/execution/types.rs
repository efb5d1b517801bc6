//! Core dynamic data types for the continuous-query execution engine.
//!
//! This module contains the fundamental data types flowing through the engine:
//! - [`Value`] - The dynamic value type system carried by tuples and result rows
//! - [`Tuple`] - The unit of streaming input, one event on one input stream

use crate::velo::bql::error::{BqlError, BqlResult};
use chrono::{DateTime, SecondsFormat, Utc};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// An ordered map from field names to values.
///
/// Both tuple payloads and result rows are maps of this shape. Key order is
/// deterministic, so structural comparison and display output are stable.
pub type ValueMap = BTreeMap<String, Value>;

/// A dynamic value in a tuple or result row
///
/// Derived equality is the deep structural comparison used for group-key
/// lookup and differential emission; `Null == Null` holds there. SQL
/// three-valued comparison semantics are the expression evaluator's concern
/// and live outside this crate.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL
    Null,
    /// Boolean value (true/false)
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point number
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Event or processing timestamp with UTC offset
    Timestamp(DateTime<Utc>),
    /// Raw binary payload
    Blob(Vec<u8>),
    /// Sequence of values
    Array(Vec<Value>),
    /// Ordered key-value pairs
    Map(ValueMap),
}

impl Value {
    /// Get the type name for error messages and debugging
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "BOOL",
            Value::Int(_) => "INT",
            Value::Float(_) => "FLOAT",
            Value::String(_) => "STRING",
            Value::Timestamp(_) => "TIMESTAMP",
            Value::Blob(_) => "BLOB",
            Value::Array(_) => "ARRAY",
            Value::Map(_) => "MAP",
        }
    }

    /// Check if this value represents a numeric type
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Convert this value to a boolean for filter decisions
    ///
    /// NULL converts to false, so a NULL filter silently drops the row rather
    /// than failing the query. Non-scalar values are not coercible and return
    /// a type error.
    pub fn to_bool(&self) -> BqlResult<bool> {
        match self {
            Value::Null => Ok(false),
            Value::Bool(b) => Ok(*b),
            Value::Int(i) => Ok(*i != 0),
            Value::Float(f) => Ok(*f != 0.0),
            other => Err(BqlError::type_error(
                "BOOL",
                other.type_name(),
                Some(other.to_display_string()),
            )),
        }
    }

    /// Convert this value to a string representation for display
    ///
    /// Unlike Debug formatting, this provides clean, SQL-like output suitable
    /// for logs and error messages.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
            Value::Timestamp(ts) => ts.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            Value::Blob(bytes) => format!("<{} bytes>", bytes.len()),
            Value::Array(arr) => {
                let elements: Vec<String> = arr.iter().map(|v| v.to_display_string()).collect();
                format!("[{}]", elements.join(", "))
            }
            Value::Map(map) => {
                let pairs: Vec<String> = map
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, v.to_display_string()))
                    .collect();
                format!("{{{}}}", pairs.join(", "))
            }
        }
    }

    /// Total order over values, for callers that need deterministic row order
    ///
    /// Output row order within one `process` call is unspecified; callers that
    /// require an order sort on identifying columns with this comparison.
    /// Values of different types order by type rank (NULL first); the order
    /// between types is arbitrary but stable.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
            (Value::Blob(a), Value::Blob(b)) => a.cmp(b),
            (Value::Array(a), Value::Array(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    let ord = x.total_cmp(y);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a.len().cmp(&b.len())
            }
            (Value::Map(a), Value::Map(b)) => {
                for ((ka, va), (kb, vb)) in a.iter().zip(b.iter()) {
                    let ord = ka.cmp(kb);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                    let ord = va.total_cmp(vb);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a.len().cmp(&b.len())
            }
            (a, b) => a.type_rank().cmp(&b.type_rank()),
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) => 2,
            Value::Float(_) => 3,
            Value::String(_) => 4,
            Value::Timestamp(_) => 5,
            Value::Blob(_) => 6,
            Value::Array(_) => 7,
            Value::Map(_) => 8,
        }
    }

    /// Convert this value into its JSON representation
    ///
    /// Timestamps become RFC 3339 strings, blobs become arrays of byte values,
    /// and non-finite floats degrade to JSON null.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Timestamp(ts) => {
                serde_json::Value::String(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Value::Blob(bytes) => {
                serde_json::Value::Array(bytes.iter().map(|b| serde_json::Value::from(*b)).collect())
            }
            Value::Array(arr) => serde_json::Value::Array(arr.iter().map(|v| v.to_json()).collect()),
            Value::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Value {
    /// Build a dynamic value from parsed JSON. Integers that fit i64 stay
    /// integral, everything else numeric becomes a float.
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => {
                Value::Array(arr.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Name of the per-alias event timestamp metadata entry
pub const META_TIMESTAMP: &str = "TS";
/// Name of the per-alias processing timestamp metadata entry
pub const META_PROC_TIMESTAMP: &str = "PROC_TS";
/// Name of the per-alias trace metadata entry
pub const META_TRACE: &str = "TRACE";

/// Key under which a relation's tuple metadata is attached to a joined row.
///
/// Meta-accessor evaluators such as `ts()` read these entries back; the colon
/// keeps them out of the namespace reachable by ordinary field references.
pub fn metadata_key(alias: &str, name: &str) -> String {
    format!("{}:meta:{}", alias, name)
}

/// One event on one input stream
///
/// The execution core reads `data`, `input_name` and `timestamp`; the
/// remaining fields are transport metadata carried through untouched and
/// exposed to meta-accessors on joined rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Tuple {
    /// Payload of the event
    pub data: ValueMap,
    /// Identifier of the upstream stream this tuple arrived on
    pub input_name: String,
    /// Event time
    pub timestamp: DateTime<Utc>,
    /// Time the surrounding topology first saw the tuple
    pub proc_timestamp: DateTime<Utc>,
    /// Batch the tuple belongs to, assigned upstream
    pub batch_id: i64,
    /// Trace events accumulated on the tuple's way through the topology
    pub trace: Vec<Value>,
}

impl Tuple {
    /// Create a tuple with the given payload and event time; the processing
    /// timestamp starts out equal to the event time.
    pub fn new(input_name: impl Into<String>, data: ValueMap, timestamp: DateTime<Utc>) -> Self {
        Self {
            data,
            input_name: input_name.into(),
            timestamp,
            proc_timestamp: timestamp,
            batch_id: 0,
            trace: Vec::new(),
        }
    }
}
