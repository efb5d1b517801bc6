//! Cross-product enumeration of all window buffers into joined rows.

use super::types::{metadata_key, Tuple, Value, ValueMap, META_PROC_TIMESTAMP, META_TIMESTAMP, META_TRACE};
use super::window::InputBuffer;
use crate::velo::bql::error::BqlResult;
use std::collections::HashMap;

/// Visit every combination of one tuple per buffer.
///
/// Each combination is presented as a single row holding the alias-nested
/// data of all participating tuples plus their per-alias metadata, shaped
/// like `{"streamA": {..}, "streamB": {..}, "streamA:meta:TS": ..}`. The row
/// is a scratch map reused across combinations; callbacks must copy what they
/// keep. Buffer iteration order is unspecified, and an empty buffer makes the
/// whole product empty.
pub fn for_each_joined_row(
    buffers: &HashMap<String, InputBuffer>,
    f: &mut dyn FnMut(&ValueMap) -> BqlResult<()>,
) -> BqlResult<()> {
    let keys: Vec<&str> = buffers.keys().map(String::as_str).collect();
    let mut scratch = ValueMap::new();
    visit(buffers, &keys, &mut scratch, f)
}

fn visit(
    buffers: &HashMap<String, InputBuffer>,
    remaining: &[&str],
    scratch: &mut ValueMap,
    f: &mut dyn FnMut(&ValueMap) -> BqlResult<()>,
) -> BqlResult<()> {
    if remaining.is_empty() {
        // one full combination is assembled in the scratch row
        return f(scratch);
    }
    let key = remaining[0];
    let rest = &remaining[1..];
    for tuple in &buffers[key].tuples {
        let alias_data = tuple.data.get(key).cloned().unwrap_or(Value::Null);
        scratch.insert(key.to_string(), alias_data);
        attach_metadata(scratch, key, tuple);
        visit(buffers, rest, scratch, f)?;
    }
    Ok(())
}

/// Expose the tuple metadata that meta-accessor evaluators read back.
fn attach_metadata(row: &mut ValueMap, alias: &str, tuple: &Tuple) {
    row.insert(
        metadata_key(alias, META_TIMESTAMP),
        Value::Timestamp(tuple.timestamp),
    );
    row.insert(
        metadata_key(alias, META_PROC_TIMESTAMP),
        Value::Timestamp(tuple.proc_timestamp),
    );
    row.insert(
        metadata_key(alias, META_TRACE),
        Value::Array(tuple.trace.clone()),
    );
}
