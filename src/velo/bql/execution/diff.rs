//! Differential emission: turning the current result relation back into a
//! stream by comparison with the previous run's results.

use super::logical::EmitterKind;
use super::types::ValueMap;

/// Rows to emit for `kind`, given the current and previous result sets.
///
/// Membership is deep structural equality. Multiplicities are not tracked: an
/// item occurring three times in `current` and once in `previous` does not
/// count as new.
pub fn emitted_rows(
    kind: EmitterKind,
    current: &[ValueMap],
    previous: &[ValueMap],
) -> Vec<ValueMap> {
    match kind {
        EmitterKind::AllStream => current.to_vec(),
        EmitterKind::InsertStream => current
            .iter()
            .filter(|row| !previous.iter().any(|prev| prev == *row))
            .cloned()
            .collect(),
        EmitterKind::DeleteStream => previous
            .iter()
            .filter(|row| !current.iter().any(|cur| cur == *row))
            .cloned()
            .collect(),
    }
}
