//! ID generation utilities.

use uuid::Uuid;

/// Generates a new time-ordered UUID (v7) as a string.
///
/// Used for every locally minted identifier: collections created while the
/// backend did not return an id, duplicated collections, history entries.
#[must_use]
pub fn generate_id() -> String {
    Uuid::now_v7().to_string()
}
