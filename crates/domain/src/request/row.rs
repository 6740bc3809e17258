//! Key/value rows for query parameters, headers and response headers

use serde::{Deserialize, Serialize};

/// A single editable key/value row.
///
/// Serialized with the short `k`/`v` field names used by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyValueRow {
    /// Row key (parameter or header name).
    #[serde(rename = "k")]
    pub key: String,
    /// Row value.
    #[serde(rename = "v", default)]
    pub value: String,
}

impl KeyValueRow {
    /// Creates a new row.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Returns true when the key is empty after trimming.
    ///
    /// Blank rows are kept for editing but never reach a request.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.key.trim().is_empty()
    }
}

/// Returns an iterator over the rows that carry a key.
pub fn filled_rows(rows: &[KeyValueRow]) -> impl Iterator<Item = &KeyValueRow> {
    rows.iter().filter(|row| !row.is_blank())
}
