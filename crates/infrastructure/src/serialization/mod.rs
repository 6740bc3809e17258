//! Deterministic JSON serialization for the local state file.
//!
//! Keys are sorted (via `BTreeMap`), indentation is two spaces and the
//! output ends with a newline, so the file diffs cleanly.

mod json;

pub use json::*;
