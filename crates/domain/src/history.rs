//! Request History Domain Model
//!
//! A bounded, newest-first log of send outcomes.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::request::HttpMethod;
use crate::response::ResponseStatus;

/// Maximum number of entries kept in the history log.
pub const HISTORY_CAPACITY: usize = 25;

/// A single send outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unique identifier for this entry.
    pub id: String,
    /// HTTP method used.
    pub method: HttpMethod,
    /// The URL that was sent.
    pub url: String,
    /// Status code, or the network error marker.
    pub status: ResponseStatus,
    /// Elapsed time shown for the send, in milliseconds.
    pub time_ms: u64,
    /// When the send completed.
    pub completed_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Creates an entry stamped with a fresh id and the current time.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>, status: ResponseStatus, time_ms: u64) -> Self {
        Self {
            id: crate::generate_id(),
            method,
            url: url.into(),
            status,
            time_ms,
            completed_at: Utc::now(),
        }
    }
}

/// Newest-first history, never longer than [`HISTORY_CAPACITY`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryLog {
    entries: VecDeque<HistoryEntry>,
}

impl HistoryLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends an entry, evicting the oldest one past capacity.
    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        while self.entries.len() > HISTORY_CAPACITY {
            self.entries.pop_back();
        }
    }

    /// Returns the entries, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Returns the most recent entry.
    #[must_use]
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no send has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
