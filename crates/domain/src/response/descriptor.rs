//! Response descriptor

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::request::KeyValueRow;

/// Label shown in place of a status code when nothing came back.
pub const NETWORK_ERROR_LABEL: &str = "Network error";

/// Outcome status of a send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    /// An HTTP status code was received.
    Code(u16),
    /// The transport failed or the reply could not be read.
    NetworkError,
}

impl ResponseStatus {
    /// Returns the numeric code, if any.
    #[must_use]
    pub const fn code(self) -> Option<u16> {
        match self {
            Self::Code(code) => Some(code),
            Self::NetworkError => None,
        }
    }

    /// Returns true for a 2xx code.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Code(code) if code >= 200 && code < 300)
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{code}"),
            Self::NetworkError => f.write_str(NETWORK_ERROR_LABEL),
        }
    }
}

/// The response view produced by a send or restored from a saved request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseDescriptor {
    /// Status code, or the network error marker.
    pub status: ResponseStatus,
    /// Reason phrase reported by the target (may be empty).
    #[serde(default)]
    pub status_text: String,
    /// Elapsed time in milliseconds, when measured.
    #[serde(default)]
    pub time_ms: Option<u64>,
    /// Response headers sorted case-insensitively by name.
    #[serde(default)]
    pub headers: Vec<KeyValueRow>,
    /// Display body.
    #[serde(default)]
    pub body: String,
}

impl ResponseDescriptor {
    /// Builds the synthetic response shown when a send fails before a reply.
    ///
    /// The body reads `Error: <message>\n\nDetails: <detail>`.
    #[must_use]
    pub fn network_error(message: &str, detail: &str, time_ms: u64) -> Self {
        Self {
            status: ResponseStatus::NetworkError,
            status_text: String::new(),
            time_ms: Some(time_ms),
            headers: Vec::new(),
            body: format!("Error: {message}\n\nDetails: {detail}"),
        }
    }

    /// Returns the status line, e.g. `200 OK` or `Network error`.
    #[must_use]
    pub fn status_line(&self) -> String {
        match self.status {
            ResponseStatus::NetworkError => NETWORK_ERROR_LABEL.to_string(),
            ResponseStatus::Code(code) => format!("{code} {}", self.status_text)
                .trim_end()
                .to_string(),
        }
    }

    /// Returns the elapsed time as a display string.
    #[must_use]
    pub fn time_display(&self) -> String {
        self.time_ms.map_or_else(String::new, |ms| format!("{ms} ms"))
    }
}
