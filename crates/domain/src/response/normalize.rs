//! Proxy reply normalization
//!
//! The backend proxy answers with `{status, statusText, timeMs, headers, body}`
//! where `headers` is either a list of pairs or a name/value map and `body`
//! may be any JSON value. Everything here turns that into a
//! [`ResponseDescriptor`].

use std::cmp::Ordering;

use serde_json::{Map, Value};

use super::{ResponseDescriptor, ResponseStatus};
use crate::request::KeyValueRow;

/// A single header as it may appear in a pair list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderPair {
    /// `{"k": "...", "v": "..."}`
    Row(KeyValueRow),
    /// `{"name": "...", "value": "..."}`
    Named {
        /// Header name.
        name: String,
        /// Header value.
        value: String,
    },
    /// `["name", "value"]`
    Tuple(String, String),
}

impl HeaderPair {
    /// Reads one pair-list item. Items without a string name are skipped;
    /// values of any type are rendered as text.
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(mut fields) => {
                if let Some(Value::String(key)) = fields.remove("k") {
                    let value = fields.remove("v").map(header_value).unwrap_or_default();
                    return Some(Self::Row(KeyValueRow::new(key, value)));
                }
                match fields.remove("name") {
                    Some(Value::String(name)) => Some(Self::Named {
                        name,
                        value: fields.remove("value").map(header_value).unwrap_or_default(),
                    }),
                    _ => None,
                }
            }
            Value::Array(items) => {
                let mut items = items.into_iter();
                match (items.next(), items.next()) {
                    (Some(Value::String(name)), value) => {
                        Some(Self::Tuple(name, value.map(header_value).unwrap_or_default()))
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }

    fn into_row(self) -> KeyValueRow {
        match self {
            Self::Row(row) => row,
            Self::Named { name, value } | Self::Tuple(name, value) => KeyValueRow::new(name, value),
        }
    }
}

/// Headers as reported by the proxy.
#[derive(Debug, Clone, PartialEq)]
pub enum RawHeaders {
    /// Ordered list of pairs.
    Pairs(Vec<HeaderPair>),
    /// Name to value map.
    Map(Map<String, Value>),
}

impl RawHeaders {
    /// Reads a `headers` field; anything but a list or an object is ignored.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Array(items) => Some(Self::Pairs(
                items.into_iter().filter_map(HeaderPair::from_value).collect(),
            )),
            Value::Object(map) => Some(Self::Map(map)),
            _ => None,
        }
    }
}

/// The JSON envelope returned by the proxy endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProxyEnvelope {
    /// Status code of the proxied response.
    pub status: Option<u16>,
    /// Reason phrase of the proxied response.
    pub status_text: Option<String>,
    /// Server-measured time in milliseconds.
    pub time_ms: Option<f64>,
    /// Response headers.
    pub headers: Option<RawHeaders>,
    /// Response body in any JSON shape.
    pub body: Value,
}

impl ProxyEnvelope {
    /// Reads an envelope field by field.
    ///
    /// A field of an unexpected type counts as absent, so one odd field never
    /// hides the others. Returns `None` when the value is not an object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut fields) = value else {
            return None;
        };
        Some(Self {
            status: fields.get("status").and_then(status_code),
            status_text: fields
                .get("statusText")
                .and_then(Value::as_str)
                .map(str::to_string),
            // Only a number is a server time.
            time_ms: fields.get("timeMs").and_then(Value::as_f64),
            headers: fields.remove("headers").and_then(RawHeaders::from_value),
            body: fields.remove("body").unwrap_or_default(),
        })
    }

    /// Decodes the text of a proxy reply.
    ///
    /// Replies that are not a JSON object fall back to the raw text with the
    /// HTTP status of the proxy call itself.
    #[must_use]
    pub fn decode_reply(
        http_status: u16,
        http_status_text: &str,
        text: &str,
        elapsed_ms: u64,
    ) -> ResponseDescriptor {
        let envelope = serde_json::from_str::<Value>(text)
            .ok()
            .and_then(Self::from_value);
        match envelope {
            Some(envelope) => envelope.into_response(http_status, http_status_text, elapsed_ms),
            None => ResponseDescriptor {
                status: ResponseStatus::Code(http_status),
                status_text: http_status_text.to_string(),
                time_ms: Some(elapsed_ms),
                headers: Vec::new(),
                body: text.to_string(),
            },
        }
    }

    /// Converts the envelope into a response view.
    ///
    /// Zero or missing status and empty status text fall back to the values
    /// of the carrying HTTP response. A server-reported time wins over the
    /// locally measured one.
    #[must_use]
    pub fn into_response(
        self,
        http_status: u16,
        http_status_text: &str,
        elapsed_ms: u64,
    ) -> ResponseDescriptor {
        let code = self.status.filter(|code| *code != 0).unwrap_or(http_status);
        let status_text = self
            .status_text
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| http_status_text.to_string());

        ResponseDescriptor {
            status: ResponseStatus::Code(code),
            status_text,
            time_ms: Some(server_time(self.time_ms).unwrap_or(elapsed_ms)),
            headers: normalize_headers(self.headers),
            body: normalize_body(&self.body),
        }
    }
}

/// Status codes arrive as numbers or numeric strings.
fn status_code(value: &Value) -> Option<u16> {
    match value {
        Value::Number(number) => number.as_u64().and_then(|code| u16::try_from(code).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn server_time(time_ms: Option<f64>) -> Option<u64> {
    time_ms
        .filter(|ms| ms.is_finite() && *ms >= 0.0)
        .map(|ms| ms.round() as u64)
}

/// Flattens proxy headers into rows sorted case-insensitively by name.
///
/// The sort is stable, so repeated names keep their reported order.
#[must_use]
pub fn normalize_headers(headers: Option<RawHeaders>) -> Vec<KeyValueRow> {
    let mut rows: Vec<KeyValueRow> = match headers {
        None => Vec::new(),
        Some(RawHeaders::Pairs(pairs)) => pairs.into_iter().map(HeaderPair::into_row).collect(),
        Some(RawHeaders::Map(map)) => map
            .into_iter()
            .map(|(name, value)| KeyValueRow::new(name, header_value(value)))
            .collect(),
    };
    rows.sort_by(|a, b| compare_names(&a.key, &b.key));
    rows
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn header_value(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        Value::Array(items) => items
            .into_iter()
            .map(header_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// Renders a proxy body for display.
///
/// Null becomes empty, objects and arrays are pretty-printed, strings holding
/// JSON are re-indented, any other string is kept verbatim.
#[must_use]
pub fn normalize_body(body: &Value) -> String {
    match body {
        Value::Null => String::new(),
        Value::Object(_) | Value::Array(_) => pretty_json(body),
        Value::String(text) => serde_json::from_str::<Value>(text)
            .map_or_else(|_| text.clone(), |parsed| pretty_json(&parsed)),
        other => other.to_string(),
    }
}

/// Pretty-prints a JSON value with two-space indentation.
#[must_use]
pub fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
