//! HTTP Request body types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DomainError, DomainResult};

/// How the raw body text is interpreted when a request is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BodyType {
    /// JSON text, sent verbatim with `application/json`.
    #[default]
    Json,
    /// Plain text, sent verbatim with `text/plain`.
    Text,
    /// A JSON object whose entries become form fields.
    Form,
}

impl BodyType {
    /// Returns the content type injected for this body type, if any.
    ///
    /// Form bodies get their content type from the transport.
    #[must_use]
    pub const fn default_content_type(self) -> Option<&'static str> {
        match self {
            Self::Json => Some("application/json"),
            Self::Text => Some("text/plain"),
            Self::Form => None,
        }
    }

    /// Returns the lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
            Self::Form => "form",
        }
    }
}

impl fmt::Display for BodyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BodyType {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            "form" => Ok(Self::Form),
            other => Err(DomainError::UnsupportedBodyType(other.to_string())),
        }
    }
}

/// Field used when a form body is not a JSON object.
pub const FALLBACK_FORM_FIELD: &str = "data";

/// The body attached to a canonical request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum RequestPayload {
    /// Raw text sent as-is.
    Raw(String),
    /// Form body as typed, normally a JSON object of fields.
    ///
    /// Each transport encodes it: urlencoded via [`form_fields`] when sent
    /// directly, as [`form_json`] through the proxy.
    Form(String),
}

impl RequestPayload {
    /// Returns the raw text if this is a raw payload.
    #[must_use]
    pub fn as_raw(&self) -> Option<&str> {
        match self {
            Self::Raw(text) => Some(text),
            Self::Form(_) => None,
        }
    }

    /// Returns the form text if this is a form payload.
    #[must_use]
    pub fn as_form(&self) -> Option<&str> {
        match self {
            Self::Form(text) => Some(text),
            Self::Raw(_) => None,
        }
    }
}

/// Splits a form body into fields.
///
/// A JSON object becomes one field per entry, strings verbatim and other
/// values as JSON text. Anything else is sent as a single `data` field.
#[must_use]
pub fn form_fields(raw: &str) -> Vec<(String, String)> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(text) => text,
                    other => other.to_string(),
                };
                (key, value)
            })
            .collect(),
        _ => vec![(FALLBACK_FORM_FIELD.to_string(), raw.to_string())],
    }
}

/// Returns a form body as JSON: the parsed value, or the raw text as a
/// string when it does not parse.
#[must_use]
pub fn form_json(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
