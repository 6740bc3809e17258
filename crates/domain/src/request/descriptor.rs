//! Canonical request descriptor
//!
//! The fully resolved request handed to a transport: final URL with query
//! parameters applied, a flat header map and an optional body.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{HttpMethod, RequestPayload};

/// A request ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    /// HTTP method.
    pub method: HttpMethod,
    /// Final URL, templates resolved and query string appended.
    pub url: String,
    /// Header map. Later rows with the same name overwrite earlier ones.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Body, absent for GET/HEAD.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<RequestPayload>,
}

impl RequestDescriptor {
    /// Creates a descriptor without headers or body.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Returns true when a header with this name is set, ignoring case.
    #[must_use]
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.keys().any(|k| k.eq_ignore_ascii_case(name))
    }

    /// Returns the value of a header, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
