//! Persisted request snapshot

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::SavedRequestRef;
use crate::request::HttpMethod;

/// A request snapshot persisted by the backend together with its response.
///
/// Records fetched from the backend may omit headers, body and response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedRequest {
    /// Backend id.
    pub id: String,
    /// HTTP method as stored; unknown values load as GET.
    pub method: String,
    /// Final URL at save time.
    pub url: String,
    /// Request headers.
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,
    /// Raw request body.
    #[serde(default)]
    pub body: Option<String>,
    /// Response body shown at save time.
    #[serde(default)]
    pub response: Option<String>,
    /// Response status code.
    #[serde(default)]
    pub status: Option<u16>,
    /// Response reason phrase.
    #[serde(default)]
    pub status_text: Option<String>,
    /// Owning folder, if any.
    #[serde(default)]
    pub folder_id: Option<String>,
    /// Owning collection.
    #[serde(default)]
    pub collection_id: Option<String>,
}

impl SavedRequest {
    /// Returns the parsed method, falling back to GET.
    #[must_use]
    pub fn http_method(&self) -> HttpMethod {
        self.method.parse().unwrap_or_default()
    }

    /// Returns the sidebar reference for this request.
    #[must_use]
    pub fn to_ref(&self) -> SavedRequestRef {
        SavedRequestRef::new(
            self.id.clone(),
            self.method.clone(),
            self.url.clone(),
            self.folder_id.clone(),
        )
    }
}
