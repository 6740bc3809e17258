//! Request Builder
//!
//! Holds the editable request (method, URL, parameter and header rows, body)
//! and turns it into a canonical [`RequestDescriptor`]. Pure transformation,
//! no I/O.

use std::collections::BTreeMap;

use courier_domain::request::filled_rows;
use courier_domain::{
    BodyType, Environment, HttpMethod, KeyValueRow, RequestDescriptor, RequestPayload,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApplicationError, ApplicationResult};
use crate::variable_resolver::TemplateResolver;

/// Header name checked before injecting a content type.
const CONTENT_TYPE: &str = "Content-Type";

/// The request being composed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestBuilder {
    /// HTTP method.
    pub method: HttpMethod,
    /// URL as typed, possibly with `{{key}}` tokens.
    pub url: String,
    /// Query parameter rows in order.
    pub params: Vec<KeyValueRow>,
    /// Header rows in order.
    pub headers: Vec<KeyValueRow>,
    /// How `raw_body` is interpreted.
    pub body_type: BodyType,
    /// Body text.
    pub raw_body: String,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self {
            method: HttpMethod::Get,
            url: String::new(),
            params: Vec::new(),
            headers: vec![KeyValueRow::new("Accept", "application/json")],
            body_type: BodyType::Json,
            raw_body: String::new(),
        }
    }
}

impl RequestBuilder {
    /// Creates a builder for a method and URL, with no rows.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            params: Vec::new(),
            headers: Vec::new(),
            body_type: BodyType::Json,
            raw_body: String::new(),
        }
    }

    /// Sets the body type and text.
    #[must_use]
    pub fn with_body(mut self, body_type: BodyType, raw_body: impl Into<String>) -> Self {
        self.body_type = body_type;
        self.raw_body = raw_body.into();
        self
    }

    /// Appends a query parameter row.
    pub fn add_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.push(KeyValueRow::new(key, value));
    }

    /// Appends a header row.
    pub fn add_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.headers.push(KeyValueRow::new(key, value));
    }

    /// Replaces the value of the first header with this name (ignoring
    /// case), or appends a new row.
    pub fn set_header(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|row| row.key.trim().eq_ignore_ascii_case(key))
        {
            Some(row) => row.value = value,
            None => self.add_header(key, value),
        }
    }

    /// Removes the parameter row at `index`.
    pub fn remove_param(&mut self, index: usize) -> Option<KeyValueRow> {
        (index < self.params.len()).then(|| self.params.remove(index))
    }

    /// Removes the header row at `index`.
    pub fn remove_header(&mut self, index: usize) -> Option<KeyValueRow> {
        (index < self.headers.len()).then(|| self.headers.remove(index))
    }

    /// Returns the percent-encoded query string of the non-blank parameters.
    #[must_use]
    pub fn query_string(&self) -> String {
        filled_rows(&self.params)
            .map(|row| {
                format!(
                    "{}={}",
                    urlencoding::encode(&row.key),
                    urlencoding::encode(&row.value)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Returns the URL with the query string appended.
    #[must_use]
    pub fn compute_final_url(&self) -> String {
        append_query(&self.url, &self.query_string())
    }

    /// Returns the header map built from the non-blank header rows.
    ///
    /// Names compare case-insensitively; a later row replaces an earlier
    /// one, spelling included.
    #[must_use]
    pub fn header_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        for row in filled_rows(&self.headers) {
            let key = row.key.trim();
            map.retain(|existing: &String, _| !existing.eq_ignore_ascii_case(key));
            map.insert(key.to_string(), row.value.clone());
        }
        map
    }

    /// Builds the canonical request.
    ///
    /// Templates in the URL are resolved against `environment` before the
    /// query string is appended.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for an empty URL and `UnresolvedTemplate`
    /// when a token has no value.
    pub fn build_descriptor(
        &self,
        resolver: TemplateResolver,
        environment: Option<&Environment>,
    ) -> ApplicationResult<RequestDescriptor> {
        if self.url.trim().is_empty() {
            return Err(ApplicationError::ValidationError(
                "URL is required".to_string(),
            ));
        }

        let resolved = resolver.resolve(&self.url, environment).into_resolved()?;
        let mut headers = self.header_map();
        let body = self.method.allows_body().then(|| self.payload(&mut headers));

        Ok(RequestDescriptor {
            method: self.method,
            url: append_query(&resolved, &self.query_string()),
            headers,
            body,
        })
    }

    fn payload(&self, headers: &mut BTreeMap<String, String>) -> RequestPayload {
        if let Some(content_type) = self.body_type.default_content_type()
            && !headers.keys().any(|k| k.eq_ignore_ascii_case(CONTENT_TYPE))
        {
            headers.insert(CONTENT_TYPE.to_string(), content_type.to_string());
        }

        match self.body_type {
            BodyType::Json | BodyType::Text => RequestPayload::Raw(self.raw_body.clone()),
            BodyType::Form => RequestPayload::Form(self.raw_body.clone()),
        }
    }
}

fn append_query(url: &str, query: &str) -> String {
    if query.is_empty() {
        url.to_string()
    } else {
        let separator = if url.contains('?') { '&' } else { '?' };
        format!("{url}{separator}{query}")
    }
}
