//! Direct transport using reqwest.
//!
//! Sends a canonical request straight to its target instead of through the
//! backend proxy, and assembles the proxy envelope locally.

use std::time::{Duration, Instant};

use courier_application::ports::{ProxyTransport, TransportError, TransportReply};
use courier_domain::response::{HeaderPair, RawHeaders};
use courier_domain::request::form_fields;
use courier_domain::{HttpMethod, KeyValueRow, ProxyEnvelope, RequestDescriptor, RequestPayload};
use reqwest::{Client, Method, Url};
use serde_json::Value;
use tracing::debug;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Transport that dispatches requests itself.
#[derive(Debug, Clone)]
pub struct DirectTransport {
    client: Client,
    timeout: Duration,
}

impl DirectTransport {
    /// Creates a transport with the given request timeout.
    ///
    /// Redirects are followed up to 10 times.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(concat!("Courier/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| TransportError::new("Failed to create HTTP client", e.to_string()))?;
        Ok(Self { client, timeout })
    }

    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }

    fn attach_body(
        builder: reqwest::RequestBuilder,
        request: &RequestDescriptor,
    ) -> Result<reqwest::RequestBuilder, TransportError> {
        match &request.body {
            None => Ok(builder),
            Some(RequestPayload::Raw(text)) => Ok(builder.body(text.clone())),
            Some(RequestPayload::Form(text)) => {
                let encoded = serde_urlencoded::to_string(form_fields(text))
                    .map_err(|e| TransportError::new("Invalid form body", e.to_string()))?;
                let builder = if request.has_header("content-type") {
                    builder
                } else {
                    builder.header("Content-Type", FORM_CONTENT_TYPE)
                };
                Ok(builder.body(encoded))
            }
        }
    }

    fn map_error(error: &reqwest::Error, timeout: Duration) -> TransportError {
        let message = if error.is_timeout() {
            format!("Request timed out after {} ms", timeout.as_millis())
        } else if error.is_connect() {
            "Connection failed".to_string()
        } else if error.is_redirect() {
            "Too many redirects".to_string()
        } else {
            "Request failed".to_string()
        };
        TransportError::new(message, error.to_string())
    }
}

impl ProxyTransport for DirectTransport {
    async fn dispatch(&self, request: &RequestDescriptor) -> Result<TransportReply, TransportError> {
        let url = Url::parse(&request.url)
            .map_err(|e| TransportError::new("Invalid URL", format!("{e}: {}", request.url)))?;

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url)
            .timeout(self.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        builder = Self::attach_body(builder, request)?;

        let started = Instant::now();
        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(&e, self.timeout))?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                HeaderPair::Row(KeyValueRow::new(
                    name.as_str(),
                    value.to_str().unwrap_or("<binary>"),
                ))
            })
            .collect();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::new("Failed to read the response body", e.to_string()))?;
        let elapsed = started.elapsed();
        debug!(status = status.as_u16(), elapsed = ?elapsed, "direct reply");

        Ok(TransportReply::Envelope(ProxyEnvelope {
            status: Some(status.as_u16()),
            status_text: status.canonical_reason().map(str::to_string),
            time_ms: Some(elapsed.as_secs_f64() * 1000.0),
            headers: Some(RawHeaders::Pairs(headers)),
            body: Value::String(text),
        }))
    }
}
