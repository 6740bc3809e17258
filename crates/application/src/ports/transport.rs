//! Proxy transport port

use std::future::Future;

use courier_domain::{ProxyEnvelope, RequestDescriptor};
use thiserror::Error;

/// A dispatch that produced no usable reply.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    /// Short description shown first.
    pub message: String,
    /// Underlying cause, shown as details.
    pub detail: String,
}

impl TransportError {
    /// Creates a transport error.
    #[must_use]
    pub fn new(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: detail.into(),
        }
    }
}

/// What came back from a dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportReply {
    /// Raw HTTP reply of the backend proxy endpoint, to be decoded.
    Proxied {
        /// HTTP status of the proxy call.
        status: u16,
        /// Reason phrase of the proxy call.
        status_text: String,
        /// Body text.
        text: String,
    },
    /// An envelope the transport assembled itself.
    Envelope(ProxyEnvelope),
}

/// Port for sending a canonical request to its target.
pub trait ProxyTransport: Send + Sync {
    /// Sends the request and returns the reply.
    ///
    /// # Errors
    ///
    /// Returns a `TransportError` when nothing usable came back.
    fn dispatch(
        &self,
        request: &RequestDescriptor,
    ) -> impl Future<Output = Result<TransportReply, TransportError>> + Send;
}
