//! Transport adapters.

mod direct_transport;

use std::sync::Arc;

use courier_application::ports::{ProxyTransport, TransportError, TransportReply};
use courier_domain::RequestDescriptor;

pub use direct_transport::DirectTransport;

use crate::backend::RestBackend;

/// Transport chosen at startup.
#[derive(Debug, Clone)]
pub enum SelectedTransport {
    /// Through the backend proxy endpoint.
    Proxy(Arc<RestBackend>),
    /// Straight to the target.
    Direct(DirectTransport),
}

impl ProxyTransport for SelectedTransport {
    async fn dispatch(&self, request: &RequestDescriptor) -> Result<TransportReply, TransportError> {
        match self {
            Self::Proxy(backend) => backend.dispatch(request).await,
            Self::Direct(direct) => direct.dispatch(request).await,
        }
    }
}
