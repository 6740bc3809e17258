//! Proxy Execution Client
//!
//! Sends a canonical request through a [`ProxyTransport`], turns whatever
//! comes back into a [`ResponseDescriptor`] and records one history entry per
//! dispatched send. Transport failures never surface as errors: they become
//! a synthetic `Network error` response.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use courier_domain::{
    HistoryEntry, HistoryLog, ProxyEnvelope, RequestDescriptor, ResponseDescriptor,
};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::{CoreEvent, Notifier, ProxyTransport, TransportReply};

/// History log shared between clients. Entries are appended on completion.
pub type SharedHistory = Arc<RwLock<HistoryLog>>;

/// Creates an empty shared history.
#[must_use]
pub fn shared_history() -> SharedHistory {
    Arc::new(RwLock::new(HistoryLog::new()))
}

/// Marks a client busy for as long as it is alive.
struct SendPermit<'a> {
    flag: &'a AtomicBool,
}

impl<'a> SendPermit<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for SendPermit<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Sends requests one at a time and records their outcome.
pub struct ProxyExecutionClient<T: ProxyTransport> {
    transport: Arc<T>,
    history: SharedHistory,
    notifier: Arc<dyn Notifier>,
    in_flight: AtomicBool,
}

impl<T: ProxyTransport> ProxyExecutionClient<T> {
    /// Creates a client writing to the given history.
    pub fn new(transport: Arc<T>, history: SharedHistory, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            transport,
            history,
            notifier,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Returns the shared history.
    #[must_use]
    pub const fn history(&self) -> &SharedHistory {
        &self.history
    }

    /// Returns true while a send is outstanding.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Sends a request and returns the response view.
    ///
    /// The server-reported time wins over the locally measured one. The
    /// history entry carries the same time as the response.
    ///
    /// # Errors
    ///
    /// Only `SendInFlight`, when another send on this client has not
    /// finished. Nothing is dispatched or recorded in that case.
    pub async fn send(&self, request: &RequestDescriptor) -> ApplicationResult<ResponseDescriptor> {
        let Some(_permit) = SendPermit::acquire(&self.in_flight) else {
            return Err(ApplicationError::SendInFlight);
        };

        debug!(method = %request.method, url = %request.url, "dispatching request");
        let started = Instant::now();
        let reply = self.transport.dispatch(request).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let response = match reply {
            Ok(TransportReply::Proxied {
                status,
                status_text,
                text,
            }) => ProxyEnvelope::decode_reply(status, &status_text, &text, elapsed_ms),
            Ok(TransportReply::Envelope(envelope)) => envelope.into_response(0, "", elapsed_ms),
            Err(e) => {
                warn!(url = %request.url, error = %e.message, "request failed");
                self.notifier.notify(CoreEvent::SendFailed {
                    message: e.message.clone(),
                });
                ResponseDescriptor::network_error(&e.message, &e.detail, elapsed_ms)
            }
        };

        let time_ms = response.time_ms.unwrap_or(elapsed_ms);
        self.history.write().await.append(HistoryEntry::new(
            request.method,
            request.url.clone(),
            response.status,
            time_ms,
        ));
        info!(
            method = %request.method,
            url = %request.url,
            status = %response.status,
            elapsed_ms = time_ms,
            "request completed"
        );

        Ok(response)
    }
}
