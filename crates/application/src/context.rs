//! Application context
//!
//! Explicit bundle of the session-wide collaborators every service needs.

use std::sync::Arc;

use crate::auth::AuthSession;
use crate::local_state::LocalState;
use crate::ports::{CoreEvent, Dialog, KeyValueStore, Notifier};

/// Session-wide collaborators injected into the services.
#[derive(Clone)]
pub struct AppContext {
    /// Observable auth state.
    pub auth: AuthSession,
    /// Persisted local state.
    pub local: LocalState,
    /// Confirmation and prompt dialogs.
    pub dialog: Arc<dyn Dialog>,
    /// User-facing notifications.
    pub notifier: Arc<dyn Notifier>,
}

impl AppContext {
    /// Builds a context, restoring the auth session from the store.
    #[must_use]
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        dialog: Arc<dyn Dialog>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let local = LocalState::new(store);
        let auth = AuthSession::new(local.auth());
        Self {
            auth,
            local,
            dialog,
            notifier,
        }
    }

    /// Delivers a notification.
    pub fn notify(&self, event: CoreEvent) {
        self.notifier.notify(event);
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("auth", &self.auth)
            .field("local", &self.local)
            .finish_non_exhaustive()
    }
}
