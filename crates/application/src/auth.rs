//! Authentication session
//!
//! Only token presence matters to the engine. The session publishes every
//! change through a watch channel so views can follow sign-in state.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// The signed-in user, as stored under the `user` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend user id.
    #[serde(alias = "_id")]
    pub id: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl User {
    /// Creates a user with only an id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            email: None,
        }
    }
}

/// Point-in-time view of the auth state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSnapshot {
    /// Bearer token, if signed in.
    pub token: Option<String>,
    /// Signed-in user, if known.
    pub user: Option<User>,
}

impl AuthSnapshot {
    /// Returns true when a token is present.
    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        self.token.is_some()
    }
}

/// Shared, observable auth state.
///
/// Clones share the same state.
#[derive(Debug, Clone)]
pub struct AuthSession {
    sender: Arc<watch::Sender<AuthSnapshot>>,
}

impl AuthSession {
    /// Creates a session holding the given snapshot.
    #[must_use]
    pub fn new(snapshot: AuthSnapshot) -> Self {
        let (sender, _) = watch::channel(snapshot);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Creates a signed-out session.
    #[must_use]
    pub fn signed_out() -> Self {
        Self::new(AuthSnapshot::default())
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> AuthSnapshot {
        self.sender.borrow().clone()
    }

    /// Returns the current token.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.sender.borrow().token.clone()
    }

    /// Returns the current user.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.sender.borrow().user.clone()
    }

    /// Returns true when a token is present.
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.sender.borrow().is_signed_in()
    }

    /// Stores a new token and user and notifies subscribers.
    pub fn sign_in(&self, token: impl Into<String>, user: Option<User>) {
        self.sender.send_replace(AuthSnapshot {
            token: Some(token.into()),
            user,
        });
    }

    /// Clears the session and notifies subscribers.
    pub fn sign_out(&self) {
        self.sender.send_replace(AuthSnapshot::default());
    }

    /// Subscribes to changes. Dropping the subscription unsubscribes.
    #[must_use]
    pub fn subscribe(&self) -> AuthSubscription {
        AuthSubscription {
            receiver: self.sender.subscribe(),
        }
    }
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::signed_out()
    }
}

/// A live subscription to auth changes.
#[derive(Debug)]
pub struct AuthSubscription {
    receiver: watch::Receiver<AuthSnapshot>,
}

impl AuthSubscription {
    /// Waits for the next change and returns the new snapshot.
    ///
    /// Returns `None` once every session handle is gone.
    pub async fn changed(&mut self) -> Option<AuthSnapshot> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Returns the latest snapshot without waiting.
    #[must_use]
    pub fn current(&self) -> AuthSnapshot {
        self.receiver.borrow().clone()
    }
}
