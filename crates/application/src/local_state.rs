//! Persisted local state
//!
//! Typed access to the key/value store. Reads never fail: absent or corrupt
//! values fall back to defaults. Write failures are logged and swallowed.

use std::sync::Arc;

use courier_domain::{Workspace, WorkspaceCollectionMap};
use courier_domain::collection::DEFAULT_WORKSPACE_ID;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::auth::{AuthSnapshot, User};
use crate::ports::KeyValueStore;

/// Store keys.
pub mod keys {
    /// Known workspaces.
    pub const WORKSPACES: &str = "workspaces";
    /// Id of the selected workspace.
    pub const ACTIVE_WORKSPACE: &str = "activeWorkspace";
    /// Workspace to collection membership.
    pub const WORKSPACE_COLLECTIONS: &str = "workspaceCollections";
    /// Bearer token.
    pub const TOKEN: &str = "token";
    /// Signed-in user.
    pub const USER: &str = "user";
}

/// Typed, defensive view of the local key/value store.
#[derive(Clone)]
pub struct LocalState {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for LocalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalState").finish_non_exhaustive()
    }
}

impl LocalState {
    /// Wraps a store.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Returns the known workspaces, never empty.
    #[must_use]
    pub fn workspaces(&self) -> Vec<Workspace> {
        match self.read_json::<Vec<Workspace>>(keys::WORKSPACES) {
            Some(list) if !list.is_empty() => list,
            _ => vec![Workspace::default()],
        }
    }

    /// Persists the workspace list.
    pub fn set_workspaces(&self, workspaces: &[Workspace]) {
        self.write_json(keys::WORKSPACES, workspaces);
    }

    /// Returns the selected workspace id, `default` when unset.
    #[must_use]
    pub fn active_workspace(&self) -> String {
        self.read_raw(keys::ACTIVE_WORKSPACE)
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| DEFAULT_WORKSPACE_ID.to_string())
    }

    /// Persists the selected workspace id.
    pub fn set_active_workspace(&self, id: &str) {
        self.write_raw(keys::ACTIVE_WORKSPACE, id);
    }

    /// Returns the workspace membership map.
    #[must_use]
    pub fn workspace_collections(&self) -> WorkspaceCollectionMap {
        self.read_json(keys::WORKSPACE_COLLECTIONS).unwrap_or_default()
    }

    /// Persists the workspace membership map.
    pub fn set_workspace_collections(&self, map: &WorkspaceCollectionMap) {
        self.write_json(keys::WORKSPACE_COLLECTIONS, map);
    }

    /// Returns the stored token and user.
    #[must_use]
    pub fn auth(&self) -> AuthSnapshot {
        AuthSnapshot {
            token: self.read_raw(keys::TOKEN).filter(|t| !t.is_empty()),
            user: self.read_json::<User>(keys::USER),
        }
    }

    /// Persists a token and user.
    pub fn set_auth(&self, token: &str, user: Option<&User>) {
        self.write_raw(keys::TOKEN, token);
        match user {
            Some(user) => self.write_json(keys::USER, user),
            None => self.remove(keys::USER),
        }
    }

    /// Removes the token and user.
    pub fn clear_auth(&self) {
        self.remove(keys::TOKEN);
        self.remove(keys::USER);
    }

    fn read_raw(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "failed to read local state");
                None
            }
        }
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.read_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "ignoring corrupt local state");
                None
            }
        }
    }

    fn write_raw(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            warn!(key, error = %e, "failed to write local state");
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.write_raw(key, &json),
            Err(e) => warn!(key, error = %e, "failed to encode local state"),
        }
    }

    fn remove(&self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            warn!(key, error = %e, "failed to remove local state");
        }
    }
}
