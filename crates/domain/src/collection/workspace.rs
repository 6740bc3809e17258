//! Workspaces and workspace membership

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Id of the workspace that always exists.
pub const DEFAULT_WORKSPACE_ID: &str = "default";

/// Name of the workspace that always exists.
pub const DEFAULT_WORKSPACE_NAME: &str = "My Workspace";

/// A named grouping used to filter visible collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    /// Workspace id.
    pub id: String,
    /// Display name.
    pub name: String,
}

impl Workspace {
    /// Creates a workspace.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(DEFAULT_WORKSPACE_ID, DEFAULT_WORKSPACE_NAME)
    }
}

/// Workspace id to ordered collection ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceCollectionMap(BTreeMap<String, Vec<String>>);

impl WorkspaceCollectionMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a collection to a workspace, keeping ids unique.
    pub fn add(&mut self, workspace_id: &str, collection_id: &str) {
        let ids = self.0.entry(workspace_id.to_string()).or_default();
        if !ids.iter().any(|id| id == collection_id) {
            ids.push(collection_id.to_string());
        }
    }

    /// Removes a collection from every workspace.
    ///
    /// Returns true if anything was removed.
    pub fn remove_everywhere(&mut self, collection_id: &str) -> bool {
        let mut removed = false;
        for ids in self.0.values_mut() {
            let before = ids.len();
            ids.retain(|id| id != collection_id);
            removed |= ids.len() != before;
        }
        removed
    }

    /// Drops every collection id for which `known` is false.
    ///
    /// Returns true if anything was removed.
    pub fn retain_known(&mut self, known: impl Fn(&str) -> bool) -> bool {
        let mut removed = false;
        for ids in self.0.values_mut() {
            let before = ids.len();
            ids.retain(|id| known(id.as_str()));
            removed |= ids.len() != before;
        }
        removed
    }

    /// Returns the collection ids mapped to a workspace.
    #[must_use]
    pub fn collections_of(&self, workspace_id: &str) -> &[String] {
        self.0.get(workspace_id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns true if any workspace references the collection.
    #[must_use]
    pub fn contains(&self, collection_id: &str) -> bool {
        self.0.values().flatten().any(|id| id == collection_id)
    }
}
