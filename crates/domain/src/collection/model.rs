//! Collection type

use serde::{Deserialize, Serialize};

use super::{Folder, SavedRequestRef};

/// Name used when a collection is created without one.
pub const DEFAULT_COLLECTION_NAME: &str = "Untitled";

/// Suffix appended to the name of a duplicated collection.
pub const COPY_SUFFIX: &str = " (copy)";

/// A named group of saved requests and folders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Server-assigned id, or a locally generated one.
    pub id: String,
    /// Collection name.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: String,
    /// Saved requests filed directly under the collection.
    #[serde(default)]
    pub requests: Vec<SavedRequestRef>,
    /// Folders of the collection.
    #[serde(default)]
    pub folders: Vec<Folder>,
}

impl Collection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            requests: Vec::new(),
            folders: Vec::new(),
        }
    }

    /// Returns a deep copy under a new id, named `"<name> (copy)"`.
    #[must_use]
    pub fn duplicate(&self, new_id: impl Into<String>) -> Self {
        Self {
            id: new_id.into(),
            name: format!("{}{COPY_SUFFIX}", self.name),
            ..self.clone()
        }
    }

    /// Finds a folder by id.
    #[must_use]
    pub fn folder(&self, id: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.id == id)
    }

    /// Finds a folder by exact name.
    #[must_use]
    pub fn folder_by_name(&self, name: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.name == name)
    }

    /// Files a saved request reference.
    ///
    /// References whose folder id names a folder of this collection go into
    /// that folder; everything else is kept at collection level.
    pub fn attach(&mut self, saved: SavedRequestRef) {
        let folder = saved
            .folder_id
            .as_deref()
            .and_then(|id| self.folders.iter_mut().find(|f| f.id == id));
        match folder {
            Some(folder) => folder.apis.push(saved),
            None => self.requests.push(saved),
        }
    }

    /// Returns the number of saved requests, folders included.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.len() + self.folders.iter().map(|f| f.apis.len()).sum::<usize>()
    }
}
