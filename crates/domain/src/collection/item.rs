//! Collection item types

use serde::{Deserialize, Serialize};

/// A sidebar entry pointing at a saved request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedRequestRef {
    /// Saved request id.
    pub id: String,
    /// Display name, `"<METHOD> <url>"`.
    pub name: String,
    /// HTTP method as stored by the backend.
    pub method: String,
    /// Saved URL.
    pub url: String,
    /// Owning folder, if any.
    #[serde(default)]
    pub folder_id: Option<String>,
}

impl SavedRequestRef {
    /// Creates a reference, deriving the display name from method and URL.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        method: impl Into<String>,
        url: impl Into<String>,
        folder_id: Option<String>,
    ) -> Self {
        let method = method.into();
        let url = url.into();
        Self {
            id: id.into(),
            name: format!("{method} {url}"),
            method,
            url,
            folder_id,
        }
    }
}

/// A folder of saved requests nested under exactly one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    /// Unique identifier within the collection.
    pub id: String,
    /// Folder name.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: String,
    /// Saved requests filed in this folder.
    #[serde(default)]
    pub apis: Vec<SavedRequestRef>,
}

impl Folder {
    /// Creates an empty folder.
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
            apis: Vec::new(),
        }
    }
}
