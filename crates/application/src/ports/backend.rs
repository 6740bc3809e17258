//! Backend REST ports
//!
//! Collections, folders, saved requests and environments live on the
//! backend. Adapters normalize the backend's heterogeneous id fields before
//! anything reaches these records.

use std::collections::BTreeMap;

use async_trait::async_trait;
use courier_domain::{SavedRequest, Variable};
use serde::Serialize;
use thiserror::Error;

/// Errors reported by a backend adapter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The backend could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("server error ({status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// `message` or `error` field of the body, else the status text.
        message: String,
    },

    /// The backend rejected the credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// The response body did not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// A collection as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRecord {
    /// Normalized id.
    pub id: String,
    /// Title, or `name` for older records.
    pub title: String,
    /// Description, empty when absent.
    pub description: String,
}

/// A folder as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRecord {
    /// Normalized id.
    pub id: String,
    /// Folder name.
    pub name: String,
    /// Description, empty when absent.
    pub description: String,
}

/// An environment as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentRecord {
    /// Normalized id.
    pub id: String,
    /// Title, or `name` for older records.
    pub title: String,
}

/// Payload persisted by the save pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewSavedRequest {
    /// Target folder.
    #[serde(rename = "f_id")]
    pub folder_id: Option<String>,
    /// Target collection.
    #[serde(rename = "col_id")]
    pub collection_id: String,
    /// Final URL.
    pub url: String,
    /// Header map built from the header rows.
    pub headers: BTreeMap<String, String>,
    /// Raw request body.
    pub body: String,
    /// HTTP method.
    pub method: String,
    /// Response body.
    pub response: String,
    /// Response status code.
    #[serde(rename = "res_status")]
    pub status: Option<u16>,
    /// Response reason phrase.
    #[serde(rename = "statusmessage")]
    pub status_text: String,
}

/// Port for the collection, folder and saved-request endpoints.
#[async_trait]
pub trait CollectionBackend: Send + Sync {
    /// Creates a collection and returns the server id, if the server sent one.
    async fn create_collection(
        &self,
        title: &str,
        description: &str,
    ) -> Result<Option<String>, BackendError>;

    /// Deletes a collection.
    async fn delete_collection(&self, id: &str) -> Result<(), BackendError>;

    /// Lists the collections of a user.
    async fn list_collections(&self, user_id: &str) -> Result<Vec<CollectionRecord>, BackendError>;

    /// Lists the folders of a collection.
    async fn list_folders(&self, collection_id: &str) -> Result<Vec<FolderRecord>, BackendError>;

    /// Creates a folder and returns the server id, if the server sent one.
    async fn create_folder(
        &self,
        collection_id: &str,
        name: &str,
        description: &str,
    ) -> Result<Option<String>, BackendError>;

    /// Lists every saved request of the signed-in user.
    async fn list_saved_requests(&self) -> Result<Vec<SavedRequest>, BackendError>;

    /// Fetches one saved request with headers, body and response.
    async fn fetch_saved_request(&self, id: &str) -> Result<SavedRequest, BackendError>;

    /// Persists a request snapshot and returns the server id, if sent.
    async fn save_request(&self, request: &NewSavedRequest)
    -> Result<Option<String>, BackendError>;
}

/// Port for the environment and variable endpoints.
#[async_trait]
pub trait EnvironmentBackend: Send + Sync {
    /// Creates an environment and returns the server id, if sent.
    async fn create_environment(&self, title: &str) -> Result<Option<String>, BackendError>;

    /// Lists the environments of a user.
    async fn list_environments(
        &self,
        user_id: &str,
    ) -> Result<Vec<EnvironmentRecord>, BackendError>;

    /// Lists the variables of an environment.
    async fn list_variables(&self, env_id: &str) -> Result<Vec<Variable>, BackendError>;

    /// Adds a variable to an environment.
    async fn add_variable(&self, env_id: &str, key: &str, value: &str)
    -> Result<(), BackendError>;

    /// Updates a variable.
    async fn update_variable(
        &self,
        var_id: &str,
        key: &str,
        value: &str,
    ) -> Result<(), BackendError>;

    /// Deletes a variable.
    async fn delete_variable(&self, var_id: &str) -> Result<(), BackendError>;
}
