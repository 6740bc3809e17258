//! Save/Load Pipeline
//!
//! Turns the live request and its last response into a persisted
//! [`SavedRequest`], and a saved request back into builder state plus a
//! response view.

use std::sync::Arc;

use courier_domain::{
    KeyValueRow, ResponseDescriptor, ResponseStatus, SavedRequest, SavedRequestRef, generate_id,
};
use tracing::{debug, info};

use crate::collections::CollectionRepository;
use crate::context::AppContext;
use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::{CollectionBackend, CoreEvent, NewSavedRequest};
use crate::request_builder::RequestBuilder;

/// Where a request gets saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveTarget {
    /// An existing collection, by id.
    Existing(String),
    /// A collection created on the fly. An empty name becomes `Untitled`.
    New {
        /// Name of the new collection.
        name: String,
    },
}

/// Input for saving the current request.
#[derive(Debug, Clone, Copy)]
pub struct SaveInput<'a> {
    /// Request being saved.
    pub builder: &'a RequestBuilder,
    /// Last response, if any.
    pub response: Option<&'a ResponseDescriptor>,
    /// Folder name inside the collection; blank saves at collection level.
    pub folder_name: Option<&'a str>,
}

/// Builder state and response view restored from a saved request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedRequest {
    /// Restored builder.
    pub builder: RequestBuilder,
    /// Restored response, when the record carries one.
    pub response: Option<ResponseDescriptor>,
}

/// Persists and restores request snapshots.
pub struct SavePipeline {
    backend: Arc<dyn CollectionBackend>,
    context: AppContext,
}

impl SavePipeline {
    /// Creates a pipeline over the collection backend.
    #[must_use]
    pub fn new(backend: Arc<dyn CollectionBackend>, context: AppContext) -> Self {
        Self { backend, context }
    }

    /// Saves the request into a collection, creating the collection and the
    /// folder when needed.
    ///
    /// A collection or folder created along the way stays when the final
    /// save fails; the saved reference is only attached on success.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown target collection, or the backend error of
    /// whichever step failed.
    pub async fn save(
        &self,
        repository: &mut CollectionRepository,
        target: SaveTarget,
        input: SaveInput<'_>,
    ) -> ApplicationResult<SavedRequestRef> {
        let collection_id = match target {
            SaveTarget::Existing(id) => {
                if repository.get(&id).is_none() {
                    return Err(ApplicationError::NotFound(format!("collection {id}")));
                }
                id
            }
            SaveTarget::New { name } => repository.create_collection(&name, "").await?.id.clone(),
        };

        let folder_id = match input.folder_name.map(str::trim).filter(|n| !n.is_empty()) {
            None => None,
            Some(name) => Some(
                match repository.find_folder_by_name(&collection_id, name) {
                    Some(folder) => folder.id.clone(),
                    None => repository
                        .create_folder(&collection_id, name, "")
                        .await?
                        .id
                        .clone(),
                },
            ),
        };

        let payload = snapshot(input, &collection_id, folder_id.clone());
        let id = self
            .backend
            .save_request(&payload)
            .await?
            .unwrap_or_else(generate_id);
        info!(request_id = %id, collection_id = %collection_id, "request saved");

        let saved = SavedRequestRef::new(id.clone(), payload.method, payload.url, folder_id);
        repository.attach_saved_request(&collection_id, saved.clone())?;
        self.context.notify(CoreEvent::RequestSaved { id });
        Ok(saved)
    }

    /// Fetches a saved request from the backend and loads it.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    pub async fn open(&self, id: &str) -> ApplicationResult<LoadedRequest> {
        let saved = self.backend.fetch_saved_request(id).await?;
        debug!(request_id = id, "saved request fetched");
        Ok(load(&saved))
    }
}

/// Builds the builder state and response view of a saved request.
///
/// The saved URL already carries its query, so no param rows come back.
/// Absent headers, body and response load empty, unknown methods load as
/// GET. A record with a response body but no status was saved from a
/// network error.
#[must_use]
pub fn load(saved: &SavedRequest) -> LoadedRequest {
    let headers = saved
        .headers
        .iter()
        .flatten()
        .map(|(key, value)| KeyValueRow::new(key.as_str(), value.as_str()))
        .collect();

    let builder = RequestBuilder {
        method: saved.http_method(),
        url: saved.url.clone(),
        params: Vec::new(),
        headers,
        raw_body: saved.body.clone().unwrap_or_default(),
        ..RequestBuilder::default()
    };

    let body = saved.response.clone().unwrap_or_default();
    let response = (saved.status.is_some() || !body.is_empty()).then(|| ResponseDescriptor {
        status: saved
            .status
            .map_or(ResponseStatus::NetworkError, ResponseStatus::Code),
        status_text: saved.status_text.clone().unwrap_or_default(),
        time_ms: None,
        headers: Vec::new(),
        body,
    });

    LoadedRequest { builder, response }
}

fn snapshot(
    input: SaveInput<'_>,
    collection_id: &str,
    folder_id: Option<String>,
) -> NewSavedRequest {
    let response = input.response;
    NewSavedRequest {
        folder_id,
        collection_id: collection_id.to_string(),
        url: input.builder.compute_final_url(),
        headers: input.builder.header_map(),
        body: input.builder.raw_body.clone(),
        method: input.builder.method.as_str().to_string(),
        response: response.map(|r| r.body.clone()).unwrap_or_default(),
        status: response.and_then(|r| r.status.code()),
        status_text: response.map(|r| r.status_text.clone()).unwrap_or_default(),
    }
}
