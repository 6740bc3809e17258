//! Collection Repository
//!
//! Collections, folders and saved-request references synced with the
//! backend, plus the persisted workspace list and workspace membership map.
//! Backend-backed operations change local state only after the call
//! succeeded.

use std::sync::Arc;

use courier_domain::collection::DEFAULT_COLLECTION_NAME;
use courier_domain::{
    Collection, Folder, SavedRequest, SavedRequestRef, Workspace, WorkspaceCollectionMap,
    generate_id,
};
use tracing::{debug, info, warn};

use crate::context::AppContext;
use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::{CollectionBackend, CollectionRecord, CoreEvent};

const DELETE_PROMPT: &str =
    "Delete this collection? This will also delete all folders and APIs within it.";

/// Local mirror of the user's collections and workspaces.
pub struct CollectionRepository {
    backend: Arc<dyn CollectionBackend>,
    context: AppContext,
    collections: Vec<Collection>,
    workspaces: Vec<Workspace>,
    active_workspace: String,
    membership: WorkspaceCollectionMap,
}

impl CollectionRepository {
    /// Creates a repository, restoring workspaces and membership from the
    /// local store.
    #[must_use]
    pub fn new(backend: Arc<dyn CollectionBackend>, context: AppContext) -> Self {
        let workspaces = context.local.workspaces();
        let active_workspace = context.local.active_workspace();
        let membership = context.local.workspace_collections();
        Self {
            backend,
            context,
            collections: Vec::new(),
            workspaces,
            active_workspace,
            membership,
        }
    }

    /// Returns every collection, newest first.
    #[must_use]
    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    /// Returns a collection by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.id == id)
    }

    /// Finds a folder of a collection by exact name.
    #[must_use]
    pub fn find_folder_by_name(&self, collection_id: &str, name: &str) -> Option<&Folder> {
        self.get(collection_id)?.folder_by_name(name)
    }

    /// Returns the collections shown for the active workspace.
    ///
    /// A workspace with mapped collections shows only those; otherwise every
    /// collection is visible.
    #[must_use]
    pub fn visible_collections(&self) -> Vec<&Collection> {
        let mapped = self.membership.collections_of(&self.active_workspace);
        if mapped.is_empty() {
            self.collections.iter().collect()
        } else {
            self.collections
                .iter()
                .filter(|c| mapped.contains(&c.id))
                .collect()
        }
    }

    /// Returns the workspace membership map.
    #[must_use]
    pub const fn membership(&self) -> &WorkspaceCollectionMap {
        &self.membership
    }

    /// Returns the known workspaces.
    #[must_use]
    pub fn workspaces(&self) -> &[Workspace] {
        &self.workspaces
    }

    /// Returns the id of the active workspace.
    #[must_use]
    pub fn active_workspace_id(&self) -> &str {
        &self.active_workspace
    }

    /// Returns the active workspace, if it is still in the list.
    #[must_use]
    pub fn active_workspace(&self) -> Option<&Workspace> {
        self.workspaces
            .iter()
            .find(|w| w.id == self.active_workspace)
    }

    /// Adds a workspace and persists the list.
    ///
    /// # Errors
    ///
    /// `ValidationError` for an empty name.
    pub fn create_workspace(&mut self, name: &str) -> ApplicationResult<&Workspace> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApplicationError::ValidationError(
                "workspace name is required".to_string(),
            ));
        }

        self.workspaces.push(Workspace::new(generate_id(), name));
        self.context.local.set_workspaces(&self.workspaces);
        debug!(name, "workspace created");
        Ok(&self.workspaces[self.workspaces.len() - 1])
    }

    /// Selects the active workspace and persists the choice.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown workspace.
    pub fn set_active_workspace(&mut self, id: &str) -> ApplicationResult<()> {
        if !self.workspaces.iter().any(|w| w.id == id) {
            return Err(ApplicationError::NotFound(format!("workspace {id}")));
        }
        self.active_workspace = id.to_string();
        self.context.local.set_active_workspace(id);
        Ok(())
    }

    /// Creates a collection on the backend and prepends it locally.
    ///
    /// An empty title becomes `Untitled`. The server id is adopted when one
    /// comes back, else a local id is generated. The new collection is
    /// mapped into the active workspace.
    ///
    /// # Errors
    ///
    /// Returns the backend error; nothing changes locally.
    pub async fn create_collection(
        &mut self,
        title: &str,
        description: &str,
    ) -> ApplicationResult<&Collection> {
        let title = match title.trim() {
            "" => DEFAULT_COLLECTION_NAME,
            trimmed => trimmed,
        };

        let id = self
            .backend
            .create_collection(title, description)
            .await?
            .unwrap_or_else(generate_id);
        info!(collection_id = %id, title, "collection created");

        self.collections
            .insert(0, Collection::new(id.clone(), title, description));
        self.membership.add(&self.active_workspace, &id);
        self.context.local.set_workspace_collections(&self.membership);
        self.context.notify(CoreEvent::CollectionCreated {
            id,
            name: title.to_string(),
        });
        Ok(&self.collections[0])
    }

    /// Renames a collection locally.
    ///
    /// # Errors
    ///
    /// `ValidationError` for an empty name, `NotFound` for an unknown id.
    pub fn rename_collection(&mut self, id: &str, name: &str) -> ApplicationResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApplicationError::ValidationError(
                "collection name is required".to_string(),
            ));
        }
        let collection = self.get_mut(id)?;
        collection.name = name.to_string();
        Ok(())
    }

    /// Inserts a local deep copy of a collection first in the list and maps
    /// it into the active workspace.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub fn duplicate_collection(&mut self, id: &str) -> ApplicationResult<&Collection> {
        let copy = self
            .get(id)
            .ok_or_else(|| not_found(id))?
            .duplicate(generate_id());
        debug!(source = id, collection_id = %copy.id, "collection duplicated");
        self.membership.add(&self.active_workspace, &copy.id);
        self.context.local.set_workspace_collections(&self.membership);
        self.collections.insert(0, copy);
        Ok(&self.collections[0])
    }

    /// Deletes a collection after confirmation.
    ///
    /// Returns `false` when the user declined. On success the id is removed
    /// from every workspace mapping and the map is persisted.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, or the backend error.
    pub async fn delete_collection(&mut self, id: &str) -> ApplicationResult<bool> {
        if self.get(id).is_none() {
            return Err(not_found(id));
        }
        if !self.context.dialog.confirm(DELETE_PROMPT).await {
            return Ok(false);
        }

        self.backend.delete_collection(id).await?;
        info!(collection_id = id, "collection deleted");

        self.collections.retain(|c| c.id != id);
        self.membership.remove_everywhere(id);
        self.context.local.set_workspace_collections(&self.membership);
        self.context
            .notify(CoreEvent::CollectionDeleted { id: id.to_string() });
        Ok(true)
    }

    /// Creates a folder on the backend and appends it to its collection.
    ///
    /// # Errors
    ///
    /// `ValidationError` for an empty name, `NotFound` for an unknown
    /// collection, or the backend error.
    pub async fn create_folder(
        &mut self,
        collection_id: &str,
        name: &str,
        description: &str,
    ) -> ApplicationResult<&Folder> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApplicationError::ValidationError(
                "folder name is required".to_string(),
            ));
        }
        if self.get(collection_id).is_none() {
            return Err(not_found(collection_id));
        }

        let folder_id = self
            .backend
            .create_folder(collection_id, name, description)
            .await?
            .unwrap_or_else(generate_id);
        debug!(collection_id, folder_id = %folder_id, "folder created");

        self.context.notify(CoreEvent::FolderCreated {
            collection_id: collection_id.to_string(),
            folder_id: folder_id.clone(),
        });
        let collection = self.get_mut(collection_id)?;
        collection
            .folders
            .push(Folder::new(folder_id, name, description));
        let last = collection.folders.len() - 1;
        Ok(&collection.folders[last])
    }

    /// Files a saved request reference under its collection or folder.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown collection.
    pub fn attach_saved_request(
        &mut self,
        collection_id: &str,
        saved: SavedRequestRef,
    ) -> ApplicationResult<()> {
        self.get_mut(collection_id)?.attach(saved);
        Ok(())
    }

    /// Replaces the local collections with the user's collections from the
    /// backend, folders and saved requests included.
    ///
    /// Saved requests that cannot be listed degrade to none, a collection
    /// whose folders cannot be listed gets no folders. Requests are filed by
    /// folder id, else by collection id when they have no folder; the rest
    /// are dropped.
    ///
    /// # Errors
    ///
    /// Returns the error of the collection listing; prior state is kept.
    pub async fn fetch_user_collections(&mut self, user_id: &str) -> ApplicationResult<&[Collection]> {
        let saved = match self.backend.list_saved_requests().await {
            Ok(saved) => saved,
            Err(e) => {
                warn!(user_id, error = %e, "failed to fetch saved requests");
                Vec::new()
            }
        };

        let records = self.backend.list_collections(user_id).await?;
        let mut collections = Vec::with_capacity(records.len());
        for record in records {
            let folders = match self.backend.list_folders(&record.id).await {
                Ok(folders) => folders,
                Err(e) => {
                    warn!(collection_id = %record.id, error = %e, "failed to fetch folders");
                    Vec::new()
                }
            };
            let mut collection = into_collection(record);
            collection.folders = folders
                .into_iter()
                .map(|f| Folder::new(f.id, f.name, f.description))
                .collect();
            collections.push(collection);
        }

        partition_saved(&mut collections, &saved);
        debug!(user_id, count = collections.len(), "fetched collections");
        self.collections = collections;

        let known = &self.collections;
        if self
            .membership
            .retain_known(|id| known.iter().any(|c| c.id == id))
        {
            debug!(user_id, "pruned stale workspace mappings");
            self.context.local.set_workspace_collections(&self.membership);
        }
        Ok(&self.collections)
    }

    fn get_mut(&mut self, id: &str) -> ApplicationResult<&mut Collection> {
        self.collections
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| not_found(id))
    }
}

fn not_found(id: &str) -> ApplicationError {
    ApplicationError::NotFound(format!("collection {id}"))
}

fn into_collection(record: CollectionRecord) -> Collection {
    Collection::new(record.id, record.title, record.description)
}

/// Files each saved request into the folder it names, or into its
/// collection when it has no folder.
fn partition_saved(collections: &mut [Collection], saved: &[SavedRequest]) {
    for request in saved {
        let reference = request.to_ref();
        match request.folder_id.as_deref() {
            Some(folder_id) => {
                if let Some(folder) = collections
                    .iter_mut()
                    .flat_map(|c| c.folders.iter_mut())
                    .find(|f| f.id == folder_id)
                {
                    folder.apis.push(reference);
                }
            }
            None => {
                if let Some(collection) = collections
                    .iter_mut()
                    .find(|c| request.collection_id.as_deref() == Some(c.id.as_str()))
                {
                    collection.requests.push(reference);
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::local_state::keys;
    use crate::test_support::{FakeBackend, context_with};
    use pretty_assertions::assert_eq;

    fn repo(backend: &Arc<FakeBackend>, confirm: bool) -> CollectionRepository {
        CollectionRepository::new(backend.clone(), context_with(confirm))
    }

    fn saved(id: &str, collection: &str, folder: Option<&str>) -> SavedRequest {
        SavedRequest {
            id: id.to_string(),
            method: "GET".to_string(),
            url: format!("https://x.test/{id}"),
            folder_id: folder.map(str::to_string),
            collection_id: Some(collection.to_string()),
            ..SavedRequest::default()
        }
    }

    #[tokio::test]
    async fn test_create_collection_prepends_and_maps_into_workspace() {
        let backend = Arc::new(FakeBackend::default());
        let mut repo = repo(&backend, true);

        let first = repo.create_collection("First", "").await.unwrap().id.clone();
        let second = repo.create_collection("", "").await.unwrap().id.clone();

        assert_eq!(repo.collections()[0].id, second);
        assert_eq!(repo.collections()[0].name, "Untitled");
        assert_eq!(
            repo.membership().collections_of("default"),
            [first, second]
        );
        assert_eq!(
            repo.context.local.workspace_collections(),
            repo.membership().clone()
        );
    }

    #[tokio::test]
    async fn test_create_collection_generates_id_when_server_omits_it() {
        let backend = Arc::new(FakeBackend::default());
        backend.omit_ids();
        let mut repo = repo(&backend, true);

        let id = repo.create_collection("Local", "").await.unwrap().id.clone();
        assert_eq!(id.len(), 36);
    }

    #[tokio::test]
    async fn test_create_collection_failure_changes_nothing() {
        let backend = Arc::new(FakeBackend::default());
        backend.fail_next("quota exceeded");
        let mut repo = repo(&backend, true);

        let err = repo.create_collection("X", "").await.unwrap_err();
        assert_eq!(
            err,
            ApplicationError::ServerError {
                status: 500,
                message: "quota exceeded".to_string()
            }
        );
        assert!(repo.collections().is_empty());
        assert!(repo.membership().collections_of("default").is_empty());
    }

    #[tokio::test]
    async fn test_rename_and_duplicate_are_local() {
        let backend = Arc::new(FakeBackend::default());
        let mut repo = repo(&backend, true);
        let id = repo.create_collection("Users", "").await.unwrap().id.clone();
        let calls = backend.call_count();

        repo.rename_collection(&id, "People").unwrap();
        let copy = repo.duplicate_collection(&id).unwrap().clone();

        assert_eq!(copy.name, "People (copy)");
        assert_ne!(copy.id, id);
        assert_eq!(repo.collections()[0].id, copy.id);
        assert_eq!(backend.call_count(), calls);

        assert!(matches!(
            repo.rename_collection(&id, " "),
            Err(ApplicationError::ValidationError(_))
        ));
        assert!(matches!(
            repo.rename_collection("nope", "x"),
            Err(ApplicationError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_is_visible_in_mapped_workspace() {
        let backend = Arc::new(FakeBackend::default());
        let mut repo = repo(&backend, true);
        repo.create_workspace("Team").unwrap();
        let team = repo.workspaces()[1].id.clone();
        repo.set_active_workspace(&team).unwrap();
        let id = repo.create_collection("Users", "").await.unwrap().id.clone();

        let copy = repo.duplicate_collection(&id).unwrap().id.clone();

        let visible: Vec<&str> = repo
            .visible_collections()
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(visible, vec![copy.as_str(), id.as_str()]);
        assert!(repo.context.local.workspace_collections().contains(&copy));
    }

    #[tokio::test]
    async fn test_delete_cascades_workspace_mapping() {
        let backend = Arc::new(FakeBackend::default());
        let mut repo = repo(&backend, true);
        let id = repo.create_collection("Gone", "").await.unwrap().id.clone();
        let other = repo.workspaces().len();
        repo.create_workspace("Second").unwrap();
        let second = repo.workspaces()[other].id.clone();
        repo.set_active_workspace(&second).unwrap();
        repo.membership.add(&second, &id);

        assert!(repo.delete_collection(&id).await.unwrap());
        assert!(repo.get(&id).is_none());
        assert!(!repo.membership().contains(&id));
        assert!(!repo.context.local.workspace_collections().contains(&id));
        assert!(!backend.collection_ids().contains(&id));
    }

    #[tokio::test]
    async fn test_declined_delete_keeps_everything() {
        let backend = Arc::new(FakeBackend::default());
        let mut repo = repo(&backend, false);
        let id = repo.create_collection("Kept", "").await.unwrap().id.clone();

        assert!(!repo.delete_collection(&id).await.unwrap());
        assert!(repo.get(&id).is_some());
        assert!(repo.membership().contains(&id));
        assert!(backend.collection_ids().contains(&id));
    }

    #[tokio::test]
    async fn test_create_folder() {
        let backend = Arc::new(FakeBackend::default());
        let mut repo = repo(&backend, true);
        let id = repo.create_collection("C", "").await.unwrap().id.clone();

        let folder = repo.create_folder(&id, "auth", "").await.unwrap().clone();
        assert_eq!(repo.find_folder_by_name(&id, "auth"), Some(&folder));
        assert_eq!(backend.folder_names(&id), vec!["auth".to_string()]);

        assert!(matches!(
            repo.create_folder("nope", "x", "").await,
            Err(ApplicationError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_partitions_saved_requests() {
        let backend = Arc::new(FakeBackend::default());
        let col = backend.seed_collection("u1", "API");
        let folder = backend.seed_folder(&col, "users");
        backend.seed_saved(saved("a", &col, None));
        backend.seed_saved(saved("b", &col, Some(&folder)));
        backend.seed_saved(saved("c", "other", None));
        backend.seed_saved(saved("d", &col, Some("missing-folder")));
        let mut repo = repo(&backend, true);

        let collections = repo.fetch_user_collections("u1").await.unwrap();
        assert_eq!(collections.len(), 1);
        assert_eq!(collections[0].requests.len(), 1);
        assert_eq!(collections[0].requests[0].name, "GET https://x.test/a");
        assert_eq!(collections[0].folders[0].apis[0].id, "b");
        assert_eq!(collections[0].request_count(), 2);
    }

    #[tokio::test]
    async fn test_fetch_degrades_folder_failures_per_collection() {
        let backend = Arc::new(FakeBackend::default());
        let broken = backend.seed_collection("u1", "Broken");
        let healthy = backend.seed_collection("u1", "Healthy");
        backend.seed_folder(&broken, "f");
        backend.seed_folder(&healthy, "g");
        backend.fail_folders_of(&broken);
        let mut repo = repo(&backend, true);

        repo.fetch_user_collections("u1").await.unwrap();
        assert!(repo.get(&broken).unwrap().folders.is_empty());
        assert_eq!(repo.get(&healthy).unwrap().folders.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_survives_saved_list_failure() {
        let backend = Arc::new(FakeBackend::default());
        let col = backend.seed_collection("u1", "API");
        backend.seed_saved(saved("a", &col, None));
        backend.fail_saved_list();
        let mut repo = repo(&backend, true);

        let collections = repo.fetch_user_collections("u1").await.unwrap();
        assert_eq!(collections.len(), 1);
        assert!(collections[0].requests.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_prunes_mappings_of_vanished_collections() {
        let backend = Arc::new(FakeBackend::default());
        let kept = backend.seed_collection("u1", "Kept");
        let mut repo = repo(&backend, true);
        repo.membership.add("default", &kept);
        repo.membership.add("default", "gone");
        repo.context
            .local
            .set_workspace_collections(&repo.membership);

        repo.fetch_user_collections("u1").await.unwrap();

        assert_eq!(repo.membership().collections_of("default"), [kept]);
        assert!(!repo.context.local.workspace_collections().contains("gone"));
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_prior_state() {
        let backend = Arc::new(FakeBackend::default());
        let mut repo = repo(&backend, true);
        repo.create_collection("Local", "").await.unwrap();

        backend.fail_collection_list();
        assert!(repo.fetch_user_collections("u1").await.is_err());
        assert_eq!(repo.collections().len(), 1);
    }

    #[tokio::test]
    async fn test_visible_collections_follow_active_workspace() {
        let backend = Arc::new(FakeBackend::default());
        let mut repo = repo(&backend, true);
        let a = repo.create_collection("A", "").await.unwrap().id.clone();
        repo.create_workspace("Empty").unwrap();
        let empty = repo.workspaces()[1].id.clone();

        repo.set_active_workspace(&empty).unwrap();
        assert_eq!(repo.visible_collections().len(), 1);

        let b = repo.create_collection("B", "").await.unwrap().id.clone();
        let visible: Vec<&str> = repo
            .visible_collections()
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(visible, vec![b.as_str()]);
        assert_ne!(a, b);
        assert_eq!(
            repo.context
                .local
                .active_workspace(),
            empty
        );
    }

    #[test]
    fn test_workspaces_restored_from_store() {
        let backend = Arc::new(FakeBackend::default());
        let context = context_with(true);
        context.local.set_workspaces(&[
            Workspace::default(),
            Workspace::new("w2", "Team"),
        ]);
        context.local.set_active_workspace("w2");

        let repo = CollectionRepository::new(backend, context);
        assert_eq!(repo.workspaces().len(), 2);
        assert_eq!(repo.active_workspace().map(|w| w.name.as_str()), Some("Team"));
        assert_eq!(keys::ACTIVE_WORKSPACE, "activeWorkspace");
    }

    #[test]
    fn test_workspace_validation() {
        let backend = Arc::new(FakeBackend::default());
        let mut repo = repo(&backend, true);
        assert!(matches!(
            repo.create_workspace("  "),
            Err(ApplicationError::ValidationError(_))
        ));
        assert!(matches!(
            repo.set_active_workspace("nope"),
            Err(ApplicationError::NotFound(_))
        ));
    }
}
