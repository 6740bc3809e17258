//! In-memory fakes of the ports, shared by the unit tests.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use courier_domain::{ProxyEnvelope, RequestDescriptor, SavedRequest, Variable};
use serde_json::json;

use crate::context::AppContext;
use crate::ports::{
    BackendError, CollectionBackend, CollectionRecord, CoreEvent, Dialog, EnvironmentBackend,
    EnvironmentRecord, FolderRecord, KeyValueStore, NewSavedRequest, Notifier, ProxyTransport,
    StorageError, TransportError, TransportReply,
};

/// Key/value store backed by a map.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
    failing: bool,
}

impl MemoryStore {
    /// A store whose writes always fail.
    pub fn failing() -> Self {
        Self {
            values: Mutex::default(),
            failing: true,
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.failing {
            return Err(StorageError::Io("read-only".to_string()));
        }
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Dialog answering every confirmation the same way.
pub struct AutoDialog {
    pub confirm: bool,
    pub asked: Mutex<Vec<String>>,
}

#[async_trait]
impl Dialog for AutoDialog {
    async fn confirm(&self, message: &str) -> bool {
        self.asked.lock().unwrap().push(message.to_string());
        self.confirm
    }

    async fn prompt(&self, _message: &str, default: &str) -> Option<String> {
        self.confirm.then(|| default.to_string())
    }
}

/// Notifier recording every event.
#[derive(Default)]
pub struct RecordingNotifier {
    pub events: Mutex<Vec<CoreEvent>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: CoreEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Builds a signed-out context over a fresh memory store.
pub fn context_with(confirm: bool) -> AppContext {
    AppContext::new(
        Arc::new(MemoryStore::default()),
        Arc::new(AutoDialog {
            confirm,
            asked: Mutex::default(),
        }),
        Arc::new(RecordingNotifier::default()),
    )
}

#[derive(Default)]
struct BackendState {
    next_id: usize,
    collections: Vec<(String, CollectionRecord)>,
    folders: Vec<(String, FolderRecord)>,
    saved: Vec<SavedRequest>,
    environments: Vec<(String, EnvironmentRecord)>,
    variables: Vec<(String, Variable)>,
    fail_next: Option<String>,
    fail_folders_of: Vec<String>,
    fail_saved_list: bool,
    fail_collection_list: bool,
    omit_ids: bool,
}

/// In-memory backend implementing both backend ports.
///
/// Collections and environments created through the ports belong to `u1`.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<BackendState>,
    calls: AtomicUsize,
}

impl FakeBackend {
    /// Number of port calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Makes the next call fail with a server error.
    pub fn fail_next(&self, message: &str) {
        self.state.lock().unwrap().fail_next = Some(message.to_string());
    }

    /// Makes folder listing fail for one collection.
    pub fn fail_folders_of(&self, collection_id: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_folders_of
            .push(collection_id.to_string());
    }

    /// Makes listing saved requests fail.
    pub fn fail_saved_list(&self) {
        self.state.lock().unwrap().fail_saved_list = true;
    }

    /// Makes listing collections fail.
    pub fn fail_collection_list(&self) {
        self.state.lock().unwrap().fail_collection_list = true;
    }

    /// Answers create calls without an id.
    pub fn omit_ids(&self) {
        self.state.lock().unwrap().omit_ids = true;
    }

    pub fn seed_environment(&self, user: &str, title: &str, vars: &[(&str, &str)]) -> String {
        let mut state = self.state.lock().unwrap();
        let id = next_id(&mut state, "env");
        state.environments.push((
            user.to_string(),
            EnvironmentRecord {
                id: id.clone(),
                title: title.to_string(),
            },
        ));
        for (key, value) in vars {
            let var_id = next_id(&mut state, "var");
            state
                .variables
                .push((id.clone(), Variable::new(var_id, *key, *value)));
        }
        id
    }

    pub fn seed_collection(&self, user: &str, title: &str) -> String {
        let mut state = self.state.lock().unwrap();
        let id = next_id(&mut state, "col");
        state.collections.push((
            user.to_string(),
            CollectionRecord {
                id: id.clone(),
                title: title.to_string(),
                description: String::new(),
            },
        ));
        id
    }

    pub fn seed_folder(&self, collection_id: &str, name: &str) -> String {
        let mut state = self.state.lock().unwrap();
        let id = next_id(&mut state, "fold");
        state.folders.push((
            collection_id.to_string(),
            FolderRecord {
                id: id.clone(),
                name: name.to_string(),
                description: String::new(),
            },
        ));
        id
    }

    pub fn seed_saved(&self, saved: SavedRequest) {
        self.state.lock().unwrap().saved.push(saved);
    }

    pub fn saved_requests(&self) -> Vec<SavedRequest> {
        self.state.lock().unwrap().saved.clone()
    }

    pub fn collection_ids(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .collections
            .iter()
            .map(|(_, c)| c.id.clone())
            .collect()
    }

    pub fn folder_names(&self, collection_id: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .folders
            .iter()
            .filter(|(owner, _)| owner == collection_id)
            .map(|(_, f)| f.name.clone())
            .collect()
    }

    fn begin(&self) -> Result<std::sync::MutexGuard<'_, BackendState>, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        match state.fail_next.take() {
            Some(message) => Err(BackendError::Server {
                status: 500,
                message,
            }),
            None => Ok(state),
        }
    }
}

fn next_id(state: &mut BackendState, prefix: &str) -> String {
    state.next_id += 1;
    format!("{prefix}-{}", state.next_id)
}

fn answer_id(state: &BackendState, id: String) -> Option<String> {
    (!state.omit_ids).then_some(id)
}

#[async_trait]
impl CollectionBackend for FakeBackend {
    async fn create_collection(
        &self,
        title: &str,
        description: &str,
    ) -> Result<Option<String>, BackendError> {
        let mut state = self.begin()?;
        let id = next_id(&mut state, "col");
        state.collections.push((
            "u1".to_string(),
            CollectionRecord {
                id: id.clone(),
                title: title.to_string(),
                description: description.to_string(),
            },
        ));
        Ok(answer_id(&state, id))
    }

    async fn delete_collection(&self, id: &str) -> Result<(), BackendError> {
        let mut state = self.begin()?;
        state.collections.retain(|(_, c)| c.id != id);
        Ok(())
    }

    async fn list_collections(&self, user_id: &str) -> Result<Vec<CollectionRecord>, BackendError> {
        let state = self.begin()?;
        if state.fail_collection_list {
            return Err(BackendError::Network("collection listing failed".to_string()));
        }
        Ok(state
            .collections
            .iter()
            .filter(|(owner, _)| owner == user_id)
            .map(|(_, c)| c.clone())
            .collect())
    }

    async fn list_folders(&self, collection_id: &str) -> Result<Vec<FolderRecord>, BackendError> {
        let state = self.begin()?;
        if state.fail_folders_of.iter().any(|id| id == collection_id) {
            return Err(BackendError::Network("folder listing failed".to_string()));
        }
        Ok(state
            .folders
            .iter()
            .filter(|(owner, _)| owner == collection_id)
            .map(|(_, f)| f.clone())
            .collect())
    }

    async fn create_folder(
        &self,
        collection_id: &str,
        name: &str,
        description: &str,
    ) -> Result<Option<String>, BackendError> {
        let mut state = self.begin()?;
        let id = next_id(&mut state, "fold");
        state.folders.push((
            collection_id.to_string(),
            FolderRecord {
                id: id.clone(),
                name: name.to_string(),
                description: description.to_string(),
            },
        ));
        Ok(answer_id(&state, id))
    }

    async fn list_saved_requests(&self) -> Result<Vec<SavedRequest>, BackendError> {
        let state = self.begin()?;
        if state.fail_saved_list {
            return Err(BackendError::Network("saved list failed".to_string()));
        }
        Ok(state.saved.clone())
    }

    async fn fetch_saved_request(&self, id: &str) -> Result<SavedRequest, BackendError> {
        let state = self.begin()?;
        state
            .saved
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| BackendError::Server {
                status: 404,
                message: "not found".to_string(),
            })
    }

    async fn save_request(
        &self,
        request: &NewSavedRequest,
    ) -> Result<Option<String>, BackendError> {
        let mut state = self.begin()?;
        let id = next_id(&mut state, "api");
        state.saved.push(SavedRequest {
            id: id.clone(),
            method: request.method.clone(),
            url: request.url.clone(),
            headers: Some(request.headers.clone()),
            body: Some(request.body.clone()),
            response: Some(request.response.clone()),
            status: request.status,
            status_text: Some(request.status_text.clone()),
            folder_id: request.folder_id.clone(),
            collection_id: Some(request.collection_id.clone()),
        });
        Ok(answer_id(&state, id))
    }
}

#[async_trait]
impl EnvironmentBackend for FakeBackend {
    async fn create_environment(&self, title: &str) -> Result<Option<String>, BackendError> {
        let mut state = self.begin()?;
        let id = next_id(&mut state, "env");
        state.environments.push((
            "u1".to_string(),
            EnvironmentRecord {
                id: id.clone(),
                title: title.to_string(),
            },
        ));
        Ok(answer_id(&state, id))
    }

    async fn list_environments(
        &self,
        user_id: &str,
    ) -> Result<Vec<EnvironmentRecord>, BackendError> {
        let state = self.begin()?;
        Ok(state
            .environments
            .iter()
            .filter(|(owner, _)| owner == user_id)
            .map(|(_, e)| e.clone())
            .collect())
    }

    async fn list_variables(&self, env_id: &str) -> Result<Vec<Variable>, BackendError> {
        let state = self.begin()?;
        Ok(state
            .variables
            .iter()
            .filter(|(owner, _)| owner == env_id)
            .map(|(_, v)| v.clone())
            .collect())
    }

    async fn add_variable(&self, env_id: &str, key: &str, value: &str) -> Result<(), BackendError> {
        let mut state = self.begin()?;
        let id = next_id(&mut state, "var");
        state
            .variables
            .push((env_id.to_string(), Variable::new(id, key, value)));
        Ok(())
    }

    async fn update_variable(
        &self,
        var_id: &str,
        key: &str,
        value: &str,
    ) -> Result<(), BackendError> {
        let mut state = self.begin()?;
        let (_, variable) = state
            .variables
            .iter_mut()
            .find(|(_, v)| v.id == var_id)
            .ok_or_else(|| BackendError::Server {
                status: 404,
                message: "variable not found".to_string(),
            })?;
        variable.key = key.to_string();
        variable.value = value.to_string();
        Ok(())
    }

    async fn delete_variable(&self, var_id: &str) -> Result<(), BackendError> {
        let mut state = self.begin()?;
        state.variables.retain(|(_, v)| v.id != var_id);
        Ok(())
    }
}

/// One scripted transport answer.
pub enum Scripted {
    Reply {
        delay: Duration,
        status: u16,
        body: serde_json::Value,
    },
    Fail(TransportError),
}

/// Transport replaying scripted answers and recording what it received.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    pub received: Mutex<Vec<RequestDescriptor>>,
}

impl ScriptedTransport {
    pub fn reply(self, status: u16, body: serde_json::Value) -> Self {
        self.reply_after(Duration::ZERO, status, body)
    }

    pub fn reply_after(self, delay: Duration, status: u16, body: serde_json::Value) -> Self {
        self.script.lock().unwrap().push_back(Scripted::Reply {
            delay,
            status,
            body,
        });
        self
    }

    pub fn fail(self, message: &str, detail: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Fail(TransportError::new(message, detail)));
        self
    }

    pub fn received_count(&self) -> usize {
        self.received.lock().unwrap().len()
    }
}

impl ProxyTransport for ScriptedTransport {
    async fn dispatch(&self, request: &RequestDescriptor) -> Result<TransportReply, TransportError> {
        self.received.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Reply {
                delay,
                status,
                body,
            }) => {
                tokio::time::sleep(delay).await;
                Ok(TransportReply::Envelope(ProxyEnvelope {
                    status: Some(status),
                    status_text: Some("OK".to_string()),
                    time_ms: None,
                    headers: None,
                    body,
                }))
            }
            Some(Scripted::Fail(err)) => Err(err),
            None => Ok(TransportReply::Proxied {
                status: 200,
                status_text: "OK".to_string(),
                text: json!({"status": 200, "body": null}).to_string(),
            }),
        }
    }
}
