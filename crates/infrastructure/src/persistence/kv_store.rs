//! Local key/value stores.
//!
//! The file store keeps every key in one JSON object on disk:
//! - Linux: ~/.config/courier/state.json
//! - macOS: ~/Library/Application Support/courier/state.json
//! - Windows: %APPDATA%/courier/state.json

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use courier_application::ports::{KeyValueStore, StorageError};
use tokio::fs;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::serialization::{SerializationError, from_json, to_json_stable};

/// File name of the state file inside the data directory.
pub const STATE_FILE_NAME: &str = "state.json";

/// Errors raised while opening or writing the state file.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The state could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// The store lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Poisoned,

    /// The background writer is gone.
    #[error("state writer stopped")]
    WriterStopped,
}

impl From<StoreError> for StorageError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Serialization(e) => Self::Corrupt(e.to_string()),
            other => Self::Io(other.to_string()),
        }
    }
}

type Values = BTreeMap<String, String>;

enum WriteCommand {
    Save(Values),
    Sync(oneshot::Sender<()>),
}

impl std::fmt::Debug for WriteCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Save(values) => write!(f, "Save({} keys)", values.len()),
            Self::Sync(_) => f.write_str("Sync"),
        }
    }
}

/// Key/value store persisted as a single JSON file.
///
/// Reads are served from an in-memory cache. Every change queues a snapshot
/// for a background task that rewrites the file with `tokio::fs`, in order;
/// [`FileKeyValueStore::sync`] waits for the queue to drain.
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    values: Mutex<Values>,
    writer: mpsc::UnboundedSender<WriteCommand>,
}

impl FileKeyValueStore {
    /// Opens the state file in `dir` and starts its writer task.
    ///
    /// A missing file starts empty. A file that cannot be decoded is logged
    /// and also starts empty; it is overwritten on the next write.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read.
    pub async fn open(dir: &Path) -> Result<Self, StoreError> {
        let path = dir.join(STATE_FILE_NAME);
        let values = match fs::read_to_string(&path).await {
            Ok(text) => from_json::<Values>(&text).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "state file is corrupt, starting empty");
                Values::new()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Values::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), keys = values.len(), "opened state file");

        let (writer, commands) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(path.clone(), commands));
        Ok(Self {
            path,
            values: Mutex::new(values),
            writer,
        })
    }

    /// Returns the path of the state file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Waits until every change made so far has been written.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer task is gone.
    pub async fn sync(&self) -> Result<(), StoreError> {
        let (done, finished) = oneshot::channel();
        self.writer
            .send(WriteCommand::Sync(done))
            .map_err(|_| StoreError::WriterStopped)?;
        finished.await.map_err(|_| StoreError::WriterStopped)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Values>, StoreError> {
        self.values.lock().map_err(|_| StoreError::Poisoned)
    }

    fn queue(&self, values: &Values) -> Result<(), StoreError> {
        self.writer
            .send(WriteCommand::Save(values.clone()))
            .map_err(|_| StoreError::WriterStopped)
    }
}

async fn run_writer(path: PathBuf, mut commands: mpsc::UnboundedReceiver<WriteCommand>) {
    while let Some(command) = commands.recv().await {
        match command {
            WriteCommand::Save(values) => {
                if let Err(e) = write_file(&path, &values).await {
                    warn!(path = %path.display(), error = %e, "failed to write state file");
                }
            }
            WriteCommand::Sync(done) => {
                // The waiter may have given up.
                let _ = done.send(());
            }
        }
    }
}

async fn write_file(path: &Path, values: &Values) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, to_json_stable(values)?).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.lock()?;
        values.insert(key.to_string(), value.to_string());
        self.queue(&values)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self.lock()?;
        if values.remove(key).is_some() {
            self.queue(&values)?;
        }
        Ok(())
    }
}

/// Key/value store that lives for the process only.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    values: Mutex<Values>,
}

impl MemoryKeyValueStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Values>, StorageError> {
        self.values
            .lock()
            .map_err(|_| StoreError::Poisoned.into())
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::open(dir.path()).await.unwrap();
        store.set("token", "abc").unwrap();
        store.set("activeWorkspace", "ws-1").unwrap();
        store.remove("token").unwrap();
        store.sync().await.unwrap();

        let reopened = FileKeyValueStore::open(dir.path()).await.unwrap();
        assert_eq!(reopened.get("activeWorkspace").unwrap().as_deref(), Some("ws-1"));
        assert_eq!(reopened.get("token").unwrap(), None);
    }

    #[tokio::test]
    async fn test_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FileKeyValueStore::open(&nested).await.unwrap();

        store.set("k", "v").unwrap();
        store.sync().await.unwrap();
        assert!(nested.join(STATE_FILE_NAME).exists());
        assert_eq!(store.path(), nested.join(STATE_FILE_NAME));
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(STATE_FILE_NAME), "not json").unwrap();

        let store = FileKeyValueStore::open(dir.path()).await.unwrap();
        assert_eq!(store.get("workspaces").unwrap(), None);

        store.set("workspaces", "[]").unwrap();
        store.sync().await.unwrap();
        let text = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(text, "{\n  \"workspaces\": \"[]\"\n}\n");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_writes_leave_the_caller_and_land_in_order() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::open(dir.path()).await.unwrap();

        for n in 1..=5 {
            store.set("counter", &n.to_string()).unwrap();
        }
        // Nothing is written until the writer task gets to run.
        assert!(!store.path().exists());
        assert_eq!(store.get("counter").unwrap().as_deref(), Some("5"));

        store.sync().await.unwrap();
        let reopened = FileKeyValueStore::open(dir.path()).await.unwrap();
        assert_eq!(reopened.get("counter").unwrap().as_deref(), Some("5"));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryKeyValueStore::new();
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }
}
