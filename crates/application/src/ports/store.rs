//! Local key/value store port

use thiserror::Error;

/// Errors raised by a key/value store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// The backing medium failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// The stored data could not be decoded.
    #[error("corrupt store: {0}")]
    Corrupt(String),
}

/// Port for the small amount of persisted local state.
///
/// Values are JSON text, or bare strings for the token and active workspace.
pub trait KeyValueStore: Send + Sync {
    /// Reads a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
