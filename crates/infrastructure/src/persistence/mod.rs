//! Persistence adapters.

mod kv_store;

pub use kv_store::{FileKeyValueStore, MemoryKeyValueStore, STATE_FILE_NAME, StoreError};
