//! Courier Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer: the backend REST client, the
//! transports, the local key/value stores and the tracing notifier, plus
//! the environment-driven configuration.

pub mod adapters;
pub mod backend;
pub mod config;
pub mod notifier;
pub mod persistence;
pub mod serialization;

pub use adapters::{DirectTransport, SelectedTransport};
pub use backend::RestBackend;
pub use config::{AppConfig, ConfigError, TransportMode};
pub use notifier::TracingNotifier;
pub use persistence::{FileKeyValueStore, MemoryKeyValueStore, StoreError};
pub use serialization::{SerializationError, from_json, to_json_stable};
