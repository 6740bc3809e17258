//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod backend;
mod dialog;
mod notifier;
mod store;
mod transport;

pub use backend::{
    BackendError, CollectionBackend, CollectionRecord, EnvironmentBackend, EnvironmentRecord,
    FolderRecord, NewSavedRequest,
};
pub use dialog::Dialog;
pub use notifier::{CoreEvent, Notifier};
pub use store::{KeyValueStore, StorageError};
pub use transport::{ProxyTransport, TransportError, TransportReply};
