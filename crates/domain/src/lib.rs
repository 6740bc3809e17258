//! Courier Domain - Core business types
//!
//! This crate defines the domain model for the Courier API client engine:
//! requests and responses, environments, collections, workspaces and the
//! send history. All types here are pure Rust with no I/O dependencies.

pub mod collection;
pub mod environment;
pub mod error;
pub mod history;
pub mod id;
pub mod request;
pub mod response;

pub use collection::{
    Collection, Folder, SavedRequest, SavedRequestRef, Workspace, WorkspaceCollectionMap,
};
pub use environment::{Environment, Variable};
pub use error::{DomainError, DomainResult};
pub use history::{HISTORY_CAPACITY, HistoryEntry, HistoryLog};
pub use id::generate_id;
pub use request::{BodyType, HttpMethod, KeyValueRow, RequestDescriptor, RequestPayload};
pub use response::{ProxyEnvelope, ResponseDescriptor, ResponseStatus};
