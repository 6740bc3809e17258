//! Courier Application - Services and ports
//!
//! This crate holds the request flow of the Courier API client engine: the
//! template resolver, request builder, environment manager, collection
//! repository, proxy execution client and save/load pipeline, wired
//! together by the [`Workbench`]. External systems are reached only through
//! the traits in [`ports`].

pub mod auth;
pub mod collections;
pub mod context;
pub mod environment_manager;
pub mod error;
pub mod local_state;
pub mod ports;
pub mod proxy_client;
pub mod request_builder;
pub mod save_load;
pub mod variable_resolver;
pub mod workbench;

#[cfg(test)]
mod test_support;

pub use auth::{AuthSession, AuthSnapshot, AuthSubscription, User};
pub use collections::CollectionRepository;
pub use context::AppContext;
pub use environment_manager::EnvironmentManager;
pub use error::{ApplicationError, ApplicationResult};
pub use local_state::LocalState;
pub use proxy_client::{ProxyExecutionClient, SharedHistory, shared_history};
pub use request_builder::RequestBuilder;
pub use save_load::{LoadedRequest, SaveInput, SavePipeline, SaveTarget};
pub use variable_resolver::{Resolution, TemplateResolver};
pub use workbench::{Backends, Workbench};
