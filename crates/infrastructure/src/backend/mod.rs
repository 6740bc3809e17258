//! Backend REST adapter.
//!
//! [`RestBackend`] talks to the backend service; [`wire`] is the only place
//! that knows the backend's field names.

mod rest;
pub mod wire;

pub use rest::RestBackend;
