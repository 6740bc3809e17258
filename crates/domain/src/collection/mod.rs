//! Collection domain types
//!
//! Collections group saved requests directly or inside folders. Workspaces
//! filter which collections are visible through a persisted membership map.

mod item;
mod model;
mod saved;
mod workspace;

pub use item::{Folder, SavedRequestRef};
pub use model::{COPY_SUFFIX, Collection, DEFAULT_COLLECTION_NAME};
pub use saved::SavedRequest;
pub use workspace::{
    DEFAULT_WORKSPACE_ID, DEFAULT_WORKSPACE_NAME, Workspace, WorkspaceCollectionMap,
};
