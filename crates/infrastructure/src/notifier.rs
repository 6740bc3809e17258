//! Notifier that writes events to the log.

use courier_application::ports::{CoreEvent, Notifier};
use tracing::{info, warn};

/// Logs every event through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, event: CoreEvent) {
        match event {
            CoreEvent::CollectionCreated { id, name } => {
                info!(collection_id = %id, %name, "Collection created");
            }
            CoreEvent::CollectionDeleted { id } => info!(collection_id = %id, "Collection deleted"),
            CoreEvent::FolderCreated {
                collection_id,
                folder_id,
            } => info!(%collection_id, %folder_id, "Folder created"),
            CoreEvent::RequestSaved { id } => info!(request_id = %id, "Request saved"),
            CoreEvent::EnvironmentCreated { id } => info!(env_id = %id, "Environment created"),
            CoreEvent::SendFailed { message } => warn!(%message, "Request failed"),
            CoreEvent::OperationFailed { message } => warn!(%message, "Operation failed"),
        }
    }
}
