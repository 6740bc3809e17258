//! Notification port

/// Something the user should hear about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    /// A collection was created.
    CollectionCreated {
        /// Collection id.
        id: String,
        /// Collection name.
        name: String,
    },
    /// A collection was deleted.
    CollectionDeleted {
        /// Collection id.
        id: String,
    },
    /// A folder was created.
    FolderCreated {
        /// Owning collection.
        collection_id: String,
        /// Folder id.
        folder_id: String,
    },
    /// A request snapshot was saved.
    RequestSaved {
        /// Saved request id.
        id: String,
    },
    /// An environment was created.
    EnvironmentCreated {
        /// Environment id.
        id: String,
    },
    /// A send produced no reply.
    SendFailed {
        /// Error message.
        message: String,
    },
    /// An operation failed.
    OperationFailed {
        /// Error message.
        message: String,
    },
}

/// Port for user-facing notifications.
pub trait Notifier: Send + Sync {
    /// Delivers an event.
    fn notify(&self, event: CoreEvent);
}
