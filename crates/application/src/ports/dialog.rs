//! Dialog port

use async_trait::async_trait;

/// Confirmation and text prompts answered by the presentation layer.
#[async_trait]
pub trait Dialog: Send + Sync {
    /// Asks a yes/no question.
    async fn confirm(&self, message: &str) -> bool;

    /// Asks for a line of text; `None` when dismissed.
    async fn prompt(&self, message: &str, default: &str) -> Option<String>;
}
