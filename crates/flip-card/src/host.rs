//! Capabilities the whiteboard host exposes to the plugin
//!
//! Board state lives entirely on the host. Nothing here caches metadata
//! between calls: every operation reads it fresh and writes it back.

use crate::types::{ClickEvent, ItemId, Metadata, Result, ShapeSpec};
use tokio::sync::mpsc;

/// Stream of item-click notifications; closes when the host drops its sender
pub type ClickStream = mpsc::UnboundedReceiver<ClickEvent>;

#[async_trait::async_trait]
pub trait BoardHost: Send + Sync {
    /// Metadata attached to `item`, `None` if it carries none
    async fn get_metadata(&self, item: &ItemId) -> Result<Option<Metadata>>;

    /// Replace the metadata attached to `item`
    async fn set_metadata(&self, item: &ItemId, metadata: Metadata) -> Result<()>;

    /// Replace the display content of `item` with a markup string
    async fn update_content(&self, item: &ItemId, content: String) -> Result<()>;

    /// Flush pending changes of `item` to other board users
    async fn sync(&self, item: &ItemId) -> Result<()>;

    async fn create_shape(&self, spec: ShapeSpec) -> Result<ItemId>;

    async fn show_notification(&self, message: &str) -> Result<()>;

    async fn show_error_notification(&self, message: &str) -> Result<()>;

    /// Register for item-click notifications
    fn subscribe_item_clicks(&self) -> Result<ClickStream>;
}
