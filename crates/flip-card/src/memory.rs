//! In-memory board host
//!
//! Stands in for the whiteboard in tests and in the command-line simulator.
//! Every call is journaled, and a single host operation can be armed to fail
//! so error paths can be driven deterministically.

use crate::host::{BoardHost, ClickStream};
use crate::types::{ClickEvent, FlipCardError, HostOp, ItemId, Metadata, Result, ShapeSpec};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

/// An object on the in-memory board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardItem {
    pub shape: ShapeSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    /// Changed since the last `sync`
    #[serde(default)]
    pub pending_sync: bool,
}

impl BoardItem {
    /// Markup currently displayed by the item
    pub fn content(&self) -> &str {
        &self.shape.content
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

/// One journaled host invocation
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    GetMetadata(ItemId),
    SetMetadata(ItemId, Metadata),
    UpdateContent(ItemId, String),
    Sync(ItemId),
    CreateShape(ShapeSpec),
    ShowNotification(String),
    ShowErrorNotification(String),
    SubscribeClicks,
}

impl HostCall {
    pub fn op(&self) -> HostOp {
        match self {
            HostCall::GetMetadata(_) => HostOp::GetMetadata,
            HostCall::SetMetadata(..) => HostOp::SetMetadata,
            HostCall::UpdateContent(..) => HostOp::UpdateContent,
            HostCall::Sync(_) => HostOp::Sync,
            HostCall::CreateShape(_) => HostOp::CreateShape,
            HostCall::ShowNotification(_) => HostOp::ShowNotification,
            HostCall::ShowErrorNotification(_) => HostOp::ShowErrorNotification,
            HostCall::SubscribeClicks => HostOp::SubscribeClicks,
        }
    }

    /// Whether the call changes board content or metadata
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            HostCall::SetMetadata(..)
                | HostCall::UpdateContent(..)
                | HostCall::Sync(_)
                | HostCall::CreateShape(_)
        )
    }
}

/// Persistable board contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub next_id: u64,
    pub items: BTreeMap<ItemId, BoardItem>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
}

#[derive(Default)]
struct BoardState {
    snapshot: BoardSnapshot,
    journal: Vec<HostCall>,
    armed_failures: HashSet<HostOp>,
    subscribers: Vec<mpsc::UnboundedSender<ClickEvent>>,
}

#[derive(Default)]
pub struct MemoryBoard {
    state: Mutex<BoardState>,
}

impl MemoryBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: BoardSnapshot) -> Self {
        Self {
            state: Mutex::new(BoardState {
                snapshot,
                ..Default::default()
            }),
        }
    }

    /// Load a board saved with [`MemoryBoard::save`]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let snapshot: BoardSnapshot = serde_json::from_slice(&bytes)?;
        Ok(Self::from_snapshot(snapshot))
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.snapshot())?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        self.state().snapshot.clone()
    }

    pub fn item(&self, item: &ItemId) -> Option<BoardItem> {
        self.state().snapshot.items.get(item).cloned()
    }

    pub fn item_ids(&self) -> Vec<ItemId> {
        self.state().snapshot.items.keys().cloned().collect()
    }

    /// Place an item directly, bypassing the journal
    pub fn insert_item(&self, item: ItemId, board_item: BoardItem) {
        self.state().snapshot.items.insert(item, board_item);
    }

    pub fn journal(&self) -> Vec<HostCall> {
        self.state().journal.clone()
    }

    pub fn clear_journal(&self) {
        self.state().journal.clear();
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.state().snapshot.notifications.clone()
    }

    /// Make the next call of `op` fail
    pub fn fail_next(&self, op: HostOp) {
        self.state().armed_failures.insert(op);
    }

    /// Deliver a click notification to every live subscriber.
    ///
    /// Returns the number of subscribers that received it.
    pub fn click(&self, items: impl IntoIterator<Item = ItemId>) -> usize {
        let event = ClickEvent::new(items);
        let mut state = self.state();
        state
            .subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
        state.subscribers.len()
    }

    /// Close every click stream handed out so far
    pub fn close_click_streams(&self) {
        self.state().subscribers.clear();
    }

    fn state(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Journal `call` and fail it if its operation was armed
    fn record(&self, call: HostCall) -> Result<MutexGuard<'_, BoardState>> {
        let op = call.op();
        let mut state = self.state();
        state.journal.push(call);
        if state.armed_failures.remove(&op) {
            return Err(FlipCardError::host(op, "injected failure"));
        }
        Ok(state)
    }
}

fn missing_item(op: HostOp, item: &ItemId) -> FlipCardError {
    FlipCardError::host(op, format!("no item with id {item}"))
}

#[async_trait::async_trait]
impl BoardHost for MemoryBoard {
    async fn get_metadata(&self, item: &ItemId) -> Result<Option<Metadata>> {
        let state = self.record(HostCall::GetMetadata(item.clone()))?;
        let board_item = state
            .snapshot
            .items
            .get(item)
            .ok_or_else(|| missing_item(HostOp::GetMetadata, item))?;
        Ok(board_item.metadata.clone())
    }

    async fn set_metadata(&self, item: &ItemId, metadata: Metadata) -> Result<()> {
        let mut state = self.record(HostCall::SetMetadata(item.clone(), metadata.clone()))?;
        let board_item = state
            .snapshot
            .items
            .get_mut(item)
            .ok_or_else(|| missing_item(HostOp::SetMetadata, item))?;
        board_item.metadata = Some(metadata);
        board_item.pending_sync = true;
        Ok(())
    }

    async fn update_content(&self, item: &ItemId, content: String) -> Result<()> {
        let mut state = self.record(HostCall::UpdateContent(item.clone(), content.clone()))?;
        let board_item = state
            .snapshot
            .items
            .get_mut(item)
            .ok_or_else(|| missing_item(HostOp::UpdateContent, item))?;
        board_item.shape.content = content;
        board_item.pending_sync = true;
        Ok(())
    }

    async fn sync(&self, item: &ItemId) -> Result<()> {
        let mut state = self.record(HostCall::Sync(item.clone()))?;
        let board_item = state
            .snapshot
            .items
            .get_mut(item)
            .ok_or_else(|| missing_item(HostOp::Sync, item))?;
        board_item.pending_sync = false;
        Ok(())
    }

    async fn create_shape(&self, spec: ShapeSpec) -> Result<ItemId> {
        let mut state = self.record(HostCall::CreateShape(spec.clone()))?;
        state.snapshot.next_id += 1;
        let item = ItemId::new(state.snapshot.next_id.to_string());
        state.snapshot.items.insert(
            item.clone(),
            BoardItem {
                shape: spec,
                metadata: None,
                pending_sync: true,
            },
        );
        Ok(item)
    }

    async fn show_notification(&self, message: &str) -> Result<()> {
        let mut state = self.record(HostCall::ShowNotification(message.to_string()))?;
        state.snapshot.notifications.push(Notification {
            kind: NotificationKind::Info,
            message: message.to_string(),
        });
        Ok(())
    }

    async fn show_error_notification(&self, message: &str) -> Result<()> {
        let mut state = self.record(HostCall::ShowErrorNotification(message.to_string()))?;
        state.snapshot.notifications.push(Notification {
            kind: NotificationKind::Error,
            message: message.to_string(),
        });
        Ok(())
    }

    fn subscribe_item_clicks(&self) -> Result<ClickStream> {
        let mut state = self.record(HostCall::SubscribeClicks)?;
        let (tx, rx) = mpsc::unbounded_channel();
        state.subscribers.push(tx);
        Ok(rx)
    }
}
