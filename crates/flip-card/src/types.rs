use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Host operations, used to report which call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostOp {
    GetMetadata,
    SetMetadata,
    UpdateContent,
    Sync,
    CreateShape,
    ShowNotification,
    ShowErrorNotification,
    SubscribeClicks,
}

impl HostOp {
    pub fn name(&self) -> &'static str {
        match self {
            HostOp::GetMetadata => "getMetadata",
            HostOp::SetMetadata => "setMetadata",
            HostOp::UpdateContent => "update",
            HostOp::Sync => "sync",
            HostOp::CreateShape => "createShape",
            HostOp::ShowNotification => "showNotification",
            HostOp::ShowErrorNotification => "showErrorNotification",
            HostOp::SubscribeClicks => "subscribeClicks",
        }
    }
}

impl fmt::Display for HostOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug)]
pub enum FlipCardError {
    #[error("No card sides defined")]
    NoSides,
    #[error("Item {item} is tagged as a flip card but its metadata is malformed: {reason}")]
    MalformedCard { item: ItemId, reason: String },
    #[error("Host call {op} failed: {message}")]
    Host { op: HostOp, message: String },
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl FlipCardError {
    pub fn host(op: HostOp, message: impl Into<String>) -> Self {
        FlipCardError::Host {
            op,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FlipCardError>;

/// Opaque identifier of an object on the board
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Host-managed key/value storage attached to a board object
pub type Metadata = serde_json::Map<String, Value>;

/// One face of a flip card
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSide {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub image_url: String,
}

impl CardSide {
    pub fn new(text: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image_url: image_url.into(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(text, "")
    }

    /// A side with neither text nor image is never stored
    pub fn is_blank(&self) -> bool {
        self.text.is_empty() && self.image_url.is_empty()
    }
}

pub const APP_ID_KEY: &str = "appId";
pub const CURRENT_SIDE_KEY: &str = "currentSide";

/// The flip card state as stored in an object's metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlipCardMetadata {
    pub app_id: String,
    pub card_data: Vec<CardSide>,
    pub current_side: usize,
}

impl FlipCardMetadata {
    pub fn new(app_id: impl Into<String>, card_data: Vec<CardSide>) -> Self {
        Self {
            app_id: app_id.into(),
            card_data,
            current_side: 0,
        }
    }

    pub fn to_metadata(&self) -> Result<Metadata> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(FlipCardError::Config(format!(
                "flip card metadata serialized to a non-object: {other}"
            ))),
        }
    }

    /// Read the flip card out of raw metadata.
    ///
    /// Returns `Ok(None)` when the metadata does not carry `app_id` as its tag.
    /// A matching tag with unreadable or empty card data is an error.
    pub fn from_metadata(
        item: &ItemId,
        metadata: &Metadata,
        app_id: &str,
    ) -> Result<Option<Self>> {
        match metadata.get(APP_ID_KEY) {
            Some(Value::String(tag)) if tag == app_id => {}
            _ => return Ok(None),
        }

        let card: FlipCardMetadata = serde_json::from_value(Value::Object(metadata.clone()))
            .map_err(|e| FlipCardError::MalformedCard {
                item: item.clone(),
                reason: e.to_string(),
            })?;

        if card.card_data.is_empty() {
            return Err(FlipCardError::MalformedCard {
                item: item.clone(),
                reason: "cardData has no sides".to_string(),
            });
        }

        Ok(Some(card))
    }

    pub fn current(&self) -> Option<&CardSide> {
        self.card_data.get(self.current_side)
    }
}

/// Parameters handed to the host when creating the card's shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeSpec {
    pub content: String,
    pub shape: String,
    pub style: ShapeStyle,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeStyle {
    pub fill_color: String,
    pub border_color: String,
    pub border_width: f64,
}

/// Notification from the host that board items were clicked
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub items: Vec<ItemId>,
}

impl ClickEvent {
    pub fn new(items: impl IntoIterator<Item = ItemId>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }

    pub fn single(item: ItemId) -> Self {
        Self { items: vec![item] }
    }
}
