use thiserror::Error;

mod logger;
mod plugin;

pub use logger::{AppLogger, LogEntry};
pub use plugin::{PluginHandle, initialize};

// Re-export types from the library crate
pub use flip_card::{
    CardForm, ClickEvent, FlipCardError, IgnoreReason, ItemId, PluginConfig, SidebarPanel,
};

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("The '{0}' button was not found in the panel.")]
    CreateControlMissing(&'static str),
    #[error("Plugin listener has shut down")]
    ShutDown,
    #[error(transparent)]
    FlipCard(#[from] FlipCardError),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Commands sent from the sidebar to the listener task
#[derive(Debug)]
pub enum PluginCommand {
    CreateCard { form: CardForm },
    Shutdown,
}

/// Updates sent from the listener task, one per handled command or click
#[derive(Debug, Clone, PartialEq)]
pub enum PluginUpdate {
    CardCreated {
        item: ItemId,
        side_count: usize,
    },
    CardFlipped {
        item: ItemId,
        from: usize,
        to: usize,
    },
    ClickIgnored {
        reason: IgnoreReason,
    },
    /// Creation refused because every side was blank
    NoSides,
    Error {
        message: String,
    },
}
