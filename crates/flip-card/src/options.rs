use crate::types::{FlipCardError, Result, ShapeSpec, ShapeStyle};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_APP_ID: &str = "flip-card-app";
pub const DEFAULT_MAX_SIDES: usize = 4;

/// Visual parameters of a newly created card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeStyleOptions {
    pub shape: String,
    pub fill_color: String,
    pub border_color: String,
    pub border_width: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for ShapeStyleOptions {
    fn default() -> Self {
        Self {
            shape: "rectangle".to_string(),
            fill_color: "#ffffff".to_string(),
            border_color: "#000000".to_string(),
            border_width: 2.0,
            width: 320.0,
            height: 240.0,
        }
    }
}

impl ShapeStyleOptions {
    /// Shape creation parameters carrying `content` as the initial display
    pub fn to_shape_spec(&self, content: String) -> ShapeSpec {
        ShapeSpec {
            content,
            shape: self.shape.clone(),
            style: ShapeStyle {
                fill_color: self.fill_color.clone(),
                border_color: self.border_color.clone(),
                border_width: self.border_width,
            },
            width: self.width,
            height: self.height,
        }
    }
}

/// User-facing notification texts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationMessages {
    pub card_created: String,
    pub card_flipped: String,
    pub no_sides: String,
}

impl Default for NotificationMessages {
    fn default() -> Self {
        Self {
            card_created: "Flip card created! Click the shape on the board to flip it.".to_string(),
            card_flipped: "Card flipped!".to_string(),
            no_sides: "Please define at least one card side.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    /// Metadata tag marking objects owned by this plugin
    pub app_id: String,
    /// Number of side input pairs on the sidebar form
    pub max_sides: usize,
    pub shape: ShapeStyleOptions,
    pub messages: NotificationMessages,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            app_id: DEFAULT_APP_ID.to_string(),
            max_sides: DEFAULT_MAX_SIDES,
            shape: ShapeStyleOptions::default(),
            messages: NotificationMessages::default(),
        }
    }
}

impl PluginConfig {
    /// Load config from JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let config: PluginConfig = serde_json::from_slice(&bytes)
            .map_err(|e| FlipCardError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to JSON file
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| FlipCardError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.app_id.is_empty() {
            return Err(FlipCardError::Config("App id must not be empty".to_string()));
        }

        if self.max_sides == 0 {
            return Err(FlipCardError::Config(
                "At least one side input is required".to_string(),
            ));
        }

        if !(self.shape.width > 0.0 && self.shape.height > 0.0) {
            return Err(FlipCardError::Config(format!(
                "Card dimensions must be positive, got {}x{}",
                self.shape.width, self.shape.height
            )));
        }

        if self.shape.border_width < 0.0 {
            return Err(FlipCardError::Config(
                "Border width must not be negative".to_string(),
            ));
        }

        Ok(())
    }
}
