//! Advancing a flip card when it is clicked
//!
//! Per click:
//! 1. Ignore events that do not report exactly one item
//! 2. Ignore items whose metadata lacks the plugin tag
//! 3. Advance the side pointer, wrapping to the first side
//! 4. Rewrite the displayed content
//! 5. Persist the pointer over the previous metadata snapshot
//! 6. Sync and notify
//!
//! Host calls are issued one after another. A failing call aborts the rest of
//! the flip and leaves the item as the last successful call left it.

use crate::host::BoardHost;
use crate::options::PluginConfig;
use crate::template::render_side_content;
use crate::types::{
    CURRENT_SIDE_KEY, ClickEvent, FlipCardError, FlipCardMetadata, ItemId, Result,
};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The click reported zero or several items
    NotSingleItem { count: usize },
    NoMetadata,
    NotFlipCard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlipOutcome {
    Ignored(IgnoreReason),
    Flipped { item: ItemId, from: usize, to: usize },
}

/// Side shown after a flip of a card with `len` sides.
///
/// Callers guarantee `len > 0`.
pub fn next_side_index(current: usize, len: usize) -> usize {
    (current % len + 1) % len
}

/// Handle one item-click notification from the host
pub async fn handle_click<H>(
    host: &H,
    config: &PluginConfig,
    event: &ClickEvent,
) -> Result<FlipOutcome>
where
    H: BoardHost + ?Sized,
{
    let [item] = event.items.as_slice() else {
        return Ok(FlipOutcome::Ignored(IgnoreReason::NotSingleItem {
            count: event.items.len(),
        }));
    };

    flip_item(host, config, item).await
}

/// Flip `item` if it is one of this plugin's cards
pub async fn flip_item<H>(host: &H, config: &PluginConfig, item: &ItemId) -> Result<FlipOutcome>
where
    H: BoardHost + ?Sized,
{
    let Some(mut metadata) = host.get_metadata(item).await? else {
        return Ok(FlipOutcome::Ignored(IgnoreReason::NoMetadata));
    };

    let Some(card) = FlipCardMetadata::from_metadata(item, &metadata, &config.app_id)? else {
        return Ok(FlipOutcome::Ignored(IgnoreReason::NotFlipCard));
    };

    let from = card.current_side;
    let to = next_side_index(from, card.card_data.len());
    let next_side = card
        .card_data
        .get(to)
        .ok_or_else(|| FlipCardError::MalformedCard {
            item: item.clone(),
            reason: format!("side {to} out of range"),
        })?;

    host.update_content(item, render_side_content(next_side)).await?;

    // Shallow merge: unknown keys written by other tools survive the flip
    metadata.insert(CURRENT_SIDE_KEY.to_string(), Value::from(to));
    host.set_metadata(item, metadata).await?;

    host.sync(item).await?;
    host.show_notification(&config.messages.card_flipped).await?;

    log::debug!("Flipped {item} from side {from} to side {to}");
    Ok(FlipOutcome::Flipped {
        item: item.clone(),
        from,
        to,
    })
}
