use crate::form::CardForm;
use crate::host::BoardHost;
use crate::options::PluginConfig;
use crate::template::render_side_content;
use crate::types::{FlipCardError, FlipCardMetadata, ItemId, Result};

/// A card placed on the board by [`create_card`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedCard {
    pub item: ItemId,
    pub card: FlipCardMetadata,
}

/// Create a flip card from the sides entered on the form.
///
/// With no non-blank side the error notification is shown and nothing on the
/// board is touched. Host failures propagate as they occur; earlier calls are
/// not undone.
pub async fn create_card<H>(
    host: &H,
    config: &PluginConfig,
    form: &CardForm,
) -> Result<CreatedCard>
where
    H: BoardHost + ?Sized,
{
    let sides = form.sides(config.max_sides);

    let Some(initial_side) = sides.first() else {
        host.show_error_notification(&config.messages.no_sides).await?;
        return Err(FlipCardError::NoSides);
    };

    let spec = config.shape.to_shape_spec(render_side_content(initial_side));
    let item = host.create_shape(spec).await?;
    log::debug!("Created shape {item} with {} side(s)", sides.len());

    let card = FlipCardMetadata::new(config.app_id.clone(), sides);
    host.set_metadata(&item, card.to_metadata()?).await?;
    host.sync(&item).await?;

    host.show_notification(&config.messages.card_created).await?;

    Ok(CreatedCard { item, card })
}
