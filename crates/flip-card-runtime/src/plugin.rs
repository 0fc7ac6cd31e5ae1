use crate::{PluginCommand, PluginUpdate, Result, RuntimeError};
use flip_card::form::CREATE_BUTTON_ID;
use flip_card::{
    BoardHost, CardForm, ClickEvent, ClickStream, FlipCardError, FlipOutcome, PluginConfig,
    SidebarPanel, create_card, handle_click,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};

/// Handle to a running plugin: the standing click subscription plus the
/// sidebar's create action
pub struct PluginHandle<H: ?Sized> {
    config: Arc<PluginConfig>,
    create_bound: bool,
    command_tx: mpsc::UnboundedSender<PluginCommand>,
    update_rx: mpsc::UnboundedReceiver<PluginUpdate>,
    listener: Option<JoinHandle<()>>,
    host: Arc<H>,
}

/// Start the plugin on `host`.
///
/// Subscribes to item clicks once and spawns the listener task on the current
/// tokio runtime. If `panel` has no create button the plugin still flips
/// cards but refuses create requests.
pub fn initialize<H>(
    host: Arc<H>,
    config: PluginConfig,
    panel: &SidebarPanel,
) -> Result<PluginHandle<H>>
where
    H: BoardHost + ?Sized + 'static,
{
    config.validate()?;
    log::info!("Board SDK is ready and the flip card plugin is initializing.");

    let clicks = host.subscribe_item_clicks()?;
    let config = Arc::new(config);

    let create_bound = panel.has_element(CREATE_BUTTON_ID);
    if !create_bound {
        log::error!("The '{CREATE_BUTTON_ID}' button was not found in the panel.");
    }

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, update_rx) = mpsc::unbounded_channel();

    let listener = tokio::spawn(listener_task(
        Arc::clone(&host),
        Arc::clone(&config),
        clicks,
        command_rx,
        update_tx,
    ));

    Ok(PluginHandle {
        config,
        create_bound,
        command_tx,
        update_rx,
        listener: Some(listener),
        host,
    })
}

impl<H: ?Sized> PluginHandle<H> {
    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    /// Press the sidebar's create button, reading the side inputs as they are now
    pub fn press_create(&self, panel: &SidebarPanel) -> Result<()> {
        if !self.create_bound {
            return Err(RuntimeError::CreateControlMissing(CREATE_BUTTON_ID));
        }
        let form = CardForm::read(panel, self.config.max_sides);
        self.command_tx
            .send(PluginCommand::CreateCard { form })
            .map_err(|_| RuntimeError::ShutDown)
    }

    /// Next update from the listener, `None` once it has shut down
    pub async fn next_update(&mut self) -> Option<PluginUpdate> {
        self.update_rx.recv().await
    }

    /// Updates received so far without waiting
    pub fn drain_updates(&mut self) -> Vec<PluginUpdate> {
        let mut updates = Vec::new();
        while let Ok(update) = self.update_rx.try_recv() {
            updates.push(update);
        }
        updates
    }

    /// Stop listening for clicks.
    ///
    /// Handlers already running are awaited, not cancelled. Returns the
    /// updates they produced that were not yet received.
    pub async fn unsubscribe(mut self) -> Result<Vec<PluginUpdate>> {
        // A send error means the listener already exited
        let _ = self.command_tx.send(PluginCommand::Shutdown);
        if let Some(listener) = self.listener.take() {
            listener.await?;
        }
        log::debug!("Flip card plugin unsubscribed");

        let mut updates = Vec::new();
        while let Some(update) = self.update_rx.recv().await {
            updates.push(update);
        }
        Ok(updates)
    }
}

impl<H: ?Sized> Drop for PluginHandle<H> {
    /// Detaches the listener; flips already running still complete
    fn drop(&mut self) {
        if self.listener.take().is_some() {
            let _ = self.command_tx.send(PluginCommand::Shutdown);
        }
    }
}

/// Long-lived task multiplexing host clicks and sidebar commands.
///
/// Each event runs in its own task so flips of different items interleave;
/// within one flip the host calls stay sequential. Clicks delivered before
/// shutdown are always handled.
async fn listener_task<H>(
    host: Arc<H>,
    config: Arc<PluginConfig>,
    mut clicks: ClickStream,
    mut command_rx: mpsc::UnboundedReceiver<PluginCommand>,
    update_tx: mpsc::UnboundedSender<PluginUpdate>,
) where
    H: BoardHost + ?Sized + 'static,
{
    let mut in_flight = JoinSet::new();
    let mut clicks_open = true;

    loop {
        tokio::select! {
            biased;

            event = clicks.recv(), if clicks_open => match event {
                Some(event) => {
                    in_flight.spawn(process_click(
                        Arc::clone(&host),
                        Arc::clone(&config),
                        event,
                        update_tx.clone(),
                    ));
                }
                None => {
                    log::warn!("Host closed the item click stream");
                    clicks_open = false;
                }
            },
            cmd = command_rx.recv() => match cmd {
                Some(PluginCommand::CreateCard { form }) => {
                    in_flight.spawn(process_create(
                        Arc::clone(&host),
                        Arc::clone(&config),
                        form,
                        update_tx.clone(),
                    ));
                }
                Some(PluginCommand::Shutdown) | None => break,
            },
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                report_join(joined, &update_tx);
            }
        }
    }

    while let Ok(event) = clicks.try_recv() {
        in_flight.spawn(process_click(
            Arc::clone(&host),
            Arc::clone(&config),
            event,
            update_tx.clone(),
        ));
    }
    drop(clicks);

    while let Some(joined) = in_flight.join_next().await {
        report_join(joined, &update_tx);
    }
}

fn report_join(
    joined: std::result::Result<(), tokio::task::JoinError>,
    update_tx: &mpsc::UnboundedSender<PluginUpdate>,
) {
    if let Err(e) = joined {
        log::error!("Handler task failed: {e}");
        let _ = update_tx.send(PluginUpdate::Error {
            message: format!("Handler task failed: {e}"),
        });
    }
}

async fn process_click<H>(
    host: Arc<H>,
    config: Arc<PluginConfig>,
    event: ClickEvent,
    update_tx: mpsc::UnboundedSender<PluginUpdate>,
) where
    H: BoardHost + ?Sized,
{
    let update = match handle_click(host.as_ref(), &config, &event).await {
        Ok(FlipOutcome::Flipped { item, from, to }) => PluginUpdate::CardFlipped { item, from, to },
        Ok(FlipOutcome::Ignored(reason)) => {
            log::debug!("Ignoring click: {reason:?}");
            PluginUpdate::ClickIgnored { reason }
        }
        Err(e) => {
            log::error!("Failed to flip card: {e}");
            PluginUpdate::Error {
                message: format!("Failed to flip card: {e}"),
            }
        }
    };
    let _ = update_tx.send(update);
}

async fn process_create<H>(
    host: Arc<H>,
    config: Arc<PluginConfig>,
    form: CardForm,
    update_tx: mpsc::UnboundedSender<PluginUpdate>,
) where
    H: BoardHost + ?Sized,
{
    let update = match create_card(host.as_ref(), &config, &form).await {
        Ok(created) => {
            log::info!(
                "Created flip card {} with {} side(s)",
                created.item,
                created.card.card_data.len()
            );
            PluginUpdate::CardCreated {
                item: created.item,
                side_count: created.card.card_data.len(),
            }
        }
        Err(FlipCardError::NoSides) => PluginUpdate::NoSides,
        Err(e) => {
            log::error!("Failed to create flip card: {e}");
            PluginUpdate::Error {
                message: format!("Failed to create flip card: {e}"),
            }
        }
    };
    let _ = update_tx.send(update);
}
