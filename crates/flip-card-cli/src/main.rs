use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use flip_card::{CardSide, FlipCardMetadata, ItemId, MemoryBoard, PluginConfig, SidebarPanel};
use flip_card_runtime::{AppLogger, PluginUpdate};
use log::LevelFilter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "flipc", about = "Flip card board simulator", version)]
struct Cli {
    /// Board file, created when missing
    #[arg(short, long, global = true, default_value = "board.json")]
    board: PathBuf,

    /// Plugin configuration (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a flip card from the sidebar form
    Create {
        /// Side as TEXT or TEXT|IMAGE_URL, repeated in flip order
        #[arg(short, long = "side")]
        sides: Vec<String>,

        /// CSV file of sides (columns: text, imageUrl), appended after --side values
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Click board items; a card flips only when exactly one item is clicked
    Click { items: Vec<String> },

    /// List board items and the side each flip card shows
    Show { item: Option<String> },
}

fn parse_side(value: &str) -> CardSide {
    match value.split_once('|') {
        Some((text, image_url)) => CardSide::new(text, image_url),
        None => CardSide::text(value),
    }
}

async fn load_board(path: &Path) -> Result<MemoryBoard> {
    if tokio::fs::try_exists(path).await? {
        MemoryBoard::load(path)
            .await
            .with_context(|| format!("Failed to load board {}", path.display()))
    } else {
        Ok(MemoryBoard::new())
    }
}

async fn load_config(path: Option<&Path>) -> Result<PluginConfig> {
    match path {
        Some(path) => PluginConfig::load(path)
            .await
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(PluginConfig::default()),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref()).await?;
    let board = Arc::new(load_board(&cli.board).await?);
    let seen_notifications = board.notifications().len();

    match cli.command {
        Commands::Create { sides, csv } => {
            let mut sides: Vec<CardSide> =
                sides.iter().map(String::as_str).map(parse_side).collect();
            if let Some(csv) = csv {
                sides.extend(flip_card::load_sides_from_csv(&csv).await?);
            }
            if sides.len() > config.max_sides {
                bail!(
                    "The form has {} side inputs, got {} sides",
                    config.max_sides,
                    sides.len()
                );
            }

            let mut panel = SidebarPanel::with_inputs(config.max_sides);
            for (i, side) in sides.iter().enumerate() {
                panel.fill_side(i + 1, side);
            }

            let mut handle = flip_card_runtime::initialize(board.clone(), config, &panel)?;
            handle.press_create(&panel)?;
            let update = handle.next_update().await;
            handle.unsubscribe().await?;
            board.save(&cli.board).await?;
            print_notifications(&board, seen_notifications);

            match update {
                Some(PluginUpdate::CardCreated { item, side_count }) => {
                    println!("Created flip card {item} with {side_count} side(s)");
                }
                Some(PluginUpdate::NoSides) => bail!("No card sides defined"),
                Some(PluginUpdate::Error { message }) => bail!(message),
                other => bail!("Unexpected plugin update: {other:?}"),
            }
        }

        Commands::Click { items } => {
            let panel = SidebarPanel::with_inputs(config.max_sides);
            let mut handle = flip_card_runtime::initialize(board.clone(), config, &panel)?;
            board.click(items.into_iter().map(ItemId::new));
            let update = handle.next_update().await;
            handle.unsubscribe().await?;
            board.save(&cli.board).await?;
            print_notifications(&board, seen_notifications);

            match update {
                Some(PluginUpdate::CardFlipped { item, from, to }) => {
                    println!("Flipped {item}: side {} → side {}", from + 1, to + 1);
                }
                Some(PluginUpdate::ClickIgnored { reason }) => {
                    println!("Click ignored: {reason:?}");
                }
                Some(PluginUpdate::Error { message }) => bail!(message),
                other => bail!("Unexpected plugin update: {other:?}"),
            }
        }

        Commands::Show { item } => {
            let ids = match item {
                Some(id) => vec![ItemId::new(id)],
                None => board.item_ids(),
            };
            if ids.is_empty() {
                println!("Board is empty");
            }
            for id in ids {
                show_item(&board, &config, &id)?;
            }
        }
    }

    Ok(())
}

fn show_item(board: &MemoryBoard, config: &PluginConfig, id: &ItemId) -> Result<()> {
    let Some(item) = board.item(id) else {
        bail!("No item with id {id}");
    };

    let card = match &item.metadata {
        Some(metadata) => FlipCardMetadata::from_metadata(id, metadata, &config.app_id)?,
        None => None,
    };
    let sync_marker = if item.pending_sync { " (unsynced)" } else { "" };

    match card.as_ref().and_then(|card| card.current().map(|side| (card, side))) {
        Some((card, side)) => {
            println!(
                "{id}: flip card, side {}/{}{sync_marker}",
                card.current_side + 1,
                card.card_data.len()
            );
            println!("  text:  {}", side.text);
            if !side.image_url.is_empty() {
                println!("  image: {}", side.image_url);
            }
        }
        None => println!("{id}: {} shape{sync_marker}", item.shape.shape),
    }
    println!("  content: {}", item.content());

    Ok(())
}

fn print_notifications(board: &MemoryBoard, skip: usize) {
    for notification in board.notifications().iter().skip(skip) {
        println!("[{:?}] {}", notification.kind, notification.message);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    AppLogger::new(256)
        .with_level(level)
        .with_stderr(true)
        .init()?;

    run(cli).await
}
