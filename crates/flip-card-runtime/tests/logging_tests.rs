use flip_card::MemoryBoard;
use flip_card_runtime::*;
use log::{Level, LevelFilter};
use std::sync::Arc;

// The global logger can only be installed once per test binary, so all
// logging assertions live in this single test.
#[tokio::test]
async fn test_startup_diagnostic_and_missing_button_error() {
    let logger = AppLogger::new(100).with_level(LevelFilter::Debug);
    logger.clone().init().unwrap();

    let board = Arc::new(MemoryBoard::new());
    let mut panel = SidebarPanel::with_inputs(4);
    panel.remove_element("create-card");

    let handle = initialize(board, PluginConfig::default(), &panel).unwrap();
    handle.unsubscribe().await.unwrap();

    let entries = logger.get_entries();
    assert!(
        entries
            .iter()
            .any(|entry| entry.level == Level::Info && entry.message.contains("initializing"))
    );

    let errors: Vec<_> = entries
        .iter()
        .filter(|entry| entry.level == Level::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].message,
        "The 'create-card' button was not found in the panel."
    );

    assert_eq!(
        logger.latest_message().as_deref(),
        Some("Flip card plugin unsubscribed")
    );

    logger.clear();
    assert!(logger.get_entries().is_empty());
}

#[test]
fn test_logger_keeps_most_recent_entries() {
    use log::Log;

    let logger = AppLogger::new(2);
    for i in 0..3 {
        logger.log(
            &log::Record::builder()
                .level(Level::Info)
                .target("test")
                .args(format_args!("entry {i}"))
                .build(),
        );
    }

    let messages: Vec<_> = logger
        .get_entries()
        .into_iter()
        .map(|entry| entry.message)
        .collect();
    assert_eq!(messages, vec!["entry 1", "entry 2"]);
}

#[test]
fn test_display_line_carries_level_target_and_message() {
    let entry = LogEntry {
        timestamp: chrono::Local::now(),
        level: Level::Warn,
        target: "flip_card_runtime::plugin".to_string(),
        message: "Host closed the item click stream".to_string(),
    };

    let line = entry.display_line();
    assert!(line.ends_with(
        " WARN  flip_card_runtime::plugin: Host closed the item click stream"
    ));
    assert_eq!(line.split(' ').next().map(str::len), Some("12:34:56.789".len()));
}
