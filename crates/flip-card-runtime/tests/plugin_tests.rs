use flip_card::memory::HostCall;
use flip_card::{BoardHost, CardSide, ClickStream, HostOp, MemoryBoard, Metadata, ShapeSpec};
use flip_card::SidebarPanel;
use flip_card_runtime::*;
use std::sync::Arc;
use std::time::Duration;

fn panel_with(sides: &[&str]) -> SidebarPanel {
    let mut panel = SidebarPanel::with_inputs(4);
    for (i, text) in sides.iter().enumerate() {
        panel.fill_side(i + 1, &CardSide::text(*text));
    }
    panel
}

async fn create(handle: &mut PluginHandle<MemoryBoard>, sides: &[&str]) -> ItemId {
    handle.press_create(&panel_with(sides)).unwrap();
    match handle.next_update().await {
        Some(PluginUpdate::CardCreated { item, .. }) => item,
        other => panic!("Expected CardCreated, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_then_flip_through_clicks() {
    let board = Arc::new(MemoryBoard::new());
    let panel = SidebarPanel::with_inputs(4);
    let mut handle = initialize(board.clone(), PluginConfig::default(), &panel).unwrap();

    let item = create(&mut handle, &["Front", "Back"]).await;

    assert_eq!(board.click([item.clone()]), 1);
    assert_eq!(
        handle.next_update().await,
        Some(PluginUpdate::CardFlipped {
            item: item.clone(),
            from: 0,
            to: 1
        })
    );
    assert!(board.item(&item).unwrap().content().ends_with("<p>Back</p>"));

    board.click([item.clone()]);
    assert_eq!(
        handle.next_update().await,
        Some(PluginUpdate::CardFlipped {
            item: item.clone(),
            from: 1,
            to: 0
        })
    );
    assert!(board.item(&item).unwrap().content().ends_with("<p>Front</p>"));

    handle.unsubscribe().await.unwrap();
}

#[tokio::test]
async fn test_subscribes_exactly_once() {
    let board = Arc::new(MemoryBoard::new());
    let handle = initialize(
        board.clone(),
        PluginConfig::default(),
        &SidebarPanel::with_inputs(4),
    )
    .unwrap();

    let subscriptions = board
        .journal()
        .iter()
        .filter(|call| call.op() == HostOp::SubscribeClicks)
        .count();
    assert_eq!(subscriptions, 1);

    handle.unsubscribe().await.unwrap();
}

#[tokio::test]
async fn test_ambiguous_clicks_are_ignored() {
    let board = Arc::new(MemoryBoard::new());
    let panel = SidebarPanel::with_inputs(4);
    let mut handle = initialize(board.clone(), PluginConfig::default(), &panel).unwrap();

    let first = create(&mut handle, &["A", "B"]).await;
    let second = create(&mut handle, &["C", "D"]).await;
    board.clear_journal();

    board.click(Vec::<ItemId>::new());
    assert_eq!(
        handle.next_update().await,
        Some(PluginUpdate::ClickIgnored {
            reason: IgnoreReason::NotSingleItem { count: 0 }
        })
    );

    board.click([first, second]);
    assert_eq!(
        handle.next_update().await,
        Some(PluginUpdate::ClickIgnored {
            reason: IgnoreReason::NotSingleItem { count: 2 }
        })
    );

    assert!(board.journal().is_empty());
    assert!(handle.drain_updates().is_empty());
    handle.unsubscribe().await.unwrap();
}

#[tokio::test]
async fn test_handle_exposes_host_config_and_pending_updates() {
    let board = Arc::new(MemoryBoard::new());
    let config = PluginConfig {
        app_id: "deck-7".to_string(),
        ..Default::default()
    };
    let mut handle = initialize(board.clone(), config, &SidebarPanel::with_inputs(4)).unwrap();

    assert!(Arc::ptr_eq(handle.host(), &board));
    assert_eq!(handle.config().app_id, "deck-7");
    assert!(handle.drain_updates().is_empty());

    let item = create(&mut handle, &["Front", "Back"]).await;
    board.click([item.clone()]);
    board.click(Vec::<ItemId>::new());

    let mut updates = Vec::new();
    while updates.len() < 2 {
        tokio::task::yield_now().await;
        updates.extend(handle.drain_updates());
    }
    assert!(updates.contains(&PluginUpdate::CardFlipped {
        item: item.clone(),
        from: 0,
        to: 1
    }));
    assert!(updates.contains(&PluginUpdate::ClickIgnored {
        reason: IgnoreReason::NotSingleItem { count: 0 }
    }));

    let metadata = handle.host().item(&item).unwrap().metadata.unwrap();
    assert_eq!(metadata["appId"], "deck-7");
    assert!(handle.unsubscribe().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_blank_form_reports_no_sides() {
    let board = Arc::new(MemoryBoard::new());
    let panel = SidebarPanel::with_inputs(4);
    let mut handle = initialize(board.clone(), PluginConfig::default(), &panel).unwrap();

    handle.press_create(&panel).unwrap();
    assert_eq!(handle.next_update().await, Some(PluginUpdate::NoSides));
    assert!(board.item_ids().is_empty());
    assert!(!board.journal().iter().any(HostCall::is_mutation));

    handle.unsubscribe().await.unwrap();
}

#[tokio::test]
async fn test_missing_create_button_refuses_create_but_still_flips() {
    let board = Arc::new(MemoryBoard::new());

    // Seed a card through a fully laid-out panel first
    let mut seeding = initialize(
        board.clone(),
        PluginConfig::default(),
        &SidebarPanel::with_inputs(4),
    )
    .unwrap();
    let item = create(&mut seeding, &["Front", "Back"]).await;
    seeding.unsubscribe().await.unwrap();

    let mut panel = panel_with(&["Ignored"]);
    panel.remove_element(flip_card::form::CREATE_BUTTON_ID);
    let mut handle = initialize(board.clone(), PluginConfig::default(), &panel).unwrap();

    assert!(matches!(
        handle.press_create(&panel),
        Err(RuntimeError::CreateControlMissing("create-card"))
    ));

    board.click([item.clone()]);
    assert!(matches!(
        handle.next_update().await,
        Some(PluginUpdate::CardFlipped { to: 1, .. })
    ));

    handle.unsubscribe().await.unwrap();
    assert_eq!(board.item_ids(), vec![item]);
}

#[tokio::test]
async fn test_host_failure_is_reported_and_listener_survives() {
    let board = Arc::new(MemoryBoard::new());
    let panel = SidebarPanel::with_inputs(4);
    let mut handle = initialize(board.clone(), PluginConfig::default(), &panel).unwrap();
    let item = create(&mut handle, &["Front", "Back"]).await;

    board.fail_next(HostOp::Sync);
    board.click([item.clone()]);
    match handle.next_update().await {
        Some(PluginUpdate::Error { message }) => assert!(message.contains("sync")),
        other => panic!("Expected Error, got {other:?}"),
    }

    // Metadata was written before the failing sync; no rollback happened
    board.click([item.clone()]);
    assert_eq!(
        handle.next_update().await,
        Some(PluginUpdate::CardFlipped {
            item,
            from: 1,
            to: 0
        })
    );

    handle.unsubscribe().await.unwrap();
}

#[tokio::test]
async fn test_flips_on_different_items_all_complete() {
    let board = Arc::new(MemoryBoard::new());
    let host: Arc<dyn BoardHost> = board.clone();
    let mut handle = initialize(
        host,
        PluginConfig::default(),
        &SidebarPanel::with_inputs(4),
    )
    .unwrap();

    handle.press_create(&panel_with(&["1a", "1b"])).unwrap();
    handle.press_create(&panel_with(&["2a", "2b", "2c"])).unwrap();
    let mut items = Vec::new();
    for _ in 0..2 {
        match handle.next_update().await {
            Some(PluginUpdate::CardCreated { item, .. }) => items.push(item),
            other => panic!("Expected CardCreated, got {other:?}"),
        }
    }

    for item in &items {
        board.click([item.clone()]);
    }

    let mut flipped = Vec::new();
    for _ in 0..2 {
        match handle.next_update().await {
            Some(PluginUpdate::CardFlipped { item, to, .. }) => flipped.push((item, to)),
            other => panic!("Expected CardFlipped, got {other:?}"),
        }
    }
    flipped.sort();
    let mut expected: Vec<_> = items.into_iter().map(|item| (item, 1)).collect();
    expected.sort();
    assert_eq!(flipped, expected);

    handle.unsubscribe().await.unwrap();
}

#[tokio::test]
async fn test_unsubscribe_waits_for_in_flight_and_stops_listening() {
    let board = Arc::new(MemoryBoard::new());
    let panel = SidebarPanel::with_inputs(4);
    let mut handle = initialize(board.clone(), PluginConfig::default(), &panel).unwrap();
    let item = create(&mut handle, &["Front", "Back"]).await;

    board.click([item.clone()]);
    let remaining = handle.unsubscribe().await.unwrap();

    assert_eq!(
        remaining,
        vec![PluginUpdate::CardFlipped {
            item: item.clone(),
            from: 0,
            to: 1
        }]
    );
    assert_eq!(board.item(&item).unwrap().metadata.unwrap()["currentSide"], 1);
    assert_eq!(board.click([item]), 0);
}

#[tokio::test]
async fn test_unsubscribe_handles_every_delivered_click() {
    for _ in 0..50 {
        let board = Arc::new(MemoryBoard::new());
        let panel = SidebarPanel::with_inputs(4);
        let mut handle = initialize(board.clone(), PluginConfig::default(), &panel).unwrap();
        let item = create(&mut handle, &["Front", "Back", "Extra"]).await;

        board.click([item.clone()]);
        board.click([item.clone()]);
        let remaining = handle.unsubscribe().await.unwrap();

        let flips = remaining
            .iter()
            .filter(|update| matches!(update, PluginUpdate::CardFlipped { .. }))
            .count();
        assert_eq!(flips, 2);
    }
}

/// Host whose content updates take a while, leaving a window mid-flip
struct SlowBoard {
    inner: Arc<MemoryBoard>,
    delay: Duration,
}

#[async_trait::async_trait]
impl BoardHost for SlowBoard {
    async fn get_metadata(&self, item: &ItemId) -> flip_card::Result<Option<Metadata>> {
        self.inner.get_metadata(item).await
    }

    async fn set_metadata(&self, item: &ItemId, metadata: Metadata) -> flip_card::Result<()> {
        self.inner.set_metadata(item, metadata).await
    }

    async fn update_content(&self, item: &ItemId, content: String) -> flip_card::Result<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.update_content(item, content).await
    }

    async fn sync(&self, item: &ItemId) -> flip_card::Result<()> {
        self.inner.sync(item).await
    }

    async fn create_shape(&self, spec: ShapeSpec) -> flip_card::Result<ItemId> {
        self.inner.create_shape(spec).await
    }

    async fn show_notification(&self, message: &str) -> flip_card::Result<()> {
        self.inner.show_notification(message).await
    }

    async fn show_error_notification(&self, message: &str) -> flip_card::Result<()> {
        self.inner.show_error_notification(message).await
    }

    fn subscribe_item_clicks(&self) -> flip_card::Result<ClickStream> {
        self.inner.subscribe_item_clicks()
    }
}

#[tokio::test]
async fn test_dropping_handle_lets_running_flip_finish() {
    let board = Arc::new(MemoryBoard::new());
    let host = Arc::new(SlowBoard {
        inner: board.clone(),
        delay: Duration::from_millis(50),
    });
    let mut handle = initialize(host, PluginConfig::default(), &SidebarPanel::with_inputs(4))
        .unwrap();

    handle.press_create(&panel_with(&["Front", "Back"])).unwrap();
    let item = match handle.next_update().await {
        Some(PluginUpdate::CardCreated { item, .. }) => item,
        other => panic!("Expected CardCreated, got {other:?}"),
    };
    board.clear_journal();

    board.click([item.clone()]);
    tokio::time::sleep(Duration::from_millis(10)).await;
    drop(handle);

    for _ in 0..100 {
        if board.journal().iter().any(|call| call.op() == HostOp::ShowNotification)
            && board.item(&item).is_some_and(|card| !card.pending_sync)
        {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let card = board.item(&item).unwrap();
    assert!(card.content().ends_with("<p>Back</p>"));
    assert_eq!(card.metadata.unwrap()["currentSide"], 1);
    assert!(!card.pending_sync);
    assert_eq!(board.click([item]), 0);
}

#[tokio::test]
async fn test_closed_click_stream_keeps_create_working() {
    let board = Arc::new(MemoryBoard::new());
    let panel = SidebarPanel::with_inputs(4);
    let mut handle = initialize(board.clone(), PluginConfig::default(), &panel).unwrap();

    board.close_click_streams();
    let item = create(&mut handle, &["Still works"]).await;
    assert!(board.item(&item).is_some());

    handle.unsubscribe().await.unwrap();
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let board = Arc::new(MemoryBoard::new());
    let config = PluginConfig {
        max_sides: 0,
        ..Default::default()
    };

    let result = initialize(board.clone(), config, &SidebarPanel::with_inputs(4));
    assert!(matches!(result, Err(RuntimeError::FlipCard(_))));
    assert!(board.journal().is_empty());
}
