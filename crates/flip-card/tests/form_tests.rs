use flip_card::form::{CREATE_BUTTON_ID, image_input_id, text_input_id};
use flip_card::*;

#[test]
fn test_panel_layout_ids() {
    let panel = SidebarPanel::with_inputs(4);
    assert!(panel.has_element(CREATE_BUTTON_ID));
    assert!(panel.has_element("card1-text"));
    assert!(panel.has_element("card4-image"));
    assert!(!panel.has_element("card5-text"));
    assert_eq!(text_input_id(2), "card2-text");
    assert_eq!(image_input_id(3), "card3-image");
}

#[test]
fn test_read_form_from_panel() {
    let mut panel = SidebarPanel::with_inputs(4);
    panel.fill_side(1, &CardSide::text("Front"));
    panel.set_value("card3-image", "https://example.com/c.png");

    let form = CardForm::read(&panel, 4);
    assert_eq!(form.entries().len(), 4);
    assert_eq!(
        form.sides(4),
        vec![
            CardSide::text("Front"),
            CardSide::new("", "https://example.com/c.png"),
        ]
    );
}

#[test]
fn test_missing_inputs_read_as_empty() {
    let mut panel = SidebarPanel::new();
    panel.set_value("card2-text", "Only text");

    let form = CardForm::read(&panel, 4);
    assert_eq!(form.entries()[0], CardSide::default());
    assert_eq!(form.sides(4), vec![CardSide::text("Only text")]);
}

#[test]
fn test_whitespace_counts_as_content() {
    let form = CardForm::from_sides([CardSide::text(" "), CardSide::default()]);
    assert_eq!(form.sides(4), vec![CardSide::text(" ")]);
}

#[test]
fn test_render_side_content_template() {
    let side = CardSide::new("Back", "https://example.com/b.png");
    assert_eq!(
        render_side_content(&side),
        "<img src=\"https://example.com/b.png\" style=\"max-width:100%; max-height: 70%; display: block; margin: auto;\" onerror=\"this.style.display='none'\"><p>Back</p>"
    );

    let text_only = CardSide::text("Hi");
    assert!(render_side_content(&text_only).starts_with("<img src=\"\" style="));
}

#[tokio::test]
async fn test_load_sides_from_csv() {
    use tempfile::NamedTempFile;

    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path();
    tokio::fs::write(
        path,
        "text,imageUrl\nFront,\n,https://example.com/b.png\nBack\n",
    )
    .await
    .unwrap();

    let sides = load_sides_from_csv(path).await.unwrap();
    assert_eq!(
        sides,
        vec![
            CardSide::text("Front"),
            CardSide::new("", "https://example.com/b.png"),
            CardSide::text("Back"),
        ]
    );
}
