use crate::types::CardSide;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Element id of the sidebar's "Create" button
pub const CREATE_BUTTON_ID: &str = "create-card";

pub fn text_input_id(slot: usize) -> String {
    format!("card{slot}-text")
}

pub fn image_input_id(slot: usize) -> String {
    format!("card{slot}-image")
}

/// The sidebar document: element ids mapped to their current values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidebarPanel {
    elements: BTreeMap<String, String>,
}

impl SidebarPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Panel laid out with a create button and `slots` empty input pairs
    pub fn with_inputs(slots: usize) -> Self {
        let mut panel = Self::new();
        panel.add_element(CREATE_BUTTON_ID);
        for slot in 1..=slots {
            panel.add_element(text_input_id(slot));
            panel.add_element(image_input_id(slot));
        }
        panel
    }

    pub fn add_element(&mut self, id: impl Into<String>) {
        self.elements.entry(id.into()).or_default();
    }

    pub fn remove_element(&mut self, id: &str) {
        self.elements.remove(id);
    }

    pub fn has_element(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    pub fn set_value(&mut self, id: impl Into<String>, value: impl Into<String>) {
        self.elements.insert(id.into(), value.into());
    }

    pub fn value(&self, id: &str) -> Option<&str> {
        self.elements.get(id).map(String::as_str)
    }

    /// Fill input pair `slot` (1-based) with `side`
    pub fn fill_side(&mut self, slot: usize, side: &CardSide) {
        self.set_value(text_input_id(slot), side.text.clone());
        self.set_value(image_input_id(slot), side.image_url.clone());
    }
}

/// Side definitions as entered on the form, blanks included
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardForm {
    entries: Vec<CardSide>,
}

impl CardForm {
    /// Read `max_sides` input pairs; missing inputs read as empty
    pub fn read(panel: &SidebarPanel, max_sides: usize) -> Self {
        let entries = (1..=max_sides)
            .map(|slot| {
                CardSide::new(
                    panel.value(&text_input_id(slot)).unwrap_or_default(),
                    panel.value(&image_input_id(slot)).unwrap_or_default(),
                )
            })
            .collect();
        Self { entries }
    }

    pub fn from_sides(entries: impl IntoIterator<Item = CardSide>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn entries(&self) -> &[CardSide] {
        &self.entries
    }

    /// Sides that will be stored from the first `max_sides` entries: blanks
    /// dropped, order kept
    pub fn sides(&self, max_sides: usize) -> Vec<CardSide> {
        self.entries
            .iter()
            .take(max_sides)
            .filter(|side| !side.is_blank())
            .cloned()
            .collect()
    }
}
