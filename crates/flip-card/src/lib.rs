//! Flip cards for a collaborative whiteboard
//!
//! A flip card is a board shape whose metadata holds an ordered list of sides
//! and the index of the side on display. Clicking the shape shows the next
//! side. All state lives in host-managed metadata; see [`host::BoardHost`].

mod creator;
mod csv_import;
mod flipper;
pub mod form;
pub mod host;
pub mod memory;
mod options;
pub mod template;
mod types;

pub use creator::{CreatedCard, create_card};
pub use csv_import::load_sides_from_csv;
pub use flipper::{FlipOutcome, IgnoreReason, flip_item, handle_click, next_side_index};
pub use form::{CardForm, SidebarPanel};
pub use host::{BoardHost, ClickStream};
pub use memory::MemoryBoard;
pub use options::*;
pub use template::render_side_content;
pub use types::*;
