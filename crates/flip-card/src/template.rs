//! Display markup for a card side
//!
//! Boards already holding flip cards depend on this exact string, so the
//! template is reproduced byte for byte and values are inserted unescaped.

use crate::types::CardSide;

const IMAGE_STYLE: &str = "max-width:100%; max-height: 70%; display: block; margin: auto;";
const IMAGE_ONERROR: &str = "this.style.display='none'";

/// Render the shape content showing `side`
pub fn render_side_content(side: &CardSide) -> String {
    format!(
        "<img src=\"{}\" style=\"{}\" onerror=\"{}\"><p>{}</p>",
        side.image_url, IMAGE_STYLE, IMAGE_ONERROR, side.text
    )
}
