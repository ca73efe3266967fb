//! Output renderers: SVG treemap, CSV rows and a text tree.

pub mod color;
pub mod csv;
pub mod svg;
pub mod text;

use serde::{Deserialize, Serialize};

pub use color::{Colorer, HeatColorer, NoneColorer, Rgba};
pub use csv::render_csv;
pub use svg::SvgRenderer;
pub use text::{render_text, TreeNodeConvert};

/// Styling for the SVG output. Colours are `#rrggbb` or `#rrggbbaa`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub border_color: String,
    pub text_color: String,
    pub font_size: f64,
    pub font_family: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            border_color: "#808080".to_string(),
            text_color: "#000000".to_string(),
            font_size: 12.0,
            font_family: "monospace".to_string(),
        }
    }
}
