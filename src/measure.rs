use serde::{Deserialize, Serialize};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Fixed sizes shared by layout, geometry and rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metrics {
    pub node_width: f64,
    pub header_height: f64,
    pub row_height: f64,
    /// Extra space below the last row.
    pub body_padding: f64,
    /// Horizontal step between layers.
    pub layer_gap: f64,
    /// Offset of the first layer and the first node in each layer.
    pub margin: f64,
    /// Vertical gap between stacked nodes of one layer.
    pub node_gap_y: f64,
    pub char_width: f64,
    pub padding_x: f64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            node_width: 240.0,
            header_height: 34.0,
            row_height: 22.0,
            body_padding: 8.0,
            layer_gap: 340.0,
            margin: 40.0,
            node_gap_y: 36.0,
            char_width: 7.0,
            padding_x: 10.0,
        }
    }
}

impl Metrics {
    pub fn node_height(&self, column_count: usize) -> f64 {
        self.header_height + column_count as f64 * self.row_height + self.body_padding
    }

    pub fn text_width(&self, text: &str) -> f64 {
        UnicodeWidthStr::width(text) as f64 * self.char_width
    }

    /// Shorten `text` with a trailing ellipsis so it fits in `max_width`.
    pub fn fit_text(&self, text: &str, max_width: f64) -> String {
        if self.text_width(text) <= max_width {
            return text.to_string();
        }

        let budget = ((max_width / self.char_width).floor() as usize).saturating_sub(1);
        let mut out = String::new();
        let mut used = 0;
        for ch in text.chars() {
            let w = ch.width().unwrap_or(0);
            if used + w > budget {
                break;
            }
            used += w;
            out.push(ch);
        }
        out.push('…');
        out
    }
}
