use heatmap_cat_protocol::{Fill, Rect, SharedStr};
use serde::{Deserialize, Serialize};

/// One heatmap box: a (time bucket, latency bucket) pair.
///
/// `x` grows with the time column, `y` grows with the latency row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub id: SharedStr,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub fill: Fill,
    /// Hover detail text, e.g. `time 14s, range 342-361ms, count: 2, colpct: 0%`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl Cell {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }
}
