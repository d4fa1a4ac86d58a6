use serde::{Deserialize, Serialize};

use crate::theme::ThemeToken;

/// Axis-aligned rectangle in heatmap pixel space.
///
/// Heights may be zero (an overlay anchored on the top row); hosts skip
/// degenerate rectangles when drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Paint applied to a heatmap cell.
///
/// Upstream cells arrive with a concrete color; the selector paints
/// hovered and selected cells with semantic tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fill {
    Color(Color),
    Theme(ThemeToken),
}

impl Fill {
    pub fn resolve(&self) -> Color {
        match self {
            Fill::Color(color) => *color,
            Fill::Theme(token) => token.color(),
        }
    }
}

impl From<Color> for Fill {
    fn from(color: Color) -> Self {
        Fill::Color(color)
    }
}

impl From<ThemeToken> for Fill {
    fn from(token: ThemeToken) -> Self {
        Fill::Theme(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_edges_and_hit_test() {
        let r = Rect::new(10, 50, 8, 8);
        assert_eq!(r.right(), 18);
        assert_eq!(r.bottom(), 58);
        assert!(r.contains(10, 50));
        assert!(r.contains(17, 57));
        assert!(!r.contains(18, 50));
        assert!(!r.contains(10, 58));
    }

    #[test]
    fn fill_serializes_tagged() {
        let fill = Fill::Color(Color::rgb(255, 231, 212));
        let json = serde_json::to_string(&fill).unwrap_or_default();
        assert_eq!(json, r#"{"color":{"r":255,"g":231,"b":212}}"#);

        let theme: Fill = serde_json::from_str(r#"{"theme":"SelectionFill"}"#)
            .unwrap_or(Fill::Color(Color::rgb(0, 0, 0)));
        assert_eq!(theme, Fill::Theme(ThemeToken::SelectionFill));
        assert_eq!(theme.resolve(), Color::rgb(150, 0, 150));
    }
}
