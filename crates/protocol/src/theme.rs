use serde::{Deserialize, Serialize};

use crate::types::Color;

/// Semantic color tokens for everything the selector paints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    /// Fill of the cell under the pointer.
    HoverHighlight,
    /// Fill of the chosen start cell.
    SelectionFill,
    /// Translucent preview overlays.
    SelectionOverlay,
    /// Status line text for rejected clicks.
    ErrorText,
}

impl ThemeToken {
    /// Default palette.
    pub fn color(self) -> Color {
        match self {
            ThemeToken::HoverHighlight => Color::rgb(200, 0, 200),
            ThemeToken::SelectionFill | ThemeToken::SelectionOverlay => Color::rgb(150, 0, 150),
            ThemeToken::ErrorText => Color::rgb(230, 57, 70),
        }
    }
}
