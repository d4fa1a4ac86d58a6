use serde::{Deserialize, Serialize};

use crate::shared_str::SharedStr;
use crate::theme::ThemeToken;
use crate::types::{Fill, Rect};

/// Identity of one of the three preview overlays.
///
/// At most one overlay per id exists on a surface at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OverlayId {
    /// Band above the lead cell of the selection's first column (A).
    ColumnLead,
    /// Band from the hovered cell down to the end of its column (B).
    BelowHover,
    /// Full-height band spanning the columns between start and hover (C).
    Between,
}

/// A single surface mutation emitted by the selector.
///
/// Hosts apply these in order. Commands are self-contained: a host needs
/// no selector state to apply them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Draw a translucent overlay, replacing any existing overlay with the
    /// same id.
    DrawOverlay {
        id: OverlayId,
        rect: Rect,
        color: ThemeToken,
        opacity: f32,
    },

    /// Remove the overlay with this id. A no-op if none is drawn.
    RemoveOverlay { id: OverlayId },

    /// Repaint a heatmap cell.
    SetFill { cell: SharedStr, fill: Fill },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_serialize_for_js_hosts() {
        let cmd = RenderCommand::RemoveOverlay {
            id: OverlayId::Between,
        };
        let json = serde_json::to_string(&cmd).unwrap_or_default();
        assert_eq!(json, r#"{"RemoveOverlay":{"id":"Between"}}"#);

        let cmd = RenderCommand::SetFill {
            cell: "c12".into(),
            fill: Fill::Theme(ThemeToken::HoverHighlight),
        };
        let json = serde_json::to_string(&cmd).unwrap_or_default();
        assert_eq!(
            json,
            r#"{"SetFill":{"cell":"c12","fill":{"theme":"HoverHighlight"}}}"#
        );
    }
}
