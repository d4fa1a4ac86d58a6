use heatmap_cat_protocol::{OverlayId, Rect, RenderCommand, ThemeToken};
use serde::{Deserialize, Serialize};

use crate::model::{Cell, GridBounds};
use crate::selection::SelectionPhase;

/// A translucent preview rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overlay {
    pub id: OverlayId,
    pub rect: Rect,
}

impl Overlay {
    pub fn draw_command(&self, opacity: f32) -> RenderCommand {
        RenderCommand::DrawOverlay {
            id: self.id,
            rect: self.rect,
            color: ThemeToken::SelectionOverlay,
            opacity,
        }
    }
}

/// Compute the preview overlays for a hovered cell.
///
/// Returns up to three overlays, in id order:
///
/// * [`OverlayId::ColumnLead`]: from the top of the grid down to the lead
///   cell (the hovered cell when idle, the start cell once selected). Only
///   shown during a selection while hovering a later column.
/// * [`OverlayId::BelowHover`]: during a selection, from the bottom of the
///   hovered cell to the bottom of the grid; in the start column above the
///   start cell it stops at the start cell instead.
/// * [`OverlayId::Between`]: during a selection, the full-height band
///   between the start column and the hovered column when they are not
///   adjacent.
pub fn compute_overlays(phase: &SelectionPhase, hover: &Cell, bounds: GridBounds) -> Vec<Overlay> {
    let GridBounds { min_y, max_y } = bounds;

    let Some(start) = phase.start_cell() else {
        return vec![Overlay {
            id: OverlayId::ColumnLead,
            rect: Rect::new(hover.x, min_y, hover.width, hover.y - min_y),
        }];
    };

    let mut overlays = Vec::with_capacity(3);

    // No lead band when hovering at or left of the start column.
    if hover.x > start.x {
        overlays.push(Overlay {
            id: OverlayId::ColumnLead,
            rect: Rect::new(start.x, min_y, start.width, start.y - min_y),
        });
    }

    let below_height = if hover.x == start.x && hover.y < start.y {
        start.y - hover.y
    } else {
        max_y - hover.bottom()
    };
    overlays.push(Overlay {
        id: OverlayId::BelowHover,
        rect: Rect::new(hover.x, hover.bottom(), hover.width, below_height),
    });

    if hover.x > start.right() {
        overlays.push(Overlay {
            id: OverlayId::Between,
            rect: Rect::new(start.right(), min_y, hover.x - start.right(), max_y - min_y),
        });
    }

    overlays
}
