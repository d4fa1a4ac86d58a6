//! The controller a host drives with pointer events.

use std::collections::HashMap;

use heatmap_cat_protocol::{Fill, RenderCommand, SharedStr, ThemeToken};
use log::{debug, warn};

use crate::model::{Cell, Grid, GridBounds, GridError, TimeRange, Timestamp};
use crate::parsers::details::{Endpoint, extract};
use crate::selection::{SelectionError, SelectionPhase, SelectionState};
use crate::views::overlay::{Overlay, compute_overlays};

/// Receives a committed range, e.g. to regenerate a flame graph for it.
pub trait Navigator {
    fn navigate(&mut self, range: TimeRange);
}

impl<F: FnMut(TimeRange)> Navigator for F {
    fn navigate(&mut self, range: TimeRange) {
        self(range)
    }
}

/// What a click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The click landed on the background.
    Ignored,
    /// First click: the start endpoint is now fixed.
    Started(Timestamp),
    /// Second click: the range was handed to the navigator.
    Committed(TimeRange),
}

/// Range selection over one heatmap.
///
/// Every event handler queues the surface mutations it implies; the host
/// drains them with [`take_commands`](Self::take_commands) and applies them
/// in order. The selector's view of drawn overlays and cell fills always
/// matches what those commands produce.
pub struct HeatmapSelector<N> {
    grid: Grid,
    bounds: GridBounds,
    state: SelectionState,
    /// Overlays currently on the surface.
    overlays: Vec<Overlay>,
    /// Fills that differ from the upstream cell fill.
    fills: HashMap<SharedStr, Fill>,
    hovered: Option<SharedStr>,
    commands: Vec<RenderCommand>,
    navigator: N,
}

impl<N: Navigator> HeatmapSelector<N> {
    pub fn new(grid: Grid, navigator: N) -> Result<Self, GridError> {
        let bounds = grid.bounds()?;
        debug!(
            "indexed {} cells, y span {}..{}",
            grid.selectable().count(),
            bounds.min_y,
            bounds.max_y
        );
        Ok(Self {
            grid,
            bounds,
            state: SelectionState::new(),
            overlays: Vec::new(),
            fills: HashMap::new(),
            hovered: None,
            commands: Vec::new(),
            navigator,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    pub fn phase(&self) -> &SelectionPhase {
        self.state.phase()
    }

    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    pub fn hovered(&self) -> Option<&Cell> {
        self.hovered.as_deref().and_then(|id| self.grid.get(id))
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Fill the cell shows when not hovered.
    pub fn fill_of(&self, id: &str) -> Option<Fill> {
        self.fills
            .get(id)
            .copied()
            .or_else(|| self.grid.get(id).map(|c| c.fill))
    }

    /// Drain the queued render commands.
    pub fn take_commands(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Pointer entered a cell: highlight it and redraw the previews.
    pub fn on_hover(&mut self, id: &str) -> Result<(), SelectionError> {
        let Some(cell) = self.selectable(id)? else {
            return Ok(());
        };
        let cell = cell.clone();

        // A missed exit must not leave the previous cell highlighted.
        if self.hovered.as_ref().is_some_and(|h| *h != cell.id) {
            self.on_hover_exit();
        }

        self.hovered = Some(cell.id.clone());
        self.commands.push(RenderCommand::SetFill {
            cell: cell.id.clone(),
            fill: Fill::Theme(ThemeToken::HoverHighlight),
        });

        self.clear_overlays();
        let opacity = self.grid.options.overlay_opacity;
        for overlay in compute_overlays(self.state.phase(), &cell, self.bounds) {
            self.commands.push(overlay.draw_command(opacity));
            self.overlays.push(overlay);
        }
        Ok(())
    }

    /// Pointer left the hovered cell: unhighlight it and drop the previews.
    pub fn on_hover_exit(&mut self) {
        if let Some(id) = self.hovered.take()
            && let Some(fill) = self.fill_of(&id)
        {
            self.commands.push(RenderCommand::SetFill { cell: id, fill });
        }
        self.clear_overlays();
    }

    /// A cell was clicked.
    ///
    /// `details` is the hover text shown for the cell; when `None` the
    /// cell's own detail text is used. Parse failures leave the selection
    /// untouched. A reversed range resets the selection before the error is
    /// returned, and the navigator is not called.
    pub fn on_click(
        &mut self,
        id: &str,
        details: Option<&str>,
    ) -> Result<ClickOutcome, SelectionError> {
        let Some(cell) = self.selectable(id)? else {
            return Ok(ClickOutcome::Ignored);
        };
        let text = match details.or(cell.details.as_deref()) {
            Some(text) => text,
            None => return Err(SelectionError::MissingDetails(cell.id.clone())),
        };

        if self.state.phase().is_idle() {
            let start_time = extract(text, Endpoint::Start).inspect_err(|e| {
                warn!("ignoring click on {id}: {e}");
            })?;
            let cell = cell.clone();
            self.clear_overlays();

            let prior_fill = self.fill_of(&cell.id).unwrap_or(cell.fill);
            let selected = Fill::Theme(ThemeToken::SelectionFill);
            self.fills.insert(cell.id.clone(), selected);
            self.commands.push(RenderCommand::SetFill {
                cell: cell.id.clone(),
                fill: selected,
            });

            self.state.begin(cell, start_time, prior_fill);
            return Ok(ClickOutcome::Started(start_time));
        }

        let end_time = extract(text, Endpoint::End).inspect_err(|e| {
            warn!("ignoring click on {id}: {e}");
        })?;
        match self.state.finish(end_time) {
            Ok(range) => {
                self.navigator.navigate(range);
                Ok(ClickOutcome::Committed(range))
            }
            Err(err) => {
                warn!("{err}");
                self.reset();
                Err(err)
            }
        }
    }

    /// Abandon any selection in progress and clear the previews.
    pub fn reset(&mut self) {
        self.clear_overlays();
        if let Some((id, fill)) = self.state.reset() {
            self.fills.insert(id.clone(), fill);
            self.commands.push(RenderCommand::SetFill { cell: id, fill });
        }
    }

    fn clear_overlays(&mut self) {
        for overlay in self.overlays.drain(..) {
            self.commands
                .push(RenderCommand::RemoveOverlay { id: overlay.id });
        }
    }

    /// `Ok(None)` for the background cell.
    fn selectable(&self, id: &str) -> Result<Option<&Cell>, SelectionError> {
        if id == self.grid.background().as_str() {
            return Ok(None);
        }
        self.grid
            .get(id)
            .map(Some)
            .ok_or_else(|| SelectionError::UnknownCell(id.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SelectorOptions;
    use heatmap_cat_protocol::{Color, OverlayId, Rect};

    const ORIGINAL: Fill = Fill::Color(Color::rgb(255, 231, 212));

    fn cell(id: &str, x: i32, y: i32, details: &str) -> Cell {
        Cell {
            id: id.into(),
            x,
            y,
            width: 8,
            height: 8,
            fill: ORIGINAL,
            details: Some(details.to_string()),
        }
    }

    #[derive(Default)]
    struct Recorder(Vec<TimeRange>);

    impl Navigator for Recorder {
        fn navigate(&mut self, range: TimeRange) {
            self.0.push(range);
        }
    }

    fn selector() -> HeatmapSelector<Recorder> {
        let mut bkg = cell("bkg", 0, 0, "");
        bkg.width = 200;
        bkg.height = 200;
        let cells = vec![
            bkg,
            cell("s", 10, 50, "time 1s, range 500-519ms, count: 1, colpct: 0%"),
            cell("top", 10, 20, "time 1s, range 100-119ms, count: 1, colpct: 0%"),
            cell("far", 30, 20, "time 3s, range 100-119ms, count: 3, colpct: 1%"),
            cell("bottom", 30, 90, "time 3s, range 900-919ms, count: 0, colpct: 0%"),
        ];
        let grid = Grid::new(cells, SelectorOptions::default());
        match grid.and_then(|g| HeatmapSelector::new(g, Recorder::default())) {
            Ok(selector) => selector,
            Err(e) => unreachable!("{e}"),
        }
    }

    #[test]
    fn hover_highlights_and_draws_lead() {
        let mut sel = selector();
        assert_eq!(sel.on_hover("far"), Ok(()));
        let cmds = sel.take_commands();
        assert_eq!(
            cmds,
            vec![
                RenderCommand::SetFill {
                    cell: "far".into(),
                    fill: Fill::Theme(ThemeToken::HoverHighlight),
                },
                RenderCommand::DrawOverlay {
                    id: OverlayId::ColumnLead,
                    rect: Rect::new(30, 20, 8, 0),
                    color: ThemeToken::SelectionOverlay,
                    opacity: 0.2,
                },
            ]
        );
        assert_eq!(sel.hovered().map(|c| c.id.as_str()), Some("far"));
    }

    #[test]
    fn hover_exit_restores_fill_and_clears() {
        let mut sel = selector();
        let _ = sel.on_hover("s");
        sel.take_commands();
        sel.on_hover_exit();
        assert_eq!(
            sel.take_commands(),
            vec![
                RenderCommand::SetFill {
                    cell: "s".into(),
                    fill: ORIGINAL,
                },
                RenderCommand::RemoveOverlay {
                    id: OverlayId::ColumnLead,
                },
            ]
        );
        sel.on_hover_exit();
        assert!(sel.take_commands().is_empty());
        assert!(sel.overlays().is_empty());
    }

    #[test]
    fn hover_without_exit_unhighlights_previous_cell() {
        let mut sel = selector();
        let _ = sel.on_hover("s");
        let _ = sel.on_hover("far");
        let cmds = sel.take_commands();
        assert!(cmds.contains(&RenderCommand::SetFill {
            cell: "s".into(),
            fill: ORIGINAL,
        }));
        assert_eq!(sel.overlays().len(), 1);
    }

    #[test]
    fn background_events_are_ignored() {
        let mut sel = selector();
        assert_eq!(sel.on_hover("bkg"), Ok(()));
        assert_eq!(sel.on_click("bkg", None), Ok(ClickOutcome::Ignored));
        assert!(sel.take_commands().is_empty());
        assert!(sel.phase().is_idle());
    }

    #[test]
    fn unknown_cell_is_an_error() {
        let mut sel = selector();
        assert_eq!(
            sel.on_click("nope", None),
            Err(SelectionError::UnknownCell("nope".into()))
        );
    }

    #[test]
    fn first_click_paints_start_and_keeps_it_through_hover_exit() {
        let mut sel = selector();
        let _ = sel.on_hover("s");
        assert_eq!(
            sel.on_click("s", None),
            Ok(ClickOutcome::Started(Timestamp::from_millis(1_500)))
        );
        assert!(sel.overlays().is_empty());
        assert_eq!(sel.fill_of("s"), Some(Fill::Theme(ThemeToken::SelectionFill)));

        sel.take_commands();
        sel.on_hover_exit();
        assert_eq!(
            sel.take_commands(),
            vec![RenderCommand::SetFill {
                cell: "s".into(),
                fill: Fill::Theme(ThemeToken::SelectionFill),
            }]
        );
    }

    #[test]
    fn explicit_details_override_cell_text() {
        let mut sel = selector();
        let details = "time 14s, range 342-361ms, count: 2, colpct: 0%";
        let outcome = sel.on_click("s", Some(details));
        assert_eq!(
            outcome,
            Ok(ClickOutcome::Started(Timestamp::from_millis(14_342)))
        );
    }

    #[test]
    fn malformed_details_leave_phase_alone() {
        let mut sel = selector();
        let err = sel.on_click("s", Some("garbage"));
        assert!(matches!(err, Err(SelectionError::Details(_))));
        assert!(sel.phase().is_idle());
        assert!(sel.take_commands().is_empty());

        let _ = sel.on_click("s", None);
        let err = sel.on_click("far", Some("time 3s,"));
        assert!(matches!(err, Err(SelectionError::Details(_))));
        assert!(!sel.phase().is_idle());
        assert!(sel.navigator().0.is_empty());
    }

    #[test]
    fn closure_navigator() {
        let mut committed = None;
        let grid = Grid::new(
            vec![cell("a", 0, 0, "time 0s, range 0-19ms,")],
            SelectorOptions::default(),
        );
        let Ok(grid) = grid else {
            unreachable!("valid grid");
        };
        let Ok(mut sel) = HeatmapSelector::new(grid, |r: TimeRange| committed = Some(r)) else {
            unreachable!("non-empty grid");
        };
        let _ = sel.on_click("a", None);
        let outcome = sel.on_click("a", None);
        drop(sel);
        let expected = TimeRange {
            start: Timestamp::from_millis(0),
            end: Timestamp::from_millis(19),
        };
        assert_eq!(outcome, Ok(ClickOutcome::Committed(expected)));
        assert_eq!(committed, Some(expected));
    }
}
