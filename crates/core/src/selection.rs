use heatmap_cat_protocol::{Fill, SharedStr};
use log::debug;
use thiserror::Error;

use crate::model::{Cell, TimeRange, Timestamp};
use crate::parsers::details::DetailsError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("selected end time {end} is before start {start}")]
    InvalidRangeOrder { start: Timestamp, end: Timestamp },
    #[error("unknown cell: {0}")]
    UnknownCell(SharedStr),
    #[error("cell {0} has no detail text")]
    MissingDetails(SharedStr),
    #[error("cell details: {0}")]
    Details(#[from] DetailsError),
    #[error("no start cell selected")]
    NotStarted,
}

/// Where the two-click selection currently stands.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SelectionPhase {
    #[default]
    Idle,
    /// The first click landed; `start` stays fixed until commit or reset.
    StartSelected { start: Cell, start_time: Timestamp },
}

impl SelectionPhase {
    pub fn start_cell(&self) -> Option<&Cell> {
        match self {
            SelectionPhase::Idle => None,
            SelectionPhase::StartSelected { start, .. } => Some(start),
        }
    }

    pub fn start_time(&self) -> Option<Timestamp> {
        match self {
            SelectionPhase::Idle => None,
            SelectionPhase::StartSelected { start_time, .. } => Some(*start_time),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, SelectionPhase::Idle)
    }
}

/// Selection phase plus what is needed to undo the first click.
///
/// Pure state: no surface, no navigator. The controller translates the
/// transitions into render commands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    phase: SelectionPhase,
    prior_fill: Option<Fill>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &SelectionPhase {
        &self.phase
    }

    /// First click: remember `start` and the fill it had before selection.
    pub fn begin(&mut self, start: Cell, start_time: Timestamp, prior_fill: Fill) {
        debug!("selection started at {} ({start_time})", start.id);
        self.prior_fill = Some(prior_fill);
        self.phase = SelectionPhase::StartSelected { start, start_time };
    }

    /// Second click: validate the order and return to idle.
    ///
    /// On `InvalidRangeOrder` the state is left in `StartSelected` so the
    /// caller can run [`reset`](Self::reset) and restore the start cell.
    pub fn finish(&mut self, end_time: Timestamp) -> Result<TimeRange, SelectionError> {
        let start_time = self.phase.start_time().ok_or(SelectionError::NotStarted)?;
        let range = TimeRange::new(start_time, end_time).ok_or(SelectionError::InvalidRangeOrder {
            start: start_time,
            end: end_time,
        })?;
        debug!("selection committed: {range}");
        self.phase = SelectionPhase::Idle;
        self.prior_fill = None;
        Ok(range)
    }

    /// Return to idle. Yields the abandoned start cell's id and the fill to
    /// restore it to, if a selection was in progress.
    pub fn reset(&mut self) -> Option<(SharedStr, Fill)> {
        let phase = std::mem::take(&mut self.phase);
        let prior = self.prior_fill.take();
        match (phase, prior) {
            (SelectionPhase::StartSelected { start, .. }, Some(fill)) => {
                debug!("selection reset, restoring {}", start.id);
                Some((start.id, fill))
            }
            _ => None,
        }
    }
}
