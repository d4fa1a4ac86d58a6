//! Range selection over a rendered subsecond-offset heatmap.
//!
//! The heatmap itself is produced upstream; this crate indexes its cells,
//! computes preview overlays while the pointer moves, and runs the
//! two-click start/end selection that produces a [`model::TimeRange`].

pub mod model;
pub mod parsers;
pub mod selection;
pub mod selector;
pub mod views;

pub use model::{
    Cell, Grid, GridBounds, GridDocumentError, GridError, SelectorOptions, TimeRange, Timestamp,
};
pub use parsers::details::{CellDetails, DetailsError, Endpoint};
pub use selection::{SelectionError, SelectionPhase, SelectionState};
pub use selector::{ClickOutcome, HeatmapSelector, Navigator};
pub use views::overlay::{Overlay, compute_overlays};
