mod cell;
mod grid;
mod time;

pub use cell::Cell;
pub use grid::{Grid, GridBounds, GridDocumentError, GridError, SelectorOptions};
pub use time::{TimeRange, Timestamp};
