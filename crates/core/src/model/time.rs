use std::fmt;

use serde::{Deserialize, Serialize};

/// Offset into the profile, in seconds with millisecond resolution.
///
/// Stored as whole milliseconds so comparisons are exact; displayed with
/// exactly three fractional digits (`14.342`), the form the range query
/// expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp {
    millis: u64,
}

impl Timestamp {
    pub const fn from_millis(millis: u64) -> Self {
        Self { millis }
    }

    pub fn from_parts(secs: u64, millis: u64) -> Option<Self> {
        secs.checked_mul(1000)
            .and_then(|s| s.checked_add(millis))
            .map(Self::from_millis)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}", self.millis / 1000, self.millis % 1000)
    }
}

/// A committed `[start, end]` selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeRange {
    /// `None` when `end` precedes `start`.
    pub fn new(start: Timestamp, end: Timestamp) -> Option<Self> {
        (end >= start).then_some(Self { start, end })
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.start, self.end)
    }
}
