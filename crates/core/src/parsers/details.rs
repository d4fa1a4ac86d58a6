use std::fmt;

use thiserror::Error;

use crate::model::Timestamp;

const TIME_TOKEN: usize = 1;
const RANGE_TOKEN: usize = 3;
const COUNT_TOKEN: usize = 5;
const COLPCT_TOKEN: usize = 7;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DetailsError {
    #[error("missing token {index} in cell details")]
    MissingToken { index: usize },
    #[error("expected a non-negative integer, found {token:?}")]
    InvalidNumber { token: String },
    #[error("expected a <low>-<high>ms range, found {token:?}")]
    MissingRangeSeparator { token: String },
    #[error("time offset out of range")]
    Overflow,
}

/// Which end of a cell's latency range a click selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
}

/// Parsed hover text of one heatmap cell.
///
/// Format: `time 14s, range 342-361ms, count: 2, colpct: 0%`. Tokens are
/// single-space separated and positional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellDetails {
    /// Whole-second time bucket (the column).
    pub secs: u64,
    /// Millisecond offset range within that second (the row).
    pub low_ms: u64,
    pub high_ms: u64,
    pub count: Option<u64>,
    pub colpct: Option<u64>,
}

impl CellDetails {
    pub fn parse(text: &str) -> Result<Self, DetailsError> {
        let tokens: Vec<&str> = text.split(' ').collect();
        let (secs, low_ms, high_ms) = time_and_range(&tokens)?;
        let optional = |index: usize| tokens.get(index).map(|t| number(t)).transpose();
        Ok(Self {
            secs,
            low_ms,
            high_ms,
            count: optional(COUNT_TOKEN)?,
            colpct: optional(COLPCT_TOKEN)?,
        })
    }

    pub fn timestamp(&self, endpoint: Endpoint) -> Result<Timestamp, DetailsError> {
        let ms = match endpoint {
            Endpoint::Start => self.low_ms,
            Endpoint::End => self.high_ms,
        };
        Timestamp::from_parts(self.secs, ms).ok_or(DetailsError::Overflow)
    }
}

impl fmt::Display for CellDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "time {}s, range {}-{}ms, count: {}, colpct: {}%",
            self.secs,
            self.low_ms,
            self.high_ms,
            self.count.unwrap_or(0),
            self.colpct.unwrap_or(0)
        )
    }
}

/// Pull the start or end offset out of a cell's detail text.
///
/// Only the time and range tokens are read, so trailing fields may be
/// absent. `extract("time 14s, range 342-361ms, ..", Start)` is `14.342`.
pub fn extract(text: &str, endpoint: Endpoint) -> Result<Timestamp, DetailsError> {
    let tokens: Vec<&str> = text.split(' ').collect();
    let (secs, low_ms, high_ms) = time_and_range(&tokens)?;
    CellDetails {
        secs,
        low_ms,
        high_ms,
        count: None,
        colpct: None,
    }
    .timestamp(endpoint)
}

fn time_and_range(tokens: &[&str]) -> Result<(u64, u64, u64), DetailsError> {
    let token = |index: usize| {
        tokens
            .get(index)
            .copied()
            .ok_or(DetailsError::MissingToken { index })
    };

    let secs = number(token(TIME_TOKEN)?)?;
    let range = token(RANGE_TOKEN)?;
    let Some((low, high)) = range.split_once('-') else {
        return Err(DetailsError::MissingRangeSeparator {
            token: range.to_string(),
        });
    };
    Ok((secs, number(low)?, number(high)?))
}

/// Parse a plain run of digits, ignoring a trailing unit or punctuation
/// (`14s,` / `361ms,` / `0%`). Signs are rejected.
fn number(token: &str) -> Result<u64, DetailsError> {
    let invalid = || DetailsError::InvalidNumber {
        token: token.to_string(),
    };
    let digits = token.trim_end_matches(|c: char| !c.is_ascii_digit());
    if !digits.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(invalid());
    }
    digits.parse().map_err(|_| invalid())
}
