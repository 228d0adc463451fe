//! User-supplied station identifier tokens.

use std::fmt;

use super::code::{InvalidStationCode, StationCode};

/// Error returned when a station token is neither a code nor a number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidStationQuery {
    #[error("empty station token")]
    Empty,
    #[error(transparent)]
    Code(#[from] InvalidStationCode),
    #[error("station token {0:?} is neither a canonical code nor a number")]
    Unrecognized(String),
}

/// A user-supplied station identifier: a canonical code or a bare number.
///
/// Station signs show a short number (e.g. "102") while the service keys
/// stations by canonical code ("ST-3685"). Users may enter either; numbers
/// have to be resolved against the live directory and can be ambiguous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StationQuery {
    Code(StationCode),
    Numeric(u32),
}

impl StationQuery {
    /// Parse a raw token into a query.
    ///
    /// Anything starting with `ST-` (any case) must be a valid canonical
    /// code; an all-digits token is a numeric query; everything else is
    /// rejected.
    pub fn parse(raw: &str) -> Result<Self, InvalidStationQuery> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(InvalidStationQuery::Empty);
        }

        let bytes = raw.as_bytes();
        if bytes.len() >= 3 && bytes[..3].eq_ignore_ascii_case(b"ST-") {
            return Ok(StationQuery::Code(StationCode::parse(raw)?));
        }

        if raw.bytes().all(|b| b.is_ascii_digit()) {
            return raw
                .parse::<u32>()
                .map(StationQuery::Numeric)
                .map_err(|_| InvalidStationQuery::Unrecognized(raw.to_string()));
        }

        Err(InvalidStationQuery::Unrecognized(raw.to_string()))
    }
}

impl fmt::Display for StationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StationQuery::Code(code) => code.fmt(f),
            StationQuery::Numeric(n) => n.fmt(f),
        }
    }
}

/// Split a comma- or newline-separated list of raw station tokens,
/// preserving order and dropping duplicates.
pub fn split_station_tokens(raw: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    raw.replace(['\n', '\r'], ",")
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.to_string()))
        .map(str::to_string)
        .collect()
}
