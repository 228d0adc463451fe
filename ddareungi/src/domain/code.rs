//! Canonical station code type.

use std::fmt;

/// Error returned when parsing an invalid station code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station code: {reason}")]
pub struct InvalidStationCode {
    reason: &'static str,
}

/// A valid canonical station code ("ST-" followed by digits).
///
/// Every docking station carries a code of this shape (e.g. "ST-3685"),
/// distinct from the numeric display number shown on the station sign.
/// This type guarantees that any `StationCode` value is valid by
/// construction.
///
/// # Examples
///
/// ```
/// use ddareungi::domain::StationCode;
///
/// let code = StationCode::parse("ST-3685").unwrap();
/// assert_eq!(code.as_str(), "ST-3685");
///
/// // Lowercase input is normalized
/// assert_eq!(StationCode::parse("st-99").unwrap().as_str(), "ST-99");
///
/// // A bare number is not a code
/// assert!(StationCode::parse("3685").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationCode(String);

impl StationCode {
    /// Parse a station code from a string.
    ///
    /// Accepts `ST-` in any case and normalizes it to uppercase; the suffix
    /// must be one or more ASCII digits.
    pub fn parse(s: &str) -> Result<Self, InvalidStationCode> {
        let s = s.trim();

        let digits = s
            .strip_prefix("ST-")
            .or_else(|| s.strip_prefix("st-"))
            .or_else(|| s.strip_prefix("St-"))
            .or_else(|| s.strip_prefix("sT-"))
            .ok_or(InvalidStationCode {
                reason: "must start with \"ST-\"",
            })?;

        if digits.is_empty() {
            return Err(InvalidStationCode {
                reason: "missing digits after \"ST-\"",
            });
        }

        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidStationCode {
                reason: "suffix must be ASCII digits",
            });
        }

        Ok(StationCode(format!("ST-{digits}")))
    }

    /// Returns the code as a string slice, e.g. "ST-3685".
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationCode({})", self.0)
    }
}

impl fmt::Display for StationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_codes() {
        assert!(StationCode::parse("ST-1").is_ok());
        assert!(StationCode::parse("ST-3685").is_ok());
        assert!(StationCode::parse("ST-00042").is_ok());
    }

    #[test]
    fn parse_normalizes_case_and_whitespace() {
        assert_eq!(StationCode::parse(" st-123 ").unwrap().as_str(), "ST-123");
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(StationCode::parse("").is_err());
        assert!(StationCode::parse("ST-").is_err());
        assert!(StationCode::parse("3685").is_err());
        assert!(StationCode::parse("ST-12a").is_err());
        assert!(StationCode::parse("XX-12").is_err());
    }

    #[test]
    fn codes_order_lexicographically() {
        let a = StationCode::parse("ST-100").unwrap();
        let b = StationCode::parse("ST-200").unwrap();
        assert!(a < b);
    }
}
