//! Station snapshot types.

use super::code::StationCode;

/// One docking station as reported by the latest directory fetch.
///
/// Valid for a single cache generation only; callers must not assume
/// freshness beyond the current refresh cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    /// Canonical code, unique within one directory snapshot.
    pub code: StationCode,
    /// Display number from the station sign, when the upstream name carries
    /// one. Not unique: historically reused across districts.
    pub numeric_id: Option<u32>,
    /// Station name with any leading display number stripped.
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    /// Bikes docked in total, including kinds not broken out below.
    pub bikes_total: u32,
    /// General (full-size) bikes available.
    pub bikes_general: u32,
    /// "Saessak" (new-sprout) light bikes available.
    pub bikes_sprout: u32,
    /// Bikes flagged for repair, unavailable for rent.
    pub bikes_repair: u32,
}

/// A station the authenticated account has marked favorite, as parsed from
/// the favorites page of the member site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteStation {
    pub code: StationCode,
    pub numeric_id: Option<u32>,
    pub name: String,
    /// General bike count shown inline on the favorites page, when present.
    pub bikes_general: Option<u32>,
    /// Sprout bike count shown inline on the favorites page, when present.
    pub bikes_sprout: Option<u32>,
}

/// Split a station name of the form "102. 망원역 1번출구 앞" into its
/// display number and title.
///
/// The upstream has no separate numeric-ID field; the number only exists as
/// a name prefix followed by a separator (".", "．", ")", "-", "번" or
/// whitespace). Names without that shape yield `(None, name)`.
pub fn split_numbered_name(raw: &str) -> (Option<u32>, &str) {
    let trimmed = raw.trim();

    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    if digits_end == 0 || digits_end == trimmed.len() {
        return (None, trimmed);
    }

    let rest = &trimmed[digits_end..];
    let Some(sep) = rest.chars().next() else {
        return (None, trimmed);
    };
    let sep_ok = matches!(sep, '.' | '．' | ')' | '-' | '번') || sep.is_whitespace();
    if !sep_ok {
        return (None, trimmed);
    }

    let Ok(number) = trimmed[..digits_end].parse::<u32>() else {
        return (None, trimmed);
    };

    let title = rest[sep.len_utf8()..].trim_matches([' ', '.', '-']);
    (Some(number), title)
}
