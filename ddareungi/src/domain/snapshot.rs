//! Published refresh snapshots.

use chrono::{DateTime, NaiveDateTime, Utc};

use super::history::{HistoryRecord, RideSummary};
use super::station::{FavoriteStation, Station};

/// Which upstream surface a recorded issue came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    Directory,
    Favorites,
    History,
    TicketStatus,
}

impl FetchSource {
    pub fn as_str(self) -> &'static str {
        match self {
            FetchSource::Directory => "directory",
            FetchSource::Favorites => "favorites",
            FetchSource::History => "history",
            FetchSource::TicketStatus => "ticket_status",
        }
    }
}

/// A non-fatal problem recorded during a refresh cycle.
///
/// Issues never abort a cycle on their own; the affected source keeps its
/// previous data and the rest of the snapshot still publishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshIssue {
    /// A source fetch failed; its previous data was carried forward.
    Fetch { source: FetchSource, message: String },
    /// Directory records dropped because individual rows failed to parse.
    SkippedRecords { count: usize },
}

/// One published snapshot of everything the instance knows.
///
/// Replaced atomically each cycle; readers never observe a partially
/// updated snapshot, and generations are monotonically increasing per
/// instance. A failed cycle leaves the previous snapshot in place.
#[derive(Debug, Clone)]
pub struct RefreshResult {
    /// Monotonically increasing per instance; 0 only for the empty initial
    /// snapshot published before the first successful cycle.
    pub generation: u64,
    pub fetched_at: DateTime<Utc>,
    pub stations: Vec<Station>,
    pub favorites: Vec<FavoriteStation>,
    pub history: Vec<HistoryRecord>,
    pub summary: Option<RideSummary>,
    /// Voucher (season ticket) expiry in Seoul local time, when the member
    /// site exposes one.
    pub ticket_expiry: Option<NaiveDateTime>,
    pub errors: Vec<RefreshIssue>,
}

impl RefreshResult {
    /// The empty snapshot readers see before the first cycle completes.
    pub fn empty() -> Self {
        RefreshResult {
            generation: 0,
            fetched_at: DateTime::<Utc>::MIN_UTC,
            stations: Vec::new(),
            favorites: Vec::new(),
            history: Vec::new(),
            summary: None,
            ticket_expiry: None,
            errors: Vec::new(),
        }
    }
}
