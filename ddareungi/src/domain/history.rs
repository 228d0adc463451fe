//! Ride history types.

use chrono::NaiveDateTime;

/// One completed ride, parsed from the member site's use-history table.
///
/// The collector returns the latest window each cycle, not deltas. Numeric
/// fields that fail to parse are kept absent rather than dropping the
/// record: the identifying fields (times, stations) remain useful.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    /// Station the bike was rented from, as displayed by the site
    /// (usually "number. title").
    pub rental_station: String,
    /// Station the bike was returned to.
    pub return_station: String,
    /// Rental timestamp in Seoul local time.
    pub started_at: Option<NaiveDateTime>,
    /// Return timestamp in Seoul local time.
    pub ended_at: Option<NaiveDateTime>,
    pub distance_meters: Option<f64>,
    pub duration_seconds: Option<i64>,
    pub calories_burned: Option<f64>,
    pub co2_saved_grams: Option<f64>,
    /// Bike identifier, e.g. "SPB-40125".
    pub bike_no: Option<String>,
    /// Opaque upstream row identifier, when the table exposes one.
    pub history_id: Option<String>,
}

/// Aggregate usage figures for the fetched history period, from the summary
/// box above the history table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RideSummary {
    /// Total usage time as displayed (e.g. "2시간 15분"); the site does not
    /// provide it in a machine format.
    pub usage_time: Option<String>,
    pub distance_km: Option<f64>,
    pub calories_kcal: Option<f64>,
    pub co2_saved_kg: Option<f64>,
}

/// History window selectable on the use-history page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryPeriod {
    Week,
    Month,
}

impl HistoryPeriod {
    /// Number of days covered by the window.
    pub fn days(self) -> i64 {
        match self {
            HistoryPeriod::Week => 7,
            HistoryPeriod::Month => 30,
        }
    }
}
