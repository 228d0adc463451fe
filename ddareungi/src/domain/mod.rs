//! Domain types for the bike-share data engine.
//!
//! This module contains the core model types shared across components.
//! Identifier types enforce their invariants at construction time, so code
//! that receives them can trust their validity.

mod code;
mod history;
mod query;
mod snapshot;
mod station;

pub use code::{InvalidStationCode, StationCode};
pub use history::{HistoryPeriod, HistoryRecord, RideSummary};
pub use query::{InvalidStationQuery, StationQuery, split_station_tokens};
pub use snapshot::{FetchSource, RefreshIssue, RefreshResult};
pub use station::{FavoriteStation, Station, split_numbered_name};
