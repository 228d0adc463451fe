//! Fetch plans behind a refresh cycle.
//!
//! A fetcher gathers everything one instance shows in a single pass.
//! Sub-fetches run serially (one logical worker per instance) and fail
//! independently: a failed source carries its previous data forward and
//! records an issue, and only a cycle where nothing succeeded — or where
//! the credentials were rejected — fails as a whole.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use futures::FutureExt;

use crate::directory::{CachedDirectory, DirectoryError};
use crate::domain::{
    FavoriteStation, FetchSource, HistoryPeriod, HistoryRecord, RefreshIssue, RefreshResult,
    RideSummary, Station,
};
use crate::history::HistoryCollector;
use crate::site::{SessionManager, SiteError};

/// Everything one cycle gathered.
#[derive(Debug, Clone, Default)]
pub struct FetchData {
    pub stations: Vec<Station>,
    pub favorites: Vec<FavoriteStation>,
    pub history: Vec<HistoryRecord>,
    pub summary: Option<RideSummary>,
    pub ticket_expiry: Option<NaiveDateTime>,
    pub issues: Vec<RefreshIssue>,
}

/// A whole cycle failed; nothing is published.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Credentials rejected (after the one bounded re-login for cookie
    /// instances). Requires user action, not retry.
    #[error("credentials rejected; the instance needs reconfiguration: {message}")]
    Auth { message: String },

    /// Every source failed this cycle; the next scheduled cycle retries.
    #[error("refresh failed: {message}")]
    Unavailable { message: String },
}

/// One instance's fetch plan.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Run one gather pass. `previous` is the last published snapshot, so
    /// partially failing plans can carry good data forward.
    async fn fetch(&self, previous: &RefreshResult) -> Result<FetchData, FetchError>;
}

/// Fetch plan for an Open API instance: the station directory.
pub struct ApiFetcher {
    directory: Arc<CachedDirectory>,
}

impl ApiFetcher {
    pub fn new(directory: Arc<CachedDirectory>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl Fetch for ApiFetcher {
    async fn fetch(&self, _previous: &RefreshResult) -> Result<FetchData, FetchError> {
        match self.directory.fetch_all().await {
            Ok(fetch) => {
                let mut data = FetchData {
                    stations: fetch.stations.clone(),
                    ..FetchData::default()
                };
                if fetch.skipped > 0 {
                    data.issues.push(RefreshIssue::SkippedRecords {
                        count: fetch.skipped,
                    });
                }
                Ok(data)
            }
            Err(DirectoryError::Unauthorized { message }) => Err(FetchError::Auth { message }),
            Err(err) => Err(FetchError::Unavailable {
                message: err.to_string(),
            }),
        }
    }
}

/// Fetch plan for a member-site instance: favorites, ride history and
/// voucher status through the owned session.
pub struct CookieFetcher {
    manager: Arc<SessionManager>,
    history: HistoryCollector,
}

impl CookieFetcher {
    pub fn new(manager: Arc<SessionManager>, period: HistoryPeriod) -> Self {
        let history = HistoryCollector::new(Arc::clone(&manager), period);
        Self { manager, history }
    }
}

#[async_trait]
impl Fetch for CookieFetcher {
    async fn fetch(&self, previous: &RefreshResult) -> Result<FetchData, FetchError> {
        let mut data = FetchData::default();
        let mut fetched_any = false;

        match self
            .manager
            .with_session(|client| client.favorites().boxed())
            .await
        {
            Ok(favorites) => {
                data.favorites = favorites;
                fetched_any = true;
            }
            Err(SiteError::Auth) => {
                return Err(FetchError::Auth {
                    message: "member-site login rejected".to_string(),
                });
            }
            Err(err) => {
                data.favorites = previous.favorites.clone();
                data.issues.push(RefreshIssue::Fetch {
                    source: FetchSource::Favorites,
                    message: err.to_string(),
                });
            }
        }

        match self.history.fetch().await {
            Ok(history) => {
                data.history = history.records;
                data.summary = Some(history.summary);
                fetched_any = true;
            }
            Err(SiteError::Auth) => {
                return Err(FetchError::Auth {
                    message: "member-site login rejected".to_string(),
                });
            }
            Err(err) => {
                data.history = previous.history.clone();
                data.summary = previous.summary.clone();
                data.issues.push(RefreshIssue::Fetch {
                    source: FetchSource::History,
                    message: err.to_string(),
                });
            }
        }

        match self
            .manager
            .with_session(|client| client.ticket_expiry().boxed())
            .await
        {
            Ok(expiry) => {
                data.ticket_expiry = expiry;
                fetched_any = true;
            }
            Err(SiteError::Auth) => {
                return Err(FetchError::Auth {
                    message: "member-site login rejected".to_string(),
                });
            }
            Err(err) => {
                data.ticket_expiry = previous.ticket_expiry;
                data.issues.push(RefreshIssue::Fetch {
                    source: FetchSource::TicketStatus,
                    message: err.to_string(),
                });
            }
        }

        if !fetched_any {
            let message = data
                .issues
                .iter()
                .map(|issue| match issue {
                    RefreshIssue::Fetch { source, message } => {
                        format!("{}: {message}", source.as_str())
                    }
                    RefreshIssue::SkippedRecords { count } => {
                        format!("{count} records skipped")
                    }
                })
                .collect::<Vec<_>>()
                .join("; ");
            return Err(FetchError::Unavailable { message });
        }

        Ok(data)
    }
}
