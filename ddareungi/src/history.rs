//! Ride-history collection through the authenticated session.

use std::sync::Arc;

use futures::FutureExt;

use crate::domain::HistoryPeriod;
use crate::site::{SessionManager, SiteError, UseHistory};

/// Fetches the latest ride-history window each cycle.
///
/// Goes through [`SessionManager::with_session`], so an expired cookie is
/// renewed transparently (once) mid-fetch. Returns the full window, not
/// deltas; records come most recent first.
pub struct HistoryCollector {
    manager: Arc<SessionManager>,
    period: HistoryPeriod,
}

impl HistoryCollector {
    pub fn new(manager: Arc<SessionManager>, period: HistoryPeriod) -> Self {
        Self { manager, period }
    }

    pub fn period(&self) -> HistoryPeriod {
        self.period
    }

    /// Fetch and normalize the configured history window.
    pub async fn fetch(&self) -> Result<UseHistory, SiteError> {
        let period = self.period;
        self.manager
            .with_session(move |client| client.use_history(period).boxed())
            .await
    }
}
