//! Per-instance refresh scheduling and snapshot publishing.
//!
//! One coordinator owns one instance's refresh lifecycle: at most one
//! cycle in flight, requests arriving mid-cycle coalesce onto that cycle's
//! outcome, a per-cycle deadline aborts slow fetches, and snapshots
//! publish atomically with monotonically increasing generations. A failed
//! or timed-out cycle publishes nothing — readers keep the previous
//! snapshot (stale but available) until a later cycle succeeds.

mod fetch;

pub use fetch::{ApiFetcher, CookieFetcher, Fetch, FetchData, FetchError};

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::{Mutex, watch};

use crate::domain::RefreshResult;

/// Timing knobs for one coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Minimum spacing between non-forced cycles.
    pub update_interval: Duration,
    /// Deadline for one whole fetch pass; an overrun aborts the cycle.
    pub fetch_timeout: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            update_interval: Duration::from_secs(60),
            fetch_timeout: Duration::from_secs(45),
        }
    }
}

/// Why a refresh produced no new snapshot.
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The cycle overran its deadline; the previous snapshot stands.
    #[error("refresh cycle exceeded {timeout:?}")]
    Timeout { timeout: Duration },
}

/// Refresh scheduler for one configured instance.
///
/// Two configured instances get two coordinators with nothing shared, so
/// they run concurrently without coordination.
pub struct RefreshCoordinator<F> {
    fetcher: F,
    config: CoordinatorConfig,
    /// Serializes cycles; the guarded value is the last cycle start, used
    /// for the minimum-interval check.
    run_lock: Mutex<Option<Instant>>,
    result_tx: watch::Sender<Arc<RefreshResult>>,
    /// Bumped after every cycle, successful or not, so coalesced waiters
    /// always wake even when nothing was published.
    cycle_tx: watch::Sender<u64>,
}

impl<F: Fetch> RefreshCoordinator<F> {
    pub fn new(fetcher: F, config: CoordinatorConfig) -> Self {
        let (result_tx, _) = watch::channel(Arc::new(RefreshResult::empty()));
        let (cycle_tx, _) = watch::channel(0);
        Self {
            fetcher,
            config,
            run_lock: Mutex::new(None),
            result_tx,
            cycle_tx,
        }
    }

    /// The latest published snapshot.
    pub fn current(&self) -> Arc<RefreshResult> {
        Arc::clone(&self.result_tx.borrow())
    }

    /// Watch published snapshots. Generations observed through the
    /// receiver are non-decreasing.
    pub fn subscribe(&self) -> watch::Receiver<Arc<RefreshResult>> {
        self.result_tx.subscribe()
    }

    /// Manual refresh trigger: runs a cycle now, bypassing the
    /// minimum-interval check. If a cycle is already in flight the call
    /// coalesces onto it instead of starting a second fetch.
    pub async fn request_refresh(&self) -> Result<Arc<RefreshResult>, RefreshError> {
        self.refresh(true).await
    }

    /// Scheduled refresh: runs a cycle unless one ran within the
    /// configured interval.
    pub async fn refresh_if_due(&self) -> Result<Arc<RefreshResult>, RefreshError> {
        self.refresh(false).await
    }

    async fn refresh(&self, forced: bool) -> Result<Arc<RefreshResult>, RefreshError> {
        // Subscribe before trying the lock so a cycle finishing in between
        // still wakes us.
        let mut cycles = self.cycle_tx.subscribe();

        match self.run_lock.try_lock() {
            Ok(mut last_start) => {
                if !forced
                    && let Some(started) = *last_start
                    && started.elapsed() < self.config.update_interval
                {
                    return Ok(self.current());
                }
                *last_start = Some(Instant::now());
                self.run_cycle().await
            }
            Err(_) => {
                // A cycle is in flight; await its completion and hand back
                // whatever it left published.
                let _ = cycles.changed().await;
                Ok(self.current())
            }
        }
    }

    async fn run_cycle(&self) -> Result<Arc<RefreshResult>, RefreshError> {
        let previous = self.current();

        let outcome = tokio::time::timeout(
            self.config.fetch_timeout,
            self.fetcher.fetch(&previous),
        )
        .await;

        let result = match outcome {
            Err(_) => {
                tracing::warn!(
                    timeout = ?self.config.fetch_timeout,
                    generation = previous.generation,
                    "refresh cycle timed out; keeping previous snapshot"
                );
                Err(RefreshError::Timeout {
                    timeout: self.config.fetch_timeout,
                })
            }
            Ok(Err(err)) => {
                tracing::warn!(
                    error = %err,
                    generation = previous.generation,
                    "refresh cycle failed; keeping previous snapshot"
                );
                Err(RefreshError::Fetch(err))
            }
            Ok(Ok(data)) => {
                let next = Arc::new(RefreshResult {
                    generation: previous.generation + 1,
                    fetched_at: Utc::now(),
                    stations: data.stations,
                    favorites: data.favorites,
                    history: data.history,
                    summary: data.summary,
                    ticket_expiry: data.ticket_expiry,
                    errors: data.issues,
                });
                self.result_tx.send_replace(Arc::clone(&next));
                tracing::debug!(generation = next.generation, "published refresh snapshot");
                Ok(next)
            }
        };

        self.cycle_tx.send_modify(|completed| *completed += 1);
        result
    }

    /// Drive the instance on its configured interval until dropped.
    ///
    /// The first cycle runs immediately. The timer itself provides the
    /// spacing, so ticks refresh unconditionally; failed cycles are logged
    /// and retried naturally on the next tick.
    pub async fn run(self: Arc<Self>) {
        let mut interval = tokio::time::interval(self.config.update_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            if let Err(err) = self.refresh(true).await {
                tracing::warn!(error = %err, "scheduled refresh failed");
            }
        }
    }
}
