//! Short-TTL cache over the station directory.
//!
//! Configuration-time station resolution and a concurrently running refresh
//! cycle both need a directory snapshot; caching one fetch under a short
//! TTL lets them share it without a second full paging pass.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;

use super::client::{DirectoryClient, DirectoryFetch};
use super::error::DirectoryError;

/// Configuration for the directory cache.
#[derive(Debug, Clone)]
pub struct DirectoryCacheConfig {
    /// TTL for the cached snapshot. Kept below typical refresh intervals so
    /// every scheduled cycle still observes fresh counts.
    pub ttl: Duration,
}

impl Default for DirectoryCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(20),
        }
    }
}

/// Directory client with snapshot caching.
pub struct CachedDirectory {
    client: DirectoryClient,
    cache: MokaCache<(), Arc<DirectoryFetch>>,
}

impl CachedDirectory {
    /// Create a new cached directory.
    pub fn new(client: DirectoryClient, config: &DirectoryCacheConfig) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(1)
            .build();

        Self { client, cache }
    }

    /// Fetch the directory, reusing a live cached snapshot if present.
    ///
    /// Failures are not cached; the next call retries upstream.
    pub async fn fetch_all(&self) -> Result<Arc<DirectoryFetch>, DirectoryError> {
        if let Some(cached) = self.cache.get(&()).await {
            return Ok(cached);
        }

        let fetch = Arc::new(self.client.fetch_all().await?);
        self.cache.insert((), Arc::clone(&fetch)).await;
        Ok(fetch)
    }

    /// Drop the cached snapshot so the next fetch goes upstream.
    pub fn invalidate(&self) {
        self.cache.invalidate_all();
    }

    /// Access the underlying client for operations that bypass the cache.
    pub fn client(&self) -> &DirectoryClient {
        &self.client
    }
}
