//! Assembly of configured instances.
//!
//! Takes the configuration structure produced by the setup flow and builds
//! the matching coordinator with its upstream clients. The two modes are
//! fully isolated: separate clients, separate session, separate snapshot
//! cache — nothing shared, so they may refresh concurrently.

use std::sync::Arc;

use crate::config::{ConfigError, Credentials, InstanceConfig, resolve_monitored};
use crate::coordinator::{ApiFetcher, CookieFetcher, CoordinatorConfig, RefreshCoordinator};
use crate::directory::{
    CachedDirectory, DirectoryCacheConfig, DirectoryClient, DirectoryConfig, DirectoryError,
};
use crate::domain::{HistoryPeriod, StationCode};
use crate::site::{SessionManager, SiteClient, SiteConfig, SiteError};

/// Failures while assembling an instance from its configuration.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("directory unavailable during setup: {0}")]
    Directory(#[from] DirectoryError),

    #[error("member site client setup failed: {0}")]
    Site(#[from] SiteError),
}

/// A built Open API instance.
pub struct ApiInstance {
    pub coordinator: Arc<RefreshCoordinator<ApiFetcher>>,
    pub directory: Arc<CachedDirectory>,
    /// Configured stations, fully resolved to canonical codes.
    pub monitored: Vec<StationCode>,
}

impl std::fmt::Debug for ApiInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiInstance")
            .field("monitored", &self.monitored)
            .finish_non_exhaustive()
    }
}

/// Build an Open API instance, resolving configured station tokens.
///
/// Resolution happens here, at configuration time: an ambiguous or unknown
/// token fails the build with a [`ConfigError`] for the setup flow to show,
/// rather than surfacing at runtime.
pub async fn build_api_instance(config: &InstanceConfig) -> Result<ApiInstance, BuildError> {
    let Credentials::ApiKey(api_key) = &config.credentials else {
        return Err(ConfigError::CredentialsMismatch { mode: config.mode }.into());
    };

    let client = DirectoryClient::new(DirectoryConfig::new(api_key.clone()))?;
    let directory = Arc::new(CachedDirectory::new(client, &DirectoryCacheConfig::default()));

    let monitored = if config.monitored_stations.is_empty() {
        Vec::new()
    } else {
        let snapshot = directory.fetch_all().await?;
        resolve_monitored(&config.monitored_stations, &snapshot.stations)?
    };

    let coordinator = Arc::new(RefreshCoordinator::new(
        ApiFetcher::new(Arc::clone(&directory)),
        CoordinatorConfig {
            update_interval: config.update_interval,
            ..CoordinatorConfig::default()
        },
    ));

    Ok(ApiInstance {
        coordinator,
        directory,
        monitored,
    })
}

/// A built member-site instance.
pub struct CookieInstance {
    pub coordinator: Arc<RefreshCoordinator<CookieFetcher>>,
    pub session: Arc<SessionManager>,
}

impl std::fmt::Debug for CookieInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieInstance").finish_non_exhaustive()
    }
}

/// Build a member-site instance.
///
/// A configured cookie header seeds the session optimistically; otherwise
/// the manager logs in on the first authenticated fetch.
pub fn build_cookie_instance(
    config: &InstanceConfig,
    period: HistoryPeriod,
) -> Result<CookieInstance, BuildError> {
    let Credentials::Account {
        username,
        password,
        cookie,
    } = &config.credentials
    else {
        return Err(ConfigError::CredentialsMismatch { mode: config.mode }.into());
    };

    let client = SiteClient::new(SiteConfig::new())?;

    let session = match cookie {
        Some(cookie) => {
            client.seed_cookie_header(cookie);
            Arc::new(SessionManager::assuming_session(
                client,
                username.clone(),
                password.clone(),
            ))
        }
        None => Arc::new(SessionManager::new(
            client,
            username.clone(),
            password.clone(),
        )),
    };

    let coordinator = Arc::new(RefreshCoordinator::new(
        CookieFetcher::new(Arc::clone(&session), period),
        CoordinatorConfig {
            update_interval: config.update_interval,
            ..CoordinatorConfig::default()
        },
    ));

    Ok(CookieInstance {
        coordinator,
        session,
    })
}
