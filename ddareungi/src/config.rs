//! Instance configuration handed over by the external setup flow.
//!
//! The setup wizard collects and validates credentials; this module only
//! defines the structure it produces and the configuration-time station
//! resolution. Resolution failures (ambiguous or unknown tokens) are
//! configuration errors that block setup, never runtime surprises.

use std::fmt;
use std::time::Duration;

use crate::domain::{InvalidStationQuery, Station, StationCode, StationQuery};
use crate::resolve::{Resolution, resolve};

/// Default refresh interval for either mode.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(60);

/// Which upstream pairing an instance uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Token-keyed Open API: station directory only.
    Api,
    /// Member-site session: favorites, ride history, voucher status.
    Cookie,
}

/// Identity material for one configured instance.
///
/// Immutable once configured; superseded only by reconfiguration, which
/// builds a fresh instance.
#[derive(Clone)]
pub enum Credentials {
    /// Open API key for the station directory.
    ApiKey(String),
    /// Member-site account. A previously captured cookie header may seed
    /// the first session before any login.
    Account {
        username: String,
        password: String,
        cookie: Option<String>,
    },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Secret material never reaches logs.
        match self {
            Credentials::ApiKey(_) => f.write_str("Credentials::ApiKey(<redacted>)"),
            Credentials::Account { .. } => f.write_str("Credentials::Account(<redacted>)"),
        }
    }
}

/// Configuration for one instance, as produced by the setup flow.
#[derive(Debug, Clone)]
pub struct InstanceConfig {
    /// Stable identifier for the instance; namespaces entity unique keys.
    pub instance_id: String,
    pub mode: Mode,
    pub credentials: Credentials,
    /// Host entity whose coordinates center the nearby recommendation.
    pub location_entity: Option<String>,
    pub update_interval: Duration,
    /// Raw station tokens as entered (codes or numbers), resolved at
    /// configuration time.
    pub monitored_stations: Vec<String>,
}

impl InstanceConfig {
    /// Config for an Open API instance.
    pub fn api(instance_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            mode: Mode::Api,
            credentials: Credentials::ApiKey(api_key.into()),
            location_entity: None,
            update_interval: DEFAULT_UPDATE_INTERVAL,
            monitored_stations: Vec::new(),
        }
    }

    /// Config for a member-site instance.
    pub fn cookie(
        instance_id: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            mode: Mode::Cookie,
            credentials: Credentials::Account {
                username: username.into(),
                password: password.into(),
                cookie: None,
            },
            location_entity: None,
            update_interval: DEFAULT_UPDATE_INTERVAL,
            monitored_stations: Vec::new(),
        }
    }

    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    pub fn with_location_entity(mut self, entity: impl Into<String>) -> Self {
        self.location_entity = Some(entity.into());
        self
    }

    pub fn with_monitored_stations(mut self, tokens: Vec<String>) -> Self {
        self.monitored_stations = tokens;
        self
    }

    /// Set monitored stations from a raw comma- or newline-separated list,
    /// the shape users paste into the setup form.
    pub fn with_station_tokens(self, raw: &str) -> Self {
        let tokens = crate::domain::split_station_tokens(raw);
        self.with_monitored_stations(tokens)
    }
}

/// Configuration-time errors; all block completion of setup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("station token {input:?}: {source}")]
    InvalidStationToken {
        input: String,
        source: InvalidStationQuery,
    },

    /// The numeric token matches several stations; the user must enter one
    /// of the candidate canonical codes instead.
    #[error("station {input:?} is ambiguous between {candidates:?}; enter a canonical code")]
    AmbiguousStation {
        input: String,
        candidates: Vec<StationCode>,
    },

    #[error("station {input:?} not found in the directory")]
    StationNotFound { input: String },

    #[error("credentials do not match mode {mode:?}")]
    CredentialsMismatch { mode: Mode },
}

/// Resolve the configured station tokens against a directory snapshot.
///
/// Every token must resolve to exactly one canonical code; the first
/// ambiguous or unknown token aborts with the error the setup flow shows
/// the user. Duplicate resolutions collapse to one entry.
pub fn resolve_monitored(
    tokens: &[String],
    directory: &[Station],
) -> Result<Vec<StationCode>, ConfigError> {
    let mut codes = Vec::new();

    for token in tokens {
        let query =
            StationQuery::parse(token).map_err(|source| ConfigError::InvalidStationToken {
                input: token.clone(),
                source,
            })?;

        match resolve(&query, directory) {
            Resolution::Resolved(code) => {
                if !codes.contains(&code) {
                    codes.push(code);
                }
            }
            Resolution::Ambiguous(candidates) => {
                return Err(ConfigError::AmbiguousStation {
                    input: token.clone(),
                    candidates,
                });
            }
            Resolution::NotFound => {
                return Err(ConfigError::StationNotFound {
                    input: token.clone(),
                });
            }
        }
    }

    Ok(codes)
}
