//! Narrow entity-registration interface to the host platform.
//!
//! The host owns entity storage, unique-ID bookkeeping and lifecycle; this
//! crate only asks it to add, remove or update entities. Favorite-station
//! entities are driven entirely by reconciliation deltas, so runtime data
//! never manipulates the host registry directly.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::watch;

use crate::domain::{FavoriteStation, RefreshResult, StationCode};
use crate::favorites::{FavoritesDelta, reconcile};

/// Kind of presentation entity to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Sensor,
    BinarySensor,
    Button,
}

/// Failure reported by the host registry.
#[derive(Debug, thiserror::Error)]
#[error("entity registry error: {message}")]
pub struct RegistryError {
    pub message: String,
}

impl RegistryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// What the host platform exposes for entity lifecycle.
#[async_trait]
pub trait EntityRegistry: Send + Sync {
    async fn register_entity(
        &self,
        kind: EntityKind,
        unique_key: &str,
        initial_state: Value,
    ) -> Result<(), RegistryError>;

    async fn unregister_entity(&self, unique_key: &str) -> Result<(), RegistryError>;

    async fn update_entity_state(&self, unique_key: &str, new_state: Value)
    -> Result<(), RegistryError>;
}

/// Tracks which favorite stations currently have entities and applies
/// reconciliation deltas through the registry.
///
/// One per configured instance; the instance id namespaces unique keys so
/// two instances never collide in the host registry.
pub struct FavoriteEntities {
    instance_id: String,
    registered: BTreeSet<StationCode>,
}

impl FavoriteEntities {
    pub fn new(instance_id: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            registered: BTreeSet::new(),
        }
    }

    /// Codes that currently have entities.
    pub fn registered(&self) -> &BTreeSet<StationCode> {
        &self.registered
    }

    /// Stable unique key for one favorite-station entity.
    pub fn unique_key(&self, code: &StationCode) -> String {
        format!("{}_fav_{}", self.instance_id, code)
    }

    /// Bring the registered entities in line with a fetched favorite list.
    ///
    /// Adds and removes entities per the reconciliation delta and pushes
    /// fresh state to the entities that stay. Returns the applied delta.
    pub async fn sync<R: EntityRegistry + ?Sized>(
        &mut self,
        registry: &R,
        fetched: &[FavoriteStation],
    ) -> Result<FavoritesDelta, RegistryError> {
        let mut by_code: BTreeMap<&StationCode, &FavoriteStation> = BTreeMap::new();
        for favorite in fetched {
            by_code.entry(&favorite.code).or_insert(favorite);
        }
        if by_code.len() != fetched.len() {
            // A duplicate code in one fetch means the upstream favorites
            // list disagrees with itself; keep the first occurrence.
            tracing::warn!(
                instance = %self.instance_id,
                "favorites list repeats station codes; keeping first occurrence"
            );
        }

        let fetched_set: BTreeSet<StationCode> = by_code.keys().map(|c| (*c).clone()).collect();
        let delta = reconcile(&fetched_set, &self.registered);

        for code in &delta.to_add {
            let state = by_code.get(code).map(|f| entity_state(f)).unwrap_or(Value::Null);
            registry
                .register_entity(EntityKind::Sensor, &self.unique_key(code), state)
                .await?;
            self.registered.insert(code.clone());
        }

        for code in &delta.to_remove {
            registry.unregister_entity(&self.unique_key(code)).await?;
            self.registered.remove(code);
        }

        for (code, favorite) in &by_code {
            if delta.to_add.contains(*code) {
                continue;
            }
            registry
                .update_entity_state(&self.unique_key(code), entity_state(favorite))
                .await?;
        }

        Ok(delta)
    }
}

/// Keep favorite-station entities in sync with published snapshots.
///
/// Awaits each new generation on the coordinator's watch channel and
/// applies the reconciliation delta through the registry. Run as a
/// background task alongside the coordinator; returns when the publishing
/// side is dropped. Registry failures are logged and retried on the next
/// generation rather than killing the task.
pub async fn drive_favorite_entities<R>(
    mut snapshots: watch::Receiver<Arc<RefreshResult>>,
    registry: &R,
    entities: &mut FavoriteEntities,
) where
    R: EntityRegistry + ?Sized,
{
    while snapshots.changed().await.is_ok() {
        let favorites = snapshots.borrow_and_update().favorites.clone();
        match entities.sync(registry, &favorites).await {
            Ok(delta) if !delta.is_empty() => {
                tracing::debug!(
                    added = delta.to_add.len(),
                    removed = delta.to_remove.len(),
                    "favorite entities reconciled"
                );
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(error = %err, "entity registry rejected favorites delta");
            }
        }
    }
}

fn entity_state(favorite: &FavoriteStation) -> Value {
    json!({
        "station_code": favorite.code.as_str(),
        "station_number": favorite.numeric_id,
        "name": favorite.name,
        "bikes_general": favorite.bikes_general,
        "bikes_sprout": favorite.bikes_sprout,
    })
}
