//! In-memory backend.
//!
//! Mirrors the `PostgreSQL` tables with maps behind a [`tokio::sync::RwLock`].
//! Used when no database URL is configured, and by tests. Contents are lost
//! when the process exits.

use std::collections::BTreeMap;

use chrono::Utc;
use modsim_types::{ActorProfileDto, ProfileId, SimulationId};
use tokio::sync::RwLock;

use crate::error::DbError;
use crate::profile_store::ProfileRecord;
use crate::simulation_store::SimulationRecord;

#[derive(Debug, Default)]
struct Tables {
    /// Profiles as encoded JSON text, ordered by id.
    profiles: BTreeMap<ProfileId, String>,
    /// Simulations per profile, in insertion order.
    simulations: BTreeMap<ProfileId, Vec<SimulationRecord>>,
}

/// Process-local profile and simulation storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a profile, or replace an existing one.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if the profile cannot be encoded.
    pub async fn upsert_profile(
        &self,
        id: &ProfileId,
        profile: &ActorProfileDto,
    ) -> Result<(), DbError> {
        let data = serde_json::to_string(profile)?;
        self.tables.write().await.profiles.insert(id.clone(), data);
        tracing::debug!(profile = %id, "Saved profile in memory");
        Ok(())
    }

    /// Load one profile.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if the stored blob is not a profile.
    pub async fn load_profile(&self, id: &ProfileId) -> Result<Option<ProfileRecord>, DbError> {
        let tables = self.tables.read().await;
        tables
            .profiles
            .get(id)
            .map(|data| {
                Ok(ProfileRecord {
                    id: id.clone(),
                    profile: serde_json::from_str(data)?,
                })
            })
            .transpose()
    }

    /// All profiles, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if any stored blob is not a profile.
    pub async fn list_profiles(&self) -> Result<Vec<ProfileRecord>, DbError> {
        let tables = self.tables.read().await;
        tables
            .profiles
            .iter()
            .map(|(id, data)| {
                Ok(ProfileRecord {
                    id: id.clone(),
                    profile: serde_json::from_str(data)?,
                })
            })
            .collect()
    }

    /// Store a finished run for `profile_id`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::UnknownProfile`] if `profile_id` is not stored.
    pub async fn insert_simulation(
        &self,
        profile_id: &ProfileId,
        data: &serde_json::Value,
    ) -> Result<SimulationRecord, DbError> {
        let mut tables = self.tables.write().await;
        if !tables.profiles.contains_key(profile_id) {
            return Err(DbError::UnknownProfile(profile_id.clone()));
        }

        let record = SimulationRecord {
            id: SimulationId::new(),
            profile_id: profile_id.clone(),
            data: data.clone(),
            created_at: Utc::now(),
        };
        tables
            .simulations
            .entry(profile_id.clone())
            .or_default()
            .push(record.clone());

        tracing::debug!(simulation = %record.id, profile = %profile_id, "Saved simulation in memory");
        Ok(record)
    }

    /// Simulations stored for `profile_id`, oldest first.
    pub async fn list_simulations(&self, profile_id: &ProfileId) -> Vec<SimulationRecord> {
        self.tables
            .read()
            .await
            .simulations
            .get(profile_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use modsim_types::{AgentDto, AgentId, StateManagerDto};
    use serde_json::json;

    use super::*;

    fn profile(agent: &str) -> ActorProfileDto {
        ActorProfileDto {
            agents: vec![AgentDto {
                id: AgentId::from(agent),
                state_managers: vec![StateManagerDto {
                    consumed: "(prev!(mass),)".to_owned(),
                    produced: "mass".to_owned(),
                    function: "propagate_mass".to_owned(),
                }],
            }],
        }
    }

    #[tokio::test]
    async fn upsert_replaces_existing_profile() {
        let store = MemoryStore::new();
        let id = ProfileId::from("p");
        store.upsert_profile(&id, &profile("A")).await.unwrap();
        store.upsert_profile(&id, &profile("B")).await.unwrap();

        let loaded = store.load_profile(&id).await.unwrap().unwrap();
        assert_eq!(loaded.profile, profile("B"));
        assert_eq!(store.list_profiles().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn profiles_list_in_id_order() {
        let store = MemoryStore::new();
        for id in ["zeta", "alpha", "mid"] {
            store
                .upsert_profile(&ProfileId::from(id), &profile("A"))
                .await
                .unwrap();
        }

        let ids: Vec<_> = store
            .list_profiles()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id.to_string())
            .collect();
        assert_eq!(ids, vec!["alpha", "mid", "zeta"]);
    }

    #[tokio::test]
    async fn missing_profile_loads_as_none() {
        let store = MemoryStore::new();
        assert!(store.load_profile(&ProfileId::from("nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn simulations_require_a_stored_profile() {
        let store = MemoryStore::new();
        let err = store
            .insert_simulation(&ProfileId::from("ghost"), &json!([]))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UnknownProfile(id) if id.as_str() == "ghost"));
    }

    #[tokio::test]
    async fn simulations_are_listed_per_profile_in_insertion_order() {
        let store = MemoryStore::new();
        let a = ProfileId::from("a");
        let b = ProfileId::from("b");
        store.upsert_profile(&a, &profile("A")).await.unwrap();
        store.upsert_profile(&b, &profile("B")).await.unwrap();

        let first = store.insert_simulation(&a, &json!([1])).await.unwrap();
        store.insert_simulation(&b, &json!([2])).await.unwrap();
        let third = store.insert_simulation(&a, &json!([3])).await.unwrap();

        let listed = store.list_simulations(&a).await;
        assert_eq!(listed, vec![first, third]);
        assert!(store.list_simulations(&ProfileId::from("c")).await.is_empty());
    }
}
