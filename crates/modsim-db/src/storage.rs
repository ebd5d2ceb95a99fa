//! Backend selection.

use modsim_types::{ActorProfileDto, ProfileId};

use crate::error::DbError;
use crate::memory::MemoryStore;
use crate::postgres::PostgresPool;
use crate::profile_store::{ProfileRecord, ProfileStore};
use crate::simulation_store::{SimulationRecord, SimulationStore};

/// The configured persistence backend.
#[derive(Debug)]
pub enum Storage {
    /// `PostgreSQL`, for deployments with a database URL.
    Postgres(PostgresPool),
    /// Process memory.
    Memory(MemoryStore),
}

impl Storage {
    /// An empty in-memory backend.
    pub fn memory() -> Self {
        Self::Memory(MemoryStore::new())
    }

    /// Short backend name for logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Memory(_) => "memory",
        }
    }

    /// Insert a profile, or replace an existing one.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if encoding or the backend write fails.
    pub async fn upsert_profile(
        &self,
        id: &ProfileId,
        profile: &ActorProfileDto,
    ) -> Result<(), DbError> {
        match self {
            Self::Postgres(pg) => ProfileStore::new(pg.pool()).upsert(id, profile).await,
            Self::Memory(mem) => mem.upsert_profile(id, profile).await,
        }
    }

    /// Load one profile.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend read or decoding fails.
    pub async fn load_profile(&self, id: &ProfileId) -> Result<Option<ProfileRecord>, DbError> {
        match self {
            Self::Postgres(pg) => ProfileStore::new(pg.pool()).load(id).await,
            Self::Memory(mem) => mem.load_profile(id).await,
        }
    }

    /// All profiles, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend read or decoding fails.
    pub async fn list_profiles(&self) -> Result<Vec<ProfileRecord>, DbError> {
        match self {
            Self::Postgres(pg) => ProfileStore::new(pg.pool()).list().await,
            Self::Memory(mem) => mem.list_profiles().await,
        }
    }

    /// Store a finished run for `profile_id`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if `profile_id` is not stored or the write fails.
    pub async fn save_simulation(
        &self,
        profile_id: &ProfileId,
        data: &serde_json::Value,
    ) -> Result<SimulationRecord, DbError> {
        match self {
            Self::Postgres(pg) => SimulationStore::new(pg.pool()).insert(profile_id, data).await,
            Self::Memory(mem) => mem.insert_simulation(profile_id, data).await,
        }
    }

    /// Simulations stored for `profile_id`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend read or decoding fails.
    pub async fn list_simulations(
        &self,
        profile_id: &ProfileId,
    ) -> Result<Vec<SimulationRecord>, DbError> {
        match self {
            Self::Postgres(pg) => {
                SimulationStore::new(pg.pool())
                    .list_for_profile(profile_id)
                    .await
            }
            Self::Memory(mem) => Ok(mem.list_simulations(profile_id).await),
        }
    }
}
