//! Simulation persistence.
//!
//! Each finished run is stored as the JSON text of its exported temporal
//! store, linked to the profile it ran against. Ids are UUID v7, so id
//! order is insertion order.

use chrono::{DateTime, Utc};
use modsim_types::{ProfileId, SimulationId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbError;

/// A stored simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRecord {
    /// Simulation identifier.
    pub id: SimulationId,
    /// Profile the simulation ran against.
    pub profile_id: ProfileId,
    /// Exported temporal store.
    pub data: serde_json::Value,
    /// When the simulation was stored.
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct SimulationRow {
    id: Uuid,
    profile_id: String,
    data: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<SimulationRow> for SimulationRecord {
    type Error = DbError;

    fn try_from(row: SimulationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: SimulationId::from(row.id),
            profile_id: ProfileId::new(row.profile_id),
            data: serde_json::from_str(&row.data)?,
            created_at: row.created_at,
        })
    }
}

/// Operations on the `simulations` table.
pub struct SimulationStore<'a> {
    pool: &'a PgPool,
}

impl<'a> SimulationStore<'a> {
    /// Create a simulation store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a finished run for `profile_id`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails, including when
    /// `profile_id` is not a stored profile.
    pub async fn insert(
        &self,
        profile_id: &ProfileId,
        data: &serde_json::Value,
    ) -> Result<SimulationRecord, DbError> {
        let id = SimulationId::new();
        let text = data.to_string();

        let created_at: (DateTime<Utc>,) = sqlx::query_as(
            r"INSERT INTO simulations (id, profile_id, data)
              VALUES ($1, $2, $3)
              RETURNING created_at",
        )
        .bind(id.into_inner())
        .bind(profile_id.as_str())
        .bind(&text)
        .fetch_one(self.pool)
        .await?;

        tracing::info!(
            simulation = %id,
            profile = %profile_id,
            bytes = text.len(),
            "Saved simulation"
        );

        Ok(SimulationRecord {
            id,
            profile_id: profile_id.clone(),
            data: data.clone(),
            created_at: created_at.0,
        })
    }

    /// Simulations stored for `profile_id`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails and
    /// [`DbError::Serialization`] if a stored blob is not valid JSON.
    pub async fn list_for_profile(
        &self,
        profile_id: &ProfileId,
    ) -> Result<Vec<SimulationRecord>, DbError> {
        let rows = sqlx::query_as::<_, SimulationRow>(
            r"SELECT id, profile_id, data, created_at
              FROM simulations
              WHERE profile_id = $1
              ORDER BY id",
        )
        .bind(profile_id.as_str())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(SimulationRecord::try_from).collect()
    }
}
