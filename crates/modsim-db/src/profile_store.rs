//! Profile persistence.
//!
//! A profile is stored as the JSON text of its [`ActorProfileDto`]. Saving
//! an existing id replaces its blob.

use modsim_types::{ActorProfileDto, ProfileId};
use sqlx::PgPool;

use crate::error::DbError;

/// A stored profile.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileRecord {
    /// Profile identifier.
    pub id: ProfileId,
    /// Decoded profile.
    pub profile: ActorProfileDto,
}

/// Raw row from the `profiles` table.
#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: String,
    data: String,
}

impl TryFrom<ProfileRow> for ProfileRecord {
    type Error = DbError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ProfileId::new(row.id),
            profile: serde_json::from_str(&row.data)?,
        })
    }
}

/// Operations on the `profiles` table.
pub struct ProfileStore<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileStore<'a> {
    /// Create a profile store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a profile, or replace the blob of an existing one.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if the profile cannot be encoded
    /// and [`DbError::Postgres`] if the upsert fails.
    pub async fn upsert(&self, id: &ProfileId, profile: &ActorProfileDto) -> Result<(), DbError> {
        let data = serde_json::to_string(profile)?;

        sqlx::query(
            r"INSERT INTO profiles (id, data)
              VALUES ($1, $2)
              ON CONFLICT (id) DO UPDATE SET data = EXCLUDED.data",
        )
        .bind(id.as_str())
        .bind(&data)
        .execute(self.pool)
        .await?;

        tracing::info!(profile = %id, bytes = data.len(), "Saved profile");
        Ok(())
    }

    /// Load one profile.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails and
    /// [`DbError::Serialization`] if the stored blob is not a profile.
    pub async fn load(&self, id: &ProfileId) -> Result<Option<ProfileRecord>, DbError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r"SELECT id, data FROM profiles WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(ProfileRecord::try_from).transpose()
    }

    /// All profiles, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails and
    /// [`DbError::Serialization`] if any stored blob is not a profile.
    pub async fn list(&self) -> Result<Vec<ProfileRecord>, DbError> {
        let rows = sqlx::query_as::<_, ProfileRow>(r"SELECT id, data FROM profiles ORDER BY id")
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(ProfileRecord::try_from).collect()
    }
}
