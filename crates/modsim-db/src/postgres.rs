//! `PostgreSQL` backend: pool setup and schema migrations.
//!
//! Queries are built at runtime rather than checked against a live
//! database, so the workspace compiles offline. Every statement binds its
//! inputs.

use std::time::Duration;

use modsim_core::config::DatabaseConfig;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tracing::info;

use crate::error::DbError;

/// How long a request waits for a free connection before failing.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// A migrated `PostgreSQL` pool holding the profile and simulation tables.
#[derive(Debug, Clone)]
pub struct PostgresPool {
    pool: PgPool,
}

impl PostgresPool {
    /// Connect using `database.url` and bring the schema up to date.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Config`] when no URL is configured or it does not
    /// parse, [`DbError::Postgres`] when the server is unreachable, and
    /// [`DbError::Migration`] when a migration fails.
    pub async fn open(config: &DatabaseConfig) -> Result<Self, DbError> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| DbError::Config("no database URL configured".to_owned()))?;
        let options: PgConnectOptions = url
            .parse()
            .map_err(|e: sqlx::Error| DbError::Config(format!("invalid database URL: {e}")))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;

        info!(
            max_connections = config.max_connections,
            "PostgreSQL storage ready"
        );
        Ok(Self { pool })
    }

    /// The underlying pool, for the table stores.
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_url_is_a_config_error() {
        let err = PostgresPool::open(&DatabaseConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Config(ref msg) if msg.contains("no database URL")));
    }

    #[tokio::test]
    async fn malformed_url_is_a_config_error() {
        let config = DatabaseConfig {
            url: Some("not a url".to_owned()),
            ..DatabaseConfig::default()
        };
        let err = PostgresPool::open(&config).await.unwrap_err();
        assert!(matches!(err, DbError::Config(_)));
    }
}
