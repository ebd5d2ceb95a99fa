//! Storage selection and first-run seeding.

use modsim_api::AppState;
use modsim_core::config::DatabaseConfig;
use modsim_core::profiles::{self, TWO_BODY_PROFILE_ID};
use modsim_db::{DbError, PostgresPool, Storage};
use modsim_types::ProfileId;
use tracing::info;

/// Connect and migrate `PostgreSQL` when a URL is configured, otherwise
/// fall back to process memory.
pub async fn open_storage(config: &DatabaseConfig) -> Result<Storage, DbError> {
    if config.url.is_none() {
        info!("No database URL configured, using in-memory storage");
        return Ok(Storage::memory());
    }
    Ok(Storage::Postgres(PostgresPool::open(config).await?))
}

/// Store the bundled two-body profile unless a profile with its id exists.
///
/// The profile is stored only; it is not loaded into the graph cache.
pub async fn seed_default_profile(state: &AppState) -> Result<(), DbError> {
    let id = ProfileId::from(TWO_BODY_PROFILE_ID);
    if state.storage.load_profile(&id).await?.is_some() {
        info!(profile = %id, "Default profile already stored");
        return Ok(());
    }

    state
        .storage
        .upsert_profile(&id, &profiles::two_body())
        .await?;
    info!(profile = %id, "Default profile seeded");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_url_selects_memory() {
        let storage = open_storage(&DatabaseConfig::default()).await.unwrap();
        assert_eq!(storage.kind(), "memory");
    }

    #[tokio::test]
    async fn seeding_is_idempotent_and_keeps_edits() {
        let state = AppState::new(Storage::memory(), 1);
        seed_default_profile(&state).await.unwrap();

        let id = ProfileId::from(TWO_BODY_PROFILE_ID);
        let mut edited = profiles::two_body();
        edited.agents.truncate(1);
        state.storage.upsert_profile(&id, &edited).await.unwrap();

        seed_default_profile(&state).await.unwrap();
        let stored = state.storage.load_profile(&id).await.unwrap().unwrap();
        assert_eq!(stored.profile, edited);
        assert!(state.graphs.is_empty().await);
    }
}
