//! Round trips through [`Storage::Memory`], the backend used when no
//! database URL is configured.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use modsim_db::{DbError, Storage};
use modsim_types::{ActorProfileDto, AgentDto, AgentId, ProfileId, StateManagerDto};
use serde_json::json;

fn clock_profile() -> ActorProfileDto {
    ActorProfileDto {
        agents: vec![AgentDto {
            id: AgentId::from("Clock"),
            state_managers: vec![StateManagerDto {
                consumed: "(prev!(time), prev!(timeStep))".to_owned(),
                produced: "time".to_owned(),
                function: "time_manager".to_owned(),
            }],
        }],
    }
}

#[tokio::test]
async fn profile_and_simulation_round_trip() {
    let storage = Storage::memory();
    assert_eq!(storage.kind(), "memory");

    let id = ProfileId::from("clock");
    storage.upsert_profile(&id, &clock_profile()).await.unwrap();

    let listed = storage.list_profiles().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, id);
    assert_eq!(listed[0].profile, clock_profile());

    let run = json!([[0.0, 100.0, {"Clock": {"time": 100.0}}]]);
    let saved = storage.save_simulation(&id, &run).await.unwrap();
    assert_eq!(saved.profile_id, id);

    let sims = storage.list_simulations(&id).await.unwrap();
    assert_eq!(sims.len(), 1);
    assert_eq!(sims[0].id, saved.id);
    assert_eq!(sims[0].data, run);
}

#[tokio::test]
async fn empty_backend_reports_nothing() {
    let storage = Storage::memory();
    let id = ProfileId::from("none");

    assert!(storage.list_profiles().await.unwrap().is_empty());
    assert!(storage.load_profile(&id).await.unwrap().is_none());
    assert!(storage.list_simulations(&id).await.unwrap().is_empty());
    assert!(matches!(
        storage.save_simulation(&id, &json!([])).await,
        Err(DbError::UnknownProfile(_))
    ));
}
