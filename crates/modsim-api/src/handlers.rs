//! REST endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Health page |
//! | `GET` | `/schema/agent` | Agent form schema (empty) |
//! | `GET` | `/schema/statemanagers` | State-manager function registry |
//! | `GET` | `/profiles` | All stored profiles |
//! | `POST` | `/profile/{id}/load` | Load a stored profile into the graph cache |
//! | `PUT` | `/profile/{id}` | Build, cache, and store a profile |
//! | `GET` | `/profile/{id}/simulations` | Stored runs of a profile |
//! | `POST` | `/profile/{id}/simulation` | Run the cached graph and store the result |

use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse};
use modsim_core::{SimulationGraph, Simulator, TemporalStore, functions};
use modsim_types::{ActorProfileDto, ProfileId, SimulationDto};
use tracing::{error, info};

use crate::error::ApiError;
use crate::state::AppState;

/// Compile `profile` and install the graph for `id`.
async fn install_graph(
    state: &AppState,
    id: &ProfileId,
    profile: &ActorProfileDto,
) -> Result<(), ApiError> {
    let started = Instant::now();
    let graph = SimulationGraph::build(profile, &state.compiler).inspect_err(|e| {
        error!(profile = %id, error = %e, "Profile failed to compile");
    })?;
    info!(
        profile = %id,
        agents = profile.agents.len(),
        elapsed_ms = started.elapsed().as_millis(),
        "Simulation graph built"
    );

    state.graphs.install(id.clone(), graph).await;
    Ok(())
}

// ---------------------------------------------------------------------------
// GET / -- health page
// ---------------------------------------------------------------------------

/// Report that the server is up.
pub async fn index() -> impl IntoResponse {
    Html("<p>modsim API - running!</p>")
}

// ---------------------------------------------------------------------------
// Schemas
// ---------------------------------------------------------------------------

/// Agent form schema. Agents carry no configurable fields beyond their
/// state managers, so the schema is empty.
pub async fn agent_schema() -> impl IntoResponse {
    Json(serde_json::json!({}))
}

/// Every registered state-manager function with its inputs and output.
pub async fn state_manager_schema() -> impl IntoResponse {
    Json(serde_json::json!({ "stateManagers": functions::schema() }))
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

/// List all stored profiles ordered by id.
pub async fn list_profiles(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let records = state.storage.list_profiles().await?;
    if records.is_empty() {
        return Err(ApiError::NotFound("Profile not found".to_owned()));
    }

    let profiles: Vec<serde_json::Value> = records
        .into_iter()
        .map(|r| serde_json::json!({ "id": r.id, "profile": r.profile }))
        .collect();

    Ok(Json(serde_json::json!({ "profiles": profiles })))
}

/// Load a stored profile and make it the active graph for its id.
pub async fn load_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ProfileId>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .storage
        .load_profile(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_owned()))?;

    install_graph(&state, &id, &record.profile).await?;

    Ok(Json(serde_json::json!({
        "id": id,
        "profile": record.profile,
        "status": "loaded",
    })))
}

/// Build a graph from the request body, cache it, and store the profile.
///
/// The profile is stored only if it compiles.
pub async fn save_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ProfileId>,
    Json(profile): Json<ActorProfileDto>,
) -> Result<impl IntoResponse, ApiError> {
    install_graph(&state, &id, &profile).await?;
    state.storage.upsert_profile(&id, &profile).await?;

    Ok(Json(serde_json::json!({ "id": id, "status": "saved" })))
}

// ---------------------------------------------------------------------------
// Simulations
// ---------------------------------------------------------------------------

/// List the stored runs of a profile, oldest first.
pub async fn list_simulations(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ProfileId>,
) -> Result<impl IntoResponse, ApiError> {
    let records = state.storage.list_simulations(&id).await?;
    if records.is_empty() {
        return Err(ApiError::NotFound(
            "No simulations found for this profile".to_owned(),
        ));
    }

    let simulations: Vec<serde_json::Value> = records
        .into_iter()
        .map(|r| {
            serde_json::json!({
                "id": r.id,
                "data": r.data,
                "createdAt": r.created_at,
            })
        })
        .collect();

    Ok(Json(serde_json::json!({ "simulations": simulations })))
}

/// Run the cached graph of a profile from the given initial states.
///
/// The run executes on the blocking pool. Its store is persisted and
/// returned as the raw `[start, end, payload]` entries.
pub async fn run_simulation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ProfileId>,
    Json(request): Json<SimulationDto>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(graph) = state.graphs.get(&id).await else {
        error!(profile = %id, "Attempted to run simulation with no loaded actors");
        return Err(ApiError::BadRequest("No actors loaded".to_owned()));
    };

    let iterations = state.iterations;
    let started = Instant::now();
    let outcome = tokio::task::spawn_blocking(move || {
        let mut simulator = Simulator::new(&graph, &request.initial_states);
        simulator
            .simulate(iterations)
            .map(|summary| (summary, simulator.into_store()))
    })
    .await
    .map_err(|e| ApiError::Internal(format!("simulation task failed: {e}")))?;

    let (summary, store): (_, TemporalStore) = outcome.inspect_err(|e| {
        error!(profile = %id, error = %e, "Simulation failed");
    })?;

    info!(
        profile = %id,
        iterations = summary.iterations,
        steps = summary.steps,
        skipped = summary.skipped,
        elapsed_ms = started.elapsed().as_millis(),
        "Simulation completed"
    );

    let data = serde_json::to_value(&store)?;
    let record = state.storage.save_simulation(&id, &data).await?;
    info!(profile = %id, simulation = %record.id, "Simulation stored");

    Ok(Json(data))
}
