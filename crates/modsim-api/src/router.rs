//! Axum router construction.
//!
//! Assembles every route into a single [`Router`] with CORS and HTTP
//! tracing middleware.

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post, put};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::handlers;
use crate::state::AppState;

/// CORS for the configured origins, or any origin when none are set.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|e| warn!(%origin, error = %e, "Ignoring invalid CORS origin"))
                .ok()
        })
        .collect();

    let allow_origin = if allowed.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(allowed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the complete Axum router.
///
/// - `GET /` -- health page
/// - `GET /schema/agent` -- agent form schema
/// - `GET /schema/statemanagers` -- function registry
/// - `GET /profiles` -- stored profiles
/// - `POST /profile/{id}/load` -- load a stored profile
/// - `PUT /profile/{id}` -- save a profile
/// - `GET /profile/{id}/simulations` -- stored runs
/// - `POST /profile/{id}/simulation` -- run a simulation
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.cors_origins);

    Router::new()
        .route("/", get(handlers::index))
        .route("/schema/agent", get(handlers::agent_schema))
        .route("/schema/statemanagers", get(handlers::state_manager_schema))
        .route("/profiles", get(handlers::list_profiles))
        .route("/profile/{id}", put(handlers::save_profile))
        .route("/profile/{id}/load", post(handlers::load_profile))
        .route("/profile/{id}/simulations", get(handlers::list_simulations))
        .route("/profile/{id}/simulation", post(handlers::run_simulation))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
