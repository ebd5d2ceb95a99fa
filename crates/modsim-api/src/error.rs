//! Error types for the HTTP API.
//!
//! [`ApiError`] unifies all failure modes into a single enum that converts
//! into an Axum response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Every
//! error body has the shape `{"error": message, "status": code}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use modsim_core::{GraphError, SimulationError};
use modsim_db::DbError;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The requested resource was not found.
    #[error("{0}")]
    NotFound(String),

    /// The request cannot be served in the current state.
    #[error("{0}")]
    BadRequest(String),

    /// A profile failed to compile into a graph.
    #[error("profile rejected: {0}")]
    Graph(#[from] GraphError),

    /// A simulation run aborted.
    #[error("simulation failed: {0}")]
    Simulation(#[from] SimulationError),

    /// The persistence layer failed.
    #[error("storage error: {0}")]
    Storage(#[from] DbError),

    /// A serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status this error maps to.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) | Self::Storage(DbError::UnknownProfile(_)) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Graph(_) | Self::Simulation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Storage(_) | Self::Serialization(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use modsim_types::{AgentId, ProfileId};

    use super::*;

    #[test]
    fn statuses_follow_the_failure_kind() {
        assert_eq!(
            ApiError::NotFound("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::BadRequest("No actors loaded".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(GraphError::UnknownAgent(AgentId::from("A"))).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::from(DbError::UnknownProfile(ProfileId::from("p"))).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(DbError::Config("bad".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn body_carries_message_and_code() {
        let response = ApiError::BadRequest("No actors loaded".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], "No actors loaded");
        assert_eq!(json["status"], 400);
    }
}
