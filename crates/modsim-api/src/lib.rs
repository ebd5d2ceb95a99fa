//! HTTP API for the modsim agent simulator.
//!
//! Clients store actor profiles, load them into the process-wide graph
//! cache, and run simulations against the cached graph. Every finished run
//! is persisted and returned as the raw temporal store.
//!
//! # Modules
//!
//! - [`router`] -- Route table and middleware
//! - [`handlers`] -- Endpoint handlers
//! - [`state`] -- Shared application state
//! - [`server`] -- TCP binding and serving
//! - [`error`] -- [`ApiError`] and its HTTP mapping

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use state::AppState;
