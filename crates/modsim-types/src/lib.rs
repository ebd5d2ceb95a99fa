//! Shared type definitions for the modsim agent simulator.
//!
//! This crate is the single source of truth for the data model shared by the
//! query compiler, the evaluation engine, persistence, and the HTTP API.
//! Types flow downstream to `TypeScript` via `ts-rs` for the web client.
//!
//! # Modules
//!
//! - [`ids`] -- Identifier newtypes for agents, profiles, and simulations
//! - [`vector`] -- Three-component [`Vector3`] with the arithmetic the
//!   propagation functions need
//! - [`value`] -- Dynamic [`Value`] held in agent state mappings
//! - [`query`] -- The structured [`Query`] tree produced by the query compiler
//! - [`dto`] -- Profile and simulation request payloads
//! - [`schema`] -- Introspection records describing supported state managers

pub mod dto;
pub mod ids;
pub mod query;
pub mod schema;
pub mod value;
pub mod vector;

// Re-export all public types at crate root for convenience.
pub use dto::{ActorProfileDto, AgentDto, AgentStateDto, SimulationDto, StateManagerDto};
pub use ids::{AgentId, ProfileId, SimulationId};
pub use query::Query;
pub use schema::StateManagerSchema;
pub use value::{State, Universe, Value};
pub use vector::Vector3;

#[cfg(test)]
mod tests {
    //! Binding generation for the web client.

    #[test]
    fn export_bindings() {
        use ts_rs::TS;

        let _ = crate::ids::AgentId::export_all();
        let _ = crate::ids::ProfileId::export_all();
        let _ = crate::ids::SimulationId::export_all();
        let _ = crate::vector::Vector3::export_all();
        let _ = crate::value::Value::export_all();
        let _ = crate::query::Query::export_all();
        let _ = crate::dto::AgentStateDto::export_all();
        let _ = crate::dto::StateManagerDto::export_all();
        let _ = crate::dto::AgentDto::export_all();
        let _ = crate::dto::ActorProfileDto::export_all();
        let _ = crate::dto::SimulationDto::export_all();
        let _ = crate::schema::StateManagerSchema::export_all();
    }
}
