//! Profile and simulation request payloads.
//!
//! A profile declares, per agent, which state managers run and how their
//! inputs and outputs are wired. A simulation request supplies the initial
//! physical state of every agent.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::AgentId;
use crate::vector::Vector3;

/// Initial physical state of one agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentStateDto {
    /// Starting position.
    pub position: Vector3,
    /// Starting velocity.
    pub velocity: Vector3,
    /// Mass.
    pub mass: f64,
}

/// Declaration of one state manager, as written by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StateManagerDto {
    /// Query text describing the inputs.
    pub consumed: String,
    /// Query text describing where the output is written.
    pub produced: String,
    /// Name of a function from the registry.
    pub function: String,
}

/// One agent and its state managers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentDto {
    /// Agent identifier.
    pub id: AgentId,
    /// State managers, in declaration order.
    pub state_managers: Vec<StateManagerDto>,
}

/// A full actor profile: every agent in the universe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActorProfileDto {
    /// Agents, in declaration order.
    pub agents: Vec<AgentDto>,
}

/// Body of a simulation run request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SimulationDto {
    /// Initial state per agent.
    pub initial_states: BTreeMap<AgentId, AgentStateDto>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn decodes_simulation_request() {
        let json = r#"{
            "initial_states": {
                "Body1": {
                    "position": {"x": -0.73, "y": 0, "z": 0},
                    "velocity": {"x": 0, "y": -0.0015, "z": 0},
                    "mass": 1
                }
            }
        }"#;
        let dto: SimulationDto = serde_json::from_str(json).unwrap();
        let body = dto.initial_states.get("Body1").unwrap();
        assert!((body.mass - 1.0).abs() < f64::EPSILON);
        assert!((body.velocity.y + 0.0015).abs() < f64::EPSILON);
    }

    #[test]
    fn decodes_profile() {
        let json = r#"{
            "agents": [{
                "id": "Body1",
                "state_managers": [
                    {"consumed": "(prev!(mass),)", "produced": "mass", "function": "propagate_mass"}
                ]
            }]
        }"#;
        let dto: ActorProfileDto = serde_json::from_str(json).unwrap();
        assert_eq!(dto.agents.len(), 1);
        assert_eq!(dto.agents.first().map(|a| a.id.as_str()), Some("Body1"));
    }
}
