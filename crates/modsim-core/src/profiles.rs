//! Bundled example profiles.
//!
//! [`two_body`] wires two gravitating bodies, `Body1` and `Body2`, each with
//! the same five state managers; [`two_body_initial_states`] holds the
//! matching initial conditions.

use std::collections::BTreeMap;

use modsim_types::{ActorProfileDto, AgentDto, AgentId, AgentStateDto, StateManagerDto, Vector3};

/// Identifier the server seeds the bundled profile under.
pub const TWO_BODY_PROFILE_ID: &str = "two_body";

fn body(id: &str, other: &str) -> AgentDto {
    let sm = |consumed: String, produced: &str, function: &str| StateManagerDto {
        consumed,
        produced: produced.to_owned(),
        function: function.to_owned(),
    };

    AgentDto {
        id: AgentId::from(id),
        state_managers: vec![
            sm(
                format!(
                    "(
                        prev!(timeStep),
                        prev!(position),
                        prev!(velocity),
                        agent!({other}).position,
                        agent!({other}).mass,
                    )"
                ),
                "velocity",
                "propagate_velocity",
            ),
            sm(
                "(prev!(timeStep), prev!(position), velocity,)".to_owned(),
                "position",
                "propagate_position",
            ),
            sm("(prev!(mass),)".to_owned(), "mass", "propagate_mass"),
            sm("(prev!(time), timeStep)".to_owned(), "time", "time_manager"),
            sm("(velocity,)".to_owned(), "timeStep", "timestep_manager"),
        ],
    }
}

/// Two bodies attracting each other.
pub fn two_body() -> ActorProfileDto {
    ActorProfileDto {
        agents: vec![body("Body1", "Body2"), body("Body2", "Body1")],
    }
}

/// Initial conditions for [`two_body`].
pub fn two_body_initial_states() -> BTreeMap<AgentId, AgentStateDto> {
    BTreeMap::from([
        (
            AgentId::from("Body1"),
            AgentStateDto {
                position: Vector3::new(-0.73, 0.0, 0.0),
                velocity: Vector3::new(0.0, -0.0015, 0.0),
                mass: 1.0,
            },
        ),
        (
            AgentId::from("Body2"),
            AgentStateDto {
                position: Vector3::new(60.34, 0.0, 0.0),
                velocity: Vector3::new(0.0, 0.13, 0.0),
                mass: 0.123,
            },
        ),
    ])
}
