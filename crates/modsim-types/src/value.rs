//! Dynamic values held in agent state.
//!
//! State managers exchange data through string-keyed mappings rather than
//! fixed structs: which fields exist is decided by the profile's queries,
//! not by the engine. [`Value`] is the closed set of shapes such a field can
//! take.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::AgentId;
use crate::vector::Vector3;

/// Field name to value mapping for one agent.
pub type State = BTreeMap<String, Value>;

/// Agent identifier to state mapping: the most recently committed state of
/// every agent visible to a step.
pub type Universe = BTreeMap<AgentId, State>;

/// A single dynamically-typed field value.
///
/// Serialized untagged, so a state round-trips through JSON as
/// `{"mass": 1.0, "position": {"x": .., "y": .., "z": ..}}`. Decoding tries
/// the variants in declaration order; an object with exactly `x`, `y`, `z`
/// becomes a [`Value::Vector`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export, export_to = "bindings/")]
pub enum Value {
    /// A scalar (mass, time, time step).
    Number(f64),
    /// A position, velocity, or other 3D quantity.
    Vector(Vector3),
    /// An ordered sequence, produced by resolving a tuple query.
    List(Vec<Value>),
    /// A nested mapping, e.g. another agent's whole state.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Return the scalar if this is a [`Value::Number`].
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Return the vector if this is a [`Value::Vector`].
    pub const fn as_vector(&self) -> Option<Vector3> {
        match self {
            Self::Vector(v) => Some(*v),
            _ => None,
        }
    }

    /// Short name of the variant, used in type-mismatch diagnostics.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Vector(_) => "Vector3",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<Vector3> for Value {
    fn from(v: Vector3) -> Self {
        Self::Vector(v)
    }
}

impl From<State> for Value {
    fn from(m: State) -> Self {
        Self::Map(m)
    }
}

impl From<Vec<Self>> for Value {
    fn from(items: Vec<Self>) -> Self {
        Self::List(items)
    }
}
