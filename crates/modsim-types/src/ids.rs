//! Identifier newtypes.
//!
//! Agents and profiles are named by the user (`Body1`, `two_body`), so their
//! identifiers wrap a [`String`]. Simulation runs are generated server-side
//! and use UUID v7 (time-ordered) for efficient database indexing.

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around a user-supplied [`String`] name.
macro_rules! define_name {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[serde(transparent)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub String);

        impl $name {
            /// Create an identifier from any string-like value.
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self(name.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(name: String) -> Self {
                Self(name)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

define_name! {
    /// Identifier of an agent (a simulated body) within a profile.
    AgentId
}

define_name! {
    /// Identifier of a stored actor profile.
    ProfileId
}

/// Unique identifier for a completed simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct SimulationId(pub Uuid);

impl SimulationId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for SimulationId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for SimulationId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for SimulationId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn agent_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&AgentId::from("Body1")).ok();
        assert_eq!(json.as_deref(), Some("\"Body1\""));
    }

    #[test]
    fn agent_id_works_as_map_key() {
        let mut map = BTreeMap::new();
        map.insert(AgentId::from("Body1"), 1_u32);
        assert_eq!(map.get("Body1"), Some(&1));

        let json = serde_json::to_string(&map).ok();
        assert_eq!(json.as_deref(), Some(r#"{"Body1":1}"#));
    }

    #[test]
    fn simulation_ids_are_distinct() {
        let a = SimulationId::new();
        let b = SimulationId::new();
        assert_ne!(a, b);
        assert_eq!(a.to_string(), a.into_inner().to_string());
    }
}
