//! The structured query tree.
//!
//! Queries describe where a state manager reads its inputs from and where
//! its output is written. They are produced from query text by the query
//! compiler and interpreted by the evaluation engine. The serialized form is
//! adjacently tagged:
//!
//! ```json
//! {"kind": "Access", "content": {"base": {"kind": "Agent", "content": "Body2"}, "field": "mass"}}
//! ```

use core::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::AgentId;

/// A compiled query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", content = "content")]
#[ts(export, export_to = "bindings/")]
pub enum Query {
    /// Look up a field in the agent's state mapping.
    Base(String),
    /// Evaluate the inner query against the previous snapshot.
    Prev(Box<Query>),
    /// The whole state mapping itself.
    Root,
    /// Another agent's most recently committed state.
    Agent(AgentId),
    /// Evaluate `base`, then look up `field` on the resulting mapping.
    Access {
        /// The query producing the mapping.
        base: Box<Query>,
        /// The field to read from it.
        field: String,
    },
    /// Several queries evaluated in order.
    Tuple(Vec<Query>),
}

impl Query {
    /// `field`
    pub fn base(field: impl Into<String>) -> Self {
        Self::Base(field.into())
    }

    /// `prev!(inner)`
    pub fn prev(inner: Self) -> Self {
        Self::Prev(Box::new(inner))
    }

    /// `agent!(id)`
    pub fn agent(id: impl Into<AgentId>) -> Self {
        Self::Agent(id.into())
    }

    /// `base.field`
    pub fn access(base: Self, field: impl Into<String>) -> Self {
        Self::Access {
            base: Box::new(base),
            field: field.into(),
        }
    }

    /// `(a, b, ...)`
    pub const fn tuple(items: Vec<Self>) -> Self {
        Self::Tuple(items)
    }

    /// The queries whose values become a state manager's arguments.
    ///
    /// A tuple contributes one argument per item; any other query is a
    /// single argument.
    pub fn arguments(&self) -> &[Self] {
        match self {
            Self::Tuple(items) => items,
            other => core::slice::from_ref(other),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base(field) => f.write_str(field),
            Self::Prev(inner) => write!(f, "prev!({inner})"),
            Self::Root => f.write_str("root!"),
            Self::Agent(id) => write!(f, "agent!({id})"),
            Self::Access { base, field } => write!(f, "{base}.{field}"),
            Self::Tuple(items) => {
                f.write_str("(")?;
                for item in items {
                    write!(f, "{item}, ")?;
                }
                f.write_str(")")
            }
        }
    }
}
