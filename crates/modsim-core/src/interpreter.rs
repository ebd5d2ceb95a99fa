//! Read and write evaluation of query trees.
//!
//! A step sees two views of the world:
//!
//! - the **universe**: the last committed state of every agent, and
//! - the **new state**: partial per-agent mappings built up while the
//!   current step runs.
//!
//! [`resolve`] reads from either view depending on `prev!` wrapping.
//! [`produce`] only ever writes into the current step; history cannot be
//! rewritten, so `prev!` and tuple targets are rejected.
//!
//! Vectors read as `{x, y, z}` mappings, so `position.x` resolves to a
//! number.

use modsim_types::{AgentId, Query, State, Universe, Value};

/// Errors raised when a query cannot be used as a production target.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InterpretError {
    /// A `prev!` query was used as a write target.
    #[error("cannot produce into read-only view `{query}`")]
    PrevTarget {
        /// The offending query.
        query: Query,
    },

    /// A tuple was used as a write target.
    #[error("tuple cannot be a production target: `{query}`")]
    TupleTarget {
        /// The offending query.
        query: Query,
    },

    /// A field write went through a value that is not a mapping.
    #[error("cannot write through `{query}`: found {found}, expected map")]
    NotAMapping {
        /// The query that resolved to a non-mapping.
        query: Query,
        /// Kind of the value found there.
        found: &'static str,
    },
}

/// Resolve `query` for `agent`.
///
/// Returns `None` ("not found") when any part of the query has no value
/// yet. With `prev` set, `Base` and `Root` read the committed universe;
/// otherwise they read the in-progress new state. `Agent` always reads the
/// committed universe, so cross-agent reads never observe same-step data.
pub fn resolve(
    agent: &AgentId,
    query: &Query,
    universe: &Universe,
    new_state: &Universe,
    prev: bool,
) -> Option<Value> {
    match query {
        Query::Base(field) => {
            let view = if prev { universe } else { new_state };
            view.get(agent)?.get(field).cloned()
        }
        Query::Prev(inner) => resolve(agent, inner, universe, new_state, true),
        Query::Root => {
            if prev {
                universe.get(agent).cloned().map(Value::Map)
            } else {
                Some(Value::Map(
                    new_state
                        .iter()
                        .map(|(id, state)| (id.to_string(), Value::Map(state.clone())))
                        .collect(),
                ))
            }
        }
        Query::Agent(id) => universe.get(id).cloned().map(Value::Map),
        Query::Access { base, field } => {
            match resolve(agent, base, universe, new_state, prev)? {
                Value::Map(map) => map.get(field).cloned(),
                Value::Vector(v) => v.component(field).map(Value::Number),
                Value::Number(_) | Value::List(_) => None,
            }
        }
        Query::Tuple(items) => items
            .iter()
            .map(|item| resolve(agent, item, universe, new_state, prev))
            .collect::<Option<Vec<_>>>()
            .map(Value::List),
    }
}

/// Write `value` to the location `query` names for `agent`.
///
/// `Base` writes into the agent's in-progress state, creating it if absent.
/// `Root` accepts and discards the value. `Agent` only ensures the target
/// agent has an entry in the universe. `Access` creates intermediate
/// mappings as needed before setting the field; a field of `root!` is a
/// whole agent's in-progress state and must be given a mapping.
///
/// # Errors
///
/// Returns [`InterpretError`] for `prev!` and tuple targets, and for field
/// writes through, or of, a non-mapping where a mapping is required.
pub fn produce(
    agent: &AgentId,
    query: &Query,
    universe: &mut Universe,
    new_state: &mut Universe,
    value: Value,
) -> Result<(), InterpretError> {
    match query {
        Query::Base(field) => {
            new_state
                .entry(agent.clone())
                .or_default()
                .insert(field.clone(), value);
            Ok(())
        }
        Query::Prev(_) => Err(InterpretError::PrevTarget {
            query: query.clone(),
        }),
        Query::Root => Ok(()),
        Query::Agent(id) => {
            universe.entry(id.clone()).or_default();
            Ok(())
        }
        Query::Access { base, field } => {
            match target_mut(agent, base, universe, new_state)? {
                Target::State(state) => {
                    state.insert(field.clone(), value);
                }
                Target::Root(states) => {
                    let found = value.kind();
                    let Value::Map(state) = value else {
                        return Err(InterpretError::NotAMapping {
                            query: query.clone(),
                            found,
                        });
                    };
                    states.insert(AgentId::from(field.as_str()), state);
                }
            }
            Ok(())
        }
        Query::Tuple(_) => Err(InterpretError::TupleTarget {
            query: query.clone(),
        }),
    }
}

/// Where a nested write lands.
enum Target<'a> {
    /// A mapping inside one agent's state, or an agent's state itself.
    State(&'a mut State),
    /// The whole in-progress new state, keyed by agent.
    Root(&'a mut Universe),
}

/// Find (creating if absent) the mapping `query` names, for a nested write.
fn target_mut<'a>(
    agent: &AgentId,
    query: &Query,
    universe: &'a mut Universe,
    new_state: &'a mut Universe,
) -> Result<Target<'a>, InterpretError> {
    match query {
        Query::Base(field) => {
            let slot = new_state
                .entry(agent.clone())
                .or_default()
                .entry(field.clone())
                .or_insert_with(|| Value::Map(State::new()));
            as_target(query, slot).map(Target::State)
        }
        Query::Agent(id) => Ok(Target::State(universe.entry(id.clone()).or_default())),
        Query::Root => Ok(Target::Root(new_state)),
        Query::Access { base, field } => match target_mut(agent, base, universe, new_state)? {
            Target::State(parent) => {
                let slot = parent
                    .entry(field.clone())
                    .or_insert_with(|| Value::Map(State::new()));
                as_target(query, slot).map(Target::State)
            }
            Target::Root(states) => Ok(Target::State(
                states.entry(AgentId::from(field.as_str())).or_default(),
            )),
        },
        Query::Prev(_) => Err(InterpretError::PrevTarget {
            query: query.clone(),
        }),
        Query::Tuple(_) => Err(InterpretError::TupleTarget {
            query: query.clone(),
        }),
    }
}

fn as_target<'a>(query: &Query, slot: &'a mut Value) -> Result<&'a mut State, InterpretError> {
    match slot {
        Value::Map(map) => Ok(map),
        other => Err(InterpretError::NotAMapping {
            query: query.clone(),
            found: other.kind(),
        }),
    }
}
