//! The simulation graph: per-agent state managers and the step evaluator.
//!
//! Dependencies between state managers are not declared up front; they are
//! implied by which queries resolve. [`SimulationGraph::step`] therefore
//! retries pending managers until every one has run or a full pass makes no
//! progress, rather than computing a topological order. The same manager
//! list is reused every step without re-analysis.

use std::collections::BTreeMap;

use modsim_query::{QueryCompiler, QueryError};
use modsim_types::{ActorProfileDto, AgentId, Query, State, Universe, Value};
use tracing::debug;

use crate::functions::{FunctionError, Operation};
use crate::interpreter::{self, InterpretError};

/// Errors raised while building a graph or stepping an agent.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A consumed or produced query failed to compile.
    #[error("agent {agent}, state manager {index}: {source}")]
    Query {
        /// Agent declaring the state manager.
        agent: AgentId,
        /// Position of the state manager in the agent's list.
        index: usize,
        /// The compiler diagnostic.
        source: QueryError,
    },

    /// A state manager references a function the registry does not have.
    #[error("agent {agent}, state manager {index}: unknown function `{name}`")]
    UnknownFunction {
        /// Agent declaring the state manager.
        agent: AgentId,
        /// Position of the state manager in the agent's list.
        index: usize,
        /// The unresolved name.
        name: String,
    },

    /// The consumed query supplies a different number of inputs than the
    /// function takes.
    #[error(
        "agent {agent}, state manager {index}: {function} takes {expected} inputs, query supplies {found}"
    )]
    ArityMismatch {
        /// Agent declaring the state manager.
        agent: AgentId,
        /// Position of the state manager in the agent's list.
        index: usize,
        /// The function.
        function: Operation,
        /// The function's parameter count.
        expected: usize,
        /// The number of consumed queries.
        found: usize,
    },

    /// The profile declares the same agent twice.
    #[error("agent {0} is declared more than once")]
    DuplicateAgent(AgentId),

    /// A step was requested for an agent the graph does not contain.
    #[error("agent {0} is not in the simulation graph")]
    UnknownAgent(AgentId),

    /// A full pass over the pending state managers ran none of them.
    #[error("no progress made while evaluating state managers for agent {agent}; remaining: {remaining:?}")]
    NoProgress {
        /// The agent being stepped.
        agent: AgentId,
        /// Labels of the state managers that could not run.
        remaining: Vec<String>,
    },

    /// A state manager's function failed.
    #[error("agent {agent}, state manager {manager}: {source}")]
    Function {
        /// The agent being stepped.
        agent: AgentId,
        /// Label of the failing state manager.
        manager: String,
        /// The function error.
        source: FunctionError,
    },

    /// A state manager's produced query is not a legal write target.
    #[error("agent {agent}, state manager {manager}: {source}")]
    Produce {
        /// The agent being stepped.
        agent: AgentId,
        /// Label of the failing state manager.
        manager: String,
        /// The interpreter error.
        source: InterpretError,
    },
}

/// A compiled state manager. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateManager {
    index: usize,
    consumed: Query,
    produced: Query,
    operation: Operation,
}

impl StateManager {
    /// Bind an operation to its consumed and produced queries.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::ArityMismatch`] if the consumed query does not
    /// supply exactly one input per function parameter.
    pub fn new(
        agent: &AgentId,
        index: usize,
        consumed: Query,
        produced: Query,
        operation: Operation,
    ) -> Result<Self, GraphError> {
        let found = consumed.arguments().len();
        if found != operation.arity() {
            return Err(GraphError::ArityMismatch {
                agent: agent.clone(),
                index,
                function: operation,
                expected: operation.arity(),
                found,
            });
        }
        Ok(Self {
            index,
            consumed,
            produced,
            operation,
        })
    }

    /// Identifier used in diagnostics, e.g. `3:time_manager`.
    pub fn label(&self) -> String {
        format!("{}:{}", self.index, self.operation)
    }

    /// Try to run this manager against the current views.
    ///
    /// Returns `Ok(false)` without side effects if any input is not ready.
    fn run(
        &self,
        agent: &AgentId,
        universe: &mut Universe,
        new_state: &mut Universe,
    ) -> Result<bool, GraphError> {
        let mut inputs = Vec::with_capacity(self.operation.arity());
        for query in self.consumed.arguments() {
            match interpreter::resolve(agent, query, universe, new_state, false) {
                Some(value) => inputs.push(value),
                None => return Ok(false),
            }
        }

        let output: Value = self
            .operation
            .apply(&inputs)
            .map_err(|source| GraphError::Function {
                agent: agent.clone(),
                manager: self.label(),
                source,
            })?;

        interpreter::produce(agent, &self.produced, universe, new_state, output).map_err(
            |source| GraphError::Produce {
                agent: agent.clone(),
                manager: self.label(),
                source,
            },
        )?;
        Ok(true)
    }
}

/// Ordered state managers for every agent in a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationGraph {
    agents: BTreeMap<AgentId, Vec<StateManager>>,
}

impl SimulationGraph {
    /// Compile every state-manager declaration in `profile`.
    ///
    /// The first failure aborts the build; no partial graph is returned.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError`] on a query compile failure, an unknown function
    /// name, an arity mismatch, or a duplicated agent.
    pub fn build<C>(profile: &ActorProfileDto, compiler: &C) -> Result<Self, GraphError>
    where
        C: QueryCompiler + ?Sized,
    {
        let mut agents = BTreeMap::new();

        for agent in &profile.agents {
            let mut managers = Vec::with_capacity(agent.state_managers.len());
            for (index, dto) in agent.state_managers.iter().enumerate() {
                let compile = |text: &str| {
                    compiler.compile(text).map_err(|source| GraphError::Query {
                        agent: agent.id.clone(),
                        index,
                        source,
                    })
                };
                let consumed = compile(&dto.consumed)?;
                let produced = compile(&dto.produced)?;
                let operation =
                    Operation::from_name(&dto.function).ok_or_else(|| GraphError::UnknownFunction {
                        agent: agent.id.clone(),
                        index,
                        name: dto.function.clone(),
                    })?;
                managers.push(StateManager::new(
                    &agent.id, index, consumed, produced, operation,
                )?);
            }

            if agents.insert(agent.id.clone(), managers).is_some() {
                return Err(GraphError::DuplicateAgent(agent.id.clone()));
            }
        }

        debug!(
            agents = agents.len(),
            state_managers = agents.values().map(Vec::len).sum::<usize>(),
            "Simulation graph built"
        );

        Ok(Self { agents })
    }

    /// Agent identifiers in the graph.
    pub fn agent_ids(&self) -> impl Iterator<Item = &AgentId> {
        self.agents.keys()
    }

    /// The state managers of one agent.
    pub fn managers(&self, agent: &AgentId) -> Option<&[StateManager]> {
        self.agents.get(agent).map(Vec::as_slice)
    }

    /// Run every state manager of `agent` exactly once.
    ///
    /// Managers whose inputs are not yet resolvable are retried on the next
    /// pass. Writes targeting other agents land in `universe`; the returned
    /// state holds only what was produced for `agent`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownAgent`] for an agent not in the graph,
    /// [`GraphError::NoProgress`] when a full pass runs no manager, and the
    /// function or produce error of the first failing manager.
    pub fn step(&self, agent: &AgentId, universe: &mut Universe) -> Result<State, GraphError> {
        let managers = self
            .agents
            .get(agent)
            .ok_or_else(|| GraphError::UnknownAgent(agent.clone()))?;

        let mut new_state = Universe::new();
        let mut pending: Vec<&StateManager> = managers.iter().collect();
        let mut passes: usize = 0;

        while !pending.is_empty() {
            passes = passes.saturating_add(1);
            let mut blocked = Vec::with_capacity(pending.len());
            for manager in &pending {
                if !manager.run(agent, universe, &mut new_state)? {
                    blocked.push(*manager);
                }
            }

            if blocked.len() == pending.len() {
                return Err(GraphError::NoProgress {
                    agent: agent.clone(),
                    remaining: blocked.iter().map(|m| m.label()).collect(),
                });
            }
            pending = blocked;
        }

        debug!(%agent, passes, managers = managers.len(), "Agent stepped");
        Ok(new_state.remove(agent).unwrap_or_default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use modsim_query::TextQueryCompiler;
    use modsim_types::{AgentDto, StateManagerDto, Vector3};

    use super::*;

    fn sm(consumed: &str, produced: &str, function: &str) -> StateManagerDto {
        StateManagerDto {
            consumed: consumed.to_owned(),
            produced: produced.to_owned(),
            function: function.to_owned(),
        }
    }

    fn profile(managers: Vec<StateManagerDto>) -> ActorProfileDto {
        ActorProfileDto {
            agents: vec![AgentDto {
                id: AgentId::from("A"),
                state_managers: managers,
            }],
        }
    }

    fn universe() -> Universe {
        let mut a = State::new();
        a.insert("time".to_owned(), Value::Number(0.0));
        a.insert("mass".to_owned(), Value::Number(1.0));
        a.insert("velocity".to_owned(), Value::Vector(Vector3::ZERO));
        Universe::from([(AgentId::from("A"), a)])
    }

    #[test]
    fn runs_managers_in_dependency_order() {
        // Declared consumer-first: time needs this step's timeStep.
        let graph = SimulationGraph::build(
            &profile(vec![
                sm("(prev!(time), timeStep)", "time", "time_manager"),
                sm("(velocity,)", "timeStep", "timestep_manager"),
                sm("(prev!(velocity),)", "velocity", "identity"),
            ]),
            &TextQueryCompiler::new(),
        )
        .unwrap();

        let state = graph.step(&AgentId::from("A"), &mut universe()).unwrap();
        assert_eq!(state.get("time"), Some(&Value::Number(100.0)));
        assert_eq!(state.get("timeStep"), Some(&Value::Number(100.0)));
        assert_eq!(state.get("velocity"), Some(&Value::Vector(Vector3::ZERO)));
        assert_eq!(state.len(), 3);
    }

    #[test]
    fn circular_dependency_fails_with_remaining_managers() {
        let graph = SimulationGraph::build(
            &profile(vec![
                sm("(b,)", "a", "propagate_mass"),
                sm("(a,)", "b", "propagate_mass"),
                sm("(prev!(mass),)", "mass", "propagate_mass"),
            ]),
            &TextQueryCompiler::new(),
        )
        .unwrap();

        let err = graph.step(&AgentId::from("A"), &mut universe()).unwrap_err();
        assert!(matches!(
            &err,
            GraphError::NoProgress { agent, remaining }
                if agent.as_str() == "A"
                    && remaining == &["0:propagate_mass".to_owned(), "1:propagate_mass".to_owned()]
        ));
    }

    #[test]
    fn unknown_agent_is_an_error() {
        let graph = SimulationGraph::build(&profile(Vec::new()), &TextQueryCompiler::new()).unwrap();
        assert!(matches!(
            graph.step(&AgentId::from("Z"), &mut universe()),
            Err(GraphError::UnknownAgent(id)) if id.as_str() == "Z"
        ));
    }

    #[test]
    fn agent_with_no_managers_steps_to_empty_state() {
        let graph = SimulationGraph::build(&profile(Vec::new()), &TextQueryCompiler::new()).unwrap();
        let state = graph.step(&AgentId::from("A"), &mut universe()).unwrap();
        assert!(state.is_empty());
    }

    #[test]
    fn build_rejects_unknown_function() {
        let err = SimulationGraph::build(
            &profile(vec![sm("(prev!(mass),)", "mass", "propagate_spin")]),
            &TextQueryCompiler::new(),
        )
        .unwrap_err();
        assert!(matches!(err, GraphError::UnknownFunction { index: 0, .. }));
    }

    #[test]
    fn build_rejects_malformed_query() {
        let err = SimulationGraph::build(
            &profile(vec![
                sm("(prev!(mass),)", "mass", "propagate_mass"),
                sm("(prev!(time", "time", "identity"),
            ]),
            &TextQueryCompiler::new(),
        )
        .unwrap_err();
        assert!(matches!(err, GraphError::Query { index: 1, .. }));
    }

    #[test]
    fn build_rejects_arity_mismatch() {
        let err = SimulationGraph::build(
            &profile(vec![sm("(prev!(time),)", "time", "time_manager")]),
            &TextQueryCompiler::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            GraphError::ArityMismatch { expected: 2, found: 1, .. }
        ));
    }

    #[test]
    fn single_query_counts_as_one_input() {
        let graph = SimulationGraph::build(
            &profile(vec![sm("prev!(mass)", "mass", "propagate_mass")]),
            &TextQueryCompiler::new(),
        )
        .unwrap();
        let state = graph.step(&AgentId::from("A"), &mut universe()).unwrap();
        assert_eq!(state.get("mass"), Some(&Value::Number(1.0)));
    }

    #[test]
    fn build_rejects_duplicate_agent() {
        let mut p = profile(Vec::new());
        p.agents.push(AgentDto {
            id: AgentId::from("A"),
            state_managers: Vec::new(),
        });
        let err = SimulationGraph::build(&p, &TextQueryCompiler::new()).unwrap_err();
        assert!(matches!(err, GraphError::DuplicateAgent(_)));
    }

    #[test]
    fn tuple_production_target_fails_the_step() {
        let graph = SimulationGraph::build(
            &profile(vec![sm("(prev!(mass),)", "(a, b)", "propagate_mass")]),
            &TextQueryCompiler::new(),
        )
        .unwrap();
        let err = graph.step(&AgentId::from("A"), &mut universe()).unwrap_err();
        assert!(matches!(
            err,
            GraphError::Produce {
                source: InterpretError::TupleTarget { .. },
                ..
            }
        ));
    }
}
