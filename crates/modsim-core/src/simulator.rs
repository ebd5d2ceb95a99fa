//! The stepping driver.
//!
//! The [`Simulator`] owns the working state of every agent and the run's
//! [`TemporalStore`]. Each iteration visits every agent in identifier order:
//! it reads the merged universe just before the agent's working time, steps
//! the agent through the [`SimulationGraph`], and appends the result keyed by
//! `[t, new time)`.
//!
//! A working `time` is seeded once and is not refreshed from step output,
//! so repeated iterations re-read the same snapshot and append repeated
//! entries for the same interval.

use std::collections::BTreeMap;
use std::time::Instant;

use modsim_types::{AgentId, AgentStateDto, State, Universe, Value, Vector3};
use tracing::{info, warn};

use crate::graph::{GraphError, SimulationGraph};
use crate::store::TemporalStore;

/// Time step every agent starts with, regardless of the request.
pub const DEFAULT_TIME_STEP: f64 = 0.01;

/// Offset subtracted from an agent's time before reading the store, so the
/// read lands inside the preceding interval rather than on its boundary.
pub const READ_OFFSET: f64 = 0.001;

/// Start of the bootstrap interval holding the initial conditions.
pub const BOOTSTRAP_START: f64 = -999_999_999.0;

/// Errors that abort a run.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// Stepping an agent failed.
    #[error("step failed: {source}")]
    Step {
        /// The underlying graph error.
        #[from]
        source: GraphError,
    },

    /// A step completed without producing a numeric `time`.
    #[error("agent {agent} produced no numeric `time`; cannot key the store entry")]
    MissingTime {
        /// The agent that was stepped.
        agent: AgentId,
    },
}

/// Per-agent state held by the driver between iterations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkingState {
    /// Position.
    pub position: Vector3,
    /// Velocity.
    pub velocity: Vector3,
    /// Mass.
    pub mass: f64,
    /// Simulation time the agent is at.
    pub time: f64,
    /// Length of the agent's time step.
    pub time_step: f64,
}

impl WorkingState {
    /// Seed from a request payload at time zero with the default step.
    pub const fn from_dto(dto: &AgentStateDto) -> Self {
        Self {
            position: dto.position,
            velocity: dto.velocity,
            mass: dto.mass,
            time: 0.0,
            time_step: DEFAULT_TIME_STEP,
        }
    }

    /// The state mapping queries see for this agent.
    pub fn to_state(&self) -> State {
        State::from([
            ("position".to_owned(), Value::Vector(self.position)),
            ("velocity".to_owned(), Value::Vector(self.velocity)),
            ("mass".to_owned(), Value::Number(self.mass)),
            ("time".to_owned(), Value::Number(self.time)),
            ("timeStep".to_owned(), Value::Number(self.time_step)),
        ])
    }
}

/// Counters describing a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Iterations executed.
    pub iterations: usize,
    /// Agent steps that produced a store entry.
    pub steps: usize,
    /// Agent visits skipped because the universe was incomplete.
    pub skipped: usize,
}

/// Drives a [`SimulationGraph`] and records its output.
#[derive(Debug)]
pub struct Simulator<'g> {
    graph: &'g SimulationGraph,
    store: TemporalStore,
    states: BTreeMap<AgentId, WorkingState>,
}

impl<'g> Simulator<'g> {
    /// Create a simulator for the given initial conditions.
    ///
    /// Writes a bootstrap entry over `[BOOTSTRAP_START, 0)` holding every
    /// agent's seeded state, so any read at or below time zero resolves to
    /// the initial conditions.
    pub fn new(graph: &'g SimulationGraph, initial_states: &BTreeMap<AgentId, AgentStateDto>) -> Self {
        let states: BTreeMap<AgentId, WorkingState> = initial_states
            .iter()
            .map(|(id, dto)| (id.clone(), WorkingState::from_dto(dto)))
            .collect();

        let bootstrap: Universe = states
            .iter()
            .map(|(id, state)| (id.clone(), state.to_state()))
            .collect();

        let mut store = TemporalStore::new();
        store.write(BOOTSTRAP_START, 0.0, bootstrap);

        Self {
            graph,
            store,
            states,
        }
    }

    /// Merged universe just visible at `t`.
    pub fn read(&self, t: f64) -> Universe {
        self.store.read_merged(t)
    }

    /// Working state of every agent.
    pub const fn states(&self) -> &BTreeMap<AgentId, WorkingState> {
        &self.states
    }

    /// The store written so far. Remains intact if a run fails.
    pub const fn store(&self) -> &TemporalStore {
        &self.store
    }

    /// Consume the simulator, returning its store.
    pub fn into_store(self) -> TemporalStore {
        self.store
    }

    /// Run `iterations` rounds over every agent.
    ///
    /// An agent is skipped for a round when the universe read for it does
    /// not hold exactly the agents being simulated.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError`] on the first failing step. Entries
    /// committed before the failure stay in the store; the failing step
    /// writes nothing.
    pub fn simulate(&mut self, iterations: usize) -> Result<RunSummary, SimulationError> {
        let started = Instant::now();
        let mut summary = RunSummary::default();

        for iteration in 0..iterations {
            for (agent, state) in &self.states {
                let t = state.time;
                let mut universe = self.store.read_merged(t - READ_OFFSET);

                if !universe.keys().eq(self.states.keys()) {
                    warn!(%agent, iteration, t, "Universe incomplete, skipping agent");
                    summary.skipped = summary.skipped.saturating_add(1);
                    continue;
                }

                let new_state = self.graph.step(agent, &mut universe)?;
                let end = new_state
                    .get("time")
                    .and_then(Value::as_number)
                    .ok_or_else(|| SimulationError::MissingTime {
                        agent: agent.clone(),
                    })?;

                self.store
                    .write(t, end, Universe::from([(agent.clone(), new_state)]));
                summary.steps = summary.steps.saturating_add(1);
            }
            summary.iterations = iteration.saturating_add(1);
        }

        info!(
            iterations = summary.iterations,
            steps = summary.steps,
            skipped = summary.skipped,
            entries = self.store.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "Simulation finished"
        );

        Ok(summary)
    }
}
