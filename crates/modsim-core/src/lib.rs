//! Evaluation engine for the modsim agent simulator.
//!
//! Agents evolve by running small pure functions ("state managers") whose
//! inputs and outputs are wired together by queries instead of direct
//! calls. This crate owns everything between a compiled profile and a
//! finished run:
//!
//! ```text
//! Simulator --read(t - eps)--> TemporalStore
//!     |
//!     +-- SimulationGraph::step(agent, universe)
//!     |       +-- interpreter::resolve / interpreter::produce
//!     |       +-- Operation::apply
//!     |
//!     +--write([t, t'), {agent: state})--> TemporalStore
//! ```
//!
//! # Modules
//!
//! - [`interpreter`] -- Read and write evaluation of [`Query`] trees
//! - [`functions`] -- The closed registry of state-manager operations
//! - [`graph`] -- Per-agent state managers and the retry-to-fixpoint step
//! - [`store`] -- Append-only store of half-open time intervals
//! - [`simulator`] -- The stepping driver
//! - [`cache`] -- Process-wide graph cache keyed by profile
//! - [`config`] -- Configuration loading from `modsim-config.yaml`
//! - [`profiles`] -- Bundled example profiles
//!
//! [`Query`]: modsim_types::Query

pub mod cache;
pub mod config;
pub mod functions;
pub mod graph;
pub mod interpreter;
pub mod profiles;
pub mod simulator;
pub mod store;

pub use cache::GraphCache;
pub use functions::{FunctionError, Operation};
pub use graph::{GraphError, SimulationGraph, StateManager};
pub use interpreter::InterpretError;
pub use simulator::{RunSummary, SimulationError, Simulator, WorkingState};
pub use store::{StoreEntry, TemporalStore};
