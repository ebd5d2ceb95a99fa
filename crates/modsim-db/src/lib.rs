//! Persistence for the modsim agent simulator.
//!
//! Profiles and finished simulations are stored as opaque JSON text. Two
//! backends share the same semantics:
//!
//! ```text
//! Storage
//!     |
//!     +-- Postgres(PostgresPool) --> profiles / simulations tables
//!     |       |-- ProfileStore
//!     |       +-- SimulationStore
//!     |
//!     +-- Memory(MemoryStore) -----> in-process maps
//! ```
//!
//! # Modules
//!
//! - [`postgres`] -- `PostgreSQL` connection pool and migrations
//! - [`profile_store`] -- Profile upsert, load, and listing
//! - [`simulation_store`] -- Simulation insert and listing
//! - [`memory`] -- In-memory backend used without a database and in tests
//! - [`storage`] -- Backend selection
//! - [`error`] -- Shared error types

pub mod error;
pub mod memory;
pub mod postgres;
pub mod profile_store;
pub mod simulation_store;
pub mod storage;

pub use error::DbError;
pub use memory::MemoryStore;
pub use postgres::PostgresPool;
pub use profile_store::{ProfileRecord, ProfileStore};
pub use simulation_store::{SimulationRecord, SimulationStore};
pub use storage::Storage;
