//! Shared application state for the API server.

use modsim_core::GraphCache;
use modsim_db::Storage;
use modsim_query::TextQueryCompiler;

/// State shared by every handler behind an `Arc`.
#[derive(Debug)]
pub struct AppState {
    /// Graphs loaded per profile.
    pub graphs: GraphCache,
    /// Profile and simulation persistence.
    pub storage: Storage,
    /// Compiler for state-manager query text.
    pub compiler: TextQueryCompiler,
    /// Iterations per simulation run.
    pub iterations: usize,
    /// Origins allowed by CORS. Empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl AppState {
    /// Create state with an empty graph cache.
    pub fn new(storage: Storage, iterations: usize) -> Self {
        Self {
            graphs: GraphCache::new(),
            storage,
            compiler: TextQueryCompiler::new(),
            iterations,
            cors_origins: Vec::new(),
        }
    }

    /// Restrict CORS to `origins`.
    #[must_use]
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }
}
