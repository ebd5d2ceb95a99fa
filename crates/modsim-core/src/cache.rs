//! Process-wide cache of compiled simulation graphs, keyed by profile.
//!
//! Created once at startup and shared by handle. Installing a graph for a
//! profile replaces the previous one atomically under the write lock; a run
//! that already fetched its [`Arc`] keeps using the graph it started with.
//! There is no expiry.

use std::collections::BTreeMap;
use std::sync::Arc;

use modsim_types::ProfileId;
use tokio::sync::RwLock;
use tracing::info;

use crate::graph::SimulationGraph;

/// Shared map from profile to its compiled graph.
#[derive(Debug, Default)]
pub struct GraphCache {
    graphs: RwLock<BTreeMap<ProfileId, Arc<SimulationGraph>>>,
}

impl GraphCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `graph` for `profile`, returning the graph it replaced.
    pub async fn install(
        &self,
        profile: ProfileId,
        graph: SimulationGraph,
    ) -> Option<Arc<SimulationGraph>> {
        let mut graphs = self.graphs.write().await;
        let previous = graphs.insert(profile.clone(), Arc::new(graph));
        info!(%profile, replaced = previous.is_some(), "Simulation graph installed");
        previous
    }

    /// The graph currently installed for `profile`.
    pub async fn get(&self, profile: &ProfileId) -> Option<Arc<SimulationGraph>> {
        self.graphs.read().await.get(profile).cloned()
    }

    /// Number of installed graphs.
    pub async fn len(&self) -> usize {
        self.graphs.read().await.len()
    }

    /// Whether no graph is installed.
    pub async fn is_empty(&self) -> bool {
        self.graphs.read().await.is_empty()
    }
}
