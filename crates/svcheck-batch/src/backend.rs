//! Seams to the network import and load-flow engines.
//!
//! The engines themselves live outside this workspace; the pipeline only
//! needs to import a case package with a chosen initial-state profile, solve
//! it in place and read the resulting node states back.

use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use svcheck_core::{BaselineTopology, InitialStateProfile, ModelHeader, NodeState};

/// Imported (and possibly solved) network as seen by the pipeline.
pub trait GridState {
    /// Node to terminal to bus mapping of the bus-breaker view.
    fn topology(&self) -> BaselineTopology;

    /// Current v/angle of every topological node with a connectable bus.
    fn node_states(&self) -> Vec<NodeState>;

    /// Topology kind of the first voltage level, if any.
    fn topology_kind(&self) -> Option<String>;

    fn model_header(&self) -> ModelHeader;
}

pub trait NetworkImporter {
    type Network: GridState;

    fn import(&self, case: &Path, profile: InitialStateProfile) -> Result<Self::Network>;
}

pub trait LoadFlowRunner<N: GridState> {
    fn run(&self, network: &mut N) -> Result<LoadFlowOutcome>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadFlowOutcome {
    pub ok: bool,
    /// Solver status label, e.g. `CONVERGED`
    pub status: String,
}

impl LoadFlowOutcome {
    pub fn converged(status: impl Into<String>) -> Self {
        Self {
            ok: true,
            status: status.into(),
        }
    }
}
