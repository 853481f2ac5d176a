//! # svcheck-core: shared types for state-variable validation
//!
//! A network model conversion is checked by comparing per-node voltage
//! magnitude and angle across five stages of the same case:
//!
//! | Stage | Source |
//! |-------|--------|
//! | `baseline` | the case's own state-variables (SV) file |
//! | `importSSH` | network re-imported with SSH initial values |
//! | `loadflowSSH` | load flow solved on the SSH import |
//! | `importSV` | network re-imported with SV initial values |
//! | `loadflowSV` | load flow solved on the SV import |
//!
//! This crate holds the vocabulary every other crate shares:
//!
//! - [`NodeId`] - topological node identifier, the join key across stages
//! - [`StateSample`] - a (v, angle) pair, always complete
//! - [`StageSamples`] - one stage's samples in source order
//! - [`NodeMetadata`] - static identification of a node in the baseline
//! - [`Stage`], [`InitialStateProfile`], [`PerStage`] - stage bookkeeping
//! - [`topology`] - baseline topology mapping and network state handed over
//!   by the import collaborator
//! - [`SvError`] / [`SvResult`] and [`Diagnostics`]
//!
//! A sample is either present with both fields or absent. There is no way to
//! build a [`StateSample`] carrying only one of the pair.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

pub mod diagnostics;
pub mod error;
pub mod stage;
pub mod topology;

pub use diagnostics::{DiagnosticIssue, Diagnostics, Severity};
pub use error::{SvError, SvResult};
pub use stage::{InitialStateProfile, PerStage, Stage};
pub use topology::{
    BaselineTopology, ConnectableBus, ModelHeader, NodeState, TerminalRef, TopologicalNode,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(value: impl Into<String>) -> Self {
        NodeId(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        NodeId(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        NodeId(value)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Voltage magnitude (kV) and angle (degrees) of one node in one stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateSample {
    pub v: f64,
    pub angle: f64,
}

impl StateSample {
    pub fn new(v: f64, angle: f64) -> Self {
        Self { v, angle }
    }

    /// Build a sample only when both fields are real numbers.
    pub fn from_fields(v: f64, angle: f64) -> Option<Self> {
        if v.is_nan() || angle.is_nan() {
            None
        } else {
            Some(Self { v, angle })
        }
    }
}

/// Samples of a single stage, in the order the snapshot listed them.
///
/// Order matters: the angle reference of a load-flow stage is the first
/// node listed with an angle of exactly zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageSamples {
    entries: Vec<(NodeId, StateSample)>,
}

impl StageSamples {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: NodeId, sample: StateSample) {
        self.entries.push((node, sample));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &StateSample)> {
        self.entries.iter().map(|(node, sample)| (node, sample))
    }

    /// Last sample recorded for `node`, matching merge semantics where a
    /// later record overwrites an earlier one.
    pub fn get(&self, node: &str) -> Option<&StateSample> {
        self.entries
            .iter()
            .rev()
            .find(|(id, _)| id.as_str() == node)
            .map(|(_, sample)| sample)
    }
}

impl FromIterator<(NodeId, StateSample)> for StageSamples {
    fn from_iter<I: IntoIterator<Item = (NodeId, StateSample)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<NodeState>> for StageSamples {
    fn from(states: Vec<NodeState>) -> Self {
        states
            .into_iter()
            .filter_map(|state| {
                StateSample::from_fields(state.v, state.angle).map(|sample| (state.node, sample))
            })
            .collect()
    }
}

/// Static identification of a topological node, taken from the baseline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMetadata {
    pub voltage_level_id: String,
    pub bus_id: String,
    pub equipment_id: String,
    pub connected_component: u32,
}
