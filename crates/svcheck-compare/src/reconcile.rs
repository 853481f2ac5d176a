//! Cross-stage reconciliation.
//!
//! The five stage snapshots of a case are joined on [`NodeId`]; each node
//! ends up with one [`NodeRecord`] holding a slot per stage. Load-flow stages
//! get an angle-reference correction before their angles are compared with
//! the baseline, because re-solving moves the slack reference and shifts
//! every angle of that solution by the same offset.
//!
//! ## Correction rule
//!
//! For `loadflowSSH` (resp. `loadflowSV`) the reference bus is the first
//! node, in snapshot order, whose merged load-flow angle is exactly zero.
//! The correction is
//!
//! ```text
//! correction = angle_import(ref) - angle_loadflow(ref)
//! ```
//!
//! with `importSSH` (resp. `importSV`) as the import stage, and a node's
//! corrected angle difference is `|angle_loadflow - angle_baseline - correction|`.
//! Without such a node the correction stays 0 and the differences go
//! uncorrected. When the reference bus has no import angle the correction is
//! missing, and so is every angle difference of that stage.

use std::collections::BTreeMap;

use serde::Serialize;
use svcheck_core::{NodeId, NodeMetadata, PerStage, Stage, StageSamples, StateSample};
use tracing::debug;

use crate::topology::TopologyIndex;

/// Joined state of one topological node across the five stages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeRecord {
    pub metadata: NodeMetadata,
    pub samples: PerStage<Option<StateSample>>,
}

impl NodeRecord {
    pub fn new(metadata: NodeMetadata) -> Self {
        Self {
            metadata,
            samples: PerStage::default(),
        }
    }

    pub fn sample(&self, stage: Stage) -> Option<&StateSample> {
        self.samples[stage].as_ref()
    }

    pub fn voltage(&self, stage: Stage) -> Option<f64> {
        self.sample(stage).map(|s| s.v)
    }

    pub fn angle(&self, stage: Stage) -> Option<f64> {
        self.sample(stage).map(|s| s.angle)
    }
}

/// Angle offsets of the two load-flow stages, fixed once per case.
///
/// An offset is `None` when the reference bus has no angle in the matching
/// import stage; that stage's angle differences are then missing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AngleReferenceCorrection {
    pub loadflow_ssh: Option<f64>,
    pub loadflow_sv: Option<f64>,
    pub reference_ssh: Option<NodeId>,
    pub reference_sv: Option<NodeId>,
}

impl Default for AngleReferenceCorrection {
    fn default() -> Self {
        Self {
            loadflow_ssh: Some(0.0),
            loadflow_sv: Some(0.0),
            reference_ssh: None,
            reference_sv: None,
        }
    }
}

impl AngleReferenceCorrection {
    /// Offset subtracted from `stage` angles; zero for non-load-flow stages.
    pub fn for_stage(&self, stage: Stage) -> Option<f64> {
        match stage {
            Stage::LoadFlowSsh => self.loadflow_ssh,
            Stage::LoadFlowSv => self.loadflow_sv,
            _ => Some(0.0),
        }
    }

    pub fn reference_node(&self, stage: Stage) -> Option<&NodeId> {
        match stage {
            Stage::LoadFlowSsh => self.reference_ssh.as_ref(),
            Stage::LoadFlowSv => self.reference_sv.as_ref(),
            _ => None,
        }
    }

    fn set(&mut self, stage: Stage, value: Option<f64>, reference: NodeId) {
        match stage {
            Stage::LoadFlowSsh => {
                self.loadflow_ssh = value;
                self.reference_ssh = Some(reference);
            }
            Stage::LoadFlowSv => {
                self.loadflow_sv = value;
                self.reference_sv = Some(reference);
            }
            _ => {}
        }
    }
}

/// Absolute differences against the baseline, in [`Stage::COMPARED`] order.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeDiffs {
    pub v: [Option<f64>; 4],
    pub angle: [Option<f64>; 4],
}

impl NodeDiffs {
    pub fn voltage(&self, stage: Stage) -> Option<f64> {
        compared_position(stage).and_then(|i| self.v[i])
    }

    pub fn angle(&self, stage: Stage) -> Option<f64> {
        compared_position(stage).and_then(|i| self.angle[i])
    }
}

fn compared_position(stage: Stage) -> Option<usize> {
    Stage::COMPARED.iter().position(|s| *s == stage)
}

/// Result of reconciling one case: records ordered by node id plus the
/// case-scoped angle correction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    records: BTreeMap<NodeId, NodeRecord>,
    correction: AngleReferenceCorrection,
}

impl Reconciliation {
    pub fn records(&self) -> impl Iterator<Item = (&NodeId, &NodeRecord)> {
        self.records.iter()
    }

    pub fn record(&self, node: &NodeId) -> Option<&NodeRecord> {
        self.records.get(node)
    }

    pub fn correction(&self) -> &AngleReferenceCorrection {
        &self.correction
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn diffs(&self, record: &NodeRecord) -> NodeDiffs {
        node_diffs(record, &self.correction)
    }

    /// Largest voltage difference of `stage` over all nodes, if any exists.
    pub fn max_voltage_diff(&self, stage: Stage) -> Option<f64> {
        self.records
            .values()
            .filter_map(|record| self.diffs(record).voltage(stage))
            .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |m| m.max(d))))
    }
}

/// Join the five stage snapshots of one case.
///
/// Nodes missing from the topology index still get a record, with blank
/// metadata. Missing data never fails: absent samples stay absent and every
/// difference depending on them stays absent.
pub fn reconcile(index: &TopologyIndex, stages: &PerStage<StageSamples>) -> Reconciliation {
    let mut records: BTreeMap<NodeId, NodeRecord> = BTreeMap::new();

    for (stage, samples) in stages.iter() {
        for (node, sample) in samples.iter() {
            let record = records.entry(node.clone()).or_insert_with(|| {
                NodeRecord::new(index.get(node).cloned().unwrap_or_default())
            });
            record.samples[stage] = StateSample::from_fields(sample.v, sample.angle);
        }
        debug!(stage = %stage, nodes = samples.len(), "merged stage samples");
    }

    let mut correction = AngleReferenceCorrection::default();
    for stage in Stage::LOAD_FLOW {
        match reference_bus(stage, &stages[stage], &records) {
            Some((reference, record)) => {
                let value = reference_offset(stage, record);
                debug!(
                    stage = %stage,
                    reference = %reference,
                    correction = ?value,
                    "angle reference selected"
                );
                correction.set(stage, value, reference.clone());
            }
            None => {
                debug!(stage = %stage, "no angle reference bus; differences left uncorrected");
            }
        }
    }

    Reconciliation {
        records,
        correction,
    }
}

/// First node, in snapshot order, whose merged `stage` angle is exactly zero.
fn reference_bus<'a, 'r>(
    stage: Stage,
    samples: &'a StageSamples,
    records: &'r BTreeMap<NodeId, NodeRecord>,
) -> Option<(&'a NodeId, &'r NodeRecord)> {
    samples.iter().find_map(|(node, _)| {
        let record = records.get(node)?;
        (record.angle(stage) == Some(0.0)).then_some((node, record))
    })
}

/// Import-stage angle of the reference bus minus its load-flow angle.
fn reference_offset(stage: Stage, reference: &NodeRecord) -> Option<f64> {
    let import_angle = reference.angle(stage.import_stage()?)?;
    Some(import_angle - reference.angle(stage)?)
}

/// Absolute differences of every compared stage against the baseline.
pub fn node_diffs(record: &NodeRecord, correction: &AngleReferenceCorrection) -> NodeDiffs {
    let baseline = record.sample(Stage::Baseline);
    let mut diffs = NodeDiffs::default();
    for (i, stage) in Stage::COMPARED.into_iter().enumerate() {
        let sample = record.sample(stage);
        diffs.v[i] = abs_diff(sample.map(|s| s.v), baseline.map(|b| b.v), Some(0.0));
        diffs.angle[i] = abs_diff(
            sample.map(|s| s.angle),
            baseline.map(|b| b.angle),
            correction.for_stage(stage),
        );
    }
    diffs
}

fn abs_diff(value: Option<f64>, baseline: Option<f64>, correction: Option<f64>) -> Option<f64> {
    Some((value? - baseline? - correction?).abs())
}
