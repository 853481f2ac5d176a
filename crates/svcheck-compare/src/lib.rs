//! # svcheck-compare: cross-stage state reconciliation
//!
//! Joins the five per-stage snapshots of a case on topological node id,
//! corrects load-flow angles for the moved slack reference and produces one
//! [`DetailRow`] per node plus a [`CaseSummary`].
//!
//! ```
//! use svcheck_compare::{reconcile, ComparisonReport, CaseSummary, TopologyIndex};
//! use svcheck_core::{NodeId, PerStage, Stage, StageSamples, StateSample};
//!
//! let mut stages: PerStage<StageSamples> = PerStage::default();
//! stages[Stage::Baseline].push(NodeId::from("N1"), StateSample::new(100.0, 0.0));
//! stages[Stage::LoadFlowSsh].push(NodeId::from("N1"), StateSample::new(99.0, 2.0));
//!
//! let reconciliation = reconcile(&TopologyIndex::default(), &stages);
//! let report = ComparisonReport::new(CaseSummary::new("case", "provider"), reconciliation);
//! assert_eq!(report.rows()[0].diff_v_lf_ssh, Some(1.0));
//! ```

pub mod reconcile;
pub mod report;
pub mod sink;
pub mod topology;

pub use reconcile::{
    node_diffs, reconcile, AngleReferenceCorrection, NodeDiffs, NodeRecord, Reconciliation,
};
pub use report::{CaseSummary, ComparisonReport, DetailRow, SummaryRow, DETAIL_COLUMNS};
pub use sink::{MemorySink, ReportSink};
pub use topology::TopologyIndex;
