//! Batch validation of a dataset of case packages.
//!
//! [`discover_cases`] lists the case folders, [`run_case`] drives the
//! five-stage pipeline of one case through pluggable [`NetworkImporter`] and
//! [`LoadFlowRunner`] engines, and [`run_batch`] ties both to a
//! [`ReportSink`](svcheck_compare::ReportSink) and writes the batch manifest.

pub mod backend;
pub mod case;
pub mod config;
pub mod manifest;
pub mod pipeline;
pub mod runner;

pub use backend::{GridState, LoadFlowOutcome, LoadFlowRunner, NetworkImporter};
pub use case::{derive_provider, discover_cases, select_archive, CaseFolder};
pub use config::BatchConfig;
pub use manifest::{load_batch_manifest, write_batch_manifest, BatchManifest, MANIFEST_FILE};
pub use pipeline::run_case;
pub use runner::{run_batch, BatchSummary};
