//! # svcheck-io: snapshot files, archives and report sinks
//!
//! - [`sv_reader`] turns a state-variables snapshot into
//!   [`StageSamples`](svcheck_core::StageSamples)
//! - [`sv_writer`] writes a solved or imported network state back out
//! - [`archive`] pulls the SV entry out of a case package
//! - [`store`] lays out the per-case working directories
//! - [`report`] implements [`ReportSink`](svcheck_compare::ReportSink) over CSV and JSON files

pub mod archive;
pub mod report;
pub mod store;
pub mod sv_reader;
pub mod sv_writer;
pub mod topology_file;

pub use archive::{extract_sv_file, SV_ENTRY_MARKER};
pub use report::{CsvReportSink, JsonReportSink, DEFAULT_SUMMARY_NAME};
pub use store::SnapshotStore;
pub use sv_reader::{load_stage, parse_voltages, StageLoad};
pub use sv_writer::{write_sv_file, write_sv_snapshot, SnapshotOptions};
pub use topology_file::{load_topology, write_topology};
