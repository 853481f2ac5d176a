use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use svcheck_compare::{CaseSummary, ReportSink};
use tracing::{info, warn};

use crate::backend::{LoadFlowRunner, NetworkImporter};
use crate::case::discover_cases;
use crate::config::BatchConfig;
use crate::manifest::{write_batch_manifest, BatchManifest, MANIFEST_FILE};
use crate::pipeline::run_case;

/// Counts and summaries returned after a run, plus the manifest location.
#[derive(Debug)]
pub struct BatchSummary {
    pub success: usize,
    pub failure: usize,
    pub manifest_path: PathBuf,
    pub cases: Vec<CaseSummary>,
}

/// Process every case of `dataset` in folder-name order.
///
/// Case failures land in the case summary and never stop the batch; only
/// dataset listing, sink and manifest errors are returned.
pub fn run_batch<I, L, S>(
    dataset: &Path,
    config: &BatchConfig,
    importer: &I,
    solver: &L,
    sink: &mut S,
) -> Result<BatchSummary>
where
    I: NetworkImporter,
    L: LoadFlowRunner<I::Network>,
    S: ReportSink + ?Sized,
{
    let hour = config
        .exploited_hour
        .as_deref()
        .context("an exploited hour is required to select case archives")?;
    let cases = discover_cases(dataset, hour)?;
    info!("{} case(s) found in '{}'", cases.len(), dataset.display());

    let mut summaries = Vec::with_capacity(cases.len());
    for case in &cases {
        let report = run_case(case, importer, solver, config);
        if let Some(error) = &report.summary.error {
            warn!("case '{}': {error}", case.name);
        }
        sink.write_case(&report)
            .with_context(|| format!("reporting case '{}'", case.name))?;
        summaries.push(report.summary);
    }
    sink.write_summary(&summaries)
        .context("writing batch summary")?;

    let manifest = BatchManifest::new(dataset, config, summaries);
    let manifest_path = config.result_dir().join(MANIFEST_FILE);
    write_batch_manifest(&manifest_path, &manifest)?;
    info!(
        "batch finished: {} ok, {} failed",
        manifest.success, manifest.failure
    );
    Ok(BatchSummary {
        success: manifest.success,
        failure: manifest.failure,
        manifest_path,
        cases: manifest.cases,
    })
}
