//! `batch_manifest.json`: what a batch run validated and with which settings.
//!
//! The manifest lands next to the summary table so a result directory can be
//! traced back to its dataset, the exploited hour that picked the archives
//! and the working directory the snapshots were written to.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use svcheck_compare::CaseSummary;

use crate::config::BatchConfig;

pub const MANIFEST_FILE: &str = "batch_manifest.json";

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchManifest {
    pub created_at: DateTime<Utc>,
    pub dataset: PathBuf,
    pub exploited_hour: Option<String>,
    pub working_dir: PathBuf,
    /// Kept on disk only when `keep_working_dir` was set
    pub working_dir_kept: bool,
    pub snapshot_version: String,
    pub num_cases: usize,
    pub success: usize,
    pub failure: usize,
    /// Names of the cases with an error, in run order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_cases: Vec<String>,
    pub cases: Vec<CaseSummary>,
}

impl BatchManifest {
    pub fn new(dataset: &Path, config: &BatchConfig, cases: Vec<CaseSummary>) -> Self {
        let failed_cases: Vec<String> = cases
            .iter()
            .filter(|summary| !summary.is_ok())
            .map(|summary| summary.case_file.clone())
            .collect();
        Self {
            created_at: Utc::now(),
            dataset: dataset.to_path_buf(),
            exploited_hour: config.exploited_hour.clone(),
            working_dir: config.working_dir.clone(),
            working_dir_kept: config.keep_working_dir,
            snapshot_version: config.snapshot_version.clone(),
            num_cases: cases.len(),
            success: cases.len() - failed_cases.len(),
            failure: failed_cases.len(),
            failed_cases,
            cases,
        }
    }
}

pub fn write_batch_manifest(path: &Path, manifest: &BatchManifest) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating result directory '{}'", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(manifest).context("serializing batch manifest")?;
    fs::write(path, json).with_context(|| format!("writing '{}'", path.display()))?;
    Ok(())
}

pub fn load_batch_manifest(path: &Path) -> Result<BatchManifest> {
    let file = File::open(path).with_context(|| format!("opening '{}'", path.display()))?;
    serde_json::from_reader(file)
        .with_context(|| format!("parsing batch manifest '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn manifest_records_run_settings_and_failures() {
        let mut failed = CaseSummary::new("20200115_1030_FO3_ELIA", "ELIA");
        failed.error = Some("error during cgmes import SV".into());
        let config = BatchConfig {
            exploited_hour: Some("1030".into()),
            ..BatchConfig::default()
        };
        let manifest = BatchManifest::new(
            Path::new("dataset"),
            &config,
            vec![CaseSummary::new("20200115_1030_FO3_RTE", "RTE"), failed],
        );
        assert_eq!((manifest.success, manifest.failure), (1, 1));
        assert_eq!(manifest.failed_cases, vec!["20200115_1030_FO3_ELIA"]);

        let tmp = NamedTempFile::new().unwrap();
        write_batch_manifest(tmp.path(), &manifest).unwrap();
        let parsed = load_batch_manifest(tmp.path()).unwrap();
        assert_eq!(parsed.num_cases, 2);
        assert_eq!(parsed.exploited_hour.as_deref(), Some("1030"));
        assert_eq!(parsed.working_dir, Path::new("workingDir"));
        assert_eq!(parsed.snapshot_version, "002");
        assert!(!parsed.working_dir_kept);
        assert_eq!(parsed.cases[1].import_status(), "error during cgmes import SV");
    }

    #[test]
    fn clean_batch_omits_failed_list() {
        let manifest = BatchManifest::new(
            Path::new("dataset"),
            &BatchConfig::default(),
            vec![CaseSummary::new("case", "RTE")],
        );
        let json = serde_json::to_value(&manifest).unwrap();
        assert!(json.get("failed_cases").is_none());
        assert_eq!(json["exploited_hour"], serde_json::Value::Null);
    }
}
