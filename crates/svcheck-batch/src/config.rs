//! Batch settings, loadable from a TOML file.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Root of the per-case snapshot trees
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,
    /// Directory receiving the reports; the current directory when unset
    #[serde(default)]
    pub result_path: Option<PathBuf>,
    /// Summary file name without extension
    #[serde(default = "default_result_filename")]
    pub result_filename: String,
    /// Hour token selecting the case archive, e.g. `1030`
    #[serde(default)]
    pub exploited_hour: Option<String>,
    /// Keep per-case snapshot trees after reconciliation
    #[serde(default)]
    pub keep_working_dir: bool,
    /// `md:Model.version` written into generated snapshots
    #[serde(default = "default_snapshot_version")]
    pub snapshot_version: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            working_dir: default_working_dir(),
            result_path: None,
            result_filename: default_result_filename(),
            exploited_hour: None,
            keep_working_dir: false,
            snapshot_version: default_snapshot_version(),
        }
    }
}

fn default_working_dir() -> PathBuf {
    PathBuf::from("workingDir")
}

fn default_result_filename() -> String {
    "Results".to_string()
}

fn default_snapshot_version() -> String {
    "002".to_string()
}

impl BatchConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config '{}'", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parsing config '{}'", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn result_dir(&self) -> PathBuf {
        self.result_path.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = BatchConfig::from_toml("").unwrap();
        assert_eq!(config.working_dir, PathBuf::from("workingDir"));
        assert_eq!(config.result_filename, "Results");
        assert_eq!(config.snapshot_version, "002");
        assert!(!config.keep_working_dir);
        assert_eq!(config.result_dir(), PathBuf::from("."));
    }

    #[test]
    fn fields_override_defaults() {
        let config = BatchConfig::from_toml(
            r#"
            working_dir = "/tmp/sv"
            result_path = "reports"
            exploited_hour = "1030"
            keep_working_dir = true
            "#,
        )
        .unwrap();
        assert_eq!(config.working_dir, PathBuf::from("/tmp/sv"));
        assert_eq!(config.exploited_hour.as_deref(), Some("1030"));
        assert_eq!(config.result_dir(), PathBuf::from("reports"));
        assert!(config.keep_working_dir);
    }

    #[test]
    fn unknown_types_are_rejected() {
        assert!(BatchConfig::from_toml("keep_working_dir = \"yes\"").is_err());
    }
}
