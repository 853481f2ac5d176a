//! Dataset layout: one folder per case, one zip package per exploited hour.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseFolder {
    pub name: String,
    pub path: PathBuf,
    pub provider: String,
    /// Selected package, `None` when no file matches the hour
    pub archive: Option<PathBuf>,
}

/// Provider label encoded in a case folder name.
///
/// Names look like `<date>_<hour>_<process>_<TSO>[_<region>]_<version>...`;
/// the optional region part is kept when it is not a pure number.
pub fn derive_provider(folder: &str) -> String {
    let parts: Vec<&str> = folder.split('_').collect();
    if parts.len() < 4 {
        return folder.to_string();
    }
    if parts.len() <= 5 || parts[5].chars().all(|c| c.is_ascii_digit()) {
        parts[3].to_string()
    } else {
        format!("{}_{}", parts[3], parts[4])
    }
}

/// Last package in `dir` (sorted by name) whose name contains `.zip` and `_<hour>_`.
pub fn select_archive(dir: &Path, hour: &str) -> Result<Option<PathBuf>> {
    let token = format!("_{hour}_");
    let mut names = Vec::new();
    let entries =
        fs::read_dir(dir).with_context(|| format!("reading case folder '{}'", dir.display()))?;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.contains(".zip") && name.contains(&token) && entry.path().is_file() {
            names.push(name);
        }
    }
    names.sort();
    Ok(names.pop().map(|name| dir.join(name)))
}

pub fn discover_cases(dataset: &Path, hour: &str) -> Result<Vec<CaseFolder>> {
    let mut cases = Vec::new();
    for entry in
        fs::read_dir(dataset).with_context(|| format!("reading dataset '{}'", dataset.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let archive = select_archive(&path, hour)?;
        debug!("case '{name}': archive {:?}", archive);
        cases.push(CaseFolder {
            provider: derive_provider(&name),
            name,
            path,
            archive,
        });
    }
    cases.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(cases)
}
