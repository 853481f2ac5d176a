//! Case-scoped snapshot directories.
//!
//! Every case gets its own tree `<working_dir>/<case>/<stage dir>/` so two
//! cases never read each other's snapshots, even when their file names
//! coincide.

use std::{
    fs,
    path::{Path, PathBuf},
};

use svcheck_core::{Stage, SvResult};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    pub fn new(working_dir: impl AsRef<Path>, case: &str) -> Self {
        Self {
            root: working_dir.as_ref().join(sanitize(case)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn stage_dir(&self, stage: Stage) -> PathBuf {
        self.root.join(stage.snapshot_dir())
    }

    pub fn stage_path(&self, stage: Stage, file_name: &str) -> PathBuf {
        self.stage_dir(stage).join(file_name)
    }

    /// Create the stage directory, clearing anything left by a previous run.
    pub fn prepare(&self, stage: Stage) -> SvResult<PathBuf> {
        let dir = self.stage_dir(stage);
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        fs::create_dir_all(&dir)?;
        debug!("prepared {} snapshot directory '{}'", stage, dir.display());
        Ok(dir)
    }

    pub fn cleanup(&self) {
        if !self.root.exists() {
            return;
        }
        if let Err(err) = fs::remove_dir_all(&self.root) {
            warn!("could not remove '{}': {err}", self.root.display());
        }
    }
}

fn sanitize(case: &str) -> String {
    case.chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn stage_paths_are_case_scoped() {
        let a = SnapshotStore::new("work", "case_a");
        let b = SnapshotStore::new("work", "case_b");
        let file = "snapshot.xml";
        assert_ne!(
            a.stage_path(Stage::LoadFlowSv, file),
            b.stage_path(Stage::LoadFlowSv, file)
        );
        assert_eq!(
            a.stage_path(Stage::ImportSsh, file),
            Path::new("work/case_a/postImport_SSH/snapshot.xml")
        );
    }

    #[test]
    fn prepare_clears_stale_files() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path(), "case");
        let stage_dir = store.prepare(Stage::LoadFlowSsh).unwrap();
        fs::write(stage_dir.join("old.xml"), "stale").unwrap();
        store.prepare(Stage::LoadFlowSsh).unwrap();
        assert!(!stage_dir.join("old.xml").exists());
        store.cleanup();
        assert!(!store.root().exists());
    }
}
