//! The five processing stages of one case and per-stage storage.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

/// Processing stages in their fixed execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    /// The case's own state variables, untouched.
    Baseline,
    /// After re-import with SSH as initial-state profile.
    ImportSsh,
    /// After load flow on the SSH import.
    LoadFlowSsh,
    /// After re-import with SV as initial-state profile.
    ImportSv,
    /// After load flow on the SV import.
    LoadFlowSv,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Baseline,
        Stage::ImportSsh,
        Stage::LoadFlowSsh,
        Stage::ImportSv,
        Stage::LoadFlowSv,
    ];

    /// Stages compared against the baseline, in report column order.
    pub const COMPARED: [Stage; 4] = [
        Stage::ImportSsh,
        Stage::LoadFlowSsh,
        Stage::ImportSv,
        Stage::LoadFlowSv,
    ];

    pub const LOAD_FLOW: [Stage; 2] = [Stage::LoadFlowSsh, Stage::LoadFlowSv];

    pub fn index(self) -> usize {
        match self {
            Stage::Baseline => 0,
            Stage::ImportSsh => 1,
            Stage::LoadFlowSsh => 2,
            Stage::ImportSv => 3,
            Stage::LoadFlowSv => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Baseline => "baseline",
            Stage::ImportSsh => "importSSH",
            Stage::LoadFlowSsh => "loadflowSSH",
            Stage::ImportSv => "importSV",
            Stage::LoadFlowSv => "loadflowSV",
        }
    }

    /// Working-directory folder holding this stage's snapshot.
    pub fn snapshot_dir(self) -> &'static str {
        match self {
            Stage::Baseline => "datafiles",
            Stage::ImportSsh => "postImport_SSH",
            Stage::LoadFlowSsh => "postLF_SSH",
            Stage::ImportSv => "postImport_SV",
            Stage::LoadFlowSv => "postLF_SV",
        }
    }

    /// Import stage a load-flow stage was solved from.
    pub fn import_stage(self) -> Option<Stage> {
        match self {
            Stage::LoadFlowSsh => Some(Stage::ImportSsh),
            Stage::LoadFlowSv => Some(Stage::ImportSv),
            _ => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown stage '{s}'"))
    }
}

/// Profile used for initial state values when re-importing a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InitialStateProfile {
    Ssh,
    Sv,
}

impl InitialStateProfile {
    pub fn as_str(self) -> &'static str {
        match self {
            InitialStateProfile::Ssh => "SSH",
            InitialStateProfile::Sv => "SV",
        }
    }

    pub fn import_stage(self) -> Stage {
        match self {
            InitialStateProfile::Ssh => Stage::ImportSsh,
            InitialStateProfile::Sv => Stage::ImportSv,
        }
    }

    pub fn load_flow_stage(self) -> Stage {
        match self {
            InitialStateProfile::Ssh => Stage::LoadFlowSsh,
            InitialStateProfile::Sv => Stage::LoadFlowSv,
        }
    }
}

impl fmt::Display for InitialStateProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed five-slot storage indexed by [`Stage`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerStage<T>([T; 5]);

impl<T> PerStage<T> {
    pub fn from_fn(mut f: impl FnMut(Stage) -> T) -> Self {
        PerStage(Stage::ALL.map(&mut f))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stage, &T)> {
        Stage::ALL.into_iter().zip(self.0.iter())
    }

    pub fn as_array(&self) -> &[T; 5] {
        &self.0
    }
}

impl<T> Index<Stage> for PerStage<T> {
    type Output = T;

    fn index(&self, stage: Stage) -> &T {
        &self.0[stage.index()]
    }
}

impl<T> IndexMut<Stage> for PerStage<T> {
    fn index_mut(&mut self, stage: Stage) -> &mut T {
        &mut self.0[stage.index()]
    }
}
