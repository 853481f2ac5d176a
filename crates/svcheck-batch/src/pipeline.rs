//! Five-stage processing of one case.
//!
//! Stages run in a fixed order because each load flow solves the network
//! produced by the import before it:
//!
//! 1. extract the case's own SV file (`datafiles`)
//! 2. import with SSH initial state, write `postImport_SSH`
//! 3. import again untouched as the topology source
//! 4. solve, write `postLF_SSH`
//! 5. import with SV initial state, write `postImport_SV`
//! 6. solve, write `postLF_SV`
//!
//! The five snapshots are then loaded back and reconciled. An import failure
//! ends the case without detail rows. A load-flow failure ends the remaining
//! stages but the stages already written are still compared.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use svcheck_compare::{reconcile, CaseSummary, ComparisonReport, TopologyIndex};
use svcheck_core::{
    BaselineTopology, InitialStateProfile, PerStage, Stage, StageSamples, SvError,
};
use svcheck_io::{extract_sv_file, load_stage, write_sv_file, SnapshotOptions, SnapshotStore};
use tracing::{debug, info, warn};

use crate::backend::{GridState, LoadFlowRunner, NetworkImporter};
use crate::case::CaseFolder;
use crate::config::BatchConfig;

/// Why a case stopped before its last stage.
enum Halt {
    /// Nothing to compare: the case produces a summary only
    NoComparison(SvError),
    /// Stages written so far are still compared
    PartialComparison(SvError),
}

struct CaseRun<'a> {
    store: &'a SnapshotStore,
    file_name: String,
    options: SnapshotOptions,
    summary: &'a mut CaseSummary,
}

impl CaseRun<'_> {
    fn write_stage(&self, stage: Stage, network: &impl GridState) -> Result<()> {
        let dir = self.store.prepare(stage)?;
        let path = dir.join(&self.file_name);
        write_sv_file(&path, &network.model_header(), &network.node_states(), &self.options)
            .with_context(|| format!("writing {stage} snapshot '{}'", path.display()))?;
        debug!("wrote {stage} snapshot '{}'", path.display());
        Ok(())
    }
}

pub fn run_case<I, L>(
    case: &CaseFolder,
    importer: &I,
    solver: &L,
    config: &BatchConfig,
) -> ComparisonReport
where
    I: NetworkImporter,
    L: LoadFlowRunner<I::Network>,
{
    let mut summary = CaseSummary::new(&case.name, &case.provider);
    let Some(archive) = case.archive.as_deref() else {
        summary.error = Some(format!("SV file not found for the provider {}", case.provider));
        warn!("case '{}': {}", case.name, summary.import_status());
        return ComparisonReport::failed(summary);
    };

    let store = SnapshotStore::new(&config.working_dir, &case.name);
    let report = match process(archive, &store, importer, solver, config, &mut summary) {
        Ok(stages) => compare(summary, stages, &store),
        Err(err) => {
            warn!("case '{}' failed: {err:#}", case.name);
            summary.error = Some(match err.downcast_ref::<SvError>() {
                Some(err) => status_message(err),
                None => format!("{err:#}"),
            });
            ComparisonReport::failed(summary)
        }
    };
    if !config.keep_working_dir {
        store.cleanup();
    }
    report
}

/// Runs the stages and returns the baseline topology with the snapshot file
/// name, or an error when nothing can be compared.
fn process<I, L>(
    archive: &Path,
    store: &SnapshotStore,
    importer: &I,
    solver: &L,
    config: &BatchConfig,
    summary: &mut CaseSummary,
) -> Result<(BaselineTopology, String)>
where
    I: NetworkImporter,
    L: LoadFlowRunner<I::Network>,
{
    let datafiles = store.prepare(Stage::Baseline)?;
    let sv_file = extract_sv_file(archive, &datafiles)?;
    let file_name = file_name_of(&sv_file)?;
    let mut run = CaseRun {
        store,
        file_name: file_name.clone(),
        options: SnapshotOptions {
            version: config.snapshot_version.clone(),
            created: Utc::now(),
            ..SnapshotOptions::default()
        },
        summary,
    };

    let mut topology = BaselineTopology::default();
    match run_stages(archive, importer, solver, &mut run, &mut topology) {
        Ok(()) => {}
        Err(Halt::NoComparison(error)) => return Err(error.into()),
        Err(Halt::PartialComparison(error)) => {
            warn!("stopping after {error}");
            run.summary.error = Some(status_message(&error));
        }
    }
    Ok((topology, file_name))
}

fn run_stages<I, L>(
    archive: &Path,
    importer: &I,
    solver: &L,
    run: &mut CaseRun<'_>,
    topology: &mut BaselineTopology,
) -> Result<(), Halt>
where
    I: NetworkImporter,
    L: LoadFlowRunner<I::Network>,
{
    let mut network = import(importer, archive, InitialStateProfile::Ssh)?;
    run.write_stage(InitialStateProfile::Ssh.import_stage(), &network)
        .map_err(|err| Halt::NoComparison(SvError::Other(format!("{err:#}"))))?;

    let pristine = import(importer, archive, InitialStateProfile::Ssh)?;
    *topology = pristine.topology();
    run.summary.topology = network.topology_kind();

    solve(solver, &mut network, InitialStateProfile::Ssh, run)?;

    let mut network = import(importer, archive, InitialStateProfile::Sv)?;
    run.write_stage(InitialStateProfile::Sv.import_stage(), &network)
        .map_err(|err| Halt::NoComparison(SvError::Other(format!("{err:#}"))))?;

    solve(solver, &mut network, InitialStateProfile::Sv, run)
}

fn import<I: NetworkImporter>(
    importer: &I,
    archive: &Path,
    profile: InitialStateProfile,
) -> Result<I::Network, Halt> {
    info!("importing '{}' with {profile} initial state", archive.display());
    importer.import(archive, profile).map_err(|err| {
        debug!("{profile} import failed: {err:#}");
        Halt::NoComparison(SvError::Import(format!("error during cgmes import {profile}")))
    })
}

fn solve<N: GridState, L: LoadFlowRunner<N>>(
    solver: &L,
    network: &mut N,
    profile: InitialStateProfile,
    run: &mut CaseRun<'_>,
) -> Result<(), Halt> {
    let failure =
        || Halt::PartialComparison(SvError::LoadFlow(format!("error during loadflow {profile}")));
    let outcome = solver.run(network).map_err(|err| {
        debug!("{profile} load flow failed: {err:#}");
        failure()
    })?;
    if !outcome.ok {
        warn!("{profile} load flow finished with status {}", outcome.status);
    }
    run.summary.load_flow_status = Some(outcome.status);
    run.write_stage(profile.load_flow_stage(), &*network)
        .map_err(|err| Halt::PartialComparison(SvError::Other(format!("{err:#}"))))
}

/// Summary text for a failed case. Collaborator failures keep the bare
/// status message, without the error kind prefix.
fn status_message(err: &SvError) -> String {
    match err {
        SvError::Import(msg) | SvError::LoadFlow(msg) => msg.clone(),
        other => other.to_string(),
    }
}

fn compare(
    mut summary: CaseSummary,
    (topology, file_name): (BaselineTopology, String),
    store: &SnapshotStore,
) -> ComparisonReport {
    let mut stages: PerStage<StageSamples> = PerStage::default();
    for stage in Stage::ALL {
        let path = store.stage_path(stage, &file_name);
        match load_stage(&path) {
            Ok(load) => {
                if load.diagnostics.has_errors() {
                    debug!("{stage}: no snapshot written for this stage");
                }
                info!("{stage}: {} node(s)", load.samples.len());
                stages[stage] = load.samples;
            }
            Err(err) => {
                warn!("{stage} snapshot unusable: {err}");
                if summary.error.is_none() {
                    summary.error = Some(err.to_string());
                }
            }
        }
    }
    let index = TopologyIndex::build(&topology);
    ComparisonReport::new(summary, reconcile(&index, &stages))
}

fn file_name_of(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("'{}' has no file name", path.display()))
}
