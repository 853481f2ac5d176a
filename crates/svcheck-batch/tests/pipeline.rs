use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Result};
use svcheck_batch::{
    load_batch_manifest, run_batch, run_case, BatchConfig, CaseFolder, GridState,
    LoadFlowOutcome, LoadFlowRunner, NetworkImporter,
};
use svcheck_compare::MemorySink;
use svcheck_core::{
    BaselineTopology, ConnectableBus, InitialStateProfile, ModelHeader, NodeState, TerminalRef,
    TopologicalNode,
};
use svcheck_io::{write_sv_snapshot, SnapshotOptions};
use tempfile::{tempdir, TempDir};
use zip::write::FileOptions;

#[derive(Clone)]
struct FakeGrid {
    states: Vec<NodeState>,
    fail_solve: bool,
}

impl GridState for FakeGrid {
    fn topology(&self) -> BaselineTopology {
        BaselineTopology::new(
            self.states
                .iter()
                .map(|state| TopologicalNode {
                    id: state.node.clone(),
                    terminals: vec![TerminalRef {
                        equipment_id: format!("EQ_{}", state.node),
                        voltage_level_id: "VL1".into(),
                        bus: Some(ConnectableBus {
                            id: format!("VL1_{}", state.node),
                            voltage_level_id: "VL1".into(),
                            connected_component: Some(0),
                        }),
                    }],
                })
                .collect(),
        )
    }

    fn node_states(&self) -> Vec<NodeState> {
        self.states.clone()
    }

    fn topology_kind(&self) -> Option<String> {
        Some("BUS_BREAKER".into())
    }

    fn model_header(&self) -> ModelHeader {
        ModelHeader::default()
    }
}

fn state(node: &str, v: f64, angle: f64) -> NodeState {
    NodeState {
        node: node.into(),
        v,
        angle,
    }
}

/// Fails imports whose archive name contains `noimport_<profile>`.
struct FakeImporter;

impl NetworkImporter for FakeImporter {
    type Network = FakeGrid;

    fn import(&self, case: &Path, profile: InitialStateProfile) -> Result<FakeGrid> {
        let name = case.to_string_lossy().into_owned();
        if name.contains(&format!("noimport{}", profile.as_str())) {
            bail!("corrupt {profile} profile");
        }
        let states = match profile {
            InitialStateProfile::Ssh => vec![state("N1", 99.5, 0.1), state("NREF", 200.0, 1.8)],
            InitialStateProfile::Sv => vec![state("N1", 100.0, 0.0), state("NREF", 200.0, 1.8)],
        };
        Ok(FakeGrid {
            states,
            fail_solve: name.contains("nosolve"),
        })
    }
}

/// Moves the slack to `NREF`.
struct FakeSolver;

impl LoadFlowRunner<FakeGrid> for FakeSolver {
    fn run(&self, network: &mut FakeGrid) -> Result<LoadFlowOutcome> {
        if network.fail_solve {
            bail!("diverged");
        }
        network.states = vec![state("N1", 99.0, 2.0), state("NREF", 200.0, 0.0)];
        Ok(LoadFlowOutcome::converged("CONVERGED"))
    }
}

fn write_case_archive(dataset: &Path, folder: &str, archive: &str) {
    let dir = dataset.join(folder);
    fs::create_dir_all(&dir).unwrap();
    let mut zip = zip::ZipWriter::new(File::create(dir.join(archive)).unwrap());
    zip.start_file("20200115T1030Z_1D_TSO_EQ_001.xml", FileOptions::default())
        .unwrap();
    zip.write_all(b"<rdf:RDF/>").unwrap();
    zip.start_file("20200115T1030Z_1D_TSO_SV_001.xml", FileOptions::default())
        .unwrap();
    let baseline = vec![state("N1", 100.0, 0.0), state("NREF", 200.0, 1.8)];
    write_sv_snapshot(&mut zip, &ModelHeader::default(), &baseline, &SnapshotOptions::default())
        .unwrap();
    zip.finish().unwrap();
}

fn config(work: &TempDir) -> BatchConfig {
    BatchConfig {
        working_dir: work.path().join("workingDir"),
        result_path: Some(work.path().join("results")),
        exploited_hour: Some("1030".into()),
        ..BatchConfig::default()
    }
}

fn case(dataset: &Path, folder: &str, archive: &str) -> CaseFolder {
    write_case_archive(dataset, folder, archive);
    CaseFolder {
        name: folder.into(),
        path: dataset.join(folder),
        provider: "TSO".into(),
        archive: Some(dataset.join(folder).join(archive)),
    }
}

#[test]
fn full_case_corrects_load_flow_angles() {
    let dataset = tempdir().unwrap();
    let work = tempdir().unwrap();
    let case = case(dataset.path(), "20200115_1030_FO3_TSO_1", "case_1030_ok.zip");

    let report = run_case(&case, &FakeImporter, &FakeSolver, &config(&work));
    assert!(report.summary.is_ok(), "{:?}", report.summary.error);
    assert_eq!(report.summary.topology.as_deref(), Some("BUS_BREAKER"));
    assert_eq!(report.summary.load_flow_status.as_deref(), Some("CONVERGED"));
    assert!((report.correction().loadflow_ssh.unwrap() - 1.8).abs() < 1e-12);

    let rows = report.rows();
    assert_eq!(rows.len(), 2);
    let n1 = &rows[0];
    assert_eq!(n1.node, "N1");
    assert_eq!(n1.voltage_level_id, "VL1");
    assert_eq!(n1.equipment_id, "EQ_N1");
    assert_eq!(n1.v, Some(100.0));
    assert_eq!(n1.v_import_ssh, Some(99.5));
    assert!((n1.diff_angle_lf_ssh.unwrap() - 0.2).abs() < 1e-9);
    assert!((n1.diff_v_lf_ssh.unwrap() - 1.0).abs() < 1e-9);
    assert_eq!(n1.diff_v_import_sv, Some(0.0));
    assert_eq!(report.summary.ssh_max_diff_v, Some(1.0));

    assert!(!work.path().join("workingDir").join(&case.name).exists());
}

#[test]
fn keep_working_dir_leaves_case_scoped_snapshots() {
    let dataset = tempdir().unwrap();
    let work = tempdir().unwrap();
    let case = case(dataset.path(), "20200115_1030_FO3_TSO_1", "case_1030_ok.zip");
    let config = BatchConfig {
        keep_working_dir: true,
        ..config(&work)
    };

    run_case(&case, &FakeImporter, &FakeSolver, &config);
    let case_dir = work.path().join("workingDir").join(&case.name);
    for dir in ["datafiles", "postImport_SSH", "postLF_SSH", "postImport_SV", "postLF_SV"] {
        assert!(
            case_dir.join(dir).join("20200115T1030Z_1D_TSO_SV_001.xml").exists(),
            "missing {dir}"
        );
    }
}

#[test]
fn import_failure_yields_no_rows() {
    let dataset = tempdir().unwrap();
    let work = tempdir().unwrap();
    let case = case(dataset.path(), "20200115_1030_FO3_TSO_2", "case_1030_noimportSV.zip");

    let report = run_case(&case, &FakeImporter, &FakeSolver, &config(&work));
    assert_eq!(report.summary.import_status(), "error during cgmes import SV");
    assert_eq!(report.row_count(), 0);
}

#[test]
fn solve_failure_still_compares_written_stages() {
    let dataset = tempdir().unwrap();
    let work = tempdir().unwrap();
    let case = case(dataset.path(), "20200115_1030_FO3_TSO_3", "case_1030_nosolve.zip");

    let report = run_case(&case, &FakeImporter, &FakeSolver, &config(&work));
    assert_eq!(report.summary.import_status(), "error during loadflow SSH");
    let rows = report.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].v_import_ssh, Some(99.5));
    assert_eq!(rows[0].v_lf_ssh, None);
    assert_eq!(rows[0].diff_v_lf_ssh, None);
    assert_eq!(rows[0].v_import_sv, None);
}

#[test]
fn missing_archive_is_reported_per_provider() {
    let work = tempdir().unwrap();
    let case = CaseFolder {
        name: "20200115_1030_FO3_ELIA_1".into(),
        path: work.path().into(),
        provider: "ELIA".into(),
        archive: None,
    };
    let report = run_case(&case, &FakeImporter, &FakeSolver, &config(&work));
    assert_eq!(
        report.summary.import_status(),
        "SV file not found for the provider ELIA"
    );
}

#[test]
fn batch_continues_after_a_failed_case() {
    let dataset = tempdir().unwrap();
    let work = tempdir().unwrap();
    write_case_archive(dataset.path(), "20200115_1030_FO3_TSOA_1", "a_1030_noimportSSH.zip");
    write_case_archive(dataset.path(), "20200115_1030_FO3_TSOB_1", "b_1030_ok.zip");
    fs::create_dir_all(dataset.path().join("20200115_1030_FO3_TSOC_1")).unwrap();

    let mut sink = MemorySink::new();
    let summary = run_batch(
        dataset.path(),
        &config(&work),
        &FakeImporter,
        &FakeSolver,
        &mut sink,
    )
    .unwrap();

    assert_eq!(summary.success, 1);
    assert_eq!(summary.failure, 2);
    let manifest = load_batch_manifest(&summary.manifest_path).unwrap();
    assert_eq!(manifest.exploited_hour.as_deref(), Some("1030"));
    assert_eq!(manifest.working_dir, work.path().join("workingDir"));
    assert_eq!(manifest.dataset, dataset.path());
    assert_eq!(
        manifest.failed_cases,
        vec!["20200115_1030_FO3_TSOA_1", "20200115_1030_FO3_TSOC_1"]
    );
    let providers: Vec<&str> = sink.summaries.iter().map(|s| s.provider.as_str()).collect();
    assert_eq!(providers, vec!["TSOA", "TSOB", "TSOC"]);
    assert_eq!(sink.summaries[0].import_status(), "error during cgmes import SSH");
    assert_eq!(sink.rows_for("20200115_1030_FO3_TSOA_1").unwrap().len(), 0);
    assert_eq!(sink.rows_for("20200115_1030_FO3_TSOB_1").unwrap().len(), 2);
}

#[test]
fn batch_without_hour_is_rejected() {
    let dataset = tempdir().unwrap();
    let mut sink = MemorySink::new();
    let result = run_batch(
        dataset.path(),
        &BatchConfig::default(),
        &FakeImporter,
        &FakeSolver,
        &mut sink,
    );
    assert!(result.is_err());
}
