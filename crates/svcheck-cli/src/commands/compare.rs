use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use svcheck_batch::BatchConfig;
use svcheck_compare::{reconcile, CaseSummary, ComparisonReport, ReportSink, TopologyIndex};
use svcheck_core::{PerStage, Stage, StageSamples};
use svcheck_io::{load_stage, load_topology, CsvReportSink, JsonReportSink};
use svcheck_cli::{CompareArgs, ReportFormat};
use tracing::{info, warn};

pub fn handle(args: &CompareArgs, config: &BatchConfig) -> Result<()> {
    let topology = load_topology(&args.topology)?;
    let index = TopologyIndex::build(&topology);
    info!("topology: {} node(s) indexed", index.len());

    let sources = PerStage::from_fn(|stage| stage_source(args, stage));
    let mut stages: PerStage<StageSamples> = PerStage::default();
    for (stage, source) in sources.iter() {
        let Some(path) = source else {
            warn!("{stage}: no snapshot given");
            continue;
        };
        let load = load_stage(path).with_context(|| format!("loading {stage} snapshot"))?;
        for issue in &load.diagnostics.issues {
            warn!("{stage}: {issue}");
        }
        info!("{stage}: {} node(s)", load.samples.len());
        stages[stage] = load.samples;
    }

    let case = args.case.clone().unwrap_or_else(|| file_stem(&args.baseline));
    let report = ComparisonReport::new(
        CaseSummary::new(case, args.provider.as_str()),
        reconcile(&index, &stages),
    );

    let out_dir = args.out.clone().unwrap_or_else(|| config.result_dir());
    let mut sink: Box<dyn ReportSink> = match args.format {
        ReportFormat::Csv => {
            Box::new(CsvReportSink::new(&out_dir, config.result_filename.as_str()))
        }
        ReportFormat::Json => Box::new(JsonReportSink::new(&out_dir)),
    };
    sink.write_case(&report)?;
    sink.write_summary(std::slice::from_ref(&report.summary))?;

    println!(
        "Compared {} node(s); report written to {}",
        report.row_count(),
        out_dir.display()
    );
    for stage in Stage::LOAD_FLOW {
        let Some(reference) = report.correction().reference_node(stage) else {
            continue;
        };
        match report.correction().for_stage(stage) {
            Some(offset) => println!("{stage}: angle reference {reference}, correction {offset}"),
            None => println!("{stage}: angle reference {reference} has no import angle"),
        }
    }
    Ok(())
}

fn stage_source(args: &CompareArgs, stage: Stage) -> Option<PathBuf> {
    match stage {
        Stage::Baseline => Some(args.baseline.clone()),
        Stage::ImportSsh => args.import_ssh.clone(),
        Stage::LoadFlowSsh => args.lf_ssh.clone(),
        Stage::ImportSv => args.import_sv.clone(),
        Stage::LoadFlowSv => args.lf_sv.clone(),
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "case".to_string())
}
