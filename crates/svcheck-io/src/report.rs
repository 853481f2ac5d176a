//! File-backed report sinks.
//!
//! [`CsvReportSink`] writes one detail table per provider plus a summary
//! table. [`JsonReportSink`] writes one JSON document per case, which is
//! easier to diff in regression checks.

use std::{
    collections::HashSet,
    fs::{self, File},
    path::{Path, PathBuf},
};

use serde::Serialize;
use svcheck_compare::{CaseSummary, ComparisonReport, DetailRow, ReportSink, SummaryRow};
use svcheck_core::{SvError, SvResult};
use tracing::{debug, info};

pub const DEFAULT_SUMMARY_NAME: &str = "Results";

const SUMMARY_HEADERS: [&str; 7] = [
    "Case file",
    "Provider",
    "Topology",
    "Import status",
    "PowerFlow status",
    "SSH max diff V",
    "SV max diff V",
];

#[derive(Debug)]
pub struct CsvReportSink {
    out_dir: PathBuf,
    summary_name: String,
    used_names: HashSet<String>,
}

impl CsvReportSink {
    pub fn new(out_dir: impl Into<PathBuf>, summary_name: impl Into<String>) -> Self {
        let summary_name = summary_name.into();
        Self {
            out_dir: out_dir.into(),
            used_names: HashSet::from([summary_name.clone()]),
            summary_name,
        }
    }

    pub fn summary_path(&self) -> PathBuf {
        self.out_dir.join(format!("{}.csv", self.summary_name))
    }

    /// `<provider>.csv`, or `<provider>_<case>.csv` once the provider has a
    /// file. A numeric suffix is appended while the name is still taken, by
    /// an earlier detail file or by the summary table.
    fn detail_path(&mut self, summary: &CaseSummary) -> PathBuf {
        let provider = sanitize_file_stem(&summary.provider);
        let mut stem = provider.clone();
        if self.used_names.contains(&stem) {
            stem = format!("{provider}_{}", sanitize_file_stem(&summary.case_file));
        }
        let base = stem.clone();
        let mut attempt = 1;
        while !self.used_names.insert(stem.clone()) {
            attempt += 1;
            stem = format!("{base}_{attempt}");
        }
        self.out_dir.join(format!("{stem}.csv"))
    }
}

impl ReportSink for CsvReportSink {
    fn write_case(&mut self, report: &ComparisonReport) -> SvResult<()> {
        let rows = report.rows();
        if rows.is_empty() {
            debug!(
                "no detail rows for case '{}', skipping detail file",
                report.summary.case_file
            );
            return Ok(());
        }
        fs::create_dir_all(&self.out_dir)?;
        let path = self.detail_path(&report.summary);
        write_rows(&path, &rows)?;
        info!("wrote {} row(s) to '{}'", rows.len(), path.display());
        Ok(())
    }

    fn write_summary(&mut self, summaries: &[CaseSummary]) -> SvResult<()> {
        fs::create_dir_all(&self.out_dir)?;
        let path = self.summary_path();
        let file = File::create(&path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(SUMMARY_HEADERS).map_err(csv_error)?;
        for summary in summaries {
            writer.serialize(summary.row()).map_err(csv_error)?;
        }
        writer.flush()?;
        info!("wrote summary of {} case(s) to '{}'", summaries.len(), path.display());
        Ok(())
    }
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> SvResult<()> {
    let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;
    for row in rows {
        writer.serialize(row).map_err(csv_error)?;
    }
    writer.flush()?;
    Ok(())
}

/// One `<case>.json` per case with the summary, the angle correction and the
/// detail rows.
#[derive(Debug)]
pub struct JsonReportSink {
    out_dir: PathBuf,
}

#[derive(Serialize)]
struct CaseDocument<'a> {
    summary: &'a CaseSummary,
    reference_ssh: Option<&'a str>,
    reference_sv: Option<&'a str>,
    correction_ssh: Option<f64>,
    correction_sv: Option<f64>,
    rows: Vec<DetailRow>,
}

impl JsonReportSink {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }
}

impl ReportSink for JsonReportSink {
    fn write_case(&mut self, report: &ComparisonReport) -> SvResult<()> {
        fs::create_dir_all(&self.out_dir)?;
        let correction = report.correction();
        let document = CaseDocument {
            summary: &report.summary,
            reference_ssh: correction.reference_ssh.as_ref().map(|id| id.as_str()),
            reference_sv: correction.reference_sv.as_ref().map(|id| id.as_str()),
            correction_ssh: correction.loadflow_ssh,
            correction_sv: correction.loadflow_sv,
            rows: report.rows(),
        };
        let path = self
            .out_dir
            .join(format!("{}.json", sanitize_file_stem(&report.summary.case_file)));
        fs::write(&path, serde_json::to_string_pretty(&document)?)?;
        Ok(())
    }

    fn write_summary(&mut self, summaries: &[CaseSummary]) -> SvResult<()> {
        fs::create_dir_all(&self.out_dir)?;
        let rows: Vec<SummaryRow> = summaries.iter().map(CaseSummary::row).collect();
        fs::write(
            self.out_dir.join("summary.json"),
            serde_json::to_string_pretty(&rows)?,
        )?;
        Ok(())
    }
}

fn sanitize_file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "unknown".to_string()
    } else {
        stem
    }
}

fn csv_error(err: csv::Error) -> SvError {
    SvError::Report(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_stems_drop_path_separators() {
        assert_eq!(sanitize_file_stem("RTE/FRANCE"), "RTE_FRANCE");
        assert_eq!(sanitize_file_stem(""), "unknown");
        assert_eq!(sanitize_file_stem("ELIA_BE"), "ELIA_BE");
    }

    #[test]
    fn second_case_of_a_provider_gets_a_suffix() {
        let mut sink = CsvReportSink::new("out", DEFAULT_SUMMARY_NAME);
        let first = sink.detail_path(&CaseSummary::new("case_1", "RTE"));
        let second = sink.detail_path(&CaseSummary::new("case_2", "RTE"));
        assert_eq!(first, Path::new("out/RTE.csv"));
        assert_eq!(second, Path::new("out/RTE_case_2.csv"));
    }

    #[test]
    fn suffixed_name_already_taken_by_a_provider_is_not_reused() {
        let mut sink = CsvReportSink::new("out", DEFAULT_SUMMARY_NAME);
        let a = sink.detail_path(&CaseSummary::new("a", "RTE"));
        let z = sink.detail_path(&CaseSummary::new("z", "RTE_b"));
        let b = sink.detail_path(&CaseSummary::new("b", "RTE"));
        assert_eq!(a, Path::new("out/RTE.csv"));
        assert_eq!(z, Path::new("out/RTE_b.csv"));
        assert_eq!(b, Path::new("out/RTE_b_2.csv"));
    }

    #[test]
    fn provider_named_like_the_summary_gets_its_own_file() {
        let mut sink = CsvReportSink::new("out", DEFAULT_SUMMARY_NAME);
        let detail = sink.detail_path(&CaseSummary::new("c1", DEFAULT_SUMMARY_NAME));
        assert_eq!(detail, Path::new("out/Results_c1.csv"));
        assert_ne!(detail, sink.summary_path());
    }
}
