use svcheck_core::SvResult;

use crate::report::{CaseSummary, ComparisonReport, DetailRow};

/// Receiver of finished reports. Presentation belongs to the implementor.
///
/// `write_case` is called once per case, `write_summary` once per batch with
/// the summaries in processing order. Node ids may repeat across cases; each
/// call stands on its own.
pub trait ReportSink {
    fn write_case(&mut self, report: &ComparisonReport) -> SvResult<()>;

    fn write_summary(&mut self, summaries: &[CaseSummary]) -> SvResult<()>;
}

/// Keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub cases: Vec<(CaseSummary, Vec<DetailRow>)>,
    pub summaries: Vec<CaseSummary>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows_for(&self, case_file: &str) -> Option<&[DetailRow]> {
        self.cases
            .iter()
            .find(|(summary, _)| summary.case_file == case_file)
            .map(|(_, rows)| rows.as_slice())
    }
}

impl ReportSink for MemorySink {
    fn write_case(&mut self, report: &ComparisonReport) -> SvResult<()> {
        self.cases.push((report.summary.clone(), report.rows()));
        Ok(())
    }

    fn write_summary(&mut self, summaries: &[CaseSummary]) -> SvResult<()> {
        self.summaries = summaries.to_vec();
        Ok(())
    }
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn write_case(&mut self, report: &ComparisonReport) -> SvResult<()> {
        (**self).write_case(report)
    }

    fn write_summary(&mut self, summaries: &[CaseSummary]) -> SvResult<()> {
        (**self).write_summary(summaries)
    }
}
