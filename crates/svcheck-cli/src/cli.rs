use clap::{Parser, Subcommand, ValueEnum, ValueHint};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "svcheck", author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: tracing::Level,

    /// Batch settings file (TOML)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reconcile the five stage snapshots of one case and write the report
    Compare(CompareArgs),
    /// Extract the SV file of a case package
    ExtractSv {
        /// Case package (zip)
        #[arg(value_hint = ValueHint::FilePath)]
        archive: PathBuf,
        /// Destination directory
        #[arg(long, value_hint = ValueHint::DirPath)]
        out: PathBuf,
    },
    /// List the cases of a dataset with provider and selected package
    Cases {
        /// Dataset root, one folder per case
        #[arg(value_hint = ValueHint::DirPath)]
        dataset: PathBuf,
        /// Exploited hour, e.g. 1030 (falls back to the config file)
        #[arg(long)]
        hour: Option<String>,
    },
}

#[derive(clap::Args, Debug)]
pub struct CompareArgs {
    /// Baseline topology mapping (JSON)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub topology: PathBuf,
    /// SV file shipped with the case
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub baseline: PathBuf,
    /// Snapshot written after the SSH import
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub import_ssh: Option<PathBuf>,
    /// Snapshot written after the SSH load flow
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub lf_ssh: Option<PathBuf>,
    /// Snapshot written after the SV import
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub import_sv: Option<PathBuf>,
    /// Snapshot written after the SV load flow
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub lf_sv: Option<PathBuf>,
    /// Report directory (defaults to the configured result path)
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub out: Option<PathBuf>,
    /// Provider label used for the detail file name
    #[arg(long, default_value = "case")]
    pub provider: String,
    /// Case name in the summary (defaults to the baseline file stem)
    #[arg(long)]
    pub case: Option<String>,
    #[arg(long, value_enum, default_value_t = ReportFormat::Csv)]
    pub format: ReportFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Json,
}
