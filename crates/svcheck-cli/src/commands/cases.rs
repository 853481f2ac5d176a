use std::path::Path;

use anyhow::{Context, Result};
use svcheck_batch::{discover_cases, BatchConfig};

pub fn handle(dataset: &Path, hour: Option<&str>, config: &BatchConfig) -> Result<()> {
    let hour = hour
        .or(config.exploited_hour.as_deref())
        .context("no exploited hour given (use --hour or set exploited_hour in the config)")?;
    let cases = discover_cases(dataset, hour)?;
    for case in &cases {
        let archive = case
            .archive
            .as_deref()
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "-".to_string());
        println!("{}\t{}\t{}", case.name, case.provider, archive);
    }
    Ok(())
}
