//! State-variables extraction from a case archive.

use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};

use svcheck_core::{SvError, SvResult};
use tracing::{debug, info};
use zip::ZipArchive;

/// Entries whose name contains this marker carry the SV profile.
pub const SV_ENTRY_MARKER: &str = "_SV_";

/// Copy the first SV entry of `archive` into `dest_dir`.
///
/// Only the file-name component of the entry is kept, so nested archive
/// paths cannot escape the destination directory.
pub fn extract_sv_file(archive: &Path, dest_dir: &Path) -> SvResult<PathBuf> {
    let file = File::open(archive)?;
    let mut zip = ZipArchive::new(file)
        .map_err(|err| SvError::Archive(format!("{}: {err}", archive.display())))?;

    for i in 0..zip.len() {
        let mut entry = zip
            .by_index(i)
            .map_err(|err| SvError::Archive(format!("{}: {err}", archive.display())))?;
        if entry.is_dir() || !entry.name().contains(SV_ENTRY_MARKER) {
            continue;
        }
        let Some(file_name) = Path::new(entry.name()).file_name().map(|n| n.to_owned()) else {
            continue;
        };
        fs::create_dir_all(dest_dir)?;
        let target = dest_dir.join(file_name);
        let mut out = File::create(&target)?;
        io::copy(&mut entry, &mut out)?;
        info!(
            "extracted '{}' from '{}'",
            entry.name(),
            archive.display()
        );
        return Ok(target);
    }

    debug!("no '{SV_ENTRY_MARKER}' entry in '{}'", archive.display());
    Err(SvError::Archive(format!(
        "SV file not found in '{}'",
        archive.display()
    )))
}
