use std::path::Path;

use anyhow::Result;
use svcheck_io::extract_sv_file;

pub fn handle(archive: &Path, out: &Path) -> Result<()> {
    let path = extract_sv_file(archive, out)?;
    println!("{}", path.display());
    Ok(())
}
