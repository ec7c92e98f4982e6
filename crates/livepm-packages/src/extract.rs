//! Package archive unpacking

use livepm_core::Result;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::ZipArchive;

/// Unpack `bytes` into `directory/dir_name`
///
/// The archive is written to `directory/{dir_name}.zip`, extracted, then
/// deleted. An existing target directory is replaced.
pub fn install_archive(bytes: &[u8], directory: &Path, dir_name: &str) -> Result<PathBuf> {
    let archive_path = directory.join(format!("{}.zip", dir_name));
    let target = directory.join(dir_name);

    if target.is_dir() {
        debug!("Replacing {:?}", target);
        fs::remove_dir_all(&target)?;
    }

    fs::write(&archive_path, bytes)?;
    let count = extract_zip(&archive_path, &target)?;
    fs::remove_file(&archive_path)?;

    debug!("Extracted {} entries into {:?}", count, target);
    Ok(target)
}

/// Extract a zip file into `target`, returning the number of entries
pub fn extract_zip(archive_path: &Path, target: &Path) -> Result<usize> {
    let mut archive = ZipArchive::new(File::open(archive_path)?)?;
    fs::create_dir_all(target)?;
    archive.extract(target)?;
    Ok(archive.len())
}
