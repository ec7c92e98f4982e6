//! Junk filtering for deploy trees.
//!
//! Build trees carry version-control marker files that must never ship in a
//! release bundle. They are removed from the deploy root before archiving.

use globset::{Glob, GlobSet, GlobSetBuilder};
use livepm_core::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// File names that are ALWAYS removed from deploy trees.
pub const IGNORE_FILES: &[&str] = &[".gitignore"];

/// Matches file names to strip from a deploy tree.
#[derive(Debug, Clone)]
pub struct JunkFilter {
    globset: GlobSet,
}

impl JunkFilter {
    /// Creates a filter for [`IGNORE_FILES`] plus additional name patterns.
    pub fn new(additional_patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();

        let patterns = IGNORE_FILES
            .iter()
            .copied()
            .chain(additional_patterns.iter().map(String::as_str));
        for pattern in patterns {
            let glob = Glob::new(pattern)
                .map_err(|e| Error::invalid_pattern(pattern, e.to_string()))?;
            builder.add(glob);
        }

        let globset = builder
            .build()
            .map_err(|e| Error::invalid_pattern("<junk filter>", e.to_string()))?;

        Ok(Self { globset })
    }

    /// Checks a file name against the filter.
    pub fn is_junk(&self, file_name: &str) -> bool {
        self.globset.is_match(file_name)
    }

    /// Deletes every matching file below `root`, returning the removed paths.
    pub fn strip(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut junk = Vec::new();
        for entry in WalkDir::new(root).follow_links(false) {
            let entry = entry.map_err(|e| Error::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let is_junk = entry
                .file_name()
                .to_str()
                .map(|name| self.is_junk(name))
                .unwrap_or(false);
            if is_junk {
                junk.push(entry.into_path());
            }
        }

        for path in &junk {
            std::fs::remove_file(path)?;
            debug!("Removed: {:?}", path);
        }
        Ok(junk)
    }
}
