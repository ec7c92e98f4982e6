//! Deploy structure interpreter
//!
//! Walks a [`DeploySpec`] and reproduces the described layout under one
//! output root. Copies happen in declaration order and stop at the first
//! missing mandatory source; files already copied stay in place.

use crate::glob::GlobMatcher;
use crate::variables::VariableTable;
use livepm_core::types::{CopyLeaf, DeployEntry, DeploySpec};
use livepm_core::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Counters for one interpreter run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployReport {
    /// Regular files written
    pub files_copied: usize,

    /// Directory sources cloned
    pub directories_copied: usize,

    /// Patterns that matched nothing
    pub patterns_without_match: usize,
}

/// Copies sources to the output root following a deploy structure
pub struct DeployTreeInterpreter<'a> {
    destination_root: PathBuf,
    variables: &'a VariableTable,
    report: DeployReport,
}

impl<'a> DeployTreeInterpreter<'a> {
    /// Create an interpreter writing under `destination_root`
    pub fn new(destination_root: impl Into<PathBuf>, variables: &'a VariableTable) -> Self {
        Self {
            destination_root: destination_root.into(),
            variables,
            report: DeployReport::default(),
        }
    }

    /// Apply a structure
    ///
    /// Every top-level source expression is resolved before anything is
    /// copied, so an unknown variable aborts with the output untouched.
    pub fn apply(mut self, spec: &DeploySpec) -> Result<DeployReport> {
        let resolved = spec
            .entries()
            .iter()
            .map(|entry| Ok((self.variables.resolve_path(entry.key())?, entry)))
            .collect::<Result<Vec<_>>>()?;

        let top = PathBuf::new();
        for (source, entry) in resolved {
            match entry {
                DeployEntry::Copy { leaf, .. } => self.copy_leaf(&source, &top, leaf)?,
                DeployEntry::Pattern { leaf, .. } => self.copy_pattern(&source, &top, leaf)?,
                DeployEntry::Subtree { children, .. } => self.walk(&source, &top, children)?,
            }
        }

        info!(
            "Copied {} files and {} directories into {:?}",
            self.report.files_copied, self.report.directories_copied, self.destination_root
        );
        Ok(self.report)
    }

    fn walk(&mut self, parent: &Path, accumulated: &Path, children: &[DeployEntry]) -> Result<()> {
        for child in children {
            match child {
                DeployEntry::Copy { source, leaf } => {
                    self.copy_leaf(&parent.join(source), accumulated, leaf)?
                }
                DeployEntry::Pattern { pattern, leaf } => {
                    self.copy_pattern(&parent.join(pattern), accumulated, leaf)?
                }
                DeployEntry::Subtree { segment, children } => {
                    self.walk(&parent.join(segment), &accumulated.join(segment), children)?
                }
            }
        }
        Ok(())
    }

    /// `pattern_path` is the directory joined with the wildcard segment
    fn copy_pattern(&mut self, pattern_path: &Path, accumulated: &Path, leaf: &CopyLeaf) -> Result<()> {
        let pattern = pattern_path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                Error::invalid_pattern(pattern_path.display().to_string(), "no file name segment")
            })?;
        let directory = pattern_path.parent().unwrap_or_else(|| Path::new(""));

        let matcher = GlobMatcher::new(pattern)?;
        let matches = matcher.match_dir(directory)?;
        if matches.is_empty() {
            debug!("Skipping {:?}: no match", pattern_path);
            self.report.patterns_without_match += 1;
            return Ok(());
        }

        for name in matches {
            self.copy_leaf(&directory.join(name), accumulated, leaf)?;
        }
        Ok(())
    }

    fn copy_leaf(&mut self, source: &Path, accumulated: &Path, leaf: &CopyLeaf) -> Result<()> {
        if !source.exists() {
            return Err(Error::missing_source(source.display().to_string()));
        }

        let basename = source.file_name().ok_or_else(|| {
            Error::invalid_deploy_spec(source.display().to_string(), "source has no file name")
        })?;
        let destination = self
            .destination_root
            .join(leaf.relative_destination(accumulated, basename));

        if source.is_dir() {
            debug!("Copying directory {:?} -> {:?}", source, destination);
            self.report.files_copied += copy_dir(source, &destination)?;
            self.report.directories_copied += 1;
        } else {
            debug!("Copying {:?} -> {:?}", source, destination);
            copy_file(source, &destination)?;
            self.report.files_copied += 1;
        }
        Ok(())
    }
}

/// Apply `spec` under `destination_root`
pub fn apply(
    spec: &DeploySpec,
    destination_root: &Path,
    variables: &VariableTable,
) -> Result<DeployReport> {
    DeployTreeInterpreter::new(destination_root, variables).apply(spec)
}

/// Copy a file, creating parent directories and overwriting the target
fn copy_file(source: &Path, destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, destination)?;
    Ok(())
}

/// `path` relative to the directory being copied
fn relative_to<'p>(path: &'p Path, base: &Path) -> Result<&'p Path> {
    path.strip_prefix(base).map_err(|_| {
        Error::Io(std::io::Error::other(format!(
            "Failed to copy {:?}: not inside {:?}",
            path, base
        )))
    })
}

/// Clone a directory tree, returning the number of files written
fn copy_dir(source: &Path, destination: &Path) -> Result<usize> {
    let mut count = 0;
    for entry in WalkDir::new(source).follow_links(true) {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        let relative = relative_to(entry.path(), source)?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            copy_file(entry.path(), &target)?;
            count += 1;
        }
    }
    Ok(count)
}
