//! Single-segment wildcard matching against directory entries

use globset::GlobBuilder;
use livepm_core::types::WILDCARD;
use livepm_core::{Error, Result};
use std::path::Path;
use tracing::debug;

/// Matches file names in one directory against a pattern such as `Qt*Core.dll`
#[derive(Debug, Clone)]
pub struct GlobMatcher {
    pattern: String,
    matcher: globset::GlobMatcher,
}

impl GlobMatcher {
    /// Compile a pattern with at most one `*` and no path separator
    ///
    /// Every other character, `?`, `[`, `{` and `\` included, matches itself.
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern.contains('/') {
            return Err(Error::invalid_pattern(
                pattern,
                "a pattern matches a single path segment",
            ));
        }
        if pattern.matches(WILDCARD).count() > 1 {
            return Err(Error::invalid_pattern(
                pattern,
                "only a single '*' is supported",
            ));
        }

        let literal = pattern
            .split(WILDCARD)
            .map(globset::escape)
            .collect::<Vec<_>>()
            .join("*");
        let glob = GlobBuilder::new(&literal)
            .literal_separator(true)
            .backslash_escape(false)
            .build()
            .map_err(|e| Error::invalid_pattern(pattern, e.to_string()))?;

        Ok(Self {
            pattern: pattern.to_string(),
            matcher: glob.compile_matcher(),
        })
    }

    /// The source pattern
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Case-sensitive match of a single file name
    pub fn is_match(&self, name: &str) -> bool {
        self.matcher.is_match(name)
    }

    /// Names of the entries in `directory` matching the pattern, sorted
    ///
    /// A missing directory yields no matches.
    pub fn match_dir(&self, directory: &Path) -> Result<Vec<String>> {
        if !directory.is_dir() {
            debug!(
                "Pattern '{}': directory {:?} does not exist",
                self.pattern, directory
            );
            return Ok(Vec::new());
        }

        let mut matches = Vec::new();
        for entry in std::fs::read_dir(directory)? {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                if self.is_match(name) {
                    matches.push(name.to_string());
                }
            }
        }
        matches.sort();

        debug!(
            "Pattern '{}' matched {} entries in {:?}",
            self.pattern,
            matches.len(),
            directory
        );
        Ok(matches)
    }
}

/// Match `pattern` against the entries of `directory`
pub fn match_entries(directory: &Path, pattern: &str) -> Result<Vec<String>> {
    GlobMatcher::new(pattern)?.match_dir(directory)
}
