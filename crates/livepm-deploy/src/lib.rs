//! Livepm Deploy
//!
//! Assembles a release bundle from a build tree and packs it.
//!
//! # Features
//!
//! - **Deploy structures**: nested JSON mappings of source paths to bundle
//!   destinations, with `{variable}` roots and single-`*` patterns
//! - **Presets**: structures for known releases compiled into the tool
//! - **Forwarding headers**: `#include` stubs for class-style header names
//! - **Platform archives**: zip on Windows, gzip tarballs elsewhere, with an
//!   optional disk image on macOS
//!
//! # Examples
//!
//! ```no_run
//! use livepm_core::types::DeploySpec;
//! use livepm_deploy::{apply, VariableTable};
//! use std::path::Path;
//!
//! fn main() -> livepm_core::Result<()> {
//!     let spec = DeploySpec::from_json(r#"{ "{root}/libs": { "foo*.dll": "out/-" } }"#)?;
//!     let variables = VariableTable::new().with("root", "/src");
//!
//!     let report = apply(&spec, Path::new("/tmp/bundle"), &variables)?;
//!     println!("Copied {} files", report.files_copied);
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod filters;
pub mod glob;
pub mod includes;
pub mod interpreter;
pub mod pipeline;
pub mod presets;
pub mod variables;

// Re-export commonly used types
pub use archive::{
    strategy_for, ArchiveBuilder, ArchiveConfig, ArchiveResult, ArchiveStrategy,
    DEFAULT_COMPRESSION_LEVEL,
};
pub use filters::{JunkFilter, IGNORE_FILES};
pub use glob::{match_entries, GlobMatcher};
pub use includes::generate_includes;
pub use interpreter::{apply, DeployReport, DeployTreeInterpreter};
pub use pipeline::{parse_options, DeployLayout, DeployOptions, DeployOutcome, DeployPipeline};
pub use variables::{resolve, VariableTable};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignore_files_not_empty() {
        assert!(!IGNORE_FILES.is_empty());
    }

    #[test]
    fn test_compression_level() {
        assert_eq!(DEFAULT_COMPRESSION_LEVEL, 6);
    }
}
