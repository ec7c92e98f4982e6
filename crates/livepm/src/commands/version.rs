//! Version command

use crate::cli::VersionArgs;
use anyhow::Result;
use serde::Serialize;

/// Version information
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    /// Package version
    pub version: String,

    /// Built-in deploy structures
    pub presets: Vec<String>,
}

impl VersionInfo {
    /// Version info for the current build
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            presets: livepm_deploy::presets::list(),
        }
    }

    /// Format as display string
    pub fn display(&self) -> String {
        format!("livepm {}", self.version)
    }
}

pub fn run(args: VersionArgs) -> Result<()> {
    let info = VersionInfo::current();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("{}", info.display());
        println!("Presets:    {}", info.presets.join(", "));
    }

    Ok(())
}
