//! Built-in deploy structures
//!
//! Structures for well-known releases are compiled into the binary and can be
//! referenced by name from a descriptor's `copy` step.

use livepm_core::types::DeploySpec;
use livepm_core::{Error, Result};
use rust_embed::RustEmbed;
use tracing::debug;

/// Embedded preset files
#[derive(RustEmbed)]
#[folder = "presets/"]
struct EmbeddedPresets;

const PRESET_EXTENSION: &str = ".json";

/// Names of all built-in presets, sorted
pub fn list() -> Vec<String> {
    let mut names: Vec<String> = EmbeddedPresets::iter()
        .filter_map(|file| file.strip_suffix(PRESET_EXTENSION).map(str::to_string))
        .collect();
    names.sort();
    names
}

/// Load a preset by name
pub fn load(name: &str) -> Result<DeploySpec> {
    let file = format!("{}{}", name, PRESET_EXTENSION);
    let content = EmbeddedPresets::get(&file).ok_or_else(|| Error::unknown_preset(name))?;

    let json = std::str::from_utf8(&content.data)
        .map_err(|_| Error::invalid_deploy_spec(name, "preset is not valid UTF-8"))?;

    debug!("Loading embedded preset: {}", name);
    DeploySpec::from_json(json)
}
