//! Installed package manifests
//!
//! Every install directory records what was installed into it in a
//! `live.packages.json` file:
//!
//! ```json
//! {
//!     "name": "myproject",
//!     "version": "1.0.1",
//!     "dependencies": {
//!         "lcvcore": "1.2.0"
//!     }
//! }
//! ```
//!
//! Writes are read-modify-write without locking; concurrent installs into the
//! same directory can lose updates.

use livepm_core::types::{PackageManifest, MANIFEST_FILE_NAME};
use livepm_core::{Error, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const INDENT: &[u8] = b"    ";

/// Manifest manager for one install directory
pub struct ManifestManager {
    /// Path to manifest file
    manifest_path: PathBuf,

    /// Current manifest data
    manifest: PackageManifest,
}

impl ManifestManager {
    /// Open the manifest of `directory`
    ///
    /// An existing manifest keeps its dependencies; `name` is reset to the
    /// directory basename and `version` to the given one. Nothing is written
    /// until [`save`](Self::save).
    pub fn open(directory: &Path, version: &str) -> Result<Self> {
        let manifest_path = Self::manifest_path(directory);
        let name = directory
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut manifest = match Self::load(&manifest_path)? {
            Some(existing) => existing,
            None => {
                debug!("No manifest at {:?}, starting a new one", manifest_path);
                PackageManifest::new(name.clone(), version)
            }
        };
        manifest.name = name;
        manifest.version = version.to_string();

        Ok(Self {
            manifest_path,
            manifest,
        })
    }

    /// Manifest path inside `directory`
    pub fn manifest_path(directory: &Path) -> PathBuf {
        directory.join(MANIFEST_FILE_NAME)
    }

    /// Read a manifest file, `None` if it does not exist
    pub fn load(path: &Path) -> Result<Option<PackageManifest>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        let manifest: PackageManifest =
            serde_json::from_str(&content).map_err(|source| Error::ManifestParse {
                path: path.display().to_string(),
                source,
            })?;
        debug!(
            "Loaded manifest with {} dependencies",
            manifest.dependencies.len()
        );
        Ok(Some(manifest))
    }

    /// Current manifest data
    pub fn manifest(&self) -> &PackageManifest {
        &self.manifest
    }

    /// Path of the manifest file
    pub fn path(&self) -> &Path {
        &self.manifest_path
    }

    /// Record an installed package
    pub fn add_dependency(&mut self, name: &str, version: &str) {
        self.manifest.add_dependency(name, version);
    }

    /// Write the manifest in full
    pub fn save(&self) -> Result<()> {
        let content = to_pretty_json(&self.manifest)?;
        std::fs::write(&self.manifest_path, content)?;
        info!(
            "Updated {:?} ({} dependencies)",
            self.manifest_path,
            self.manifest.dependencies.len()
        );
        Ok(())
    }

    /// Merge `{name: version}` into the manifest of `directory` and save it
    pub fn record(
        directory: &Path,
        manifest_version: &str,
        name: &str,
        version: &str,
    ) -> Result<PackageManifest> {
        let mut manager = Self::open(directory, manifest_version)?;
        manager.add_dependency(name, version);
        manager.save()?;
        Ok(manager.manifest)
    }
}

/// Serialize with four-space indentation, leaving non-ASCII text unescaped
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT));
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use livepm_core::types::PROJECT_MANIFEST_VERSION;
    use tempfile::TempDir;

    #[test]
    fn test_record_creates_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let project = temp_dir.path().join("myproject");
        std::fs::create_dir(&project).unwrap();

        let manifest =
            ManifestManager::record(&project, PROJECT_MANIFEST_VERSION, "alpha", "2.0.0").unwrap();

        assert_eq!(manifest.name, "myproject");
        assert_eq!(manifest.version, "1.0.1");
        assert_eq!(manifest.dependencies["alpha"], "2.0.0");
        assert!(ManifestManager::manifest_path(&project).exists());
    }

    #[test]
    fn test_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = ManifestManager::open(temp_dir.path(), "1.0.1").unwrap();
        manager.add_dependency("lcvcore", "1.2.0");
        manager.add_dependency("lcvimgproc", "1.2.0");
        manager.save().unwrap();

        let loaded = ManifestManager::load(manager.path()).unwrap().unwrap();
        assert_eq!(loaded.dependencies, manager.manifest().dependencies);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        ManifestManager::record(temp_dir.path(), "1.0.1", "beta", "1.0.0").unwrap();
        ManifestManager::record(temp_dir.path(), "1.0.1", "alpha", "2.0.0").unwrap();
        let manifest = ManifestManager::record(temp_dir.path(), "1.0.1", "alpha", "2.0.0").unwrap();

        assert_eq!(manifest.dependencies.len(), 2);
    }

    #[test]
    fn test_four_space_indent_and_unicode() {
        let mut manifest = PackageManifest::new("proiect", "1.0.1");
        manifest.add_dependency("ăbc", "1.0");

        let json = to_pretty_json(&manifest).unwrap();
        assert!(json.contains("\n    \"name\": \"proiect\""));
        assert!(json.contains("\"ăbc\": \"1.0\""));
    }

    #[test]
    fn test_field_order() {
        let mut manifest = PackageManifest::new("myproject", "1.0.1");
        manifest.add_dependency("lcvcore", "1.2.0");

        let json = to_pretty_json(&manifest).unwrap();
        assert_eq!(
            json,
            "{\n    \"name\": \"myproject\",\n    \"version\": \"1.0.1\",\n    \"dependencies\": {\n        \"lcvcore\": \"1.2.0\"\n    }\n}"
        );
    }

    #[test]
    fn test_corrupt_manifest_is_error() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(ManifestManager::manifest_path(temp_dir.path()), "{ not json").unwrap();

        let result = ManifestManager::open(temp_dir.path(), "1.0.1");
        assert!(matches!(result, Err(Error::ManifestParse { .. })));
    }
}
