//! Installed package manifest (live.packages.json)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Manifest file name written into every install directory
pub const MANIFEST_FILE_NAME: &str = "live.packages.json";

/// Version recorded for project manifests created by the installer
pub const PROJECT_MANIFEST_VERSION: &str = "1.0.1";

/// Per-directory record of installed packages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    /// Directory basename
    pub name: String,

    /// Version of the owning project or package
    pub version: String,

    /// Installed packages (name -> version)
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
}

impl PackageManifest {
    /// Create a manifest with no dependencies
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            dependencies: BTreeMap::new(),
        }
    }

    /// Record a package, replacing any previous version of it
    pub fn add_dependency(&mut self, name: impl Into<String>, version: impl Into<String>) {
        self.dependencies.insert(name.into(), version.into());
    }
}
