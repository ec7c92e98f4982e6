//! Registry wire types
//!
//! `GET {server}/package/{name}/latest/{release}` answers with:
//!
//! ```json
//! {
//!     "url": "https://livekeys.io/files/lcvcore-1.2.0.zip",
//!     "version": "1.2.0",
//!     "dependencies": [
//!         { "version": "1.0.0", "package": { "name": "lcvbase" }, "url": "...", "dependencies": [] }
//!     ]
//! }
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Check that `value` can name a single directory entry
///
/// Package names and versions become `{name}-{version}` directories, so they
/// must be non-empty, hold no path separator and not be `.` or `..`.
pub fn validate_path_component(field: &str, value: &str) -> Result<()> {
    if value.is_empty() || value == "." || value == ".." || value.contains(['/', '\\']) {
        return Err(Error::registry(format!(
            "Invalid package {} '{}': must be a single path component",
            field, value
        )));
    }
    Ok(())
}

/// Latest release of a package as resolved by the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    /// Archive download URL
    pub url: String,

    /// Resolved version
    pub version: String,

    /// Direct dependencies
    #[serde(default)]
    pub dependencies: Vec<DependencyNode>,
}

impl PackageMetadata {
    /// Check the version and every dependency name and version in the tree
    pub fn validate(&self) -> Result<()> {
        validate_path_component("version", &self.version)?;
        let mut stack: Vec<&DependencyNode> = self.dependencies.iter().collect();
        while let Some(node) = stack.pop() {
            validate_path_component("name", node.name())?;
            validate_path_component("version", &node.version)?;
            stack.extend(node.dependencies.iter());
        }
        Ok(())
    }
}

/// A dependency as returned by the registry, with its own dependencies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyNode {
    /// Resolved version
    pub version: String,

    /// Package reference
    pub package: PackageRef,

    /// Archive download URL
    pub url: String,

    /// Nested dependencies
    #[serde(default)]
    pub dependencies: Vec<DependencyNode>,
}

impl DependencyNode {
    /// Package name
    pub fn name(&self) -> &str {
        &self.package.name
    }

    /// Install directory name: `{name}-{version}`
    pub fn dir_name(&self) -> String {
        format!("{}-{}", self.package.name, self.version)
    }
}

/// Package reference inside a dependency node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRef {
    /// Package name
    pub name: String,
}
