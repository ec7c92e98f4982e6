//! Package descriptor (live.package.json)
//!
//! The descriptor names the package, its version and the releases it can be
//! deployed as. Each release lists the environment it needs and the deploy
//! steps that assemble its bundle.

use crate::error::{Error, Result};
use crate::types::DeploySpec;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Descriptor file name looked up inside package directories
pub const PACKAGE_FILE_NAME: &str = "live.package.json";

/// Parsed package descriptor
#[derive(Debug, Clone, Deserialize)]
pub struct PackageDescriptor {
    /// Package name
    pub name: String,

    /// Package version
    pub version: String,

    /// Components shipped by this package (id -> description)
    #[serde(default)]
    pub components: BTreeMap<String, String>,

    /// Third-party dependencies, informational
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Releases keyed by release id
    #[serde(default)]
    pub releases: BTreeMap<String, Release>,
}

impl PackageDescriptor {
    /// Locate the descriptor for a path
    ///
    /// A directory resolves to the `live.package.json` inside it; a file is
    /// used as is.
    pub fn find(path: &Path) -> Result<PathBuf> {
        if path.is_dir() {
            let candidate = path.join(PACKAGE_FILE_NAME);
            if candidate.is_file() {
                return Ok(candidate);
            }
            return Err(Error::config_not_found(candidate.display().to_string()));
        }
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        Err(Error::config_not_found(path.display().to_string()))
    }

    /// Load and parse a descriptor file
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading package descriptor from {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse descriptor JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Whether a release id is declared
    pub fn has_release(&self, id: &str) -> bool {
        self.releases.contains_key(id)
    }

    /// Get a release by id
    pub fn release(&self, id: &str) -> Result<&Release> {
        self.releases
            .get(id)
            .ok_or_else(|| Error::unknown_release(id))
    }

    /// Bundle directory name: `{name}-{version}-{release}`
    pub fn release_name(&self, release_id: &str) -> String {
        format!("{}-{}-{}", self.name, self.version, release_id)
    }

    /// Name of the package directory inside the bundle
    pub fn package_dir_name(&self) -> String {
        self.name.replace('.', "-")
    }
}

/// A deployable release of a package
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    /// Compiler id; also the build subdirectory holding the release output
    pub compiler: String,

    /// Environment variables this release needs (name -> description)
    #[serde(default)]
    pub environment: BTreeMap<String, String>,

    /// Deploy steps, executed in order
    #[serde(default)]
    pub deploy: Vec<DeployStep>,

    /// Documentation output directory, relative to the bundle directory
    #[serde(default)]
    pub document: Option<String>,

    /// Application bundle shipped on macOS (e.g. `livekeys.app`)
    #[serde(default)]
    pub bundle: Option<String>,
}

impl Release {
    /// Check the required environment against `env`, returning the values in
    /// declaration order
    pub fn init_environment(
        &self,
        env: &BTreeMap<String, String>,
    ) -> Result<Vec<(String, String)>> {
        self.environment
            .keys()
            .map(|name| {
                env.get(name)
                    .map(|value| (name.clone(), value.clone()))
                    .ok_or_else(|| Error::missing_environment(name))
            })
            .collect()
    }
}

/// A single deploy step
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeployStep {
    /// Copy files according to a deploy structure
    Copy { structure: StructureSource },

    /// Generate forwarding include headers
    Includes {
        /// Directory relative to the deploy root
        location: String,
        /// Generated header name -> included file
        headers: BTreeMap<String, String>,
    },
}

impl fmt::Display for DeployStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployStep::Copy {
                structure: StructureSource::Preset(name),
            } => write!(f, "copy files ({})", name),
            DeployStep::Copy { .. } => write!(f, "copy files"),
            DeployStep::Includes { location, .. } => write!(f, "generate includes ({})", location),
        }
    }
}

/// A deploy structure given inline or by built-in preset name
#[derive(Debug, Clone)]
pub enum StructureSource {
    /// Name of a structure compiled into the tool
    Preset(String),
    /// Inline structure
    Inline(DeploySpec),
}

impl<'de> Deserialize<'de> for StructureSource {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct StructureSourceVisitor;

        impl<'de> Visitor<'de> for StructureSourceVisitor {
            type Value = StructureSource;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a preset name or an inline deploy structure")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<Self::Value, E> {
                Ok(StructureSource::Preset(value.to_string()))
            }

            fn visit_map<A>(self, map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                DeploySpec::deserialize(de::value::MapAccessDeserializer::new(map))
                    .map(StructureSource::Inline)
            }
        }

        deserializer.deserialize_any(StructureSourceVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DESCRIPTOR: &str = r#"{
        "name": "live.cv",
        "version": "1.4.0",
        "components": { "lcvcore": "Core image types" },
        "releases": {
            "msvc2013_64": {
                "compiler": "msvc2013_64",
                "environment": { "QTDIR": "Qt install", "OPENCV_DIR": "OpenCV install" },
                "deploy": [
                    { "type": "copy", "structure": "livecv-msvc2013_64" },
                    { "type": "copy", "structure": { "{source}/samples": "-" } },
                    { "type": "includes", "location": "api/include", "headers": { "QMat": "qmat.h" } }
                ]
            }
        }
    }"#;

    #[test]
    fn test_parse_descriptor() {
        let descriptor = PackageDescriptor::from_json(DESCRIPTOR).unwrap();
        assert_eq!(descriptor.name, "live.cv");
        assert!(descriptor.has_release("msvc2013_64"));
        assert!(!descriptor.has_release("gcc_64"));

        let release = descriptor.release("msvc2013_64").unwrap();
        assert_eq!(release.deploy.len(), 3);
        assert!(matches!(
            &release.deploy[0],
            DeployStep::Copy { structure: StructureSource::Preset(name) } if name == "livecv-msvc2013_64"
        ));
        assert!(matches!(
            &release.deploy[1],
            DeployStep::Copy { structure: StructureSource::Inline(spec) } if spec.len() == 1
        ));
        assert!(matches!(&release.deploy[2], DeployStep::Includes { .. }));
    }

    #[test]
    fn test_invalid_inline_structure_reports_cause() {
        let json = r#"{
            "name": "live.cv",
            "version": "1.4.0",
            "releases": {
                "gcc_64": {
                    "compiler": "gcc_64",
                    "deploy": [
                        { "type": "copy", "structure": { "{source}": { "*a*b": "-" } } }
                    ]
                }
            }
        }"#;

        let message = PackageDescriptor::from_json(json).unwrap_err().to_string();
        assert!(message.contains("only a single '*' is supported"), "{}", message);
        assert!(!message.contains("did not match any variant"), "{}", message);
    }

    #[test]
    fn test_unknown_release() {
        let descriptor = PackageDescriptor::from_json(DESCRIPTOR).unwrap();
        let err = descriptor.release("gcc_64").unwrap_err();
        assert!(matches!(err, Error::UnknownRelease { .. }));
    }

    #[test]
    fn test_names() {
        let descriptor = PackageDescriptor::from_json(DESCRIPTOR).unwrap();
        assert_eq!(descriptor.release_name("msvc2013_64"), "live.cv-1.4.0-msvc2013_64");
        assert_eq!(descriptor.package_dir_name(), "live-cv");
    }

    #[test]
    fn test_init_environment() {
        let descriptor = PackageDescriptor::from_json(DESCRIPTOR).unwrap();
        let release = descriptor.release("msvc2013_64").unwrap();

        let mut env = BTreeMap::new();
        env.insert("QTDIR".to_string(), "/opt/qt".to_string());
        let err = release.init_environment(&env).unwrap_err();
        assert!(matches!(err, Error::MissingEnvironment { ref variable } if variable == "OPENCV_DIR"));

        env.insert("OPENCV_DIR".to_string(), "/opt/opencv".to_string());
        let values = release.init_environment(&env).unwrap();
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_find_descriptor() {
        let temp_dir = TempDir::new().unwrap();
        assert!(PackageDescriptor::find(temp_dir.path()).is_err());

        let file = temp_dir.path().join(PACKAGE_FILE_NAME);
        std::fs::write(&file, DESCRIPTOR).unwrap();
        assert_eq!(PackageDescriptor::find(temp_dir.path()).unwrap(), file);
        assert_eq!(PackageDescriptor::find(&file).unwrap(), file);
    }
}
