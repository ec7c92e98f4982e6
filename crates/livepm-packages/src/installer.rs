//! Recursive package installation
//!
//! Installing a package:
//!
//! 1. look up the latest release in the registry (not found ends the install)
//! 2. create `<root>/packages/<name>` (or `<root>/plugins/<name>` globally)
//! 3. download and extract the archive into `<name>-<version>/`
//! 4. record the package in the project manifest of the working directory
//! 5. walk the dependency tree depth-first; each dependency is recorded in the
//!    package directory's manifest and extracted next to the package
//!
//! Every dependency lands directly in the package directory, whatever its
//! depth. Names and versions from the request and the registry must each be a
//! single path component, and are checked before anything is written. A dependency seen twice (same name and version) is installed once.

use crate::extract::install_archive;
use crate::manifest::ManifestManager;
use crate::registry::{Lookup, RegistryClient};
use livepm_core::types::{validate_path_component, DependencyNode, PROJECT_MANIFEST_VERSION};
use livepm_core::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Directory for project-local installs
pub const LOCAL_INSTALL_DIR: &str = "packages";

/// Directory for global installs
pub const GLOBAL_INSTALL_DIR: &str = "plugins";

/// What to install and where
#[derive(Debug, Clone)]
pub struct InstallRequest {
    /// Package name
    pub name: String,

    /// Release id, e.g. `msvc2013_64`
    pub release: String,

    /// Root the install directory is created in
    pub target_root: PathBuf,

    /// Directory owning the project manifest
    pub working_dir: PathBuf,

    /// Install into `plugins/` instead of `packages/`
    pub global: bool,

    /// Extract the root package archive into every dependency directory
    /// instead of downloading each dependency
    pub reuse_root_archive: bool,
}

impl InstallRequest {
    /// A local install into `working_dir`
    pub fn new(
        name: impl Into<String>,
        release: impl Into<String>,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        let working_dir = working_dir.into();
        Self {
            name: name.into(),
            release: release.into(),
            target_root: working_dir.clone(),
            working_dir,
            global: false,
            reuse_root_archive: false,
        }
    }

    /// Install under `root/plugins` instead
    pub fn global(mut self, root: impl Into<PathBuf>) -> Self {
        self.target_root = root.into();
        self.global = true;
        self
    }

    /// Set [`reuse_root_archive`](Self::reuse_root_archive)
    pub fn with_reuse_root_archive(mut self, reuse: bool) -> Self {
        self.reuse_root_archive = reuse;
        self
    }

    /// `target_root/(plugins|packages)/name`
    pub fn plugin_directory(&self) -> PathBuf {
        let kind = if self.global {
            GLOBAL_INSTALL_DIR
        } else {
            LOCAL_INSTALL_DIR
        };
        self.target_root.join(kind).join(&self.name)
    }
}

/// A dependency that was installed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledDependency {
    /// Package name
    pub name: String,

    /// Installed version
    pub version: String,

    /// Extraction directory
    pub path: PathBuf,
}

/// Summary of a successful install
#[derive(Debug, Clone)]
pub struct InstallSummary {
    /// Package name
    pub name: String,

    /// Installed version
    pub version: String,

    /// Directory holding the package and its dependencies
    pub plugin_directory: PathBuf,

    /// Extraction directory of the package
    pub package_dir: PathBuf,

    /// Dependencies in install order
    pub dependencies: Vec<InstalledDependency>,

    /// Project manifest that records the package
    pub project_manifest: PathBuf,
}

/// Result of an install
#[derive(Debug, Clone)]
pub enum InstallOutcome {
    /// The registry does not have the package
    NotFound { name: String, status: u16 },

    /// The package and its dependencies were installed
    Installed(InstallSummary),
}

/// Installs packages from a registry
pub struct PackageInstaller {
    registry: RegistryClient,
}

impl PackageInstaller {
    /// Create an installer using `registry`
    pub fn new(registry: RegistryClient) -> Self {
        Self { registry }
    }

    /// The registry client
    pub fn registry(&self) -> &RegistryClient {
        &self.registry
    }

    /// Install a package and its dependency tree
    pub async fn install(&self, request: &InstallRequest) -> Result<InstallOutcome> {
        validate_path_component("name", &request.name)?;

        let metadata = match self
            .registry
            .fetch_latest(&request.name, &request.release)
            .await?
        {
            Lookup::Found(metadata) => metadata,
            Lookup::NotFound { status } => {
                warn!("Package not found: {} ({})", request.name, request.release);
                return Ok(InstallOutcome::NotFound {
                    name: request.name.clone(),
                    status,
                });
            }
        };
        metadata.validate()?;
        info!("Found {} {}", request.name, metadata.version);

        let plugin_directory = request.plugin_directory();
        std::fs::create_dir_all(&plugin_directory)?;

        let archive = self.registry.download(&metadata.url).await?;
        let package_dir = install_archive(
            &archive,
            &plugin_directory,
            &format!("{}-{}", request.name, metadata.version),
        )?;

        ManifestManager::record(
            &request.working_dir,
            PROJECT_MANIFEST_VERSION,
            &request.name,
            &metadata.version,
        )?;

        let dependencies = self
            .install_dependencies(
                &metadata.dependencies,
                &plugin_directory,
                &metadata.version,
                request.reuse_root_archive.then_some(archive.as_slice()),
            )
            .await?;

        Ok(InstallOutcome::Installed(InstallSummary {
            name: request.name.clone(),
            version: metadata.version,
            plugin_directory,
            package_dir,
            dependencies,
            project_manifest: ManifestManager::manifest_path(&request.working_dir),
        }))
    }

    /// Depth-first walk over the dependency tree, in registry order
    async fn install_dependencies(
        &self,
        roots: &[DependencyNode],
        plugin_directory: &Path,
        package_version: &str,
        root_archive: Option<&[u8]>,
    ) -> Result<Vec<InstalledDependency>> {
        let mut installed = Vec::new();
        let mut visited = HashSet::new();
        let mut stack: Vec<&DependencyNode> = roots.iter().rev().collect();

        while let Some(node) = stack.pop() {
            if !visited.insert((node.name(), node.version.as_str())) {
                debug!("Skipping {}: already installed", node.dir_name());
                continue;
            }
            info!("Installing dependency {} {}", node.name(), node.version);

            ManifestManager::record(plugin_directory, package_version, node.name(), &node.version)?;

            let path = match root_archive {
                Some(bytes) => install_archive(bytes, plugin_directory, &node.dir_name())?,
                None => {
                    let bytes = self.registry.download(&node.url).await?;
                    install_archive(&bytes, plugin_directory, &node.dir_name())?
                }
            };

            installed.push(InstalledDependency {
                name: node.name().to_string(),
                version: node.version.clone(),
                path,
            });
            stack.extend(node.dependencies.iter().rev());
        }

        Ok(installed)
    }
}
