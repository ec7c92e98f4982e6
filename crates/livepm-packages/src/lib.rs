//! Livepm Packages
//!
//! Installs packages from the livekeys registry.
//!
//! # Features
//!
//! - **Registry lookups**: latest release of a package for a release id
//! - **Recursive install**: the dependency tree is flattened into the
//!   package's install directory
//! - **Manifests**: `live.packages.json` records what each directory holds,
//!   merged across installs
//!
//! # Examples
//!
//! ```no_run
//! use livepm_packages::{InstallOutcome, InstallRequest, PackageInstaller, RegistryClient};
//!
//! #[tokio::main]
//! async fn main() -> livepm_core::Result<()> {
//!     let registry = RegistryClient::new("https://livekeys.io/api")?;
//!     let installer = PackageInstaller::new(registry);
//!
//!     let request = InstallRequest::new("lcvcore", "gcc_64", std::env::current_dir()?);
//!     if let InstallOutcome::Installed(summary) = installer.install(&request).await? {
//!         println!("Installed {} {}", summary.name, summary.version);
//!     }
//!     Ok(())
//! }
//! ```

pub mod extract;
pub mod installer;
pub mod manifest;
pub mod registry;

// Re-export commonly used types
pub use installer::{
    InstallOutcome, InstallRequest, InstallSummary, InstalledDependency, PackageInstaller,
    GLOBAL_INSTALL_DIR, LOCAL_INSTALL_DIR,
};
pub use manifest::ManifestManager;
pub use registry::{Lookup, RegistryClient, DEFAULT_SERVER_URL};
