//! Install command

use anyhow::{anyhow, Context, Result};
use livepm_packages::{InstallOutcome, InstallRequest, PackageInstaller, RegistryClient};
use std::path::PathBuf;
use tracing::debug;

use crate::cli::InstallArgs;
use crate::output;

/// Environment variable naming the livekeys installation
pub const LIVEKEYS_DIR_ENV: &str = "LIVEKEYS_DIR";

/// Root of the livekeys installation, for global installs
fn livekeys_dir() -> Result<PathBuf> {
    std::env::var_os(LIVEKEYS_DIR_ENV)
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("{} environment variable has not been set", LIVEKEYS_DIR_ENV))
}

/// Build the install request for the current directory
fn install_request(args: &InstallArgs) -> Result<InstallRequest> {
    let working_dir = std::env::current_dir().context("Failed to read the current directory")?;

    let request = InstallRequest::new(&args.name, &args.release, working_dir)
        .with_reuse_root_archive(args.reuse_root_archive);
    if args.install_globally {
        return Ok(request.global(livekeys_dir()?));
    }
    Ok(request)
}

pub async fn run(args: InstallArgs) -> Result<()> {
    output::header(&format!("Install {}", args.name));

    let request = install_request(&args)?;
    debug!("Install request: {:?}", request);
    output::kv("Release", &args.release);
    output::kv("Server", &args.server_url);
    output::kv("Target", &request.plugin_directory().display().to_string());

    let registry = RegistryClient::new(&args.server_url)?;
    let installer = PackageInstaller::new(registry);

    let spinner = output::spinner(&format!("Installing {}...", args.name));
    let outcome = installer.install(&request).await;
    spinner.finish_and_clear();

    match outcome.with_context(|| format!("Failed to install {}", args.name))? {
        InstallOutcome::NotFound { name, status } => {
            output::error(&format!("Package not found: {} (status {})", name, status));
        }
        InstallOutcome::Installed(summary) => {
            output::kv("Version", &summary.version);
            output::kv("Location", &summary.package_dir.display().to_string());
            for dependency in &summary.dependencies {
                output::item(&format!("{} {}", dependency.name, dependency.version));
            }
            output::kv("Manifest", &summary.project_manifest.display().to_string());
            output::success(&format!("Installed {} {}", summary.name, summary.version));
        }
    }

    Ok(())
}
