//! Deploy command

use anyhow::{Context, Result};
use livepm_deploy::{parse_options, DeployOptions, DeployPipeline};
use tracing::debug;

use crate::cli::DeployArgs;
use crate::output;

/// Build pipeline options from the command line and process environment
fn deploy_options(args: DeployArgs) -> Result<DeployOptions> {
    let mut options = DeployOptions::new(args.package_path.into_std_path_buf(), args.release_id);
    options.source = args.source.map(|p| p.into_std_path_buf());
    options.build = args.build.map(|p| p.into_std_path_buf());
    options.makedoc = args.makedoc.map(|p| p.into_std_path_buf());
    if let Some(extra) = &args.options {
        options.options = parse_options(extra)?;
    }
    Ok(options)
}

pub async fn run(args: DeployArgs) -> Result<()> {
    let options = deploy_options(args)?;
    debug!(
        "Deploying {:?} release {}",
        options.package_path, options.release_id
    );
    let release_id = options.release_id.clone();

    let pipeline = DeployPipeline::load(options).context("Failed to load package")?;
    let descriptor = pipeline.descriptor();

    output::header(&format!("Package {}", descriptor.name));
    output::kv("File", &pipeline.descriptor_path().display().to_string());
    output::kv("Version", &descriptor.version);
    if !descriptor.components.is_empty() {
        output::kv("Modules", "");
        for description in descriptor.components.values() {
            output::item(description);
        }
    }
    if !descriptor.dependencies.is_empty() {
        output::kv("Dependencies", "");
        for dependency in &descriptor.dependencies {
            output::item(dependency);
        }
    }

    let layout = pipeline.layout()?;
    let release = pipeline.release()?;
    output::header(&format!("Release {}", release_id));
    output::kv("Source dir", &layout.source_dir.display().to_string());
    output::kv("Release dir", &layout.release_dir.display().to_string());
    output::kv("Compiler", &release.compiler);
    output::kv("Deploy dir", &layout.deploy_dir.display().to_string());

    let outcome = tokio::task::spawn_blocking(move || pipeline.run())
        .await
        .context("Deploy task failed")?
        .context("Deploy failed")?;

    output::header("Summary");
    output::kv("Files copied", &outcome.report.files_copied.to_string());
    output::kv("Headers generated", &outcome.headers_generated.to_string());
    output::kv("Junk removed", &outcome.archive.removed.len().to_string());
    if let Some(doc) = &outcome.documentation {
        output::kv("Documentation", &doc.display().to_string());
    }
    if outcome.report.patterns_without_match > 0 {
        output::warning(&format!(
            "{} optional patterns matched nothing",
            outcome.report.patterns_without_match
        ));
    }
    output::info(&format!(
        "Archive: {} ({} bytes)",
        outcome.archive.archive_path.display(),
        outcome.archive.size_bytes
    ));
    output::success("Done");

    Ok(())
}
