//! Deploy pipeline
//!
//! Turns a package descriptor and a release id into a packed release bundle:
//!
//! 1. resolve the source, build, release and deploy directories
//! 2. check the release environment and build the variable table
//! 3. clean the bundle directory and run the release's deploy steps
//! 4. optionally generate documentation
//! 5. strip junk and archive
//!
//! Steps run sequentially and stop at the first error. Nothing is rolled back.

use crate::archive::{ArchiveBuilder, ArchiveConfig, ArchiveResult};
use crate::includes::generate_includes;
use crate::interpreter::{self, DeployReport};
use crate::presets;
use crate::variables::VariableTable;
use livepm_core::types::{DeployStep, PackageDescriptor, Release, StructureSource};
use livepm_core::{Error, PlatformKind, Result};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;
use tracing::{debug, info};

/// Default build directory name inside the source directory
pub const DEFAULT_BUILD_DIR: &str = "build";

/// Documentation directory inside the package directory
pub const DEFAULT_DOC_DIR: &str = "doc";

/// Runtime used for the documentation script
pub const DOC_RUNTIME: &str = "node";

/// Inputs of one deploy run
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Package directory or descriptor file
    pub package_path: PathBuf,

    /// Release to deploy
    pub release_id: String,

    /// Source directory, defaults to the descriptor's directory
    pub source: Option<PathBuf>,

    /// Build directory, defaults to `<source>/build`
    pub build: Option<PathBuf>,

    /// Extra path variables
    pub options: Vec<(String, String)>,

    /// Documentation generator script
    pub makedoc: Option<PathBuf>,

    /// Program the documentation script is run with
    pub doc_runtime: String,

    /// Environment the release variables are read from
    pub environment: BTreeMap<String, String>,

    /// Target platform, selects the bundle layout and archive format
    pub platform: PlatformKind,
}

impl DeployOptions {
    /// Options for the current process environment and platform
    pub fn new(package_path: impl Into<PathBuf>, release_id: impl Into<String>) -> Self {
        Self {
            package_path: package_path.into(),
            release_id: release_id.into(),
            source: None,
            build: None,
            options: Vec::new(),
            makedoc: None,
            doc_runtime: DOC_RUNTIME.to_string(),
            environment: process_environment(),
            platform: PlatformKind::current(),
        }
    }
}

/// The process environment, without entries that are not valid Unicode
pub fn process_environment() -> BTreeMap<String, String> {
    environment_from(std::env::vars_os())
}

fn environment_from<I>(vars: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(name, value)| match (name.into_string(), value.into_string()) {
            (Ok(name), Ok(value)) => Some((name, value)),
            (name, _) => {
                debug!("Skipping non-Unicode environment entry {:?}", name);
                None
            }
        })
        .collect()
}

/// Parse `key=value[,key=value]`
pub fn parse_options(input: &str) -> Result<Vec<(String, String)>> {
    input
        .split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), value.trim().to_string()))
            }
            _ => Err(Error::invalid_option(pair)),
        })
        .collect()
}

/// Directories of one deploy run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployLayout {
    /// Source directory
    pub source_dir: PathBuf,

    /// Build directory
    pub build_dir: PathBuf,

    /// Compiler output: `<build>/<compiler>`
    pub release_dir: PathBuf,

    /// Bundle name: `{name}-{version}-{release}`
    pub build_name: String,

    /// Bundle directory, next to the release directory
    pub deploy_dir: PathBuf,

    /// Package directory name inside the bundle
    pub release_name: String,

    /// Root the deploy structures write into
    pub deploy_root: PathBuf,
}

/// Summary of a finished deploy
#[derive(Debug, Clone)]
pub struct DeployOutcome {
    /// Directories used
    pub layout: DeployLayout,

    /// Accumulated copy counters of all copy steps
    pub report: DeployReport,

    /// Forwarding headers written
    pub headers_generated: usize,

    /// Documentation output directory, if generated
    pub documentation: Option<PathBuf>,

    /// The packed bundle
    pub archive: ArchiveResult,
}

/// A loaded descriptor ready to deploy one release
pub struct DeployPipeline {
    descriptor_path: PathBuf,
    descriptor: PackageDescriptor,
    options: DeployOptions,
}

impl DeployPipeline {
    /// Find and parse the descriptor and check the release id
    pub fn load(options: DeployOptions) -> Result<Self> {
        let descriptor_path = PackageDescriptor::find(&std::path::absolute(&options.package_path)?)?;
        info!("Parsing package file {:?}", descriptor_path);

        let descriptor = PackageDescriptor::load(&descriptor_path)?;
        descriptor.release(&options.release_id)?;

        Ok(Self {
            descriptor_path,
            descriptor,
            options,
        })
    }

    /// The parsed descriptor
    pub fn descriptor(&self) -> &PackageDescriptor {
        &self.descriptor
    }

    /// Path of the parsed descriptor
    pub fn descriptor_path(&self) -> &Path {
        &self.descriptor_path
    }

    /// The release being deployed
    pub fn release(&self) -> Result<&Release> {
        self.descriptor.release(&self.options.release_id)
    }

    /// Compute the directories of this run
    pub fn layout(&self) -> Result<DeployLayout> {
        let release = self.release()?;

        let source_dir = match &self.options.source {
            Some(source) => std::path::absolute(source)?,
            None => self
                .descriptor_path
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| Error::config_not_found(self.descriptor_path.display().to_string()))?,
        };
        let build_dir = match &self.options.build {
            Some(build) => std::path::absolute(build)?,
            None => source_dir.join(DEFAULT_BUILD_DIR),
        };
        let release_dir = build_dir.join(&release.compiler);

        let build_name = self.descriptor.release_name(&self.options.release_id);
        let deploy_dir = sibling(&release_dir, &build_name);
        let release_name = self.descriptor.package_dir_name();

        let deploy_root = if self.options.platform == PlatformKind::MacOs && release.bundle.is_some() {
            deploy_dir.clone()
        } else {
            deploy_dir.join(&release_name)
        };

        Ok(DeployLayout {
            source_dir,
            build_dir,
            release_dir,
            build_name,
            deploy_dir,
            release_name,
            deploy_root,
        })
    }

    /// Check the release environment and build the variable table
    pub fn variables(&self, layout: &DeployLayout) -> Result<VariableTable> {
        let release = self.release()?;
        let environment = release.init_environment(&self.options.environment)?;

        let mut table = VariableTable::new();
        for (name, value) in &environment {
            info!("Environment {} [{}]: {:?}", name, release.environment[name], value);
            table.insert(name.to_lowercase(), value);
        }
        if let Some((_, qtdir)) = environment.iter().find(|(name, _)| name == "QTDIR") {
            table.insert("qtbuild", sibling(Path::new(qtdir), &release.compiler));
        }

        table.insert("source", &layout.source_dir);
        table.insert("build", &layout.build_dir);
        table.insert("release", &layout.release_dir);
        table.insert("deploy", &layout.deploy_root);

        for (name, value) in &self.options.options {
            table.insert(name.clone(), value);
        }

        debug!("Variable table has {} entries", table.len());
        Ok(table)
    }

    /// Run every stage
    pub fn run(&self) -> Result<DeployOutcome> {
        let start = Instant::now();
        let release = self.release()?;
        let layout = self.layout()?;

        info!("Deploying {} ({})", layout.build_name, release.compiler);
        info!("Source dir: {:?}", layout.source_dir);
        info!("Release dir: {:?}", layout.release_dir);

        let variables = self.variables(&layout)?;

        if layout.deploy_dir.is_dir() {
            info!("Cleaning deploy dir: {:?}", layout.deploy_dir);
            fs::remove_dir_all(&layout.deploy_dir)?;
        }
        info!("Creating deploy dir: {:?}", layout.deploy_root);
        fs::create_dir_all(&layout.deploy_root)?;

        let mut report = DeployReport::default();
        let mut headers_generated = 0;
        for step in &release.deploy {
            info!("*** {} ***", step.to_string().to_uppercase());
            match step {
                DeployStep::Copy { structure } => {
                    let spec = match structure {
                        StructureSource::Preset(name) => Cow::Owned(presets::load(name)?),
                        StructureSource::Inline(spec) => Cow::Borrowed(spec),
                    };
                    let step_report = interpreter::apply(&spec, &layout.deploy_root, &variables)?;
                    report.files_copied += step_report.files_copied;
                    report.directories_copied += step_report.directories_copied;
                    report.patterns_without_match += step_report.patterns_without_match;
                }
                DeployStep::Includes { location, headers } => {
                    let written = generate_includes(&layout.deploy_root.join(location), headers)?;
                    headers_generated += written.len();
                }
            }
        }

        let documentation = match &self.options.makedoc {
            Some(script) => Some(self.make_documentation(script, release, &layout)?),
            None => None,
        };

        info!("Creating archive...");
        let config = ArchiveConfig::new().with_bundle(release.bundle.clone());
        let archive = ArchiveBuilder::new(config).finalize(&layout.deploy_root, self.options.platform)?;

        info!("Deploy finished in {:.1}s", start.elapsed().as_secs_f64());
        Ok(DeployOutcome {
            layout,
            report,
            headers_generated,
            documentation,
            archive,
        })
    }

    fn make_documentation(&self, script: &Path, release: &Release, layout: &DeployLayout) -> Result<PathBuf> {
        let script = std::path::absolute(script)?;
        let output_path = documentation_dir(release, layout);
        fs::create_dir_all(&output_path)?;

        let runtime = self.options.doc_runtime.as_str();
        info!("Creating documentation in {:?}", output_path);
        let mut command = Command::new(runtime);
        command
            .arg(&script)
            .arg("--output-path")
            .arg(&output_path)
            .arg(&layout.source_dir)
            .envs(&self.options.environment);
        if let Some(dir) = script.parent() {
            command.current_dir(dir);
        }

        let output = command
            .output()
            .map_err(|e| Error::tool_failed(runtime, e.to_string()))?;
        for line in String::from_utf8_lossy(&output.stdout).lines() {
            info!("LIVEDOC: {}", line);
        }
        if !output.status.success() {
            return Err(Error::tool_failed(
                runtime,
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(output_path)
    }
}

/// `<deploy>/<document>` when the release names one, else `<deploy>/<package>/doc`
fn documentation_dir(release: &Release, layout: &DeployLayout) -> PathBuf {
    match &release.document {
        Some(document) => layout.deploy_dir.join(document),
        None => layout.deploy_dir.join(&layout.release_name).join(DEFAULT_DOC_DIR),
    }
}

/// `dir/../name`, normalized when `dir` has a parent
fn sibling(dir: &Path, name: &str) -> PathBuf {
    match dir.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(name),
        _ => dir.join("..").join(name),
    }
}
