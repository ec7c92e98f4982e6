//! Release archive creation.
//!
//! After the deploy tree is assembled, junk files are stripped and the bundle
//! is packed in the platform's format:
//! - Windows: zip of the bundle directory (the parent of the deploy root), so
//!   the archive holds a named top folder
//! - macOS: optional disk image of the app bundle, then a gzip tarball of the
//!   deploy root's contents
//! - other Unix: gzip tarball of the bundle directory
//!
//! Archives are written next to the directory they pack. A failed archive is
//! left where it is.

use crate::filters::JunkFilter;
use crate::glob::GlobMatcher;
use flate2::write::GzEncoder;
use flate2::Compression;
use livepm_core::{Error, PlatformKind, Result};
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use tar::Builder as TarBuilder;
use tracing::{debug, info, warn};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Default gzip/deflate compression level
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Disk image tool used on macOS
pub const DMG_TOOL: &str = "create-dmg";

/// Result of finalizing a deploy tree.
#[derive(Debug, Clone)]
pub struct ArchiveResult {
    /// Path to the created archive
    pub archive_path: PathBuf,

    /// Junk files removed before packing
    pub removed: Vec<PathBuf>,

    /// Number of files in the archive
    pub file_count: usize,

    /// Size of the archive in bytes
    pub size_bytes: u64,
}

/// Configuration for archive creation.
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    /// Compression level (1-9)
    pub compression_level: u32,

    /// Extra junk file name patterns
    pub junk_patterns: Vec<String>,

    /// App bundle to turn into a disk image on macOS
    pub bundle: Option<String>,
}

impl ArchiveConfig {
    /// Creates a default archive configuration.
    pub fn new() -> Self {
        Self {
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            junk_patterns: Vec::new(),
            bundle: None,
        }
    }

    /// Sets the compression level.
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level.clamp(1, 9);
        self
    }

    /// Adds junk file name patterns.
    pub fn with_junk_patterns(mut self, patterns: Vec<String>) -> Self {
        self.junk_patterns = patterns;
        self
    }

    /// Sets the macOS app bundle name.
    pub fn with_bundle(mut self, bundle: Option<String>) -> Self {
        self.bundle = bundle;
        self
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Platform-specific packing of a deploy root.
pub trait ArchiveStrategy {
    /// Hook run before packing.
    fn prepare(&self, _root: &Path) -> Result<()> {
        Ok(())
    }

    /// Packs the deploy root, returning the archive path and file count.
    fn pack(&self, root: &Path) -> Result<(PathBuf, usize)>;
}

/// Windows: zip of the bundle directory.
pub struct ZipStrategy {
    compression_level: u32,
}

impl ArchiveStrategy for ZipStrategy {
    fn pack(&self, root: &Path) -> Result<(PathBuf, usize)> {
        let base = bundle_dir(root)?;
        let archive = with_suffix(base, PlatformKind::Windows.archive_extension());
        let count = write_zip(base, &archive, self.compression_level)?;
        Ok((archive, count))
    }
}

/// macOS: disk image hook, then a tarball of the deploy root itself.
pub struct MacOsStrategy {
    compression_level: u32,
    bundle: Option<String>,
}

impl ArchiveStrategy for MacOsStrategy {
    fn prepare(&self, root: &Path) -> Result<()> {
        let Some(bundle) = &self.bundle else {
            return Ok(());
        };
        if which::which(DMG_TOOL).is_err() {
            info!("{} not found, skipping disk image", DMG_TOOL);
            return Ok(());
        }

        info!("Creating disk image from {}", bundle);
        let output = Command::new(DMG_TOOL)
            .arg(bundle)
            .current_dir(root)
            .output()?;
        debug!("{}: {}", DMG_TOOL, String::from_utf8_lossy(&output.stdout).trim());
        if !output.status.success() {
            return Err(Error::tool_failed(
                DMG_TOOL,
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let parent = bundle_dir(root)?;
        for image in GlobMatcher::new("*.dmg")?.match_dir(root)? {
            info!("Disk image: {}", image);
            std::fs::rename(root.join(&image), parent.join(&image))?;
        }
        Ok(())
    }

    fn pack(&self, root: &Path) -> Result<(PathBuf, usize)> {
        let archive = with_suffix(root, PlatformKind::MacOs.archive_extension());
        let count = write_tar_gz(root, &archive, self.compression_level)?;
        Ok((archive, count))
    }
}

/// Other Unix: tarball of the bundle directory.
pub struct TarGzStrategy {
    compression_level: u32,
}

impl ArchiveStrategy for TarGzStrategy {
    fn pack(&self, root: &Path) -> Result<(PathBuf, usize)> {
        let base = bundle_dir(root)?;
        let archive = with_suffix(base, PlatformKind::Unix.archive_extension());
        let count = write_tar_gz(base, &archive, self.compression_level)?;
        Ok((archive, count))
    }
}

/// Selects the packing strategy for a platform.
pub fn strategy_for(platform: PlatformKind, config: &ArchiveConfig) -> Box<dyn ArchiveStrategy> {
    match platform {
        PlatformKind::Windows => Box::new(ZipStrategy {
            compression_level: config.compression_level,
        }),
        PlatformKind::MacOs => Box::new(MacOsStrategy {
            compression_level: config.compression_level,
            bundle: config.bundle.clone(),
        }),
        PlatformKind::Unix => Box::new(TarGzStrategy {
            compression_level: config.compression_level,
        }),
    }
}

/// Archive builder for deploy trees.
pub struct ArchiveBuilder {
    config: ArchiveConfig,
}

impl ArchiveBuilder {
    /// Creates a new archive builder.
    pub fn new(config: ArchiveConfig) -> Self {
        Self { config }
    }

    /// Strips junk from `root` and packs it for `platform`.
    pub fn finalize(&self, root: &Path, platform: PlatformKind) -> Result<ArchiveResult> {
        let filter = JunkFilter::new(&self.config.junk_patterns)?;
        let removed = filter.strip(root)?;
        info!("Removed {} junk files", removed.len());

        let strategy = strategy_for(platform, &self.config);
        strategy.prepare(root)?;
        let (archive_path, file_count) = strategy.pack(root)?;
        let size_bytes = std::fs::metadata(&archive_path)?.len();

        info!(
            "Created {} archive {:?} ({} files, {} bytes)",
            platform, archive_path, file_count, size_bytes
        );

        Ok(ArchiveResult {
            archive_path,
            removed,
            file_count,
            size_bytes,
        })
    }
}

/// The directory holding the deploy root
fn bundle_dir(root: &Path) -> Result<&Path> {
    root.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| Error::archive(format!("{:?} has no parent directory", root)))
}

/// `path` with `.{extension}` appended to its last component
fn with_suffix(path: &Path, extension: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// Entries below `base` (excluding `base`) with `/`-separated relative names
fn archive_entries(base: &Path) -> Result<Vec<(PathBuf, String, bool)>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(base).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        let relative = entry
            .path()
            .strip_prefix(base)
            .map_err(|e| Error::archive(format!("Failed to compute relative path: {}", e)))?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let is_dir = entry.file_type().is_dir();
        entries.push((entry.into_path(), name, is_dir));
    }
    Ok(entries)
}

/// Writes the contents of `base` as a gzip tarball.
pub fn write_tar_gz(base: &Path, archive: &Path, level: u32) -> Result<usize> {
    let entries = archive_entries(base)?;
    if archive.starts_with(base) {
        warn!("Archive {:?} is inside the packed directory", archive);
    }

    let file = File::create(archive)?;
    let encoder = GzEncoder::new(BufWriter::new(file), Compression::new(level));
    let mut tar = TarBuilder::new(encoder);

    let mut count = 0;
    for (path, name, is_dir) in entries {
        if is_dir {
            tar.append_dir(&name, &path)?;
        } else {
            tar.append_path_with_name(&path, &name)?;
            count += 1;
        }
    }

    let encoder = tar.into_inner()?;
    let mut writer = encoder.finish()?;
    writer.flush()?;
    Ok(count)
}

/// Writes the contents of `base` as a zip archive.
pub fn write_zip(base: &Path, archive: &Path, level: u32) -> Result<usize> {
    let entries = archive_entries(base)?;

    let file = File::create(archive)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(i64::from(level)));

    let mut count = 0;
    for (path, name, is_dir) in entries {
        if is_dir {
            zip.add_directory(name, options)?;
        } else {
            zip.start_file(name, options)?;
            let mut source = File::open(&path)?;
            std::io::copy(&mut source, &mut zip)?;
            count += 1;
        }
    }

    let mut writer = zip.finish()?;
    writer.flush()?;
    Ok(count)
}
