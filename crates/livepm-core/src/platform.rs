//! Platform detection
//!
//! Deploy archives differ per platform family, so the pipeline branches on
//! [`PlatformKind`] instead of comparing platform names.

use std::fmt;

/// Platform families with distinct packaging conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformKind {
    /// Windows family: zip archives
    Windows,
    /// macOS: app bundle, optional disk image, gzip tarball
    MacOs,
    /// Linux and other Unix systems: gzip tarball
    Unix,
}

impl PlatformKind {
    /// Detect the platform this binary was built for
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            PlatformKind::Windows
        } else if cfg!(target_os = "macos") {
            PlatformKind::MacOs
        } else {
            PlatformKind::Unix
        }
    }

    /// File extension of the archive produced on this platform
    pub fn archive_extension(&self) -> &'static str {
        match self {
            PlatformKind::Windows => "zip",
            PlatformKind::MacOs | PlatformKind::Unix => "tar.gz",
        }
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformKind::Windows => write!(f, "Windows"),
            PlatformKind::MacOs => write!(f, "macOS"),
            PlatformKind::Unix => write!(f, "Unix"),
        }
    }
}
