//! Error types for livepm-core

use thiserror::Error;

/// Result type alias using livepm-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for livepm
#[derive(Error, Debug)]
pub enum Error {
    /// Package descriptor not found
    #[error("Package descriptor not found: {path}")]
    ConfigNotFound { path: String },

    /// Required environment variable is not set
    #[error("{variable} environment variable has not been set")]
    MissingEnvironment { variable: String },

    /// Release id not present in the package descriptor
    #[error("Failed to find release id: {release}")]
    UnknownRelease { release: String },

    /// Path variable referenced but not supplied
    #[error("Unknown path variable '{{{name}}}' in '{expression}'")]
    UnknownVariable { name: String, expression: String },

    /// Structurally invalid deploy structure
    #[error("Invalid deploy structure at '{key}': {message}")]
    InvalidDeploySpec { key: String, message: String },

    /// Unsupported glob pattern
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Mandatory deploy source is missing
    #[error("Source path does not exist: {path}")]
    MissingSource { path: String },

    /// Built-in deploy structure not found
    #[error("Unknown deploy structure preset: {name}")]
    UnknownPreset { name: String },

    /// Malformed `--options` entry
    #[error("Invalid deploy option '{option}', expected key=value")]
    InvalidOption { option: String },

    /// Registry responded with an error
    #[error("Registry error: {message}")]
    Registry { message: String },

    /// Unexpected HTTP status on a download
    #[error("Request to {url} failed with status {status}")]
    HttpStatus { url: String, status: u16 },

    /// Manifest file could not be parsed
    #[error("Failed to parse manifest {path}: {source}")]
    ManifestParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Archive creation or extraction failed
    #[error("Archive error: {message}")]
    Archive { message: String },

    /// External tool exited unsuccessfully
    #[error("{tool} failed: {message}")]
    ToolFailed { tool: String, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Zip error
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create a missing environment variable error
    pub fn missing_environment(variable: impl Into<String>) -> Self {
        Self::MissingEnvironment {
            variable: variable.into(),
        }
    }

    /// Create an unknown release error
    pub fn unknown_release(release: impl Into<String>) -> Self {
        Self::UnknownRelease {
            release: release.into(),
        }
    }

    /// Create an unknown variable error
    pub fn unknown_variable(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self::UnknownVariable {
            name: name.into(),
            expression: expression.into(),
        }
    }

    /// Create an invalid deploy structure error
    pub fn invalid_deploy_spec(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDeploySpec {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create an invalid pattern error
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Create a missing source error
    pub fn missing_source(path: impl Into<String>) -> Self {
        Self::MissingSource { path: path.into() }
    }

    /// Create an unknown preset error
    pub fn unknown_preset(name: impl Into<String>) -> Self {
        Self::UnknownPreset { name: name.into() }
    }

    /// Create an invalid option error
    pub fn invalid_option(option: impl Into<String>) -> Self {
        Self::InvalidOption {
            option: option.into(),
        }
    }

    /// Create a registry error
    pub fn registry(message: impl Into<String>) -> Self {
        Self::Registry {
            message: message.into(),
        }
    }

    /// Create an archive error
    pub fn archive(message: impl Into<String>) -> Self {
        Self::Archive {
            message: message.into(),
        }
    }

    /// Create a tool failure error
    pub fn tool_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }
}
