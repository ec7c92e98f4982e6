//! Package registry client
//!
//! The registry resolves a package name and release id to the latest
//! published archive:
//!
//! ```text
//! GET {server}/package/{name}/latest/{release}
//! ```
//!
//! Any non-2xx answer means the package is not available for that release.
//! There is no request timeout.

use livepm_core::types::PackageMetadata;
use livepm_core::{Error, Result};
use tracing::{debug, info, warn};

/// Default registry server
pub const DEFAULT_SERVER_URL: &str = "https://livekeys.io/api";

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("livepm/", env!("CARGO_PKG_VERSION"));

/// Result of a registry lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The registry resolved the package
    Found(PackageMetadata),

    /// The registry answered with a non-success status
    NotFound { status: u16 },
}

impl Lookup {
    /// The resolved metadata, if found
    pub fn found(self) -> Option<PackageMetadata> {
        match self {
            Lookup::Found(metadata) => Some(metadata),
            Lookup::NotFound { .. } => None,
        }
    }
}

/// HTTP client for the package registry
#[derive(Debug, Clone)]
pub struct RegistryClient {
    client: reqwest::Client,
    server_url: String,
}

impl RegistryClient {
    /// Create a client for `server_url`
    pub fn new(server_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            server_url: server_url.into(),
        })
    }

    /// The registry server
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Lookup URL of the latest release of a package
    pub fn latest_url(&self, name: &str, release: &str) -> String {
        format!(
            "{}/package/{}/latest/{}",
            self.server_url.trim_end_matches('/'),
            name,
            release
        )
    }

    /// Resolve the latest release of `name` for `release`
    ///
    /// A non-success status is returned as [`Lookup::NotFound`]; transport
    /// failures and malformed bodies are errors.
    pub async fn fetch_latest(&self, name: &str, release: &str) -> Result<Lookup> {
        let url = self.latest_url(name, release);
        info!("Requesting package info: {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("Registry returned {} for {}", status, url);
            return Ok(Lookup::NotFound {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let metadata: PackageMetadata = serde_json::from_str(&body).map_err(|e| {
            Error::registry(format!("Invalid package info for '{}': {}", name, e))
        })?;

        debug!(
            "Resolved {} {} with {} dependencies",
            name,
            metadata.version,
            metadata.dependencies.len()
        );
        Ok(Lookup::Found(metadata))
    }

    /// Download an archive
    pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
        info!("Downloading: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        debug!("Downloaded {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}
