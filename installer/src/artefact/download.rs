//! Fetcher stage: HTTP retrieval of release assets and checksum sidecars.
//!
//! Provides a trait-based abstraction over the network so the pipeline can
//! be exercised in tests without touching a real server.

use log::debug;
use std::io::Read;
use std::sync::OnceLock;
use std::time::Duration;

/// Network timeout applied to every request.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Raw bytes of a downloaded asset, together with the URL they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedPayload {
    url: String,
    bytes: Vec<u8>,
}

impl DownloadedPayload {
    /// Wrap bytes retrieved from `url`.
    #[must_use]
    pub const fn new(url: String, bytes: Vec<u8>) -> Self {
        Self { url, bytes }
    }

    /// Return the source URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Return the payload bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the payload and return its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Trait for downloading release assets.
///
/// # Examples
///
/// ```
/// use shellbin_installer::artefact::download::HttpDownloader;
///
/// let downloader = HttpDownloader;
/// // Use downloader.fetch("https://…") in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArtefactDownloader {
    /// Fetch `url` and return the whole response body.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Status`] for any non-success HTTP status and
    /// [`DownloadError::Transport`] when the request could not complete.
    fn fetch(&self, url: &str) -> Result<DownloadedPayload, DownloadError>;
}

/// Errors arising from asset downloads.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// The server answered with a non-success status.
    #[error("HTTP {status} for {url}")]
    Status {
        /// The URL that was requested.
        url: String,
        /// The HTTP status code returned.
        status: u16,
    },

    /// The request failed before a status was received, or the body could
    /// not be read.
    #[error("download failed for {url}: {reason}")]
    Transport {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },
}

/// HTTP-based downloader using `ureq`.
pub struct HttpDownloader;

impl ArtefactDownloader for HttpDownloader {
    fn fetch(&self, url: &str) -> Result<DownloadedPayload, DownloadError> {
        debug!("GET {url}");
        let response = http_agent()
            .get(url)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;

        let mut bytes = Vec::new();
        response
            .into_body()
            .as_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| DownloadError::Transport {
                url: url.to_owned(),
                reason: e.to_string(),
            })?;

        debug!("fetched {} bytes from {url}", bytes.len());
        Ok(DownloadedPayload::new(url.to_owned(), bytes))
    }
}

/// Shared `ureq` agent with request timeout configuration.
fn http_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(DOWNLOAD_TIMEOUT))
            .build();
        ureq::Agent::new_with_config(config)
    })
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(status) => DownloadError::Status {
            url: url.to_owned(),
            status: *status,
        },
        other => DownloadError::Transport {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}
