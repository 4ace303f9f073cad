//! Fetch pipeline orchestrator.
//!
//! Runs the five stages in order for one tool and one platform:
//!
//! 1. resolve the platform to a release asset (no I/O);
//! 2. fetch the asset, and its checksum sidecar when the tool uses one;
//! 3. verify the payload digest;
//! 4. extract the executable (or file set) in memory;
//! 5. install into the destination directory.
//!
//! The first failure stops the run. Nothing is written to the destination
//! before verification and extraction have both succeeded.

use camino::Utf8Path;
use log::{debug, info};
use std::io::Write;

use crate::artefact::download::{ArtefactDownloader, DownloadError, HttpDownloader};
use crate::artefact::extraction::{ExtractionError, extract};
use crate::artefact::install::{InstallError, InstalledFile, install_extracted};
use crate::artefact::platform::PlatformKey;
use crate::artefact::table::UnsupportedPlatform;
use crate::artefact::verification::{IntegrityError, parse_sidecar, verify};
use crate::output::write_stderr_line;
use crate::tool::{ExpectedDigest, ToolSpec};

/// Inputs for one pipeline run.
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig<'a> {
    /// The tool to fetch.
    pub tool: &'a ToolSpec,
    /// The platform to fetch it for.
    pub platform: &'a PlatformKey,
    /// Directory the executable is installed into.
    pub destination: &'a Utf8Path,
    /// When true, suppress progress output.
    pub quiet: bool,
}

/// A failed pipeline run, tagged with the stage that failed.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The platform has no release asset.
    #[error("resolve: {0}")]
    Resolve(#[from] UnsupportedPlatform),

    /// The asset or its sidecar could not be fetched.
    #[error("fetch: {0}")]
    Fetch(#[from] DownloadError),

    /// The payload failed verification.
    #[error("verify: {0}")]
    Verify(#[from] IntegrityError),

    /// The executable could not be extracted.
    #[error("extract: {0}")]
    Extract(#[from] ExtractionError),

    /// The executable could not be written.
    #[error("install: {0}")]
    Install(#[from] InstallError),
}

/// Run the pipeline against the real network.
///
/// # Errors
///
/// See [`run_pipeline_with`].
pub fn run_pipeline(
    config: &PipelineConfig<'_>,
    stderr: &mut dyn Write,
) -> Result<Vec<InstalledFile>, PipelineError> {
    run_pipeline_with(config, &HttpDownloader, stderr)
}

/// Run the pipeline with an injected downloader.
///
/// Returns the installed files; the executable is always among them.
///
/// # Errors
///
/// Returns the [`PipelineError`] of the first stage that fails.
pub fn run_pipeline_with(
    config: &PipelineConfig<'_>,
    downloader: &dyn ArtefactDownloader,
    stderr: &mut dyn Write,
) -> Result<Vec<InstalledFile>, PipelineError> {
    let tool = config.tool;
    let resolved = tool.resolve(config.platform)?;
    info!(
        "{} {} for {}: {}",
        tool.name(),
        tool.version(),
        resolved.platform,
        resolved.url
    );

    progress(config, stderr, format!("Downloading {}...", resolved.file_name));
    let payload = downloader.fetch(&resolved.url)?;
    debug!("received {} bytes from {}", payload.bytes().len(), payload.url());

    let expected = match &resolved.expected {
        ExpectedDigest::Pinned(digest) => digest.clone(),
        ExpectedDigest::Sidecar { url, algorithm } => {
            debug!("fetching checksum sidecar {url}");
            let sidecar = downloader.fetch(url)?;
            parse_sidecar(url, sidecar.bytes(), &resolved.file_name, *algorithm)?
        }
    };

    verify(&payload, &expected)?;
    progress(
        config,
        stderr,
        format!("Verified {} {}", expected.algorithm(), resolved.file_name),
    );

    let extracted = extract(payload, tool.executable(), tool.extraction())?;
    let installed = install_extracted(
        config.destination,
        &extracted,
        &resolved.installed_name,
        tool.executable(),
    )?;

    for file in installed.iter().filter(|file| file.is_executable()) {
        progress(config, stderr, format!("Installed {}", file.path()));
    }
    Ok(installed)
}

fn progress(config: &PipelineConfig<'_>, stderr: &mut dyn Write, message: String) {
    if !config.quiet {
        write_stderr_line(stderr, message);
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
