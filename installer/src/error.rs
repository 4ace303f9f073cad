//! Error types for the shellbin CLI.
//!
//! Pipeline failures keep their stage prefix; the remaining variants cover
//! what the CLI does around the pipeline: loading tool tables, choosing a
//! destination, copying a build tree, and writing output.

use crate::artefact::download::DownloadError;
use crate::artefact::error::ArtefactError;
use crate::pipeline::PipelineError;
use crate::tool::ToolError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur while running a shellbin command.
#[derive(Debug, Error)]
pub enum InstallerError {
    /// A tool definition could not be loaded.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// A pipeline stage failed.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// The `--os`/`--arch` override is not a valid platform key.
    #[error("invalid platform override: {0}")]
    InvalidPlatform(#[source] ArtefactError),

    /// A digest algorithm name was not recognised.
    #[error("invalid digest algorithm: {0}")]
    InvalidAlgorithm(#[source] ArtefactError),

    /// No per-user executable directory could be determined.
    #[error("could not determine a default install directory; pass --dest")]
    NoDefaultDestination,

    /// The build directory passed to `install` does not exist.
    #[error("build directory {path} does not exist; run `shellbin build` first")]
    MissingBuildDir {
        /// The missing directory.
        path: Utf8PathBuf,
    },

    /// The install directory lies inside the build directory.
    #[error("install directory {install_dir} is inside build directory {build_dir}")]
    InstallInsideBuild {
        /// The build tree being copied.
        build_dir: Utf8PathBuf,
        /// The requested install location.
        install_dir: Utf8PathBuf,
    },

    /// Copying the build tree failed.
    #[error("failed to copy {from} to {to}: {source}")]
    CopyFailed {
        /// Source path.
        from: Utf8PathBuf,
        /// Destination path.
        to: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A local file could not be read.
    #[error("failed to read {path}: {source}")]
    ReadFailed {
        /// The file that could not be read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Fetching a file for `digest --url` failed.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Writing command output failed.
    #[error("failed to write output: {source}")]
    WriteFailed {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for shellbin operations.
pub type Result<T> = std::result::Result<T, InstallerError>;
