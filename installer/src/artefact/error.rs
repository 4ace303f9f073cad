//! Error types for artefact value validation.
//!
//! Each variant provides a descriptive message identifying the invalid input
//! and the constraint that was violated.

use thiserror::Error;

/// Errors arising from invalid artefact-related values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtefactError {
    /// A digest string is not valid hex of the algorithm's length.
    #[error("invalid {algorithm} digest: {reason}")]
    InvalidDigest {
        /// Name of the digest algorithm the value was checked against.
        algorithm: &'static str,
        /// Description of the validation failure.
        reason: String,
    },

    /// A digest algorithm name is not recognised.
    #[error("unknown digest algorithm \"{value}\"; expected sha256 or sha512")]
    UnknownAlgorithm {
        /// The rejected algorithm name.
        value: String,
    },

    /// An operating system or architecture identifier is empty.
    #[error("invalid platform key: {reason}")]
    InvalidPlatformKey {
        /// Description of the validation failure.
        reason: String,
    },
}

/// Result type alias using [`ArtefactError`].
pub type Result<T> = std::result::Result<T, ArtefactError>;
