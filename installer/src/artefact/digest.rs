//! Digest algorithms and the validated hex digest newtype.
//!
//! Release tables pin either SHA-256 or SHA-512 digests. [`HexDigest`]
//! stores the value in lowercase so comparisons are insensitive to the case
//! the upstream publisher chose.

use super::error::{ArtefactError, Result};
use serde::Deserialize;
use sha2::{Digest, Sha256, Sha512};
use std::fmt;
use std::str::FromStr;

/// A supported cryptographic digest algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// SHA-256, 64 hex characters.
    #[default]
    Sha256,
    /// SHA-512, 128 hex characters.
    Sha512,
}

impl DigestAlgorithm {
    /// Return the length of a hex-encoded digest for this algorithm.
    ///
    /// # Examples
    ///
    /// ```
    /// use shellbin_installer::artefact::digest::DigestAlgorithm;
    ///
    /// assert_eq!(DigestAlgorithm::Sha256.hex_len(), 64);
    /// assert_eq!(DigestAlgorithm::Sha512.hex_len(), 128);
    /// ```
    #[must_use]
    pub const fn hex_len(self) -> usize {
        match self {
            Self::Sha256 => 64,
            Self::Sha512 => 128,
        }
    }

    /// Return the lowercase algorithm name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }

    /// Hash `bytes` and return the lowercase hex digest.
    ///
    /// # Examples
    ///
    /// ```
    /// use shellbin_installer::artefact::digest::DigestAlgorithm;
    ///
    /// let digest = DigestAlgorithm::Sha256.compute(b"");
    /// assert_eq!(
    ///     digest.as_str(),
    ///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    /// );
    /// ```
    #[must_use]
    pub fn compute(self, bytes: &[u8]) -> HexDigest {
        let hex = match self {
            Self::Sha256 => format!("{:x}", Sha256::digest(bytes)),
            Self::Sha512 => format!("{:x}", Sha512::digest(bytes)),
        };
        HexDigest {
            algorithm: self,
            hex,
        }
    }
}

impl FromStr for DigestAlgorithm {
    type Err = ArtefactError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            _ => Err(ArtefactError::UnknownAlgorithm {
                value: value.to_owned(),
            }),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated hex-encoded digest, normalised to lowercase.
///
/// # Examples
///
/// ```
/// use shellbin_installer::artefact::digest::{DigestAlgorithm, HexDigest};
///
/// let upper = "AB".repeat(32);
/// let digest = HexDigest::parse(DigestAlgorithm::Sha256, &upper).expect("valid digest");
/// assert_eq!(digest.as_str(), "ab".repeat(32));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HexDigest {
    algorithm: DigestAlgorithm,
    hex: String,
}

impl HexDigest {
    /// Validate `value` as a digest for `algorithm`.
    ///
    /// Upper- and lowercase hex digits are both accepted; the stored form is
    /// lowercase.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::InvalidDigest`] when the length is wrong or a
    /// non-hex character is present.
    pub fn parse(algorithm: DigestAlgorithm, value: &str) -> Result<Self> {
        let trimmed = value.trim();
        let expected_len = algorithm.hex_len();
        if trimmed.len() != expected_len {
            return Err(ArtefactError::InvalidDigest {
                algorithm: algorithm.name(),
                reason: format!(
                    "expected {expected_len} hex characters, got {}",
                    trimmed.len()
                ),
            });
        }
        if let Some(bad) = trimmed.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(ArtefactError::InvalidDigest {
                algorithm: algorithm.name(),
                reason: format!("non-hex character '{bad}'"),
            });
        }
        Ok(Self {
            algorithm,
            hex: trimmed.to_ascii_lowercase(),
        })
    }

    /// Return the algorithm this digest belongs to.
    #[must_use]
    pub const fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Return the digest as a lowercase hex string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.hex
    }
}

impl AsRef<str> for HexDigest {
    fn as_ref(&self) -> &str {
        &self.hex
    }
}

impl fmt::Display for HexDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex)
    }
}
