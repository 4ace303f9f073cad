//! Tool definitions: which binary to fetch, from where, and how to check it.
//!
//! A [`ToolSpec`] is the whole configuration of one pipeline variant: the
//! version, the URL template, the platform table, the digest algorithm and
//! source, and how the executable is pulled out of the asset. Definitions
//! are TOML documents compiled into the binary (see [`builtin`]).
//!
//! # Sub-modules
//!
//! - [`builtin`] - Registry of the embedded tool definitions.

pub mod builtin;

use crate::artefact::digest::{DigestAlgorithm, HexDigest};
use crate::artefact::extraction::ExtractionMode;
use crate::artefact::platform::PlatformKey;
use crate::artefact::table::{
    AssetChecksum, PlatformTable, ReleaseAsset, TableError, TableRow, UnsupportedPlatform,
};
use serde::Deserialize;
use thiserror::Error;

pub use crate::artefact::table::SidecarLocation;

const VERSION_PLACEHOLDER: &str = "{version}";
const SUFFIX_PLACEHOLDER: &str = "{suffix}";

/// Where the expected digest of an asset comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChecksumSource {
    /// The digest is pinned in the platform table.
    Pinned,
    /// The digest is fetched from a sidecar published beside the asset.
    Sidecar(SidecarLocation),
}

/// The expected digest for one resolved asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectedDigest {
    /// A digest pinned in the table.
    Pinned(HexDigest),
    /// A digest still to be read from this sidecar URL.
    Sidecar {
        /// The sidecar URL.
        url: String,
        /// Algorithm of the digest inside the sidecar.
        algorithm: DigestAlgorithm,
    },
}

/// Everything the pipeline needs to fetch one asset for one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    /// The platform the asset was resolved for.
    pub platform: PlatformKey,
    /// Full download URL.
    pub url: String,
    /// Final path segment of the URL.
    pub file_name: String,
    /// Where the expected digest comes from.
    pub expected: ExpectedDigest,
    /// File name the executable is installed under.
    pub installed_name: String,
}

/// Errors raised while loading or looking up tool definitions.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The TOML document could not be parsed.
    #[error("invalid tool definition: {0}")]
    Parse(#[source] Box<toml::de::Error>),

    /// The platform table failed validation.
    #[error("invalid platform table for {tool}: {source}")]
    Table {
        /// The tool being loaded.
        tool: String,
        /// The underlying table error.
        #[source]
        source: TableError,
    },

    /// A definition field is missing or inconsistent.
    #[error("invalid tool definition for {tool}: {reason}")]
    Invalid {
        /// The tool being loaded.
        tool: String,
        /// Description of the problem.
        reason: String,
    },

    /// No built-in definition has this name.
    #[error("unknown tool \"{name}\"; available tools: {available}")]
    UnknownTool {
        /// The requested name.
        name: String,
        /// Comma-separated list of built-in tools.
        available: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTool {
    name: String,
    version: String,
    url: String,
    executable: String,
    #[serde(default)]
    algorithm: DigestAlgorithm,
    #[serde(default)]
    extract: ExtractionMode,
    checksum: RawChecksum,
    #[serde(rename = "asset", default)]
    assets: Vec<RawAsset>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawChecksum {
    source: RawChecksumKind,
    suffix: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawChecksumKind {
    Pinned,
    Sidecar,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAsset {
    os: String,
    arch: Vec<String>,
    suffix: String,
    digest: Option<String>,
}

/// One parameterised pipeline variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSpec {
    name: String,
    version: String,
    url_template: String,
    executable: String,
    algorithm: DigestAlgorithm,
    extraction: ExtractionMode,
    checksum: ChecksumSource,
    table: PlatformTable,
}

impl ToolSpec {
    /// Parse and validate a TOML tool definition.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Parse`] for malformed TOML, [`ToolError::Table`]
    /// when the platform table is invalid, and [`ToolError::Invalid`] for
    /// inconsistent fields such as a URL template without `{suffix}`.
    pub fn from_toml(source: &str) -> Result<Self, ToolError> {
        let raw: RawTool =
            toml::from_str(source).map_err(|err| ToolError::Parse(Box::new(err)))?;
        let invalid = |reason: &str| ToolError::Invalid {
            tool: raw.name.clone(),
            reason: reason.to_owned(),
        };

        if raw.name.trim().is_empty() {
            return Err(invalid("name must not be empty"));
        }
        if raw.version.trim().is_empty() {
            return Err(invalid("version must not be empty"));
        }
        if raw.executable.trim().is_empty() || raw.executable.contains(['/', '\\']) {
            return Err(invalid("executable must be a plain file name"));
        }
        if !raw.url.contains(SUFFIX_PLACEHOLDER) {
            return Err(invalid("url template must contain {suffix}"));
        }

        let checksum = match (raw.checksum.source, raw.checksum.suffix, raw.checksum.url) {
            (RawChecksumKind::Pinned, None, None) => ChecksumSource::Pinned,
            (RawChecksumKind::Pinned, _, _) => {
                return Err(invalid("pinned checksums take no sidecar suffix or url"));
            }
            (RawChecksumKind::Sidecar, Some(suffix), None) if !suffix.is_empty() => {
                ChecksumSource::Sidecar(SidecarLocation::Suffix(suffix))
            }
            (RawChecksumKind::Sidecar, None, Some(url)) if !url.is_empty() => {
                ChecksumSource::Sidecar(SidecarLocation::Url(url))
            }
            (RawChecksumKind::Sidecar, _, _) => {
                return Err(invalid("sidecar checksums need exactly one of suffix or url"));
            }
        };

        let rows = raw
            .assets
            .into_iter()
            .map(|asset| TableRow {
                os: asset.os,
                arch: asset.arch,
                suffix: asset.suffix,
                digest: asset.digest,
            })
            .collect::<Vec<_>>();
        if rows.is_empty() {
            return Err(invalid("at least one [[asset]] entry is required"));
        }

        let sidecar = match &checksum {
            ChecksumSource::Pinned => None,
            ChecksumSource::Sidecar(location) => Some(location),
        };
        let table = PlatformTable::from_rows(raw.algorithm, rows, sidecar).map_err(
            |source| ToolError::Table {
                tool: raw.name.clone(),
                source,
            },
        )?;

        Ok(Self {
            name: raw.name,
            version: raw.version,
            url_template: raw.url,
            executable: raw.executable,
            algorithm: raw.algorithm,
            extraction: raw.extract,
            checksum,
            table,
        })
    }

    /// Return the tool's registry name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the pinned upstream version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Return the executable base name, without extension.
    #[must_use]
    pub fn executable(&self) -> &str {
        &self.executable
    }

    /// Return the digest algorithm.
    #[must_use]
    pub const fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Return the extraction mode.
    #[must_use]
    pub const fn extraction(&self) -> ExtractionMode {
        self.extraction
    }

    /// Return the checksum source.
    #[must_use]
    pub const fn checksum(&self) -> &ChecksumSource {
        &self.checksum
    }

    /// Return the platform table.
    #[must_use]
    pub const fn table(&self) -> &PlatformTable {
        &self.table
    }

    /// Expand the URL template for `asset`.
    #[must_use]
    pub fn download_url(&self, asset: &ReleaseAsset) -> String {
        self.expand(&self.url_template)
            .replace(SUFFIX_PLACEHOLDER, asset.suffix())
    }

    /// Resolve everything needed to fetch the asset for `platform`.
    ///
    /// Performs no I/O.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedPlatform`] when the table has no entry.
    pub fn resolve(&self, platform: &PlatformKey) -> Result<ResolvedAsset, UnsupportedPlatform> {
        let asset = self.table.resolve(platform)?;
        let url = self.download_url(asset);
        let file_name = url.rsplit('/').next().unwrap_or(&url).to_owned();

        let expected = match asset.checksum() {
            AssetChecksum::Pinned(digest) => ExpectedDigest::Pinned(digest.clone()),
            AssetChecksum::Sidecar(SidecarLocation::Suffix(suffix)) => ExpectedDigest::Sidecar {
                url: format!("{url}{suffix}"),
                algorithm: self.algorithm,
            },
            AssetChecksum::Sidecar(SidecarLocation::Url(template)) => ExpectedDigest::Sidecar {
                url: self.expand(template),
                algorithm: self.algorithm,
            },
        };

        Ok(ResolvedAsset {
            platform: platform.clone(),
            url,
            file_name,
            expected,
            installed_name: platform.executable_name(&self.executable),
        })
    }

    fn expand(&self, template: &str) -> String {
        template.replace(VERSION_PLACEHOLDER, &self.version)
    }
}

#[cfg(test)]
#[path = "tool_tests.rs"]
mod tests;
