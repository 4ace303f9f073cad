//! Immutable platform → release asset tables and the resolver stage.
//!
//! A [`PlatformTable`] is built once from validated entries and then only
//! read. Each entry may list several architecture names; every name resolves
//! to the same [`ReleaseAsset`], which is how a CPU variant without its own
//! upstream build reuses another variant's binary.

use super::digest::{DigestAlgorithm, HexDigest};
use super::error::ArtefactError;
use super::platform::PlatformKey;
use std::collections::BTreeMap;
use thiserror::Error;

/// How to locate a checksum sidecar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidecarLocation {
    /// Append this suffix to the asset URL (for example `.sha512sum`).
    Suffix(String),
    /// A fixed URL template listing checksums for every asset.
    Url(String),
}

/// Where the expected digest of one asset comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetChecksum {
    /// A digest pinned in the table.
    Pinned(HexDigest),
    /// A digest published beside the asset.
    Sidecar(SidecarLocation),
}

/// A single downloadable asset for one or more platform keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseAsset {
    suffix: String,
    checksum: AssetChecksum,
}

impl ReleaseAsset {
    /// Create an asset from its URL suffix and checksum source.
    #[must_use]
    pub const fn new(suffix: String, checksum: AssetChecksum) -> Self {
        Self { suffix, checksum }
    }

    /// Return the platform-specific part of the asset file name.
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Return where the expected digest comes from.
    #[must_use]
    pub const fn checksum(&self) -> &AssetChecksum {
        &self.checksum
    }

    /// Return the pinned digest, if the table carries one.
    #[must_use]
    pub const fn digest(&self) -> Option<&HexDigest> {
        match &self.checksum {
            AssetChecksum::Pinned(digest) => Some(digest),
            AssetChecksum::Sidecar(_) => None,
        }
    }
}

/// Unvalidated table row, as written in a tool definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// Operating system identifier.
    pub os: String,
    /// Architecture names served by this asset. The first is canonical.
    pub arch: Vec<String>,
    /// Platform-specific part of the asset name.
    pub suffix: String,
    /// Pinned hex digest of the asset.
    pub digest: Option<String>,
}

/// One validated table entry: the keys it serves and the asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    keys: Vec<PlatformKey>,
    asset: ReleaseAsset,
}

impl TableEntry {
    /// Return every platform key served by this entry, canonical key first.
    #[must_use]
    pub fn keys(&self) -> &[PlatformKey] {
        &self.keys
    }

    /// Return the asset served for these keys.
    #[must_use]
    pub const fn asset(&self) -> &ReleaseAsset {
        &self.asset
    }
}

/// Errors raised while building a [`PlatformTable`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// The same (os, arch) key appears on two entries.
    #[error("platform {key} is listed more than once")]
    DuplicateKey {
        /// The repeated key.
        key: PlatformKey,
    },

    /// An entry lists no architectures.
    #[error("entry for suffix \"{suffix}\" lists no architectures")]
    NoArchitectures {
        /// Suffix of the offending entry.
        suffix: String,
    },

    /// An entry has an empty asset suffix.
    #[error("entry for {key} has an empty asset suffix")]
    EmptySuffix {
        /// First key of the offending entry.
        key: PlatformKey,
    },

    /// A pinned-digest table entry carries no digest.
    #[error("entry for {key} has no pinned digest")]
    MissingDigest {
        /// First key of the offending entry.
        key: PlatformKey,
    },

    /// A key or digest value failed validation.
    #[error("entry for suffix \"{suffix}\": {source}")]
    InvalidValue {
        /// Suffix of the offending entry.
        suffix: String,
        /// The underlying validation failure.
        #[source]
        source: ArtefactError,
    },
}

/// The running platform has no entry in the release table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "unsupported platform {platform}; supported platforms are: {supported}. \
     Add an entry for this platform to the release table"
)]
pub struct UnsupportedPlatform {
    /// The key that failed to resolve.
    pub platform: PlatformKey,
    /// Comma-separated list of supported keys.
    pub supported: String,
}

/// Immutable mapping from [`PlatformKey`] to [`ReleaseAsset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformTable {
    entries: Vec<TableEntry>,
    index: BTreeMap<PlatformKey, usize>,
}

impl PlatformTable {
    /// Validate `rows` and build a table.
    ///
    /// Digests are parsed against `algorithm`. A row with a digest is pinned;
    /// a row without one falls back to `sidecar`, and is rejected when there
    /// is none.
    ///
    /// # Errors
    ///
    /// Returns a [`TableError`] for duplicate keys, empty suffixes, rows
    /// without architectures, missing digests, or malformed values.
    pub fn from_rows(
        algorithm: DigestAlgorithm,
        rows: Vec<TableRow>,
        sidecar: Option<&SidecarLocation>,
    ) -> Result<Self, TableError> {
        let mut entries = Vec::with_capacity(rows.len());
        let mut index = BTreeMap::new();

        for row in rows {
            let entry = validate_row(algorithm, row, sidecar)?;
            let position = entries.len();
            for key in &entry.keys {
                if index.insert(key.clone(), position).is_some() {
                    return Err(TableError::DuplicateKey { key: key.clone() });
                }
            }
            entries.push(entry);
        }

        Ok(Self { entries, index })
    }

    /// Look up the asset for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedPlatform`] when no entry serves `key`.
    pub fn resolve(&self, key: &PlatformKey) -> Result<&ReleaseAsset, UnsupportedPlatform> {
        self.index
            .get(key)
            .and_then(|position| self.entries.get(*position))
            .map(TableEntry::asset)
            .ok_or_else(|| UnsupportedPlatform {
                platform: key.clone(),
                supported: self.supported_keys().join(", "),
            })
    }

    /// Return all entries in table order.
    #[must_use]
    pub fn entries(&self) -> &[TableEntry] {
        &self.entries
    }

    /// Return every supported key, including aliases, in sorted order.
    #[must_use]
    pub fn supported_keys(&self) -> Vec<String> {
        self.index.keys().map(ToString::to_string).collect()
    }
}

fn validate_row(
    algorithm: DigestAlgorithm,
    row: TableRow,
    sidecar: Option<&SidecarLocation>,
) -> Result<TableEntry, TableError> {
    let TableRow {
        os,
        arch,
        suffix,
        digest,
    } = row;

    if arch.is_empty() {
        return Err(TableError::NoArchitectures { suffix });
    }

    let keys = arch
        .iter()
        .map(|name| PlatformKey::new(&os, name))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| TableError::InvalidValue {
            suffix: suffix.clone(),
            source,
        })?;
    let Some(first_key) = keys.first().cloned() else {
        return Err(TableError::NoArchitectures { suffix });
    };

    if suffix.trim().is_empty() {
        return Err(TableError::EmptySuffix { key: first_key });
    }

    let checksum = match (digest, sidecar) {
        (Some(value), _) => {
            let digest = HexDigest::parse(algorithm, &value).map_err(|source| {
                TableError::InvalidValue {
                    suffix: suffix.clone(),
                    source,
                }
            })?;
            AssetChecksum::Pinned(digest)
        }
        (None, Some(location)) => AssetChecksum::Sidecar(location.clone()),
        (None, None) => return Err(TableError::MissingDigest { key: first_key }),
    };

    Ok(TableEntry {
        keys,
        asset: ReleaseAsset::new(suffix, checksum),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn sidecar() -> SidecarLocation {
        SidecarLocation::Suffix(".sha256".to_owned())
    }

    fn row(os: &str, arch: &[&str], suffix: &str, digest: Option<String>) -> TableRow {
        TableRow {
            os: os.to_owned(),
            arch: arch.iter().map(|a| (*a).to_owned()).collect(),
            suffix: suffix.to_owned(),
            digest,
        }
    }

    #[fixture]
    fn table() -> PlatformTable {
        PlatformTable::from_rows(
            DigestAlgorithm::Sha256,
            vec![
                row(
                    "linux",
                    &["x86_64", "amd64"],
                    "linux.x86_64.tar.xz",
                    Some("a".repeat(64)),
                ),
                row(
                    "darwin",
                    &["x86_64", "aarch64"],
                    "darwin.x86_64.tar.xz",
                    Some("b".repeat(64)),
                ),
            ],
            None,
        )
        .expect("valid table")
    }

    #[rstest]
    fn resolves_exact_key(table: PlatformTable) {
        let key = PlatformKey::new("linux", "x86_64").expect("key");
        let asset = table.resolve(&key).expect("supported");
        assert_eq!(asset.suffix(), "linux.x86_64.tar.xz");
    }

    #[rstest]
    #[case::linux_alias("linux", "amd64", "linux.x86_64.tar.xz")]
    #[case::darwin_arm_reuses_intel("macos", "aarch64", "darwin.x86_64.tar.xz")]
    fn aliases_resolve_to_shared_entry(
        table: PlatformTable,
        #[case] os: &str,
        #[case] arch: &str,
        #[case] suffix: &str,
    ) {
        let key = PlatformKey::new(os, arch).expect("key");
        assert_eq!(table.resolve(&key).expect("supported").suffix(), suffix);
    }

    #[rstest]
    fn unsupported_key_lists_supported_platforms(table: PlatformTable) {
        let key = PlatformKey::new("freebsd", "x86_64").expect("key");
        let err = table.resolve(&key).expect_err("unsupported");
        assert_eq!(err.platform, key);
        assert!(err.supported.contains("linux/x86_64"));
        assert!(err.to_string().contains("Add an entry"));
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let err = PlatformTable::from_rows(
            DigestAlgorithm::Sha256,
            vec![
                row("linux", &["x86_64"], "a.tar.xz", None),
                row("linux", &["amd64", "x86_64"], "b.tar.xz", None),
            ],
            Some(&sidecar()),
        )
        .expect_err("duplicate");
        assert!(matches!(err, TableError::DuplicateKey { .. }));
    }

    #[test]
    fn missing_digest_is_rejected_when_required() {
        let err = PlatformTable::from_rows(
            DigestAlgorithm::Sha256,
            vec![row("linux", &["x86_64"], "a.tar.xz", None)],
            None,
        )
        .expect_err("missing digest");
        assert!(matches!(err, TableError::MissingDigest { .. }));
    }

    #[test]
    fn digest_length_follows_algorithm() {
        let err = PlatformTable::from_rows(
            DigestAlgorithm::Sha512,
            vec![row("linux", &["x86_64"], "a", Some("a".repeat(64)))],
            None,
        )
        .expect_err("sha256 length under sha512 table");
        assert!(matches!(err, TableError::InvalidValue { .. }));
    }

    #[rstest]
    #[case::no_arch(row("linux", &[], "a", None))]
    #[case::empty_suffix(row("linux", &["x86_64"], " ", None))]
    #[case::empty_arch(row("linux", &[""], "a", None))]
    fn malformed_rows_are_rejected(#[case] bad: TableRow) {
        let result = PlatformTable::from_rows(DigestAlgorithm::Sha256, vec![bad], Some(&sidecar()));
        assert!(result.is_err());
    }

    #[test]
    fn rows_without_digest_use_the_sidecar() {
        let table = PlatformTable::from_rows(
            DigestAlgorithm::Sha256,
            vec![
                row("linux", &["x86_64"], "a", None),
                row("darwin", &["x86_64"], "b", Some("c".repeat(64))),
            ],
            Some(&sidecar()),
        )
        .expect("valid table");

        let linux = table
            .resolve(&PlatformKey::new("linux", "x86_64").expect("key"))
            .expect("supported");
        assert_eq!(linux.checksum(), &AssetChecksum::Sidecar(sidecar()));
        assert!(linux.digest().is_none());

        let darwin = table
            .resolve(&PlatformKey::new("darwin", "x86_64").expect("key"))
            .expect("supported");
        assert!(matches!(darwin.checksum(), AssetChecksum::Pinned(_)));
    }

    #[rstest]
    fn supported_keys_include_aliases(table: PlatformTable) {
        let keys = table.supported_keys();
        assert_eq!(keys.len(), 4);
        assert!(keys.contains(&"darwin/aarch64".to_owned()));
    }
}
