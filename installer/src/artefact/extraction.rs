//! Archive extractor stage.
//!
//! Turns a verified payload into the bytes to install. The archive format is
//! sniffed from the source URL. Nothing is written to disk here: members are
//! read into memory and handed to the installer stage.

use super::download::DownloadedPayload;
use log::{debug, warn};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::{Cursor, Read};

/// Container format of a downloaded asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    /// A tar archive compressed with xz.
    TarXz,
    /// A tar archive compressed with gzip.
    TarGz,
    /// A zip archive.
    Zip,
    /// Not an archive: the payload is the executable itself.
    Bare,
}

impl ArchiveKind {
    /// Sniff the archive format from a URL suffix.
    ///
    /// # Examples
    ///
    /// ```
    /// use shellbin_installer::artefact::extraction::ArchiveKind;
    ///
    /// assert_eq!(
    ///     ArchiveKind::from_url("https://example.test/shellcheck-v0.9.0.linux.x86_64.tar.xz"),
    ///     ArchiveKind::TarXz
    /// );
    /// assert_eq!(
    ///     ArchiveKind::from_url("https://example.test/shfmt_v3.7.0_linux_amd64"),
    ///     ArchiveKind::Bare
    /// );
    /// ```
    #[must_use]
    pub fn from_url(url: &str) -> Self {
        let path = url.split(|c| c == '?' || c == '#').next().unwrap_or(url);
        let lower = path.to_ascii_lowercase();
        if lower.ends_with(".tar.xz") || lower.ends_with(".txz") {
            Self::TarXz
        } else if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
            Self::TarGz
        } else if lower.ends_with(".zip") {
            Self::Zip
        } else {
            Self::Bare
        }
    }
}

/// How many archive members the extractor returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Return the one executable member.
    #[default]
    Single,
    /// Return every regular file, keyed by base file name.
    All,
}

/// The executable selected from a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedExecutable {
    member: Option<String>,
    bytes: Vec<u8>,
}

impl ExtractedExecutable {
    /// Return the archive member name, or `None` for a bare payload.
    #[must_use]
    pub fn member(&self) -> Option<&str> {
        self.member.as_deref()
    }

    /// Return the executable bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the value and return the executable bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Result of the extractor stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    /// A single executable.
    Executable(ExtractedExecutable),
    /// Every regular file in the archive, keyed by base file name.
    Files(BTreeMap<String, Vec<u8>>),
}

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// I/O error while decoding the archive.
    #[error("extraction I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The zip container could not be read.
    #[error("invalid zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// No member matched the executable pattern.
    #[error("no member matching \"{pattern}\" in {url}; the release table and asset disagree")]
    MemberNotFound {
        /// The archive URL.
        url: String,
        /// Description of the pattern searched for.
        pattern: String,
    },

    /// More than one member matched where exactly one was expected.
    #[error("{} members match \"{pattern}\" in {url}: {}", candidates.len(), candidates.join(", "))]
    AmbiguousMember {
        /// The archive URL.
        url: String,
        /// Description of the pattern searched for.
        pattern: String,
        /// Every matching member name.
        candidates: Vec<String>,
    },

    /// The archive contains no regular files.
    #[error("archive {url} contains no files")]
    EmptyArchive {
        /// The archive URL.
        url: String,
    },
}

/// Produce the installable bytes for `payload`.
///
/// Tar archives yield the regular file whose base name equals
/// `executable_base`; zip archives yield the entry ending in `.exe`. In
/// [`ExtractionMode::All`] every regular file is returned instead. Bare
/// payloads always pass through unchanged.
///
/// # Errors
///
/// Returns [`ExtractionError::MemberNotFound`] or
/// [`ExtractionError::AmbiguousMember`] when the archive does not hold
/// exactly one match, and [`ExtractionError::Io`] / [`ExtractionError::Zip`]
/// for corrupt archives.
pub fn extract(
    payload: DownloadedPayload,
    executable_base: &str,
    mode: ExtractionMode,
) -> Result<Extracted, ExtractionError> {
    let kind = ArchiveKind::from_url(payload.url());
    debug!("extracting {} as {kind:?} ({mode:?})", payload.url());

    if kind == ArchiveKind::Bare {
        return Ok(Extracted::Executable(ExtractedExecutable {
            member: None,
            bytes: payload.into_bytes(),
        }));
    }

    let pattern = MemberPattern::for_kind(kind, executable_base);
    let wanted = |name: &str| mode == ExtractionMode::All || pattern.matches(name);
    let members = read_members(kind, payload.bytes(), &wanted)?;

    match mode {
        ExtractionMode::Single => select_single(payload.url(), &pattern, members),
        ExtractionMode::All => collect_all(payload.url(), members),
    }
}

/// Return the final path component, accepting both separators.
///
/// # Examples
///
/// ```
/// use shellbin_installer::artefact::extraction::base_name;
///
/// assert_eq!(base_name("shellcheck-v0.9.0/shellcheck"), "shellcheck");
/// assert_eq!(base_name("bin\\shellcheck.exe"), "shellcheck.exe");
/// ```
#[must_use]
pub fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

struct Member {
    name: String,
    bytes: Vec<u8>,
}

enum MemberPattern<'a> {
    BaseName(&'a str),
    ExeSuffix,
}

impl<'a> MemberPattern<'a> {
    fn for_kind(kind: ArchiveKind, executable_base: &'a str) -> Self {
        if kind == ArchiveKind::Zip {
            Self::ExeSuffix
        } else {
            Self::BaseName(executable_base)
        }
    }

    fn matches(&self, name: &str) -> bool {
        match self {
            Self::BaseName(base) => base_name(name) == *base,
            Self::ExeSuffix => name.to_ascii_lowercase().ends_with(".exe"),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::BaseName(base) => format!("*/{base}"),
            Self::ExeSuffix => "*.exe".to_owned(),
        }
    }
}

fn read_members(
    kind: ArchiveKind,
    bytes: &[u8],
    wanted: &dyn Fn(&str) -> bool,
) -> Result<Vec<Member>, ExtractionError> {
    match kind {
        ArchiveKind::TarXz => tar_members(xz2::read::XzDecoder::new(bytes), wanted),
        ArchiveKind::TarGz => tar_members(flate2::read::GzDecoder::new(bytes), wanted),
        ArchiveKind::Zip => zip_members(bytes, wanted),
        ArchiveKind::Bare => Ok(Vec::new()),
    }
}

fn tar_members<R: Read>(
    reader: R,
    wanted: &dyn Fn(&str) -> bool,
) -> Result<Vec<Member>, ExtractionError> {
    let mut archive = tar::Archive::new(reader);
    let mut members = Vec::new();

    for entry_result in archive.entries()? {
        let mut entry = entry_result?;
        let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        if !entry.header().entry_type().is_file() {
            debug!("skipping non-file tar entry {name}");
            continue;
        }
        if !wanted(&name) {
            continue;
        }
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes)?;
        members.push(Member { name, bytes });
    }

    Ok(members)
}

fn zip_members(
    bytes: &[u8],
    wanted: &dyn Fn(&str) -> bool,
) -> Result<Vec<Member>, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut members = Vec::new();

    for index in 0..archive.len() {
        let mut file = archive.by_index(index)?;
        if file.is_dir() {
            continue;
        }
        let name = file.name().to_owned();
        if !wanted(&name) {
            continue;
        }
        let mut content = Vec::new();
        file.read_to_end(&mut content)?;
        members.push(Member {
            name,
            bytes: content,
        });
    }

    Ok(members)
}

fn select_single(
    url: &str,
    pattern: &MemberPattern<'_>,
    members: Vec<Member>,
) -> Result<Extracted, ExtractionError> {
    let mut matches = members.into_iter();
    let Some(first) = matches.next() else {
        return Err(ExtractionError::MemberNotFound {
            url: url.to_owned(),
            pattern: pattern.describe(),
        });
    };

    let rest: Vec<Member> = matches.collect();
    if !rest.is_empty() {
        let candidates = std::iter::once(first.name)
            .chain(rest.into_iter().map(|m| m.name))
            .collect();
        return Err(ExtractionError::AmbiguousMember {
            url: url.to_owned(),
            pattern: pattern.describe(),
            candidates,
        });
    }

    debug!("selected member {} ({} bytes)", first.name, first.bytes.len());
    Ok(Extracted::Executable(ExtractedExecutable {
        member: Some(first.name),
        bytes: first.bytes,
    }))
}

fn collect_all(url: &str, members: Vec<Member>) -> Result<Extracted, ExtractionError> {
    let mut files = BTreeMap::new();
    let mut seen: BTreeMap<String, String> = BTreeMap::new();

    for member in members {
        let name = base_name(&member.name).to_owned();
        if name.is_empty() {
            warn!("skipping archive member with empty file name: {}", member.name);
            continue;
        }
        if let Some(previous) = seen.insert(name.clone(), member.name.clone()) {
            return Err(ExtractionError::AmbiguousMember {
                url: url.to_owned(),
                pattern: name,
                candidates: vec![previous, member.name],
            });
        }
        files.insert(name, member.bytes);
    }

    if files.is_empty() {
        return Err(ExtractionError::EmptyArchive {
            url: url.to_owned(),
        });
    }
    Ok(Extracted::Files(files))
}

#[cfg(test)]
#[path = "extraction_tests.rs"]
mod tests;
