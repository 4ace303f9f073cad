//! Platform keys used to look up release assets.
//!
//! A [`PlatformKey`] pairs an operating system identifier with a CPU
//! architecture identifier. Release tables spell operating systems the way
//! upstream asset names do (`linux`, `darwin`, `windows`), so the host's
//! `macos` is reported as `darwin`.

use super::error::{ArtefactError, Result};
use serde::Serialize;
use std::fmt;

/// Operating system identifier for Windows hosts.
pub const WINDOWS: &str = "windows";

/// Composite (operating system, architecture) lookup key.
///
/// # Examples
///
/// ```
/// use shellbin_installer::artefact::platform::PlatformKey;
///
/// let key = PlatformKey::new("Linux", "x86_64").expect("valid key");
/// assert_eq!(key.os(), "linux");
/// assert_eq!(key.to_string(), "linux/x86_64");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PlatformKey {
    os: String,
    arch: String,
}

impl PlatformKey {
    /// Build a key from operating system and architecture names.
    ///
    /// Both parts are lowercased; `macos` is normalised to `darwin`.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::InvalidPlatformKey`] when either part is
    /// empty.
    pub fn new(os: &str, arch: &str) -> Result<Self> {
        let os = normalise_os(os.trim());
        let arch = arch.trim().to_ascii_lowercase();
        if os.is_empty() {
            return Err(ArtefactError::InvalidPlatformKey {
                reason: "operating system must not be empty".to_owned(),
            });
        }
        if arch.is_empty() {
            return Err(ArtefactError::InvalidPlatformKey {
                reason: "architecture must not be empty".to_owned(),
            });
        }
        Ok(Self { os, arch })
    }

    /// Return the key describing the running host.
    #[must_use]
    pub fn host() -> Self {
        Self {
            os: normalise_os(std::env::consts::OS),
            arch: std::env::consts::ARCH.to_owned(),
        }
    }

    /// Return the operating system identifier.
    #[must_use]
    pub fn os(&self) -> &str {
        &self.os
    }

    /// Return the architecture identifier.
    #[must_use]
    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// Whether this key names a Windows platform.
    #[must_use]
    pub fn is_windows(&self) -> bool {
        self.os == WINDOWS
    }

    /// Return the installed filename for an executable base name.
    ///
    /// # Examples
    ///
    /// ```
    /// use shellbin_installer::artefact::platform::PlatformKey;
    ///
    /// let win = PlatformKey::new("windows", "x86_64").expect("valid key");
    /// assert_eq!(win.executable_name("shfmt"), "shfmt.exe");
    /// ```
    #[must_use]
    pub fn executable_name(&self, base: &str) -> String {
        if self.is_windows() {
            format!("{base}.exe")
        } else {
            base.to_owned()
        }
    }
}

impl fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

fn normalise_os(os: &str) -> String {
    let lower = os.to_ascii_lowercase();
    match lower.as_str() {
        "macos" | "osx" => "darwin".to_owned(),
        _ => lower,
    }
}
