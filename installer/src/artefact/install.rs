//! Installer stage: write extracted bytes to disk and mark executables.
//!
//! Files are created (or overwritten) under a destination directory that is
//! created on demand. Executables keep whatever read/write bits the new file
//! received and gain owner, group, and other execute bits.

use super::extraction::{Extracted, base_name};
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use std::collections::BTreeMap;
use std::fs;

/// Execute bits for owner, group, and other.
pub const EXECUTE_BITS: u32 = 0o111;

/// A file written by the installer stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledFile {
    path: Utf8PathBuf,
    mode: Option<u32>,
    executable: bool,
}

impl InstalledFile {
    /// Return the path of the written file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Return the permission bits after installation.
    ///
    /// `None` on platforms without POSIX modes.
    #[must_use]
    pub const fn mode(&self) -> Option<u32> {
        self.mode
    }

    /// Whether the installer marked this file executable.
    #[must_use]
    pub const fn is_executable(&self) -> bool {
        self.executable
    }
}

/// Errors arising from the installer stage.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    /// A filesystem operation failed.
    #[error("failed to {operation} {path}")]
    Io {
        /// The operation that failed.
        operation: &'static str,
        /// The path involved.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A file name would escape the destination directory.
    #[error("refusing to install file with unsafe name \"{name}\"")]
    UnsafeName {
        /// The rejected name.
        name: String,
    },
}

/// Write one executable into `dir`.
///
/// # Errors
///
/// Returns [`InstallError::Io`] when the directory cannot be created, the
/// file cannot be written, or its permissions cannot be updated, and
/// [`InstallError::UnsafeName`] when `name` is not a plain file name.
pub fn install_executable(
    dir: &Utf8Path,
    name: &str,
    bytes: &[u8],
) -> Result<InstalledFile, InstallError> {
    check_name(name)?;
    create_dir(dir)?;
    write_file(dir, name, bytes, true)
}

/// Write every file in `files` into `dir`.
///
/// Only names matching `executable_base` (see [`is_executable_name`]) gain
/// execute bits.
///
/// # Errors
///
/// Stops at the first failing file; see [`install_executable`].
pub fn install_files(
    dir: &Utf8Path,
    files: &BTreeMap<String, Vec<u8>>,
    executable_base: &str,
) -> Result<Vec<InstalledFile>, InstallError> {
    files.keys().try_for_each(|name| check_name(name))?;
    create_dir(dir)?;
    files
        .iter()
        .map(|(name, bytes)| {
            write_file(dir, name, bytes, is_executable_name(name, executable_base))
        })
        .collect()
}

/// Install the output of the extractor stage.
///
/// A single executable is written as `installed_name`; a file set is written
/// under the names it carries.
///
/// # Errors
///
/// See [`install_executable`] and [`install_files`].
pub fn install_extracted(
    dir: &Utf8Path,
    extracted: &Extracted,
    installed_name: &str,
    executable_base: &str,
) -> Result<Vec<InstalledFile>, InstallError> {
    match extracted {
        Extracted::Executable(exe) => {
            install_executable(dir, installed_name, exe.bytes()).map(|file| vec![file])
        }
        Extracted::Files(files) => install_files(dir, files, executable_base),
    }
}

/// Whether `name` is the executable called `base`, ignoring case and any
/// single extension.
///
/// # Examples
///
/// ```
/// use shellbin_installer::artefact::install::is_executable_name;
///
/// assert!(is_executable_name("ShellCheck.EXE", "shellcheck"));
/// assert!(is_executable_name("shellcheck", "shellcheck"));
/// assert!(!is_executable_name("LICENSE.txt", "shellcheck"));
/// assert!(!is_executable_name("shellcheck-docs.txt", "shellcheck"));
/// ```
#[must_use]
pub fn is_executable_name(name: &str, base: &str) -> bool {
    let stem = name.split_once('.').map_or(name, |(stem, _)| stem);
    stem.eq_ignore_ascii_case(base)
        && name
            .split_once('.')
            .is_none_or(|(_, ext)| !ext.is_empty() && !ext.contains('.'))
}

fn create_dir(dir: &Utf8Path) -> Result<(), InstallError> {
    fs::create_dir_all(dir).map_err(|source| InstallError::Io {
        operation: "create directory",
        path: dir.to_owned(),
        source,
    })
}

/// Names must be plain file names so nothing lands outside the destination.
fn check_name(name: &str) -> Result<(), InstallError> {
    if name.is_empty() || name == "." || name == ".." || base_name(name) != name {
        return Err(InstallError::UnsafeName {
            name: name.to_owned(),
        });
    }
    Ok(())
}

fn write_file(
    dir: &Utf8Path,
    name: &str,
    bytes: &[u8],
    executable: bool,
) -> Result<InstalledFile, InstallError> {
    let path = dir.join(name);
    fs::write(&path, bytes).map_err(|source| InstallError::Io {
        operation: "write",
        path: path.clone(),
        source,
    })?;

    let mode = if executable {
        add_execute_bits(&path)?
    } else {
        current_mode(&path)?
    };

    if executable {
        info!("installed executable {path} ({} bytes)", bytes.len());
    } else {
        debug!("installed {path} ({} bytes)", bytes.len());
    }

    Ok(InstalledFile {
        path,
        mode,
        executable,
    })
}

#[cfg(unix)]
fn add_execute_bits(path: &Utf8Path) -> Result<Option<u32>, InstallError> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)
        .map_err(|source| InstallError::Io {
            operation: "read permissions of",
            path: path.to_owned(),
            source,
        })?
        .permissions();
    let mode = (perms.mode() | EXECUTE_BITS) & 0o7777;
    perms.set_mode(mode);
    fs::set_permissions(path, perms).map_err(|source| InstallError::Io {
        operation: "set permissions of",
        path: path.to_owned(),
        source,
    })?;
    Ok(Some(mode))
}

#[cfg(not(unix))]
fn add_execute_bits(_path: &Utf8Path) -> Result<Option<u32>, InstallError> {
    Ok(None)
}

#[cfg(unix)]
fn current_mode(path: &Utf8Path) -> Result<Option<u32>, InstallError> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|source| InstallError::Io {
        operation: "read permissions of",
        path: path.to_owned(),
        source,
    })?;
    Ok(Some(metadata.permissions().mode() & 0o7777))
}

#[cfg(not(unix))]
fn current_mode(_path: &Utf8Path) -> Result<Option<u32>, InstallError> {
    Ok(None)
}
