//! Install hook: copy a populated build directory into its final location.
//!
//! `shellbin build` fills `<build-dir>/bin`; `shellbin install` copies the
//! whole build tree into the install directory. `fs::copy` carries the
//! permission bits across, so executables stay executable.

use crate::error::{InstallerError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fs;

/// Name of the directory under the build directory that receives binaries.
pub const BIN_DIR: &str = "bin";

/// Return the directory `shellbin build` installs into.
#[must_use]
pub fn build_bin_dir(build_dir: &Utf8Path) -> Utf8PathBuf {
    build_dir.join(BIN_DIR)
}

/// Copies a build tree into an install directory.
#[derive(Debug, Clone)]
pub struct Stager {
    build_dir: Utf8PathBuf,
    install_dir: Utf8PathBuf,
}

impl Stager {
    /// Create a stager copying `build_dir` into `install_dir`.
    #[must_use]
    pub const fn new(build_dir: Utf8PathBuf, install_dir: Utf8PathBuf) -> Self {
        Self {
            build_dir,
            install_dir,
        }
    }

    /// Copy every file under the build directory, creating directories as
    /// needed and overwriting existing files.
    ///
    /// Returns the written paths in sorted order.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::MissingBuildDir`] when the build directory
    /// does not exist, [`InstallerError::InstallInsideBuild`] when the
    /// install directory lies within the build tree, and
    /// [`InstallerError::CopyFailed`] for any failing directory walk,
    /// directory creation, or copy.
    pub fn stage_all(&self) -> Result<Vec<Utf8PathBuf>> {
        if !self.build_dir.is_dir() {
            return Err(InstallerError::MissingBuildDir {
                path: self.build_dir.clone(),
            });
        }
        // Copying into the tree being walked would never terminate.
        if resolved(&self.install_dir).starts_with(resolved(&self.build_dir)) {
            return Err(InstallerError::InstallInsideBuild {
                build_dir: self.build_dir.clone(),
                install_dir: self.install_dir.clone(),
            });
        }

        let mut written = Vec::new();
        copy_dir(&self.build_dir, &self.install_dir, &mut written)?;
        written.sort();
        Ok(written)
    }
}

/// Canonicalise the longest existing prefix of `path` and append the rest.
fn resolved(path: &Utf8Path) -> Utf8PathBuf {
    let mut missing = Vec::new();
    for ancestor in path.ancestors() {
        let dir = if ancestor.as_str().is_empty() {
            Utf8Path::new(".")
        } else {
            ancestor
        };
        if let Ok(real) = dir.canonicalize_utf8() {
            return missing.iter().rev().fold(real, |acc, part| acc.join(part));
        }
        if let Some(last) = ancestor.components().next_back() {
            missing.push(last.as_str());
        }
    }
    path.to_owned()
}

fn copy_dir(from: &Utf8Path, to: &Utf8Path, written: &mut Vec<Utf8PathBuf>) -> Result<()> {
    let copy_failed = |source: std::io::Error| InstallerError::CopyFailed {
        from: from.to_owned(),
        to: to.to_owned(),
        source,
    };

    fs::create_dir_all(to).map_err(copy_failed)?;

    for entry in from.read_dir_utf8().map_err(copy_failed)? {
        let entry = entry.map_err(copy_failed)?;
        let source = entry.path();
        let target = to.join(entry.file_name());
        let file_type = entry.file_type().map_err(copy_failed)?;

        if file_type.is_dir() {
            copy_dir(source, &target, written)?;
            continue;
        }

        fs::copy(source, &target).map_err(|err| InstallerError::CopyFailed {
            from: source.to_owned(),
            to: target.clone(),
            source: err,
        })?;
        debug!("copied {source} to {target}");
        written.push(target);
    }

    Ok(())
}
