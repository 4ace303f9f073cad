//! Per-user directory lookup behind a trait so tests can substitute paths.

use camino::Utf8PathBuf;
use std::path::PathBuf;

/// Source of the per-user directories shellbin installs into.
pub trait BaseDirs {
    /// Return the user's home directory.
    fn home_dir(&self) -> Option<PathBuf>;

    /// Return the per-user executable directory.
    fn bin_dir(&self) -> Option<PathBuf>;
}

/// [`BaseDirs`] backed by `directories-next`.
///
/// The XDG executable directory is only defined on Linux, so other platforms
/// fall back to `~/.local/bin`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBaseDirs;

impl BaseDirs for SystemBaseDirs {
    fn home_dir(&self) -> Option<PathBuf> {
        directories_next::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
    }

    fn bin_dir(&self) -> Option<PathBuf> {
        let dirs = directories_next::BaseDirs::new()?;
        dirs.executable_dir()
            .map(std::path::Path::to_path_buf)
            .or_else(|| Some(dirs.home_dir().join(".local").join("bin")))
    }
}

/// Return the default `fetch` destination, if it is valid UTF-8.
#[must_use]
pub fn default_destination(dirs: &dyn BaseDirs) -> Option<Utf8PathBuf> {
    dirs.bin_dir()
        .or_else(|| dirs.home_dir().map(|home| home.join(".local").join("bin")))
        .and_then(|path| Utf8PathBuf::from_path_buf(path).ok())
}
