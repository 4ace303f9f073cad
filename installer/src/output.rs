//! User-facing output for the shellbin CLI.
//!
//! Progress and diagnostics go to stderr line by line; after a `fetch` into a
//! directory missing from `PATH`, a shell snippet shows how to add it.

use camino::Utf8Path;
use std::ffi::OsStr;
use std::fmt::Display;
use std::io::Write;

/// Write one line to `stderr`, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort progress output.
    }
}

/// Shell lines that put a directory on `PATH`.
#[derive(Debug, Clone)]
pub struct ShellSnippet {
    /// Export line for bash/zsh.
    pub bash: String,
    /// Set line for fish shell.
    pub fish: String,
    /// Assignment for PowerShell.
    pub powershell: String,
}

impl ShellSnippet {
    /// Create snippets that prepend `bin_dir` to `PATH`.
    ///
    /// # Example
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use shellbin_installer::output::ShellSnippet;
    ///
    /// let snippet = ShellSnippet::new(Utf8Path::new("/home/user/.local/bin"));
    /// assert_eq!(snippet.bash, "export PATH=\"/home/user/.local/bin:$PATH\"");
    /// ```
    #[must_use]
    pub fn new(bin_dir: &Utf8Path) -> Self {
        Self {
            bash: format!("export PATH=\"{bin_dir}:$PATH\""),
            fish: format!("fish_add_path \"{bin_dir}\""),
            powershell: format!("$env:PATH = \"{bin_dir};$env:PATH\""),
        }
    }

    /// Format the snippet for display to the user.
    #[must_use]
    pub fn display_text(&self) -> String {
        format!(
            concat!(
                "Add the following to your shell configuration:\n\n",
                "  # bash/zsh (~/.bashrc, ~/.zshrc)\n",
                "  {}\n\n",
                "  # fish (~/.config/fish/config.fish)\n",
                "  {}\n\n",
                "  # PowerShell ($PROFILE)\n",
                "  {}"
            ),
            self.bash, self.fish, self.powershell
        )
    }
}

/// Whether `dir` is one of the entries of the `path_var` search path.
#[must_use]
pub fn is_on_path(dir: &Utf8Path, path_var: Option<&OsStr>) -> bool {
    path_var.is_some_and(|paths| {
        std::env::split_paths(paths).any(|entry| entry.as_path() == dir.as_std_path())
    })
}

/// Format a success message after a pipeline run.
#[must_use]
pub fn success_message(tool: &str, version: &str, count: usize, dir: &Utf8Path) -> String {
    let files = if count == 1 { "file" } else { "files" };
    format!("Installed {tool} {version} ({count} {files}) to {dir}")
}
