//! CLI argument definitions for shellbin.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary focused on orchestration.

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// Fetch, verify, and install prebuilt shellcheck and shfmt binaries.
#[derive(Parser, Debug)]
#[command(name = "shellbin")]
#[command(version, about)]
#[command(long_about = concat!(
    "Fetch, verify, and install prebuilt shellcheck and shfmt binaries.\n\n",
    "Each tool is described by a built-in release table mapping (os, arch) to ",
    "an upstream asset and its checksum. shellbin downloads the asset for the ",
    "current platform, checks its digest, pulls the executable out of the ",
    "archive, and writes it with execute permissions.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Install shellcheck into the per-user bin directory:\n",
    "    $ shellbin fetch shellcheck\n\n",
    "  Install shfmt for another platform into ./out:\n",
    "    $ shellbin fetch shfmt --os darwin --arch arm64 --dest out\n\n",
    "  Packaging hooks:\n",
    "    $ shellbin build shellcheck --build-dir build\n",
    "    $ shellbin install --build-dir build --install-dir /opt/shellcheck\n\n",
    "  Show the release table of a tool:\n",
    "    $ shellbin platforms shellcheck --json",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (repeatable: -v, -vv, -vvv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Download, verify, and install a tool.
    Fetch(FetchArgs),

    /// Build hook: install a tool into `<build-dir>/bin`.
    Build(BuildArgs),

    /// Install hook: copy a build directory into the install directory.
    Install(InstallArgs),

    /// List the platforms a tool supports.
    Platforms(PlatformsArgs),

    /// List the built-in tools.
    Tools,

    /// Print the digest of a local file or URL.
    Digest(DigestArgs),
}

/// Overrides for the platform a tool is fetched for.
#[derive(Args, Debug, Clone, Default)]
pub struct PlatformArgs {
    /// Operating system to fetch for [default: the running OS].
    #[arg(long, value_name = "OS", requires = "arch")]
    pub os: Option<String>,

    /// CPU architecture to fetch for [default: the running architecture].
    #[arg(long, value_name = "ARCH", requires = "os")]
    pub arch: Option<String>,
}

/// Arguments for the fetch command.
#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// Built-in tool to fetch.
    #[arg(value_name = "TOOL")]
    pub tool: String,

    /// Directory to install into [default: per-user bin directory].
    #[arg(short, long, value_name = "DIR")]
    pub dest: Option<Utf8PathBuf>,

    /// Platform override.
    #[command(flatten)]
    pub platform: PlatformArgs,
}

/// Arguments for the build hook.
#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Built-in tool to fetch.
    #[arg(value_name = "TOOL")]
    pub tool: String,

    /// Build directory; the tool is written to its `bin` subdirectory.
    #[arg(long, value_name = "DIR")]
    pub build_dir: Utf8PathBuf,

    /// Platform override.
    #[command(flatten)]
    pub platform: PlatformArgs,
}

/// Arguments for the install hook.
#[derive(Args, Debug, Clone)]
pub struct InstallArgs {
    /// Build directory populated by `shellbin build`.
    #[arg(long, value_name = "DIR")]
    pub build_dir: Utf8PathBuf,

    /// Directory the build tree is copied into.
    #[arg(long, value_name = "DIR")]
    pub install_dir: Utf8PathBuf,
}

/// Arguments for the platforms command.
#[derive(Args, Debug, Clone)]
pub struct PlatformsArgs {
    /// Built-in tool to describe.
    #[arg(value_name = "TOOL")]
    pub tool: String,

    /// Output in JSON format.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the digest command.
#[derive(Args, Debug, Clone)]
pub struct DigestArgs {
    /// File to hash [default: standard input].
    #[arg(value_name = "FILE", conflicts_with = "url")]
    pub file: Option<Utf8PathBuf>,

    /// Download and hash this URL instead of a local file.
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Digest algorithm (sha256 or sha512).
    #[arg(short, long, value_name = "ALGORITHM", default_value = "sha256")]
    pub algorithm: String,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
