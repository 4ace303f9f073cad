//! shellbin CLI entrypoint.
//!
//! Dispatches subcommands: `fetch` runs the download pipeline into a
//! directory, `build` and `install` are the packaging hooks, and the rest
//! inspect the built-in release tables.

use camino::Utf8Path;
use clap::Parser;
use log::LevelFilter;
use shellbin_installer::artefact::digest::DigestAlgorithm;
use shellbin_installer::artefact::download::{ArtefactDownloader, HttpDownloader};
use shellbin_installer::artefact::install::InstalledFile;
use shellbin_installer::artefact::platform::PlatformKey;
use shellbin_installer::cli::{
    BuildArgs, Cli, Command, DigestArgs, FetchArgs, InstallArgs, PlatformArgs,
};
use shellbin_installer::dirs::{BaseDirs, SystemBaseDirs, default_destination};
use shellbin_installer::error::{InstallerError, Result};
use shellbin_installer::list::{run_platforms, run_tools};
use shellbin_installer::output::{ShellSnippet, is_on_path, success_message, write_stderr_line};
use shellbin_installer::pipeline::{PipelineConfig, run_pipeline_with};
use shellbin_installer::stager::{Stager, build_bin_dir};
use shellbin_installer::tool::builtin::builtin;
use std::io::{Read, Write};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbosity);

    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &SystemBaseDirs, &HttpDownloader, &mut stdout, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

/// Map the `-v` count to a log level; `RUST_LOG` still takes precedence.
fn init_logging(verbosity: u8) {
    env_logger::Builder::new()
        .filter_level(level_for_verbosity(verbosity))
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

const fn level_for_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn run(
    cli: &Cli,
    dirs: &dyn BaseDirs,
    downloader: &dyn ArtefactDownloader,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> Result<()> {
    match &cli.command {
        Command::Fetch(args) => run_fetch(cli.quiet, args, dirs, downloader, stderr),
        Command::Build(args) => run_build(cli.quiet, args, downloader, stderr),
        Command::Install(args) => run_install(cli.quiet, args, stderr),
        Command::Platforms(args) => run_platforms(args, stdout),
        Command::Tools => run_tools(stdout),
        Command::Digest(args) => run_digest(args, downloader, stdout),
    }
}

fn run_fetch(
    quiet: bool,
    args: &FetchArgs,
    dirs: &dyn BaseDirs,
    downloader: &dyn ArtefactDownloader,
    stderr: &mut dyn Write,
) -> Result<()> {
    let destination = match &args.dest {
        Some(dest) => dest.clone(),
        None => default_destination(dirs).ok_or(InstallerError::NoDefaultDestination)?,
    };
    fetch_into(quiet, &args.tool, &args.platform, &destination, downloader, stderr)?;

    let path_var = std::env::var_os("PATH");
    if !quiet && !is_on_path(&destination, path_var.as_deref()) {
        write_stderr_line(stderr, "");
        write_stderr_line(stderr, ShellSnippet::new(&destination).display_text());
    }
    Ok(())
}

fn run_build(
    quiet: bool,
    args: &BuildArgs,
    downloader: &dyn ArtefactDownloader,
    stderr: &mut dyn Write,
) -> Result<()> {
    let destination = build_bin_dir(&args.build_dir);
    fetch_into(quiet, &args.tool, &args.platform, &destination, downloader, stderr)?;
    Ok(())
}

fn fetch_into(
    quiet: bool,
    tool_name: &str,
    platform: &PlatformArgs,
    destination: &Utf8Path,
    downloader: &dyn ArtefactDownloader,
    stderr: &mut dyn Write,
) -> Result<Vec<InstalledFile>> {
    let tool = builtin(tool_name)?;
    let platform = resolve_platform(platform)?;
    let config = PipelineConfig {
        tool: &tool,
        platform: &platform,
        destination,
        quiet,
    };

    let installed = run_pipeline_with(&config, downloader, stderr)?;
    if !quiet {
        write_stderr_line(
            stderr,
            success_message(tool.name(), tool.version(), installed.len(), destination),
        );
    }
    Ok(installed)
}

fn resolve_platform(args: &PlatformArgs) -> Result<PlatformKey> {
    match (&args.os, &args.arch) {
        (Some(os), Some(arch)) => {
            PlatformKey::new(os, arch).map_err(InstallerError::InvalidPlatform)
        }
        _ => Ok(PlatformKey::host()),
    }
}

fn run_install(quiet: bool, args: &InstallArgs, stderr: &mut dyn Write) -> Result<()> {
    let stager = Stager::new(args.build_dir.clone(), args.install_dir.clone());
    let written = stager.stage_all()?;

    if !quiet {
        for path in &written {
            write_stderr_line(stderr, format!("Installed {path}"));
        }
        let files = if written.len() == 1 { "file" } else { "files" };
        write_stderr_line(
            stderr,
            format!("Copied {} {files} to {}", written.len(), args.install_dir),
        );
    }
    Ok(())
}

fn run_digest(
    args: &DigestArgs,
    downloader: &dyn ArtefactDownloader,
    stdout: &mut dyn Write,
) -> Result<()> {
    let algorithm: DigestAlgorithm = args
        .algorithm
        .parse()
        .map_err(InstallerError::InvalidAlgorithm)?;

    let (name, bytes) = match (&args.url, &args.file) {
        (Some(url), _) => {
            let payload = downloader.fetch(url)?;
            let name = url.rsplit('/').next().unwrap_or(url).to_owned();
            (name, payload.into_bytes())
        }
        (None, Some(file)) => (file.to_string(), read_file(file)?),
        (None, None) => (String::from("-"), read_stdin()?),
    };

    let digest = algorithm.compute(&bytes);
    writeln!(stdout, "{digest}  {name}").map_err(|source| InstallerError::WriteFailed { source })
}

fn read_file(path: &Utf8Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| InstallerError::ReadFailed {
        path: path.to_owned(),
        source,
    })
}

fn read_stdin() -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    std::io::stdin()
        .read_to_end(&mut bytes)
        .map_err(|source| InstallerError::ReadFailed {
            path: "-".into(),
            source,
        })?;
    Ok(bytes)
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            1
        }
    }
}
