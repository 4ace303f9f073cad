//! Tests for shellbin CLI parsing.

use super::*;
use rstest::rstest;

#[test]
fn fetch_parses_tool_and_defaults() {
    let cli = Cli::parse_from(["shellbin", "fetch", "shellcheck"]);
    let Command::Fetch(args) = cli.command else {
        panic!("expected Fetch command");
    };
    assert_eq!(args.tool, "shellcheck");
    assert!(args.dest.is_none());
    assert!(args.platform.os.is_none());
    assert!(args.platform.arch.is_none());
    assert_eq!(cli.verbosity, 0);
    assert!(!cli.quiet);
}

#[test]
fn fetch_parses_destination_and_platform() {
    let cli = Cli::parse_from([
        "shellbin", "fetch", "shfmt", "--dest", "out", "--os", "darwin", "--arch", "arm64",
    ]);
    let Command::Fetch(args) = cli.command else {
        panic!("expected Fetch command");
    };
    assert_eq!(args.dest, Some(Utf8PathBuf::from("out")));
    assert_eq!(args.platform.os.as_deref(), Some("darwin"));
    assert_eq!(args.platform.arch.as_deref(), Some("arm64"));
}

#[rstest]
#[case::os_only(&["shellbin", "fetch", "shfmt", "--os", "linux"])]
#[case::arch_only(&["shellbin", "fetch", "shfmt", "--arch", "x86_64"])]
fn platform_override_needs_both_parts(#[case] args: &[&str]) {
    assert!(Cli::try_parse_from(args).is_err());
}

#[test]
fn build_requires_build_dir() {
    assert!(Cli::try_parse_from(["shellbin", "build", "shellcheck"]).is_err());
    let cli = Cli::parse_from(["shellbin", "build", "shellcheck", "--build-dir", "build"]);
    assert!(matches!(
        cli.command,
        Command::Build(BuildArgs { ref build_dir, .. }) if build_dir == "build"
    ));
}

#[test]
fn install_parses_both_directories() {
    let cli = Cli::parse_from([
        "shellbin",
        "install",
        "--build-dir",
        "build",
        "--install-dir",
        "/opt/shellcheck",
    ]);
    let Command::Install(args) = cli.command else {
        panic!("expected Install command");
    };
    assert_eq!(args.build_dir, Utf8PathBuf::from("build"));
    assert_eq!(args.install_dir, Utf8PathBuf::from("/opt/shellcheck"));
}

#[test]
fn platforms_parses_json_flag() {
    let cli = Cli::parse_from(["shellbin", "platforms", "shfmt", "--json"]);
    assert!(matches!(
        cli.command,
        Command::Platforms(PlatformsArgs { json: true, .. })
    ));
}

#[test]
fn digest_defaults_to_sha256() {
    let cli = Cli::parse_from(["shellbin", "digest", "asset.tar.xz"]);
    let Command::Digest(args) = cli.command else {
        panic!("expected Digest command");
    };
    assert_eq!(args.algorithm, "sha256");
    assert_eq!(args.file, Some(Utf8PathBuf::from("asset.tar.xz")));
}

#[test]
fn digest_file_conflicts_with_url() {
    assert!(
        Cli::try_parse_from(["shellbin", "digest", "a", "--url", "https://example.test/a"])
            .is_err()
    );
    let cli = Cli::parse_from(["shellbin", "digest"]);
    assert!(matches!(
        cli.command,
        Command::Digest(DigestArgs {
            file: None,
            url: None,
            ..
        })
    ));
}

#[rstest]
#[case::none(&["shellbin", "tools"], 0)]
#[case::single(&["shellbin", "-v", "tools"], 1)]
#[case::after_subcommand(&["shellbin", "tools", "-vvv"], 3)]
fn verbosity_counts_occurrences(#[case] args: &[&str], #[case] expected: u8) {
    let cli = Cli::parse_from(args);
    assert_eq!(cli.verbosity, expected);
}

#[test]
fn quiet_conflicts_with_verbose() {
    assert!(Cli::try_parse_from(["shellbin", "-q", "-v", "tools"]).is_err());
    assert!(Cli::parse_from(["shellbin", "tools", "--quiet"]).quiet);
}

#[test]
fn subcommand_is_required() {
    assert!(Cli::try_parse_from(["shellbin"]).is_err());
}

#[test]
fn command_definition_is_consistent() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
}
