//! Unit tests for pipeline orchestration.
//!
//! Downloads are served by `StubDownloader` or a mockall mock; archives are
//! built in memory. Every failure test also checks that the destination was
//! left untouched.

use super::*;
use crate::artefact::download::{DownloadedPayload, MockArtefactDownloader};
use crate::test_utils::{StubDownloader, sha256_hex, sha512_hex, tar_xz, zip_archive};
use camino::Utf8PathBuf;
use rstest::{fixture, rstest};
use tempfile::TempDir;

const ASSET_URL: &str = "https://example.test/v0.9.0/shellcheck-v0.9.0.linux.x86_64.tar.xz";
const BINARY: &[u8] = b"\x7fELF fake shellcheck";

struct Sandbox {
    _temp: TempDir,
    destination: Utf8PathBuf,
}

#[fixture]
fn sandbox() -> Sandbox {
    let temp = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("UTF-8 path");
    Sandbox {
        _temp: temp,
        destination: root.join("bin"),
    }
}

fn linux() -> PlatformKey {
    PlatformKey::new("linux", "x86_64").expect("key")
}

fn shellcheck_archive() -> Vec<u8> {
    tar_xz(&[
        ("shellcheck-v0.9.0/LICENSE.txt", b"GPL"),
        ("shellcheck-v0.9.0/README.txt", b"readme"),
        ("shellcheck-v0.9.0/shellcheck", BINARY),
    ])
    .expect("archive")
}

fn pinned_tool(digest: &str) -> ToolSpec {
    ToolSpec::from_toml(&format!(
        r#"
name = "shellcheck"
version = "0.9.0"
url = "https://example.test/v{{version}}/shellcheck-v{{version}}.{{suffix}}"
executable = "shellcheck"

[checksum]
source = "pinned"

[[asset]]
os = "linux"
arch = ["x86_64"]
suffix = "linux.x86_64.tar.xz"
digest = "{digest}"
"#
    ))
    .expect("valid definition")
}

fn sidecar_tool() -> ToolSpec {
    ToolSpec::from_toml(
        r#"
name = "shellcheck-gcs"
version = "0.7.1"
url = "https://example.test/shellcheck-v{version}.{suffix}"
executable = "shellcheck"
algorithm = "sha512"

[checksum]
source = "sidecar"
suffix = ".sha512sum"

[[asset]]
os = "linux"
arch = ["x86_64"]
suffix = "linux-x86_64"
"#,
    )
    .expect("valid definition")
}

fn run(
    tool: &ToolSpec,
    platform: &PlatformKey,
    sandbox: &Sandbox,
    downloader: &dyn ArtefactDownloader,
) -> (Result<Vec<InstalledFile>, PipelineError>, String) {
    let mut stderr = Vec::new();
    let config = PipelineConfig {
        tool,
        platform,
        destination: &sandbox.destination,
        quiet: false,
    };
    let result = run_pipeline_with(&config, downloader, &mut stderr);
    (result, String::from_utf8(stderr).expect("UTF-8 output"))
}

#[rstest]
fn pinned_tar_xz_installs_only_the_executable(sandbox: Sandbox) {
    let archive = shellcheck_archive();
    let tool = pinned_tool(&sha256_hex(&archive));
    let downloader = StubDownloader::new().with_body(ASSET_URL, archive);

    let (result, stderr) = run(&tool, &linux(), &sandbox, &downloader);
    let installed = result.expect("pipeline succeeds");

    assert_eq!(installed.len(), 1);
    let target = sandbox.destination.join("shellcheck");
    assert_eq!(std::fs::read(&target).expect("installed"), BINARY);
    assert!(!sandbox.destination.join("LICENSE.txt").exists());
    assert!(!sandbox.destination.join("README.txt").exists());
    assert_eq!(downloader.requests(), vec![ASSET_URL.to_owned()]);
    assert!(stderr.contains("Downloading shellcheck-v0.9.0.linux.x86_64.tar.xz"));
    assert!(stderr.contains(&format!("Installed {target}")));

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&target)
            .expect("metadata")
            .permissions()
            .mode();
        assert_eq!(mode & 0o111, 0o111, "mode {mode:o}");
    }
}

#[rstest]
fn unsupported_platform_fails_before_any_request(sandbox: Sandbox) {
    let tool = pinned_tool(&"0".repeat(64));
    let downloader = StubDownloader::new();
    let freebsd = PlatformKey::new("freebsd", "x86_64").expect("key");

    let (result, _) = run(&tool, &freebsd, &sandbox, &downloader);

    let err = result.expect_err("unsupported");
    assert!(matches!(err, PipelineError::Resolve(_)));
    assert!(err.to_string().starts_with("resolve: "));
    assert!(downloader.requests().is_empty());
    assert!(!sandbox.destination.exists());
}

#[rstest]
fn http_error_is_a_fetch_failure(sandbox: Sandbox) {
    let tool = pinned_tool(&"0".repeat(64));
    let downloader = StubDownloader::new().with_status(ASSET_URL, 503);

    let (result, _) = run(&tool, &linux(), &sandbox, &downloader);

    let err = result.expect_err("HTTP 503");
    assert!(matches!(
        err,
        PipelineError::Fetch(DownloadError::Status { status: 503, .. })
    ));
    assert!(!sandbox.destination.exists());
}

#[rstest]
fn digest_mismatch_installs_nothing(sandbox: Sandbox) {
    let archive = shellcheck_archive();
    let wrong = sha256_hex(b"a different archive");
    let tool = pinned_tool(&wrong);
    let downloader = StubDownloader::new().with_body(ASSET_URL, archive.clone());

    let (result, _) = run(&tool, &linux(), &sandbox, &downloader);

    let err = result.expect_err("mismatch");
    let message = err.to_string();
    assert!(message.starts_with("verify: "), "{message}");
    assert!(message.contains(&wrong));
    assert!(message.contains(&sha256_hex(&archive)));
    assert!(!sandbox.destination.exists());
}

#[rstest]
fn missing_member_installs_nothing(sandbox: Sandbox) {
    let archive = tar_xz(&[("shellcheck-v0.9.0/README.txt", b"readme")]).expect("archive");
    let tool = pinned_tool(&sha256_hex(&archive));
    let downloader = StubDownloader::new().with_body(ASSET_URL, archive);

    let (result, _) = run(&tool, &linux(), &sandbox, &downloader);

    assert!(matches!(
        result.expect_err("no member"),
        PipelineError::Extract(ExtractionError::MemberNotFound { .. })
    ));
    assert!(!sandbox.destination.exists());
}

#[rstest]
fn sidecar_digest_is_fetched_after_the_asset(sandbox: Sandbox) {
    let asset_url = "https://example.test/shellcheck-v0.7.1.linux-x86_64";
    let sidecar_url = format!("{asset_url}.sha512sum");
    let sidecar = format!("{}  shellcheck-v0.7.1.linux-x86_64\n", sha512_hex(BINARY));
    let downloader = StubDownloader::new()
        .with_body(asset_url, BINARY.to_vec())
        .with_body(&sidecar_url, sidecar.into_bytes());

    let (result, _) = run(&sidecar_tool(), &linux(), &sandbox, &downloader);

    result.expect("pipeline succeeds");
    assert_eq!(downloader.requests(), vec![asset_url.to_owned(), sidecar_url]);
    assert_eq!(
        std::fs::read(sandbox.destination.join("shellcheck")).expect("installed"),
        BINARY
    );
}

#[rstest]
fn missing_sidecar_is_a_fetch_failure(sandbox: Sandbox) {
    let downloader = StubDownloader::new().with_body(
        "https://example.test/shellcheck-v0.7.1.linux-x86_64",
        BINARY.to_vec(),
    );

    let (result, _) = run(&sidecar_tool(), &linux(), &sandbox, &downloader);

    assert!(matches!(
        result.expect_err("sidecar 404"),
        PipelineError::Fetch(DownloadError::Status { status: 404, .. })
    ));
    assert!(!sandbox.destination.exists());
}

#[rstest]
fn each_url_is_fetched_exactly_once(sandbox: Sandbox) {
    let bare_tool = ToolSpec::from_toml(
        r#"
name = "shfmt"
version = "3.7.0"
url = "https://example.test/shfmt_v{version}_{suffix}"
executable = "shfmt"

[checksum]
source = "pinned"

[[asset]]
os = "linux"
arch = ["x86_64"]
suffix = "linux_amd64"
digest = "DIGEST"
"#
        .replace("DIGEST", &sha256_hex(BINARY))
        .as_str(),
    )
    .expect("valid definition");

    let mut downloader = MockArtefactDownloader::new();
    downloader
        .expect_fetch()
        .withf(|url| url == "https://example.test/shfmt_v3.7.0_linux_amd64")
        .times(1)
        .returning(|url| Ok(DownloadedPayload::new(url.to_owned(), BINARY.to_vec())));

    let (result, _) = run(&bare_tool, &linux(), &sandbox, &downloader);

    let installed = result.expect("pipeline succeeds");
    assert_eq!(installed.len(), 1);
    assert_eq!(
        installed.first().map(|file| file.path().file_name()),
        Some(Some("shfmt"))
    );
}

#[rstest]
fn all_mode_installs_every_file(sandbox: Sandbox) {
    let archive = zip_archive(&[
        ("LICENSE.txt", b"GPL"),
        ("README.txt", b"readme"),
        ("shellcheck.exe", BINARY),
    ])
    .expect("archive");
    let tool = ToolSpec::from_toml(&format!(
        r#"
name = "shellcheck-zip-all"
version = "0.9.0"
url = "https://example.test/shellcheck-v{{version}}.{{suffix}}"
executable = "shellcheck"
extract = "all"

[checksum]
source = "pinned"

[[asset]]
os = "windows"
arch = ["x86_64"]
suffix = "zip"
digest = "{}"
"#,
        sha256_hex(&archive)
    ))
    .expect("valid definition");
    let downloader =
        StubDownloader::new().with_body("https://example.test/shellcheck-v0.9.0.zip", archive);
    let windows = PlatformKey::new("windows", "x86_64").expect("key");

    let (result, _) = run(&tool, &windows, &sandbox, &downloader);

    let installed = result.expect("pipeline succeeds");
    assert_eq!(installed.len(), 3);
    let executables: Vec<_> = installed
        .iter()
        .filter(|file| file.is_executable())
        .map(|file| file.path().file_name())
        .collect();
    assert_eq!(executables, vec![Some("shellcheck.exe")]);
    assert!(sandbox.destination.join("LICENSE.txt").is_file());
}

#[rstest]
fn quiet_run_writes_no_progress(sandbox: Sandbox) {
    let archive = shellcheck_archive();
    let tool = pinned_tool(&sha256_hex(&archive));
    let downloader = StubDownloader::new().with_body(ASSET_URL, archive);
    let platform = linux();
    let config = PipelineConfig {
        tool: &tool,
        platform: &platform,
        destination: &sandbox.destination,
        quiet: true,
    };
    let mut stderr = Vec::new();

    run_pipeline_with(&config, &downloader, &mut stderr).expect("pipeline succeeds");

    assert!(stderr.is_empty());
}
