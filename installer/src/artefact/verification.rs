//! Integrity verifier stage.
//!
//! Hashes a downloaded payload and compares it against the expected digest,
//! which comes either from the release table or from a checksum sidecar
//! published next to the asset. A mismatch is always fatal.

use super::digest::{DigestAlgorithm, HexDigest};
use super::download::DownloadedPayload;
use log::debug;

/// Errors raised by the integrity verifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityError {
    /// The payload digest differs from the expected value.
    #[error("{algorithm} mismatch for {url}: expected \"{expected}\" but got \"{actual}\"")]
    Mismatch {
        /// The URL the payload was fetched from.
        url: String,
        /// The digest algorithm used.
        algorithm: DigestAlgorithm,
        /// The expected digest.
        expected: String,
        /// The digest of the bytes actually received.
        actual: String,
    },

    /// The checksum sidecar did not contain a usable digest.
    #[error("malformed checksum sidecar {url}: {reason}")]
    MalformedSidecar {
        /// The sidecar URL.
        url: String,
        /// Description of the problem.
        reason: String,
    },
}

/// Check `payload` against `expected`.
///
/// Hex digits compare case-insensitively because [`HexDigest`] stores the
/// lowercase form.
///
/// # Errors
///
/// Returns [`IntegrityError::Mismatch`] carrying both digests when the
/// payload does not hash to `expected`.
///
/// # Examples
///
/// ```
/// use shellbin_installer::artefact::digest::DigestAlgorithm;
/// use shellbin_installer::artefact::download::DownloadedPayload;
/// use shellbin_installer::artefact::verification::verify;
///
/// let payload = DownloadedPayload::new("https://example.test/a".to_owned(), b"abc".to_vec());
/// let expected = DigestAlgorithm::Sha256.compute(b"abc");
/// assert!(verify(&payload, &expected).is_ok());
/// ```
pub fn verify(payload: &DownloadedPayload, expected: &HexDigest) -> Result<(), IntegrityError> {
    let algorithm = expected.algorithm();
    let actual = algorithm.compute(payload.bytes());
    if actual != *expected {
        return Err(IntegrityError::Mismatch {
            url: payload.url().to_owned(),
            algorithm,
            expected: expected.to_string(),
            actual: actual.to_string(),
        });
    }
    debug!("{algorithm} verified for {}", payload.url());
    Ok(())
}

/// Extract the expected digest from a checksum sidecar.
///
/// A single-asset sidecar holds the digest as its first whitespace-delimited
/// token. A checksum list (`<digest>  <file>` per line) is searched for the
/// line naming `asset_file_name`.
///
/// # Errors
///
/// Returns [`IntegrityError::MalformedSidecar`] when the sidecar is not UTF-8,
/// is empty, has no line for the asset, or holds a token that is not a valid
/// digest for `algorithm`.
///
/// # Examples
///
/// ```
/// use shellbin_installer::artefact::digest::DigestAlgorithm;
/// use shellbin_installer::artefact::verification::parse_sidecar;
///
/// let text = format!("{}  shfmt_v3.7.0_linux_amd64\n", "c".repeat(64));
/// let digest = parse_sidecar(
///     "https://example.test/sha256sums.txt",
///     text.as_bytes(),
///     "shfmt_v3.7.0_linux_amd64",
///     DigestAlgorithm::Sha256,
/// )
/// .expect("digest line present");
/// assert_eq!(digest.as_str(), "c".repeat(64));
/// ```
pub fn parse_sidecar(
    sidecar_url: &str,
    sidecar: &[u8],
    asset_file_name: &str,
    algorithm: DigestAlgorithm,
) -> Result<HexDigest, IntegrityError> {
    let malformed = |reason: String| IntegrityError::MalformedSidecar {
        url: sidecar_url.to_owned(),
        reason,
    };

    let text = std::str::from_utf8(sidecar)
        .map_err(|e| malformed(format!("not valid UTF-8: {e}")))?;
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();

    let line = match lines.as_slice() {
        [] => return Err(malformed("sidecar is empty".to_owned())),
        [only] => *only,
        many => many
            .iter()
            .copied()
            .find(|l| names_asset(l, asset_file_name))
            .ok_or_else(|| malformed(format!("no checksum listed for {asset_file_name}")))?,
    };

    let token = line
        .split_whitespace()
        .next()
        .ok_or_else(|| malformed("sidecar is empty".to_owned()))?;
    HexDigest::parse(algorithm, token).map_err(|e| malformed(e.to_string()))
}

/// Whether a checksum-list line names `asset_file_name`.
///
/// `sha*sum` output marks binary mode with a leading `*` on the file name.
fn names_asset(line: &str, asset_file_name: &str) -> bool {
    line.split_whitespace()
        .nth(1)
        .map(|name| name.trim_start_matches('*'))
        .is_some_and(|name| name == asset_file_name || name.ends_with(&format!("/{asset_file_name}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const URL: &str = "https://example.test/asset";
    const SIDECAR_URL: &str = "https://example.test/asset.sha512sum";

    fn payload(bytes: &[u8]) -> DownloadedPayload {
        DownloadedPayload::new(URL.to_owned(), bytes.to_vec())
    }

    #[rstest]
    #[case::sha256(DigestAlgorithm::Sha256)]
    #[case::sha512(DigestAlgorithm::Sha512)]
    fn matching_digest_is_accepted(#[case] algorithm: DigestAlgorithm) {
        let bytes = b"#!/bin/sh\necho ok\n";
        assert!(verify(&payload(bytes), &algorithm.compute(bytes)).is_ok());
    }

    #[test]
    fn uppercase_expected_digest_is_accepted() {
        let bytes = b"payload";
        let upper = DigestAlgorithm::Sha256
            .compute(bytes)
            .as_str()
            .to_ascii_uppercase();
        let expected = HexDigest::parse(DigestAlgorithm::Sha256, &upper).expect("valid");
        assert!(verify(&payload(bytes), &expected).is_ok());
    }

    #[rstest]
    #[case::empty(b"".as_slice())]
    #[case::text(b"shellcheck".as_slice())]
    #[case::binary(&[0_u8, 255, 7, 42][..])]
    fn wrong_digest_is_always_rejected(#[case] bytes: &[u8]) {
        let wrong = DigestAlgorithm::Sha256.compute(b"something else entirely");
        let err = verify(&payload(bytes), &wrong).expect_err("mismatch");
        let IntegrityError::Mismatch {
            expected, actual, ..
        } = &err
        else {
            panic!("expected Mismatch, got {err:?}");
        };
        assert_eq!(expected, wrong.as_str());
        assert_eq!(actual, DigestAlgorithm::Sha256.compute(bytes).as_str());
        let message = err.to_string();
        assert!(message.contains(wrong.as_str()));
        assert!(message.contains(actual.as_str()));
    }

    #[test]
    fn single_token_sidecar_uses_first_token() {
        let digest = "d".repeat(128);
        let text = format!("{digest} shellcheck-v0.7.1.linux-x86_64\n");
        let parsed = parse_sidecar(SIDECAR_URL, text.as_bytes(), "ignored", DigestAlgorithm::Sha512)
            .expect("valid sidecar");
        assert_eq!(parsed.as_str(), digest);
    }

    #[test]
    fn bare_digest_sidecar_is_accepted() {
        let digest = "E".repeat(128);
        let parsed = parse_sidecar(SIDECAR_URL, digest.as_bytes(), "x", DigestAlgorithm::Sha512)
            .expect("valid sidecar");
        assert_eq!(parsed.as_str(), "e".repeat(128));
    }

    #[test]
    fn checksum_list_selects_asset_line() {
        let text = format!(
            "{}  shfmt_v3.7.0_darwin_amd64\n{} *shfmt_v3.7.0_linux_amd64\n",
            "1".repeat(64),
            "2".repeat(64)
        );
        let parsed = parse_sidecar(
            SIDECAR_URL,
            text.as_bytes(),
            "shfmt_v3.7.0_linux_amd64",
            DigestAlgorithm::Sha256,
        )
        .expect("asset listed");
        assert_eq!(parsed.as_str(), "2".repeat(64));
    }

    #[rstest]
    #[case::empty(b"".as_slice(), "empty")]
    #[case::blank_lines(b"\n\n  \n".as_slice(), "empty")]
    #[case::not_hex(b"not-a-digest  file".as_slice(), "digest")]
    #[case::not_utf8(&[0xff_u8, 0xfe][..], "UTF-8")]
    fn malformed_sidecars_are_rejected(#[case] sidecar: &[u8], #[case] needle: &str) {
        let err = parse_sidecar(SIDECAR_URL, sidecar, "file", DigestAlgorithm::Sha256)
            .expect_err("malformed");
        assert!(matches!(err, IntegrityError::MalformedSidecar { .. }));
        assert!(err.to_string().contains(needle), "{err}");
    }

    #[test]
    fn checksum_list_without_asset_is_rejected() {
        let text = format!("{}  a\n{}  b\n", "1".repeat(64), "2".repeat(64));
        let err = parse_sidecar(SIDECAR_URL, text.as_bytes(), "c", DigestAlgorithm::Sha256)
            .expect_err("asset missing");
        assert!(err.to_string().contains("no checksum listed for c"));
    }
}
