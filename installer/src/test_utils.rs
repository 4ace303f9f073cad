//! Shared test utilities for the installer crate.
//!
//! Archive builders produce in-memory fixtures in every format the extractor
//! understands. Entry names ending in `/` become directory entries.

use crate::artefact::digest::DigestAlgorithm;
use crate::artefact::download::{ArtefactDownloader, DownloadError, DownloadedPayload};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::{Cursor, Write};

/// Return the lowercase hex SHA-256 digest of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    DigestAlgorithm::Sha256.compute(bytes).as_str().to_owned()
}

/// Return the lowercase hex SHA-512 digest of `bytes`.
#[must_use]
pub fn sha512_hex(bytes: &[u8]) -> String {
    DigestAlgorithm::Sha512.compute(bytes).as_str().to_owned()
}

/// Build a `.tar.xz` archive from `(name, content)` pairs.
///
/// # Errors
///
/// Returns an I/O error if encoding fails.
pub fn tar_xz(entries: &[(&str, &[u8])]) -> std::io::Result<Vec<u8>> {
    let encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
    let encoder = write_tar(encoder, entries)?;
    encoder.finish()
}

/// Build a `.tar.gz` archive from `(name, content)` pairs.
///
/// # Errors
///
/// Returns an I/O error if encoding fails.
pub fn tar_gz(entries: &[(&str, &[u8])]) -> std::io::Result<Vec<u8>> {
    let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    let encoder = write_tar(encoder, entries)?;
    encoder.finish()
}

/// Build a `.zip` archive from `(name, content)` pairs.
///
/// # Errors
///
/// Returns an I/O error if encoding fails.
pub fn zip_archive(entries: &[(&str, &[u8])]) -> std::io::Result<Vec<u8>> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();

    for (name, content) in entries {
        if name.ends_with('/') {
            writer
                .add_directory(*name, options)
                .map_err(std::io::Error::other)?;
            continue;
        }
        writer
            .start_file(*name, options)
            .map_err(std::io::Error::other)?;
        writer.write_all(content)?;
    }

    let cursor = writer.finish().map_err(std::io::Error::other)?;
    Ok(cursor.into_inner())
}

fn write_tar<W: Write>(sink: W, entries: &[(&str, &[u8])]) -> std::io::Result<W> {
    let mut builder = tar::Builder::new(sink);

    for (name, content) in entries {
        let mut header = tar::Header::new_gnu();
        if name.ends_with('/') {
            header.set_entry_type(tar::EntryType::Directory);
            header.set_mode(0o755);
            header.set_size(0);
            builder.append_data(&mut header, name, std::io::empty())?;
        } else {
            header.set_entry_type(tar::EntryType::Regular);
            header.set_mode(0o644);
            header.set_size(content.len() as u64);
            builder.append_data(&mut header, name, *content)?;
        }
    }

    builder.into_inner()
}

/// Canned response for [`StubDownloader`].
#[derive(Debug, Clone)]
pub enum StubResponse {
    /// Serve these bytes.
    Body(Vec<u8>),
    /// Answer with this HTTP status.
    Status(u16),
}

/// Downloader serving canned responses and recording every requested URL.
///
/// URLs without a canned response answer with HTTP 404.
#[derive(Debug, Default)]
pub struct StubDownloader {
    responses: BTreeMap<String, StubResponse>,
    requests: RefCell<Vec<String>>,
}

impl StubDownloader {
    /// Create a downloader with no canned responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `bytes` for `url`.
    #[must_use]
    pub fn with_body(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.responses
            .insert(url.to_owned(), StubResponse::Body(bytes));
        self
    }

    /// Answer `url` with HTTP `status`.
    #[must_use]
    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.responses
            .insert(url.to_owned(), StubResponse::Status(status));
        self
    }

    /// Return every URL requested so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl ArtefactDownloader for StubDownloader {
    fn fetch(&self, url: &str) -> Result<DownloadedPayload, DownloadError> {
        self.requests.borrow_mut().push(url.to_owned());
        match self.responses.get(url) {
            Some(StubResponse::Body(bytes)) => {
                Ok(DownloadedPayload::new(url.to_owned(), bytes.clone()))
            }
            Some(StubResponse::Status(status)) => Err(DownloadError::Status {
                url: url.to_owned(),
                status: *status,
            }),
            None => Err(DownloadError::Status {
                url: url.to_owned(),
                status: 404,
            }),
        }
    }
}
