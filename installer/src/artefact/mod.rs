//! The five stages of the fetch pipeline and the types they exchange.
//!
//! Each stage is usable on its own; [`crate::pipeline`] wires them together
//! in order: resolve, fetch, verify, extract, install.
//!
//! # Sub-modules
//!
//! - [`digest`] - Digest algorithms and validated hex digests (`HexDigest`).
//! - [`download`] - Fetcher stage: downloader trait and HTTP implementation.
//! - [`error`] - Validation errors for keys and digests.
//! - [`extraction`] - Archive extractor stage for tar.xz, tar.gz, and zip.
//! - [`install`] - Installer stage: write files and set execute bits.
//! - [`platform`] - Normalised `(os, arch)` keys (`PlatformKey`).
//! - [`table`] - Platform → release asset tables and the resolver stage.
//! - [`verification`] - Integrity verifier stage and sidecar parsing.

pub mod digest;
pub mod download;
pub mod error;
pub mod extraction;
pub mod install;
pub mod platform;
pub mod table;
pub mod verification;
