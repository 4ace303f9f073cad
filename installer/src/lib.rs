//! shellbin installer library.
//!
//! Fetches prebuilt shellcheck and shfmt binaries for the running platform:
//! a release table picks the upstream asset, the download is checked against
//! a pinned or published digest, and the executable is pulled out of its
//! archive and written with execute permissions. The `shellbin` binary wraps
//! this library; packaging scripts can also call it directly.
//!
//! # Modules
//!
//! - [`artefact`] - The pipeline stages and the types they exchange
//! - [`cli`] - Command-line argument definitions
//! - [`dirs`] - Per-user directory lookup
//! - [`error`] - CLI-level error type
//! - [`list`] - `platforms` and `tools` commands
//! - [`list_output`] - Text and JSON rendering of release tables
//! - [`output`] - Progress lines and `PATH` snippets
//! - [`pipeline`] - Stage orchestration for one tool and platform
//! - [`stager`] - Build-tree copy for the install hook
//! - [`tool`] - Tool definitions and the built-in registry

pub mod artefact;
pub mod cli;
pub mod dirs;
pub mod error;
pub mod list;
pub mod list_output;
pub mod output;
pub mod pipeline;
pub mod stager;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod tool;
