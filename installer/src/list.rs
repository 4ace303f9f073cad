//! `platforms` and `tools` command implementations.
//!
//! Both read only the built-in tool tables and write to stdout.

use log::trace;
use std::io::Write;

use crate::cli::PlatformsArgs;
use crate::error::{InstallerError, Result};
use crate::list_output::{format_platforms_human, format_platforms_json, format_tools_human};
use crate::tool::builtin::{all_builtin, builtin};

/// Print the release table of one built-in tool.
///
/// # Errors
///
/// Returns an error if the tool is unknown or writing to stdout fails.
pub fn run_platforms(args: &PlatformsArgs, stdout: &mut dyn Write) -> Result<()> {
    let spec = builtin(&args.tool)?;
    trace!("{} has {} table entries", spec.name(), spec.table().entries().len());

    let output = if args.json {
        format_platforms_json(&spec)
    } else {
        format_platforms_human(&spec)
    };
    write_output(stdout, &output)
}

/// Print every built-in tool.
///
/// # Errors
///
/// Returns an error if a built-in table fails to load or writing fails.
pub fn run_tools(stdout: &mut dyn Write) -> Result<()> {
    let specs = all_builtin()?;
    write_output(stdout, format_tools_human(&specs).trim_end())
}

fn write_output(stdout: &mut dyn Write, output: &str) -> Result<()> {
    writeln!(stdout, "{output}").map_err(|source| InstallerError::WriteFailed { source })
}
