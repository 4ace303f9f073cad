//! Output formatting for the `platforms` and `tools` commands.
//!
//! Release tables are rendered either as aligned text or as JSON.

use serde::Serialize;

use crate::artefact::extraction::ExtractionMode;
use crate::tool::{ChecksumSource, SidecarLocation, ToolSpec};

/// Format a tool's release table for human-readable output.
///
/// # Examples
///
/// ```
/// use shellbin_installer::list_output::format_platforms_human;
/// use shellbin_installer::tool::builtin::builtin;
///
/// let spec = builtin("shfmt").expect("built-in tool");
/// let output = format_platforms_human(&spec);
/// assert!(output.starts_with("shfmt 3.7.0"));
/// assert!(output.contains("linux/x86_64"));
/// ```
#[must_use]
pub fn format_platforms_human(spec: &ToolSpec) -> String {
    let mut output = format!(
        "{} {} ({}, {})\n",
        spec.name(),
        spec.version(),
        spec.algorithm(),
        describe_checksum(spec.checksum())
    );

    for entry in spec.table().entries() {
        let keys = entry
            .keys()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        output.push('\n');
        output.push_str(&format!("  {keys}\n"));
        output.push_str(&format!("    {}\n", spec.download_url(entry.asset())));
        if let Some(digest) = entry.asset().digest() {
            output.push_str(&format!("    {digest}\n"));
        }
    }

    output
}

/// Format a tool's release table as JSON.
///
/// # Examples
///
/// ```
/// use shellbin_installer::list_output::format_platforms_json;
/// use shellbin_installer::tool::builtin::builtin;
///
/// let spec = builtin("shellcheck").expect("built-in tool");
/// let json = format_platforms_json(&spec);
/// assert!(json.contains("\"assets\""));
/// ```
#[must_use]
pub fn format_platforms_json(spec: &ToolSpec) -> String {
    let json_data = ToolJson::from_spec(spec);
    serde_json::to_string_pretty(&json_data).unwrap_or_else(|_| "{}".to_owned())
}

/// Format the list of built-in tools.
#[must_use]
pub fn format_tools_human(specs: &[ToolSpec]) -> String {
    let width = specs.iter().map(|spec| spec.name().len()).max().unwrap_or(0);
    let mut output = String::from("Built-in tools:\n");
    for spec in specs {
        let mode = match spec.extraction() {
            ExtractionMode::Single => "",
            ExtractionMode::All => ", all files",
        };
        output.push_str(&format!(
            "  {:width$}  {}  ({}{mode})\n",
            spec.name(),
            spec.version(),
            describe_checksum(spec.checksum()),
        ));
    }
    output
}

fn describe_checksum(checksum: &ChecksumSource) -> &'static str {
    match checksum {
        ChecksumSource::Pinned => "pinned digests",
        ChecksumSource::Sidecar(SidecarLocation::Suffix(_)) => "sidecar digests",
        ChecksumSource::Sidecar(SidecarLocation::Url(_)) => "checksum list",
    }
}

/// JSON representation of a tool's release table.
#[derive(Debug, Serialize)]
pub struct ToolJson {
    /// Tool name.
    pub name: String,
    /// Upstream version.
    pub version: String,
    /// Digest algorithm name.
    pub algorithm: &'static str,
    /// Where digests come from: `pinned` or `sidecar`.
    pub checksum: &'static str,
    /// One entry per downloadable asset.
    pub assets: Vec<AssetJson>,
}

impl ToolJson {
    fn from_spec(spec: &ToolSpec) -> Self {
        let assets = spec
            .table()
            .entries()
            .iter()
            .map(|entry| AssetJson {
                platforms: entry.keys().iter().map(ToString::to_string).collect(),
                url: spec.download_url(entry.asset()),
                digest: entry.asset().digest().map(|d| d.as_str().to_owned()),
            })
            .collect();

        Self {
            name: spec.name().to_owned(),
            version: spec.version().to_owned(),
            algorithm: spec.algorithm().name(),
            checksum: match spec.checksum() {
                ChecksumSource::Pinned => "pinned",
                ChecksumSource::Sidecar(_) => "sidecar",
            },
            assets,
        }
    }
}

/// JSON entry for one asset.
#[derive(Debug, Serialize)]
pub struct AssetJson {
    /// Every `os/arch` key served by the asset.
    pub platforms: Vec<String>,
    /// Download URL.
    pub url: String,
    /// Pinned digest, when the table carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}
