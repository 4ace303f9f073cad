//! Registry of the tool definitions compiled into the binary.

use super::{ToolError, ToolSpec};

const BUILTIN_TABLES: &[(&str, &str)] = &[
    ("shellcheck", include_str!("../../tables/shellcheck.toml")),
    ("shellcheck-gcs", include_str!("../../tables/shellcheck-gcs.toml")),
    (
        "shellcheck-zip-all",
        include_str!("../../tables/shellcheck-zip-all.toml"),
    ),
    ("shfmt", include_str!("../../tables/shfmt.toml")),
];

/// Return the names of every built-in tool, in registry order.
#[must_use]
pub fn builtin_names() -> Vec<&'static str> {
    BUILTIN_TABLES.iter().map(|(name, _)| *name).collect()
}

/// Load the built-in definition called `name`.
///
/// # Errors
///
/// Returns [`ToolError::UnknownTool`] for an unregistered name, or the parse
/// error of the embedded definition.
pub fn builtin(name: &str) -> Result<ToolSpec, ToolError> {
    let source = BUILTIN_TABLES
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, source)| *source)
        .ok_or_else(|| ToolError::UnknownTool {
            name: name.to_owned(),
            available: builtin_names().join(", "),
        })?;
    ToolSpec::from_toml(source)
}

/// Load every built-in definition.
///
/// # Errors
///
/// Returns the first definition that fails to load.
pub fn all_builtin() -> Result<Vec<ToolSpec>, ToolError> {
    BUILTIN_TABLES
        .iter()
        .map(|(_, source)| ToolSpec::from_toml(source))
        .collect()
}
