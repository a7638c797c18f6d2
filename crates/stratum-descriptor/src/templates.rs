//! Descriptor template resolution
//!
//! Each supported schema version bundles two template resources: a metadata
//! file copied verbatim and a range file whose `%minY%` / `%worldHeight%`
//! placeholders are substituted at materialization time. Templates are
//! compiled into the crate, so a new schema version ships with a build
//! update.

use crate::error::DescriptorError;

/// Placeholder replaced with the descriptor's minimum coordinate
pub(crate) const MIN_Y_PLACEHOLDER: &str = "%minY%";
/// Placeholder replaced with the descriptor's total height
pub(crate) const HEIGHT_PLACEHOLDER: &str = "%worldHeight%";

/// Template resources for one schema version
#[derive(Debug, Clone, Copy)]
pub struct TemplateSet {
    /// Schema version these templates belong to
    pub version: &'static str,
    /// Metadata file content, copied verbatim
    pub meta: &'static str,
    /// Range file content with coordinate placeholders
    pub range: &'static str,
}

const V94_1: TemplateSet = TemplateSet {
    version: "94.1",
    meta: include_str!("../templates/94.1/meta.json"),
    range: include_str!("../templates/94.1/range.json"),
};

/// The schema version this build materializes by default
pub const CURRENT_SCHEMA_VERSION: &str = V94_1.version;

/// Look up the template resources registered for a schema version.
///
/// # Errors
/// [`DescriptorError::UnsupportedVersion`] when no templates are registered,
/// which means a build update is required.
pub fn resolve_templates(schema_version: &str) -> Result<&'static TemplateSet, DescriptorError> {
    match schema_version {
        "94.1" => Ok(&V94_1),
        other => Err(DescriptorError::UnsupportedVersion(other.to_string())),
    }
}

/// Map a host runtime version to the descriptor schema version it requires.
///
/// # Errors
/// [`DescriptorError::UnsupportedVersion`] for runtimes this build does not
/// know about.
pub fn schema_version_for_runtime(runtime_version: &str) -> Result<&'static str, DescriptorError> {
    match runtime_version {
        // 1.21.11 is the first supported runtime.
        "1.21.11" => Ok("94.1"),
        other => Err(DescriptorError::UnsupportedVersion(other.to_string())),
    }
}
