//! Stratum Descriptor - versioned on-disk range descriptors
//!
//! Each partition store carries a descriptor directory describing the
//! logical coordinate range the host should apply to it. This crate owns:
//! - Template resolution by schema version
//! - Materialization (atomic-enough replace: delete, recreate, substitute)
//! - Loading persisted descriptors back into structured form
//! - The runtime-version to schema-version compatibility table

#![warn(unreachable_pub)]

pub mod error;
pub mod store;
pub mod templates;

pub use error::DescriptorError;
pub use store::{DescriptorStore, RangeDescriptor};
pub use templates::{
    resolve_templates, schema_version_for_runtime, TemplateSet, CURRENT_SCHEMA_VERSION,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
