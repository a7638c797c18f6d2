//! Versioned descriptor store
//!
//! Every partition store carries an on-disk descriptor directory that tells
//! the host its logical coordinate range. [`DescriptorStore`] materializes
//! that directory from versioned templates, loads it back, and checks
//! compatibility with the running build.
//!
//! Materialization is delete-then-recreate rather than staged: a crash in
//! the middle can leave a missing descriptor, which the load path reports
//! instead of accepting. This is a single-operator, low-frequency operation.

use crate::error::DescriptorError;
use crate::templates::{
    resolve_templates, schema_version_for_runtime, TemplateSet, HEIGHT_PLACEHOLDER,
    MIN_Y_PLACEHOLDER,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory inside a store that holds descriptor packs
const DESCRIPTOR_DIR: &str = "descriptors";
/// Name of the descriptor pack owned by this system
const DESCRIPTOR_NAME: &str = "stratum";
/// Fixed-name metadata file inside the pack
const META_FILE: &str = "meta.json";
/// Range file inside the pack, relative to its root
const RANGE_FILE: &str = "data/range.json";

/// A persisted descriptor read back from disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeDescriptor {
    /// Schema version the descriptor was written with
    pub schema_version: String,
    /// Minimum coordinate of the described range
    pub min_y: i32,
    /// Total height of the described range
    pub height: i32,
    /// Name of the store the descriptor lives in
    pub name: String,
}

/// Writer/reader for the versioned on-disk descriptor.
///
/// Holds the coordinate range the running configuration expects; the same
/// physical descriptor is replicated into whichever store is currently the
/// default.
#[derive(Debug, Clone)]
pub struct DescriptorStore {
    templates: &'static TemplateSet,
    min_y: i32,
    height: i32,
}

impl DescriptorStore {
    /// Create a store for an explicit schema version.
    ///
    /// # Errors
    /// [`DescriptorError::UnsupportedVersion`] when no templates are
    /// registered for `schema_version`.
    pub fn new(schema_version: &str, min_y: i32, height: i32) -> Result<Self, DescriptorError> {
        Ok(Self {
            templates: resolve_templates(schema_version)?,
            min_y,
            height,
        })
    }

    /// Create a store for the schema required by a host runtime version.
    ///
    /// # Errors
    /// [`DescriptorError::UnsupportedVersion`] for unknown runtimes.
    pub fn for_runtime(
        runtime_version: &str,
        min_y: i32,
        height: i32,
    ) -> Result<Self, DescriptorError> {
        Self::new(schema_version_for_runtime(runtime_version)?, min_y, height)
    }

    /// Schema version this store writes
    #[inline]
    #[must_use]
    pub fn schema_version(&self) -> &str {
        self.templates.version
    }

    /// Minimum coordinate this store writes
    #[inline]
    #[must_use]
    pub fn min_y(&self) -> i32 {
        self.min_y
    }

    /// Total height this store writes
    #[inline]
    #[must_use]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Path of the descriptor pack for a store
    #[must_use]
    pub fn descriptor_path(server_root: &Path, store_name: &str) -> PathBuf {
        server_root
            .join(store_name)
            .join(DESCRIPTOR_DIR)
            .join(DESCRIPTOR_NAME)
    }

    /// Write the descriptor into the given store, replacing any existing one.
    ///
    /// Any pre-existing pack is deleted first (per-entry failures are logged
    /// and skipped, but the directory must end up gone), then the directory
    /// structure is recreated, the metadata template copied verbatim, and the
    /// range template written with its placeholders substituted.
    ///
    /// # Errors
    /// The post-condition is a fully written descriptor or an error; no
    /// partial write goes unreported.
    pub fn materialize(&self, server_root: &Path, store_name: &str) -> Result<(), DescriptorError> {
        let target = Self::descriptor_path(server_root, store_name);

        if target.exists() {
            remove_tree_best_effort(&target);
            if target.exists() {
                return Err(DescriptorError::CleanupFailed(target));
            }
        }

        let data_dir = target.join("data");
        fs::create_dir_all(&data_dir).map_err(|e| DescriptorError::io(&data_dir, e))?;

        let meta_path = target.join(META_FILE);
        fs::write(&meta_path, self.templates.meta).map_err(|e| DescriptorError::io(&meta_path, e))?;

        let range = self
            .templates
            .range
            .replace(MIN_Y_PLACEHOLDER, &self.min_y.to_string())
            .replace(HEIGHT_PLACEHOLDER, &self.height.to_string());
        let range_path = target.join(RANGE_FILE);
        fs::write(&range_path, range).map_err(|e| DescriptorError::io(&range_path, e))?;

        tracing::debug!(
            store = store_name,
            version = self.templates.version,
            min_y = self.min_y,
            height = self.height,
            "materialized range descriptor"
        );
        Ok(())
    }

    /// Load the persisted descriptor from a store.
    ///
    /// # Errors
    /// - [`DescriptorError::NotFound`] when the pack directory is absent
    /// - [`DescriptorError::Malformed`] when a structured field is missing
    ///   or unparsable
    pub fn load(server_root: &Path, store_name: &str) -> Result<RangeDescriptor, DescriptorError> {
        let target = Self::descriptor_path(server_root, store_name);
        if !target.exists() {
            return Err(DescriptorError::NotFound(target));
        }

        let meta_path = target.join(META_FILE);
        let meta_raw =
            fs::read_to_string(&meta_path).map_err(|e| DescriptorError::io(&meta_path, e))?;
        let meta: serde_json::Value = serde_json::from_str(&meta_raw)
            .map_err(|e| DescriptorError::malformed(&meta_path, e.to_string()))?;
        let schema_version = meta
            .pointer("/pack/format")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| DescriptorError::malformed(&meta_path, "missing pack.format"))?
            .to_string();

        let range_path = target.join(RANGE_FILE);
        let range_raw =
            fs::read_to_string(&range_path).map_err(|e| DescriptorError::io(&range_path, e))?;
        let range: serde_json::Value = serde_json::from_str(&range_raw)
            .map_err(|e| DescriptorError::malformed(&range_path, e.to_string()))?;
        let min_y = read_i32(&range, "min_y", &range_path)?;
        let height = read_i32(&range, "height", &range_path)?;

        Ok(RangeDescriptor {
            schema_version,
            min_y,
            height,
            name: store_name.to_string(),
        })
    }

    /// Check a loaded descriptor against the schema this build supports.
    ///
    /// Currently a fixed compatibility check; the hook for future
    /// multi-version upgrade logic.
    #[must_use]
    pub fn migrate(&self, descriptor: &RangeDescriptor) -> bool {
        if resolve_templates(&descriptor.schema_version).is_err() {
            tracing::warn!(
                store = descriptor.name.as_str(),
                version = descriptor.schema_version.as_str(),
                "descriptor schema version is not supported by this build"
            );
            return false;
        }
        true
    }
}

fn read_i32(
    value: &serde_json::Value,
    field: &str,
    path: &Path,
) -> Result<i32, DescriptorError> {
    value
        .get(field)
        .and_then(serde_json::Value::as_i64)
        .and_then(|v| i32::try_from(v).ok())
        .ok_or_else(|| DescriptorError::malformed(path, format!("missing integer field {field}")))
}

/// Delete a directory tree, deepest entries first. Individual failures are
/// logged and skipped; the caller checks whether the root is actually gone.
fn remove_tree_best_effort(root: &Path) {
    if root.is_dir() {
        match fs::read_dir(root) {
            Ok(entries) => {
                for entry in entries.flatten() {
                    remove_tree_best_effort(&entry.path());
                }
            }
            Err(e) => {
                tracing::error!(path = %root.display(), error = %e, "failed to list directory");
                return;
            }
        }
        if let Err(e) = fs::remove_dir(root) {
            tracing::error!(path = %root.display(), error = %e, "failed to delete directory");
        }
    } else if let Err(e) = fs::remove_file(root) {
        tracing::error!(path = %root.display(), error = %e, "failed to delete file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::CURRENT_SCHEMA_VERSION;
    use tempfile::TempDir;

    fn store() -> DescriptorStore {
        DescriptorStore::new(CURRENT_SCHEMA_VERSION, -256, 1536).unwrap()
    }

    #[test]
    fn materialize_then_load_round_trips() {
        let root = TempDir::new().unwrap();
        store().materialize(root.path(), "earth_0_1024").unwrap();

        let loaded = DescriptorStore::load(root.path(), "earth_0_1024").unwrap();
        assert_eq!(loaded.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(loaded.min_y, -256);
        assert_eq!(loaded.height, 1536);
        assert_eq!(loaded.name, "earth_0_1024");
    }

    #[test]
    fn materialize_substitutes_placeholders_as_decimal_integers() {
        let root = TempDir::new().unwrap();
        store().materialize(root.path(), "earth_0_1024").unwrap();

        let range_path =
            DescriptorStore::descriptor_path(root.path(), "earth_0_1024").join(RANGE_FILE);
        let raw = fs::read_to_string(range_path).unwrap();
        assert!(raw.contains("\"min_y\": -256"));
        assert!(raw.contains("\"height\": 1536"));
        assert!(!raw.contains('%'));
    }

    #[test]
    fn materialize_replaces_an_existing_descriptor() {
        let root = TempDir::new().unwrap();
        let target = DescriptorStore::descriptor_path(root.path(), "earth_0_1024");
        fs::create_dir_all(target.join("stale/nested")).unwrap();
        fs::write(target.join("stale/nested/junk.bin"), b"old").unwrap();

        store().materialize(root.path(), "earth_0_1024").unwrap();
        assert!(!target.join("stale").exists());
        assert!(target.join(META_FILE).exists());
    }

    #[test]
    fn load_missing_descriptor_is_not_found() {
        let root = TempDir::new().unwrap();
        let err = DescriptorStore::load(root.path(), "earth_0_1024").unwrap_err();
        assert!(matches!(err, DescriptorError::NotFound(_)));
    }

    #[test]
    fn load_rejects_a_range_file_without_fields() {
        let root = TempDir::new().unwrap();
        store().materialize(root.path(), "earth_0_1024").unwrap();

        let range_path =
            DescriptorStore::descriptor_path(root.path(), "earth_0_1024").join(RANGE_FILE);
        fs::write(&range_path, "{\"kind\": \"vertical_range\"}").unwrap();

        let err = DescriptorStore::load(root.path(), "earth_0_1024").unwrap_err();
        assert!(matches!(err, DescriptorError::Malformed { .. }));
    }

    #[test]
    fn migrate_accepts_supported_schema_only() {
        let descriptor_store = store();
        let mut descriptor = RangeDescriptor {
            schema_version: CURRENT_SCHEMA_VERSION.to_string(),
            min_y: -256,
            height: 1536,
            name: "earth_0_1024".to_string(),
        };
        assert!(descriptor_store.migrate(&descriptor));

        descriptor.schema_version = "0.0".to_string();
        assert!(!descriptor_store.migrate(&descriptor));
    }
}
