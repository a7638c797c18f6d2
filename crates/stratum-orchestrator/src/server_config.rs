//! Top-level server file reconciliation
//!
//! Two host-owned files have to be rewritten when the default partition
//! changes: the properties-style server file whose `level-name` key points at
//! the default store, and the YAML generator-binding file that maps a store
//! name to the generator spec driving it. Both are edited in place; unknown
//! keys and unrelated content survive a rewrite.

use crate::error::ConfigError;
use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

/// Name of the properties-style server file
pub const SERVER_FILE_NAME: &str = "server.properties";
/// Key holding the default store's name
pub const LEVEL_NAME_KEY: &str = "level-name";
/// Name of the generator-binding file
pub const BINDINGS_FILE_NAME: &str = "bindings.yml";

/// In-memory view of the properties-style server file.
///
/// Key order is preserved so a rewrite stays diffable against the original.
#[derive(Debug, Clone, Default)]
pub struct ServerProperties {
    entries: IndexMap<String, String>,
}

impl ServerProperties {
    /// Parse the file at `path`.
    ///
    /// Blank lines and `#`/`!` comment lines are skipped; everything else is
    /// a `key=value` pair.
    ///
    /// # Errors
    /// IO failure reading the file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let mut entries = IndexMap::new();
        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                entries.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
        Ok(Self { entries })
    }

    /// Value of a key, if present
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Set a key, inserting or replacing in place
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Write all entries back to `path`.
    ///
    /// # Errors
    /// IO failure writing the file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let mut out = String::new();
        for (key, value) in &self.entries {
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push('\n');
        }
        fs::write(path, out).map_err(|e| ConfigError::io(path, e))
    }
}

/// Record the generator spec for a store in the binding file, creating the
/// file if needed and leaving unrelated entries intact.
///
/// # Errors
/// IO or YAML failure on the binding file.
pub fn bind_generator(path: &Path, store_name: &str, generator: &str) -> Result<(), ConfigError> {
    let mut doc = if path.exists() {
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        match serde_yaml::from_str::<Value>(&raw).map_err(|e| ConfigError::parse(path, e))? {
            Value::Mapping(mapping) => mapping,
            _ => Mapping::new(),
        }
    } else {
        Mapping::new()
    };

    let partitions = doc
        .entry(Value::String("partitions".to_string()))
        .or_insert_with(|| Value::Mapping(Mapping::new()));
    if !partitions.is_mapping() {
        *partitions = Value::Mapping(Mapping::new());
    }
    if let Value::Mapping(partitions) = partitions {
        let mut binding = Mapping::new();
        binding.insert(
            Value::String("generator".to_string()),
            Value::String(generator.to_string()),
        );
        partitions.insert(
            Value::String(store_name.to_string()),
            Value::Mapping(binding),
        );
    }

    let rendered = serde_yaml::to_string(&Value::Mapping(doc))
        .map_err(|e| ConfigError::parse(path, e))?;
    fs::write(path, rendered).map_err(|e| ConfigError::io(path, e))?;
    tracing::info!(store = store_name, generator, "updated generator binding");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn properties_round_trip_preserves_unknown_keys_and_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SERVER_FILE_NAME);
        fs::write(
            &path,
            "# host settings\nmotd=hello world\nlevel-name=old_default\nmax-occupants=20\n",
        )
        .unwrap();

        let mut props = ServerProperties::load(&path).unwrap();
        assert_eq!(props.get(LEVEL_NAME_KEY), Some("old_default"));
        assert_eq!(props.get("motd"), Some("hello world"));

        props.set(LEVEL_NAME_KEY, "earth_-11264_-10240");
        props.save(&path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert_eq!(
            raw,
            "motd=hello world\nlevel-name=earth_-11264_-10240\nmax-occupants=20\n"
        );
    }

    #[test]
    fn missing_server_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = ServerProperties::load(&dir.path().join(SERVER_FILE_NAME)).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn bind_generator_creates_and_updates_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(BINDINGS_FILE_NAME);

        bind_generator(&path, "earth_0_1024", "terraoffset:0").unwrap();
        bind_generator(&path, "earth_1024_2048", "terraoffset:-1024").unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let doc: Value = serde_yaml::from_str(&raw).unwrap();
        assert_eq!(
            doc["partitions"]["earth_0_1024"]["generator"],
            Value::String("terraoffset:0".to_string())
        );
        assert_eq!(
            doc["partitions"]["earth_1024_2048"]["generator"],
            Value::String("terraoffset:-1024".to_string())
        );
    }

    #[test]
    fn bind_generator_leaves_unrelated_content_intact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(BINDINGS_FILE_NAME);
        fs::write(&path, "other-section:\n  keep: true\n").unwrap();

        bind_generator(&path, "earth_0_1024", "terraoffset:0").unwrap();

        let doc: Value =
            serde_yaml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc["other-section"]["keep"], Value::Bool(true));
        assert_eq!(
            doc["partitions"]["earth_0_1024"]["generator"],
            Value::String("terraoffset:0".to_string())
        );
    }
}
