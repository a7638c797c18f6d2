//! Operator configuration with versioned self-migration
//!
//! The on-disk `config.yml` carries a `config-version` stamp. On load it is
//! compared against the version bundled with this build:
//! - older on disk: a timestamped backup is written, bundled keys missing on
//!   disk are merged in (user values are never overwritten), the stamp is
//!   bumped and the file saved back
//! - newer on disk: a forward-compatibility warning is logged and the file
//!   is used unmodified (never downgraded, unknown keys never stripped)
//! - equal: nothing happens

use crate::error::ConfigError;
use crate::plan::PlanParams;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the configuration file inside the data directory
pub const CONFIG_FILE_NAME: &str = "config.yml";
const CONFIG_VERSION_KEY: &str = "config-version";

/// Default configuration bundled with this build
const BUNDLED_CONFIG: &str = include_str!("../resources/config.yml");

/// Loads, migrates and serves the operator configuration.
pub struct ConfigManager {
    config_path: PathBuf,
    config: Mapping,
    defaults: Mapping,
    current_version: i64,
    bundled_version: i64,
}

impl ConfigManager {
    /// Load the configuration from `data_dir`, copying the bundled default
    /// into place first if no file exists, and migrating a stale file.
    ///
    /// # Errors
    /// IO or YAML parse failures on either the on-disk or bundled file.
    pub fn load(data_dir: &Path) -> Result<Self, ConfigError> {
        fs::create_dir_all(data_dir).map_err(|e| ConfigError::io(data_dir, e))?;
        let config_path = data_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            fs::write(&config_path, BUNDLED_CONFIG)
                .map_err(|e| ConfigError::io(&config_path, e))?;
        }

        let raw =
            fs::read_to_string(&config_path).map_err(|e| ConfigError::io(&config_path, e))?;
        let config = parse_mapping(&raw, &config_path)?;
        let defaults = parse_mapping(BUNDLED_CONFIG, &config_path)?;

        let current_version = get_i64(&config, CONFIG_VERSION_KEY).unwrap_or(0);
        let bundled_version =
            get_i64(&defaults, CONFIG_VERSION_KEY).unwrap_or_else(|| current_version.max(1));

        let mut manager = Self {
            config_path,
            config,
            defaults,
            current_version,
            bundled_version,
        };

        if current_version < bundled_version {
            manager.migrate()?;
        } else if current_version > bundled_version {
            tracing::warn!(
                on_disk = current_version,
                bundled = bundled_version,
                "config-version is newer than this build's bundled version; \
                 proceeding, but the config may expect a newer build"
            );
        }

        Ok(manager)
    }

    /// Re-run loading and migration from disk.
    ///
    /// # Errors
    /// Same failure modes as [`ConfigManager::load`].
    pub fn reload(&mut self) -> Result<(), ConfigError> {
        let data_dir = self
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        *self = Self::load(&data_dir)?;
        Ok(())
    }

    fn migrate(&mut self) -> Result<(), ConfigError> {
        self.backup();
        merge_defaults(&mut self.config, &self.defaults);
        self.config.insert(
            Value::String(CONFIG_VERSION_KEY.to_string()),
            Value::Number(self.bundled_version.into()),
        );
        let from = self.current_version;
        self.current_version = self.bundled_version;
        self.save()?;
        tracing::info!(
            from,
            to = self.bundled_version,
            "config migrated (backup created)"
        );
        Ok(())
    }

    /// Write a timestamped backup next to the config file. Failure is logged
    /// but does not stop the migration.
    fn backup(&self) {
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let backup_path = self
            .config_path
            .with_file_name(format!("{CONFIG_FILE_NAME}.bak-{stamp}"));
        match fs::copy(&self.config_path, &backup_path) {
            Ok(_) => tracing::info!(backup = %backup_path.display(), "created config backup"),
            Err(e) => tracing::warn!(error = %e, "failed to create config backup"),
        }
    }

    /// Persist the in-memory configuration.
    ///
    /// # Errors
    /// IO or serialization failure on the config file.
    pub fn save(&self) -> Result<(), ConfigError> {
        let rendered = serde_yaml::to_string(&Value::Mapping(self.config.clone()))
            .map_err(|e| ConfigError::parse(&self.config_path, e))?;
        fs::write(&self.config_path, rendered).map_err(|e| ConfigError::io(&self.config_path, e))
    }

    /// Version stamp of the on-disk configuration
    #[inline]
    #[must_use]
    pub fn current_version(&self) -> i64 {
        self.current_version
    }

    /// Version stamp bundled with this build
    #[inline]
    #[must_use]
    pub fn bundled_version(&self) -> i64 {
        self.bundled_version
    }

    /// Configured band height
    #[must_use]
    pub fn world_height(&self) -> i32 {
        self.get_int("worldHeight", 1024)
    }

    /// Configured buffer size
    #[must_use]
    pub fn buffer_size(&self) -> i32 {
        self.get_int("bufferSize", 256)
    }

    /// Lower bound of the global coordinate range
    #[must_use]
    pub fn global_min(&self) -> i32 {
        self.get_int("globalMin", -11264)
    }

    /// Upper bound of the global coordinate range
    #[must_use]
    pub fn global_max(&self) -> i32 {
        self.get_int("globalMax", 9216)
    }

    /// Base name for band stores
    #[must_use]
    pub fn base_name(&self) -> String {
        get_str(&self.config, "worldBaseName")
            .or_else(|| get_str(&self.defaults, "worldBaseName"))
            .unwrap_or("earth")
            .to_string()
    }

    /// The five plan parameters as one value
    #[must_use]
    pub fn plan_params(&self) -> PlanParams {
        PlanParams {
            world_height: self.world_height(),
            buffer_size: self.buffer_size(),
            global_min: self.global_min(),
            global_max: self.global_max(),
            base_name: self.base_name(),
        }
    }

    fn get_int(&self, key: &str, fallback: i32) -> i32 {
        get_i64(&self.config, key)
            .or_else(|| get_i64(&self.defaults, key))
            .and_then(|v| i32::try_from(v).ok())
            .unwrap_or(fallback)
    }
}

fn parse_mapping(raw: &str, path: &Path) -> Result<Mapping, ConfigError> {
    let value: Value = serde_yaml::from_str(raw).map_err(|e| ConfigError::parse(path, e))?;
    match value {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        _ => Ok(Mapping::new()),
    }
}

fn get<'a>(mapping: &'a Mapping, key: &str) -> Option<&'a Value> {
    mapping
        .iter()
        .find(|(k, _)| k.as_str() == Some(key))
        .map(|(_, v)| v)
}

fn get_i64(mapping: &Mapping, key: &str) -> Option<i64> {
    get(mapping, key).and_then(Value::as_i64)
}

fn get_str<'a>(mapping: &'a Mapping, key: &str) -> Option<&'a str> {
    get(mapping, key).and_then(Value::as_str)
}

/// Copy every bundled key absent from `target`; existing user values are
/// never overwritten. Nested mappings are merged recursively.
fn merge_defaults(target: &mut Mapping, defaults: &Mapping) {
    for (key, default_value) in defaults {
        match target.get_mut(key) {
            Some(Value::Mapping(existing)) => {
                if let Value::Mapping(nested_defaults) = default_value {
                    merge_defaults(existing, nested_defaults);
                }
            }
            Some(_) => {}
            None => {
                target.insert(key.clone(), default_value.clone());
            }
        }
    }
}
