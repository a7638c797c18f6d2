//! Error types for orchestration
//!
//! Covers the whole taxonomy surfaced to the operator:
//! - Configuration validation and file handling
//! - The idempotency guard on `init`
//! - Per-band creation failures gathered at the barrier
//! - Descriptor persistence and compatibility failures

use std::path::PathBuf;
use stratum_core::RegistryError;
use stratum_descriptor::DescriptorError;

/// One band whose backing partition could not be created
#[derive(Debug, Clone)]
pub struct CreationFailure {
    /// Name of the band
    pub band: String,
    /// Failure reason reported by the backing store
    pub reason: String,
}

impl std::fmt::Display for CreationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.band, self.reason)
    }
}

fn join_failures(failures: &[CreationFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors raised while loading or migrating the operator configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error on a configuration file
    #[error("io error at {path}: {source}")]
    Io {
        /// Offending file
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid YAML
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// Offending file
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl ConfigError {
    /// Create an IO error for a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a parse error for a path
    pub fn parse(path: impl Into<PathBuf>, source: serde_yaml::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }
}

/// Main orchestration error type
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// Plan parameters fail a positivity/divisibility invariant.
    /// Fully recoverable by fixing the configuration and retrying.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// `init` was called while the registry already holds bands
    #[error("already initialized")]
    AlreadyInitialized,

    /// One or more bands could not be created. The whole `init` is aborted;
    /// bands that did succeed are left in the backing system.
    #[error("partition creation failed: {}", join_failures(.failures))]
    PartitionCreation {
        /// Every band that failed, with the backing store's reason
        failures: Vec<CreationFailure>,
    },

    /// Descriptor persistence or compatibility failure
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    /// Persisted descriptor disagrees with the live configuration
    #[error("descriptor mismatch: {0}")]
    DescriptorMismatch(String),

    /// A planned band's backing store could not be resolved at load time;
    /// the registry reconstruction is aborted as a whole.
    #[error("backing store for band {0} is missing; registry reconstruction aborted")]
    MissingStore(String),

    /// Top-level server file could not be read or is incomplete
    #[error("server file error: {0}")]
    ServerConfig(String),

    /// Configuration file handling failed
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Band registration failed (registry invariants)
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_failures_are_listed_by_band() {
        let err = OrchestratorError::PartitionCreation {
            failures: vec![
                CreationFailure {
                    band: "earth_0_1024".to_string(),
                    reason: "disk full".to_string(),
                },
                CreationFailure {
                    band: "earth_1024_2048".to_string(),
                    reason: "timeout".to_string(),
                },
            ],
        };
        let message = err.to_string();
        assert!(message.contains("earth_0_1024: disk full"));
        assert!(message.contains("earth_1024_2048: timeout"));
    }

    #[test]
    fn invalid_configuration_names_the_constraint() {
        let err = OrchestratorError::InvalidConfiguration(
            "worldHeight must be a multiple of 16".to_string(),
        );
        assert!(err.to_string().contains("worldHeight"));
    }
}
