//! Error types for descriptor persistence

use std::path::PathBuf;

/// Errors raised by the versioned descriptor store
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    /// No templates registered for the requested schema version
    #[error("no descriptor templates registered for schema version '{0}'")]
    UnsupportedVersion(String),

    /// No persisted descriptor at the given path
    #[error("no descriptor found at {0}")]
    NotFound(PathBuf),

    /// Persisted descriptor exists but its structured fields are unreadable
    #[error("malformed descriptor at {path}: {reason}")]
    Malformed {
        /// Location of the offending file
        path: PathBuf,
        /// What failed to parse
        reason: String,
    },

    /// Pre-existing descriptor directory could not be fully removed
    #[error("existing descriptor at {0} could not be fully removed")]
    CleanupFailed(PathBuf),

    /// IO error while reading or writing descriptor files
    #[error("io error at {path}: {source}")]
    Io {
        /// Location of the offending file
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DescriptorError {
    /// Create an IO error for a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a malformed-descriptor error for a path
    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
