//! Error types for the band registry

/// Errors raised when registering band descriptors
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Descriptor disagrees with the registry's configured geometry
    #[error("invariant violation for band {band}: {constraint}")]
    InvariantViolation {
        /// Name of the rejected band
        band: String,
        /// The constraint that failed
        constraint: String,
    },

    /// A band with this name is already registered
    #[error("band already registered: {0}")]
    AlreadyExists(String),
}

impl RegistryError {
    /// Create an invariant violation for a band
    pub fn invariant(band: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self::InvariantViolation {
            band: band.into(),
            constraint: constraint.into(),
        }
    }
}
