//! Band registry
//!
//! Holds the ordered set of active [`BandDescriptor`]s and answers the two
//! runtime questions: which band owns a global coordinate, and which band is
//! backed by a given store. The registry is append-only during normal
//! operation; [`BandRegistry::reset`] (clear + reconfigure) is the only other
//! mutation path and is reserved for configuration reloads.

use crate::descriptor::BandDescriptor;
use crate::error::RegistryError;
use crate::store::StoreHandle;

/// Ordered registry of active bands.
///
/// Mutated only by the orchestrator; the crossing evaluator reads it. All
/// mutation and lookup happen on the same logical control thread, so the
/// registry carries no internal locking.
#[derive(Debug)]
pub struct BandRegistry {
    world_height: i32,
    buffer_size: i32,
    /// Ascending by `min_y`; kept sorted on every insert
    bands: Vec<BandDescriptor>,
}

impl BandRegistry {
    /// Create an empty registry configured for the given band geometry
    #[must_use]
    pub fn new(world_height: i32, buffer_size: i32) -> Self {
        Self {
            world_height,
            buffer_size,
            bands: Vec::new(),
        }
    }

    /// Configured band height
    #[inline]
    #[must_use]
    pub fn world_height(&self) -> i32 {
        self.world_height
    }

    /// Configured buffer size
    #[inline]
    #[must_use]
    pub fn buffer_size(&self) -> i32 {
        self.buffer_size
    }

    /// Register a band descriptor.
    ///
    /// # Errors
    /// - [`RegistryError::InvariantViolation`] if the descriptor's height or
    ///   buffer size disagrees with the configured values, or its primary
    ///   range overlaps a registered band
    /// - [`RegistryError::AlreadyExists`] on a duplicate name
    ///
    /// A failed registration leaves the registry untouched.
    pub fn register(&mut self, descriptor: BandDescriptor) -> Result<(), RegistryError> {
        if descriptor.height() != self.world_height {
            return Err(RegistryError::invariant(
                descriptor.name(),
                format!(
                    "height {} does not match configured world height {}",
                    descriptor.height(),
                    self.world_height
                ),
            ));
        }
        if descriptor.buffer_size() != self.buffer_size {
            return Err(RegistryError::invariant(
                descriptor.name(),
                format!(
                    "buffer size {} does not match configured buffer size {}",
                    descriptor.buffer_size(),
                    self.buffer_size
                ),
            ));
        }
        if self.bands.iter().any(|b| b.name() == descriptor.name()) {
            return Err(RegistryError::AlreadyExists(descriptor.name().to_string()));
        }
        if let Some(other) = self
            .bands
            .iter()
            .find(|b| descriptor.min_y() < b.max_y() && b.min_y() < descriptor.max_y())
        {
            return Err(RegistryError::invariant(
                descriptor.name(),
                format!(
                    "primary range [{}, {}) overlaps band {}",
                    descriptor.min_y(),
                    descriptor.max_y(),
                    other.name()
                ),
            ));
        }

        self.bands.push(descriptor);
        self.bands.sort_by_key(BandDescriptor::min_y);
        Ok(())
    }

    /// Band whose primary range `[min_y, max_y)` contains `global_y`
    #[must_use]
    pub fn lookup_by_coordinate(&self, global_y: i32) -> Option<&BandDescriptor> {
        // Bands are sorted and non-overlapping, so binary search the lower
        // bounds and check the candidate's upper bound.
        let idx = self.bands.partition_point(|b| b.min_y() <= global_y);
        let candidate = self.bands.get(idx.checked_sub(1)?)?;
        candidate.contains_global(global_y).then_some(candidate)
    }

    /// Band backed by the given store, if any
    #[must_use]
    pub fn lookup_by_store(&self, handle: &StoreHandle) -> Option<&BandDescriptor> {
        self.bands.iter().find(|b| b.store() == handle)
    }

    /// All bands in ascending `min_y` order
    #[inline]
    #[must_use]
    pub fn all(&self) -> &[BandDescriptor] {
        &self.bands
    }

    /// Number of registered bands
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bands.len()
    }

    /// Whether no bands are registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Clear all bands and adopt new configured geometry.
    ///
    /// Used when the operator configuration is reloaded; descriptors must be
    /// re-registered afterwards.
    pub fn reset(&mut self, world_height: i32, buffer_size: i32) {
        self.bands.clear();
        self.world_height = world_height;
        self.buffer_size = buffer_size;
    }
}
