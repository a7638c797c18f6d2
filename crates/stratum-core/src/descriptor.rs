//! Band descriptors
//!
//! A [`BandDescriptor`] is the immutable description of one fixed-height
//! slice of the global vertical axis: its name, half-open coordinate range,
//! buffer overlap with its neighbors, and the handle of the spatial store
//! backing it.

use crate::store::StoreHandle;
use serde::{Deserialize, Serialize};

/// One band of the layered world.
///
/// Created by the orchestrator once its backing partition exists and never
/// mutated afterwards; a registry reset is the only way descriptors go away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandDescriptor {
    name: String,
    min_y: i32,
    max_y: i32,
    buffer_size: i32,
    store: StoreHandle,
}

impl BandDescriptor {
    /// Create a new band descriptor covering `[min_y, max_y)`
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        min_y: i32,
        max_y: i32,
        buffer_size: i32,
        store: StoreHandle,
    ) -> Self {
        Self {
            name: name.into(),
            min_y,
            max_y,
            buffer_size,
            store,
        }
    }

    /// Unique band name, identical to the backing store's external name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inclusive lower bound of the band's primary range
    #[inline]
    #[must_use]
    pub fn min_y(&self) -> i32 {
        self.min_y
    }

    /// Exclusive upper bound of the band's primary range
    #[inline]
    #[must_use]
    pub fn max_y(&self) -> i32 {
        self.max_y
    }

    /// Overlap width shared with each neighboring band
    #[inline]
    #[must_use]
    pub fn buffer_size(&self) -> i32 {
        self.buffer_size
    }

    /// Handle of the backing spatial store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    /// Height of the primary range
    #[inline]
    #[must_use]
    pub fn height(&self) -> i32 {
        self.max_y - self.min_y
    }

    /// Global coordinate below which an occupant is relocated downward.
    ///
    /// The relocation point sits half-way through the buffer.
    #[inline]
    #[must_use]
    pub fn teleport_min_y(&self) -> i32 {
        self.min_y - self.buffer_size / 2
    }

    /// Global coordinate above which an occupant is relocated upward.
    #[inline]
    #[must_use]
    pub fn teleport_max_y(&self) -> i32 {
        self.max_y + self.buffer_size / 2
    }

    /// Whether `global_y` falls inside the primary range `[min_y, max_y)`
    #[inline]
    #[must_use]
    pub fn contains_global(&self, global_y: i32) -> bool {
        global_y >= self.min_y && global_y < self.max_y
    }
}
