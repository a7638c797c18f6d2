//! Stratum Core - banded world layering
//!
//! Leaf types and pure logic for partitioning a vertical coordinate axis
//! into fixed-height bands:
//! - Band descriptors and the ordered band registry
//! - Coordinate-to-band resolution
//! - Boundary-crossing evaluation with buffered remapping
//! - The backing-store collaborator seam
//!
//! # Example
//!
//! ```rust,ignore
//! use stratum_core::{BandDescriptor, BandRegistry, StoreHandle};
//!
//! let mut registry = BandRegistry::new(1024, 256);
//! registry.register(BandDescriptor::new("earth_0_1024", 0, 1024, 256,
//!     StoreHandle::new("earth_0_1024")))?;
//!
//! let band = registry.lookup_by_coordinate(512).unwrap();
//! assert_eq!(band.teleport_min_y(), -128);
//! ```

#![warn(unreachable_pub)]

pub mod crossing;
pub mod descriptor;
pub mod error;
pub mod registry;
pub mod store;

pub use crossing::{evaluate, CrossingOutcome, OccupantId, PositionEvent, Remap};
pub use descriptor::BandDescriptor;
pub use error::RegistryError;
pub use registry::BandRegistry;
pub use store::{BackingStore, Difficulty, GameMode, PartitionSettings, StoreError, StoreHandle};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
