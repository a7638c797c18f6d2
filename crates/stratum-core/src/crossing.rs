//! Boundary-crossing evaluation
//!
//! Pure decision logic for occupant movement. The host delivers an immutable
//! [`PositionEvent`] for every movement or explicit relocation; [`evaluate`]
//! consults the registry and answers with an optional [`Remap`] instruction.
//! Actually relocating the occupant is the host's job.

use crate::registry::BandRegistry;
use crate::store::StoreHandle;

/// Identifier of a moving occupant, assigned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OccupantId(pub u64);

impl std::fmt::Display for OccupantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A position change inside some spatial store
#[derive(Debug, Clone, PartialEq)]
pub struct PositionEvent {
    /// The occupant that moved
    pub occupant: OccupantId,
    /// Store the occupant currently resides in
    pub store: StoreHandle,
    /// Vertical coordinate local to that store
    pub local_y: f64,
}

/// Instruction to relocate an occupant into a neighboring band
#[derive(Debug, Clone, PartialEq)]
pub struct Remap {
    /// Backing store of the destination band
    pub target: StoreHandle,
    /// Local vertical coordinate inside the destination store
    pub local_y: f64,
}

/// Result of evaluating a position event against the registry
#[derive(Debug, Clone, PartialEq)]
pub struct CrossingOutcome {
    /// The occupant's position on the global axis, for diagnostics/UI
    pub global_y: i32,
    /// Relocation instruction, when a buffer threshold was crossed
    pub remap: Option<Remap>,
}

/// Evaluate a position event.
///
/// Returns `None` when the event's store is not backed by any registered
/// band (the occupant is outside the managed axis entirely). Otherwise the
/// outcome always carries the reconstructed global coordinate; it carries a
/// [`Remap`] only when the occupant moved past a teleport threshold and a
/// destination band exists.
///
/// The translated coordinate shifts by exactly one band height in the
/// direction of travel. Bands are contiguous and of uniform height, so the
/// shifted coordinate always lands inside the destination band's primary
/// range, at least half a buffer away from its thresholds; re-evaluating the
/// remapped position never triggers another crossing.
#[must_use]
pub fn evaluate(registry: &BandRegistry, event: &PositionEvent) -> Option<CrossingOutcome> {
    let band = registry.lookup_by_store(&event.store)?;
    let global_y = event.local_y.floor() as i32 + band.min_y();

    let crossing_down = global_y < band.teleport_min_y();
    let crossing_up = global_y > band.teleport_max_y();
    if !crossing_down && !crossing_up {
        return Some(CrossingOutcome {
            global_y,
            remap: None,
        });
    }

    let Some(destination) = registry.lookup_by_coordinate(global_y) else {
        // Past the outermost configured buffer; leave the occupant in place.
        tracing::warn!(
            occupant = %event.occupant,
            global_y,
            band = band.name(),
            "occupant moved beyond every configured band, not remapping"
        );
        return Some(CrossingOutcome {
            global_y,
            remap: None,
        });
    };

    let world_height = f64::from(registry.world_height());
    let local_y = if crossing_down {
        event.local_y + world_height
    } else {
        event.local_y - world_height
    };

    tracing::info!(
        occupant = %event.occupant,
        from = band.name(),
        to = destination.name(),
        local_y,
        "occupant crossed a band boundary, remapping"
    );

    Some(CrossingOutcome {
        global_y,
        remap: Some(Remap {
            target: destination.store().clone(),
            local_y,
        }),
    })
}
