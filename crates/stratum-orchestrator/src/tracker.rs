//! Startup load tracking
//!
//! At host startup the planned partitions load one by one; registry
//! reconstruction must wait until all of them are up. The tracker starts
//! from the full plan and ticks names off as the host reports each load.

use crate::plan::PlanParams;
use std::collections::HashSet;

/// Tracks which planned partitions are still waiting to load.
#[derive(Debug)]
pub struct PartitionLoadTracker {
    pending: HashSet<String>,
}

impl PartitionLoadTracker {
    /// Start tracking every band the plan names
    #[must_use]
    pub fn new(params: &PlanParams) -> Self {
        Self {
            pending: params.bands().into_iter().map(|b| b.name).collect(),
        }
    }

    /// Record that a partition has loaded.
    ///
    /// Returns `true` when this was the last pending partition; names
    /// outside the plan are ignored.
    pub fn mark_loaded(&mut self, name: &str) -> bool {
        if self.pending.remove(name) && self.pending.is_empty() {
            tracing::info!("all planned partitions loaded");
            return true;
        }
        false
    }

    /// Whether every planned partition has loaded
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of partitions still pending
    #[inline]
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
