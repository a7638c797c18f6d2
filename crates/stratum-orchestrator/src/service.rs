//! Service facade
//!
//! Owns the three long-lived pieces (configuration, registry, orchestrator)
//! and exposes the operations the host wires to its lifecycle and command
//! surface. All mutation goes through `&mut self`; the host is expected to
//! drive the service from a single control thread.

use crate::config::ConfigManager;
use crate::error::OrchestratorError;
use crate::orchestrator::{InitReport, Orchestrator};
use crate::tracker::PartitionLoadTracker;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use stratum_core::{BackingStore, BandRegistry, CrossingOutcome, PositionEvent};

/// Result of a configuration reload
#[derive(Debug, Clone)]
pub struct ReloadReport {
    /// Config version before the reload
    pub previous_version: i64,
    /// Config version after the reload
    pub current_version: i64,
    /// Wall-clock duration of the reload
    pub elapsed: Duration,
}

/// The assembled banding service.
pub struct StratumService<S> {
    config: ConfigManager,
    registry: BandRegistry,
    orchestrator: Orchestrator<S>,
}

impl<S: BackingStore + 'static> StratumService<S> {
    /// Load the configuration from `data_dir` and assemble the service.
    /// The registry starts empty; call [`StratumService::restore`] or
    /// [`StratumService::init`] to populate it.
    ///
    /// # Errors
    /// Configuration load or migration failure.
    pub fn start(
        data_dir: &Path,
        server_root: &Path,
        runtime_version: &str,
        store: Arc<S>,
    ) -> Result<Self, OrchestratorError> {
        let config = ConfigManager::load(data_dir)?;
        let registry = BandRegistry::new(config.world_height(), config.buffer_size());
        let orchestrator = Orchestrator::new(store, server_root, runtime_version);
        tracing::info!(version = crate::VERSION, "stratum service started");
        Ok(Self {
            config,
            registry,
            orchestrator,
        })
    }

    /// Re-read the configuration from disk and clear the registry so the
    /// next `init` or `restore` runs against the fresh parameters.
    ///
    /// # Errors
    /// Configuration load or migration failure; the previous configuration
    /// stays in effect.
    pub fn reload(&mut self) -> Result<ReloadReport, OrchestratorError> {
        let start = Instant::now();
        let previous_version = self.config.current_version();
        self.config.reload()?;
        self.registry
            .reset(self.config.world_height(), self.config.buffer_size());
        Ok(ReloadReport {
            previous_version,
            current_version: self.config.current_version(),
            elapsed: start.elapsed(),
        })
    }

    /// Realize the band plan. See [`Orchestrator::init`].
    ///
    /// # Errors
    /// See [`Orchestrator::init`].
    pub async fn init(&mut self) -> Result<InitReport, OrchestratorError> {
        self.orchestrator
            .init(&mut self.registry, &self.config)
            .await
    }

    /// Rebuild the registry from existing partitions. See
    /// [`Orchestrator::restore`].
    ///
    /// # Errors
    /// See [`Orchestrator::restore`].
    pub async fn restore(&mut self) -> Result<usize, OrchestratorError> {
        self.orchestrator
            .restore(&mut self.registry, &self.config)
            .await
    }

    /// Evaluate one occupant position report against the registry
    #[must_use]
    pub fn evaluate_move(&self, event: &PositionEvent) -> Option<CrossingOutcome> {
        stratum_core::crossing::evaluate(&self.registry, event)
    }

    /// Tracker seeded with the current plan, for host startup wiring
    #[must_use]
    pub fn load_tracker(&self) -> PartitionLoadTracker {
        PartitionLoadTracker::new(&self.config.plan_params())
    }

    /// The live configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ConfigManager {
        &self.config
    }

    /// The live registry
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &BandRegistry {
        &self.registry
    }
}
