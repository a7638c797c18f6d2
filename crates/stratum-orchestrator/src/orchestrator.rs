//! Partition plan orchestration
//!
//! Drives the one-time realization of the band plan (`init`): validates the
//! configured parameters, creates every backing partition asynchronously with
//! staggered starts, barrier-joins on completion, swaps the default
//! partition, and keeps the persisted range descriptor consistent. The
//! sibling `restore` path rebuilds the in-memory registry from already
//! existing partitions at host startup.
//!
//! Registry mutation happens only here; the crossing evaluator is a pure
//! reader, and both run on the same logical control thread.

use crate::config::ConfigManager;
use crate::error::{CreationFailure, OrchestratorError};
use crate::plan::{PlanParams, PlannedBand};
use crate::server_config::{
    bind_generator, ServerProperties, BINDINGS_FILE_NAME, LEVEL_NAME_KEY, SERVER_FILE_NAME,
};
use futures::future::join_all;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use stratum_core::{
    BackingStore, BandDescriptor, BandRegistry, PartitionSettings, StoreHandle,
};
use stratum_descriptor::DescriptorStore;

/// Default stagger between consecutive creation requests (20 host ticks)
pub const DEFAULT_DELAY_INCREMENT: Duration = Duration::from_secs(1);

/// Result of a successful `init`
#[derive(Debug, Clone)]
pub struct InitReport {
    /// Number of bands created and registered
    pub bands: usize,
    /// Lower bound of the covered global range
    pub global_min: i32,
    /// Upper bound of the covered global range
    pub global_max: i32,
    /// Name of the new default partition
    pub new_default: String,
    /// Wall-clock duration of the whole operation
    pub elapsed: Duration,
}

/// Orchestrates partition creation and registry reconstruction.
pub struct Orchestrator<S> {
    store: Arc<S>,
    server_root: PathBuf,
    runtime_version: String,
    delay_increment: Duration,
}

impl<S: BackingStore + 'static> Orchestrator<S> {
    /// Create an orchestrator working against `server_root`
    #[must_use]
    pub fn new(store: Arc<S>, server_root: impl Into<PathBuf>, runtime_version: impl Into<String>) -> Self {
        Self {
            store,
            server_root: server_root.into(),
            runtime_version: runtime_version.into(),
            delay_increment: DEFAULT_DELAY_INCREMENT,
        }
    }

    /// Override the stagger between creation requests
    #[must_use]
    pub fn with_delay_increment(mut self, delay_increment: Duration) -> Self {
        self.delay_increment = delay_increment;
        self
    }

    /// Realize the band plan.
    ///
    /// Fails immediately with [`OrchestratorError::AlreadyInitialized`] when
    /// the registry is non-empty; otherwise validates the configuration,
    /// persists the range descriptor against the current default store,
    /// creates every planned partition (staggered, then barrier-joined),
    /// swaps the default partition, re-persists the descriptor against the
    /// new default, and registers all bands.
    ///
    /// # Errors
    /// Any step's failure aborts the operation; bands already created in the
    /// backing system are never rolled back.
    pub async fn init(
        &self,
        registry: &mut BandRegistry,
        config: &ConfigManager,
    ) -> Result<InitReport, OrchestratorError> {
        let start = Instant::now();

        if !registry.is_empty() {
            return Err(OrchestratorError::AlreadyInitialized);
        }
        let params = config.plan_params();
        params.validate()?;

        let server_file = self.server_root.join(SERVER_FILE_NAME);
        let mut properties = ServerProperties::load(&server_file)
            .map_err(|e| OrchestratorError::ServerConfig(e.to_string()))?;
        let old_default = properties
            .get(LEVEL_NAME_KEY)
            .ok_or_else(|| {
                OrchestratorError::ServerConfig(format!(
                    "{SERVER_FILE_NAME} has no {LEVEL_NAME_KEY} key"
                ))
            })?
            .to_string();

        let descriptor = DescriptorStore::for_runtime(
            &self.runtime_version,
            params.descriptor_min_y(),
            params.descriptor_height(),
        )?;
        self.persist_descriptor(&descriptor, &old_default)?;

        let created = self.create_partitions(&params).await?;

        // Full success past the barrier: swap the default partition.
        let Some((first_band, _)) = created.first() else {
            return Err(OrchestratorError::InvalidConfiguration(
                "plan produced no bands".to_string(),
            ));
        };
        let new_default = first_band.name.clone();
        properties.set(LEVEL_NAME_KEY, &new_default);
        properties
            .save(&server_file)
            .map_err(|e| OrchestratorError::ServerConfig(e.to_string()))?;
        bind_generator(
            &self.server_root.join(BINDINGS_FILE_NAME),
            &new_default,
            &first_band.generator,
        )?;

        self.unload_previous_default(&old_default).await;

        // The physical descriptor lives alongside whichever partition is
        // default; re-persist it against the new one. On failure the plan is
        // realized but the descriptor inconsistent: the operator retries.
        self.persist_descriptor(&descriptor, &new_default)?;

        for (band, handle) in created {
            registry.register(BandDescriptor::new(
                band.name,
                band.min_y,
                band.max_y,
                params.buffer_size,
                handle,
            ))?;
        }

        let report = InitReport {
            bands: registry.len(),
            global_min: params.global_min,
            global_max: params.global_max,
            new_default,
            elapsed: start.elapsed(),
        };
        tracing::info!(
            bands = report.bands,
            global_min = report.global_min,
            global_max = report.global_max,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "band plan realized"
        );
        Ok(report)
    }

    /// Issue one staggered creation task per planned band and barrier-join.
    ///
    /// Requests go out in ascending coordinate order, each delayed by its
    /// index times the stagger, so completion order is unspecified; the
    /// barrier only guarantees that everything after it runs once every task
    /// has finished. Results come back in plan order.
    async fn create_partitions(
        &self,
        params: &PlanParams,
    ) -> Result<Vec<(PlannedBand, StoreHandle)>, OrchestratorError> {
        let settings = PartitionSettings::default();
        let mut tasks = Vec::new();
        for (k, band) in params.bands().into_iter().enumerate() {
            let store = Arc::clone(&self.store);
            let delay = self.delay_increment * k as u32;
            let settings = settings.clone();
            let name = band.name.clone();
            let handle = tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                create_one(store.as_ref(), band, &settings).await
            });
            tasks.push((name, handle));
        }

        let joined = join_all(
            tasks
                .into_iter()
                .map(|(name, handle)| async move { (name, handle.await) }),
        )
        .await;

        let mut created = Vec::new();
        let mut failures = Vec::new();
        for (name, outcome) in joined {
            match outcome {
                Ok(Ok(pair)) => created.push(pair),
                Ok(Err(failure)) => failures.push(failure),
                Err(e) => failures.push(CreationFailure {
                    band: name,
                    reason: format!("creation task failed: {e}"),
                }),
            }
        }

        if failures.is_empty() {
            Ok(created)
        } else {
            tracing::error!(
                failed = failures.len(),
                succeeded = created.len(),
                "band plan aborted; successfully created partitions are left in place"
            );
            Err(OrchestratorError::PartitionCreation { failures })
        }
    }

    /// Unload the previous default store. Best-effort: the partition may
    /// simply remain loaded.
    async fn unload_previous_default(&self, old_default: &str) {
        if !self.store.exists(old_default).await {
            return;
        }
        let handle = StoreHandle::new(old_default);
        if !self.store.is_loaded(&handle).await {
            return;
        }
        if let Err(e) = self.store.unload(&handle).await {
            tracing::warn!(store = old_default, error = %e, "failed to unload previous default partition");
        }
    }

    /// Materialize the descriptor into a store and verify it reads back
    /// compatible with this build.
    fn persist_descriptor(
        &self,
        descriptor: &DescriptorStore,
        store_name: &str,
    ) -> Result<(), OrchestratorError> {
        descriptor.materialize(&self.server_root, store_name)?;
        let written = DescriptorStore::load(&self.server_root, store_name)?;
        if !descriptor.migrate(&written) {
            return Err(OrchestratorError::DescriptorMismatch(format!(
                "materialized descriptor reports unsupported schema version {}",
                written.schema_version
            )));
        }
        Ok(())
    }

    /// Rebuild the registry from already existing partitions.
    ///
    /// Called at host startup once every planned store has loaded. Loads the
    /// persisted descriptor from the current default store and validates it
    /// against the live configuration, then resolves every planned band to
    /// its backing store. Any mismatch or missing store aborts the whole
    /// reconstruction and leaves the registry empty; an inconsistent
    /// descriptor is never silently accepted.
    ///
    /// # Errors
    /// See [`OrchestratorError::DescriptorMismatch`] and
    /// [`OrchestratorError::MissingStore`].
    pub async fn restore(
        &self,
        registry: &mut BandRegistry,
        config: &ConfigManager,
    ) -> Result<usize, OrchestratorError> {
        let params = config.plan_params();
        registry.reset(params.world_height, params.buffer_size);

        let server_file = self.server_root.join(SERVER_FILE_NAME);
        let properties = ServerProperties::load(&server_file)
            .map_err(|e| OrchestratorError::ServerConfig(e.to_string()))?;
        let default_store = properties
            .get(LEVEL_NAME_KEY)
            .ok_or_else(|| {
                OrchestratorError::ServerConfig(format!(
                    "{SERVER_FILE_NAME} has no {LEVEL_NAME_KEY} key"
                ))
            })?
            .to_string();

        let persisted = DescriptorStore::load(&self.server_root, &default_store)?;
        stratum_descriptor::resolve_templates(&persisted.schema_version)?;
        if persisted.height != params.descriptor_height() {
            return Err(OrchestratorError::DescriptorMismatch(format!(
                "descriptor height {} does not match worldHeight + 2*bufferSize = {}",
                persisted.height,
                params.descriptor_height()
            )));
        }
        if persisted.min_y != params.descriptor_min_y() {
            return Err(OrchestratorError::DescriptorMismatch(format!(
                "descriptor min_y {} does not match -bufferSize = {}",
                persisted.min_y,
                params.descriptor_min_y()
            )));
        }

        let mut resolved = Vec::new();
        for band in params.bands() {
            if !self.store.exists(&band.name).await {
                return Err(OrchestratorError::MissingStore(band.name));
            }
            resolved.push(band);
        }

        for band in resolved {
            let handle = StoreHandle::new(&band.name);
            if let Err(e) = registry.register(BandDescriptor::new(
                band.name,
                band.min_y,
                band.max_y,
                params.buffer_size,
                handle,
            )) {
                // Never leave a partially populated registry behind.
                registry.reset(params.world_height, params.buffer_size);
                return Err(e.into());
            }
        }

        tracing::info!(bands = registry.len(), "restored band registry");
        Ok(registry.len())
    }
}

/// Create one partition and apply the baseline settings; settings are only
/// applied after the backing store reports success. No retries.
async fn create_one<S: BackingStore>(
    store: &S,
    band: PlannedBand,
    settings: &PartitionSettings,
) -> Result<(PlannedBand, StoreHandle), CreationFailure> {
    if store.exists(&band.name).await {
        return Err(CreationFailure {
            band: band.name,
            reason: "store already exists".to_string(),
        });
    }
    let handle = store
        .create(&band.name, &band.generator)
        .await
        .map_err(|e| CreationFailure {
            band: band.name.clone(),
            reason: e.to_string(),
        })?;
    store
        .configure(&handle, settings)
        .await
        .map_err(|e| CreationFailure {
            band: band.name.clone(),
            reason: format!("created but configuration failed: {e}"),
        })?;
    tracing::info!(band = band.name.as_str(), "created partition");
    Ok((band, handle))
}
