//! Stratum Test Utils - shared test doubles
//!
//! An in-memory [`BackingStore`] implementation with scriptable failures,
//! used across the workspace's integration tests.

#![warn(unreachable_pub)]

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use stratum_core::{BackingStore, PartitionSettings, StoreError, StoreHandle};

/// What the store remembers about one created partition
#[derive(Debug, Clone)]
pub struct StoreRecord {
    /// Generator spec the partition was created with
    pub generator: String,
    /// Settings applied after creation, if `configure` ran
    pub settings: Option<PartitionSettings>,
}

#[derive(Debug, Default)]
struct Inner {
    stores: HashMap<String, StoreRecord>,
    loaded: HashSet<String>,
    fail_create: HashMap<String, String>,
    fail_unload: HashSet<String>,
    creation_order: Vec<String>,
}

/// In-memory [`BackingStore`] with scriptable failures.
///
/// Created partitions are marked loaded immediately. `fail_creation_of` and
/// `fail_unload_of` script the corresponding operations to fail by name.
#[derive(Debug, Default)]
pub struct MemoryBackingStore {
    inner: Mutex<Inner>,
}

impl MemoryBackingStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pre-seed a loaded partition, as if it existed before the test
    pub fn add_store(&self, name: &str, generator: &str) {
        let mut inner = self.inner();
        inner.stores.insert(
            name.to_string(),
            StoreRecord {
                generator: generator.to_string(),
                settings: None,
            },
        );
        inner.loaded.insert(name.to_string());
    }

    /// Builder form of [`MemoryBackingStore::add_store`]
    #[must_use]
    pub fn with_existing(self, name: &str, generator: &str) -> Self {
        self.add_store(name, generator);
        self
    }

    /// Script `create` to fail for this name
    pub fn fail_creation_of(&self, name: &str, reason: &str) {
        self.inner()
            .fail_create
            .insert(name.to_string(), reason.to_string());
    }

    /// Script `unload` to fail for this name
    pub fn fail_unload_of(&self, name: &str) {
        self.inner().fail_unload.insert(name.to_string());
    }

    /// Names of successfully created partitions, in completion order
    #[must_use]
    pub fn created_names(&self) -> Vec<String> {
        self.inner().creation_order.clone()
    }

    /// Settings applied to a partition, if any
    #[must_use]
    pub fn settings_for(&self, name: &str) -> Option<PartitionSettings> {
        self.inner()
            .stores
            .get(name)
            .and_then(|record| record.settings.clone())
    }

    /// Generator a partition was created with, if it exists
    #[must_use]
    pub fn generator_for(&self, name: &str) -> Option<String> {
        self.inner()
            .stores
            .get(name)
            .map(|record| record.generator.clone())
    }

    /// Synchronous loaded check for assertions
    #[must_use]
    pub fn is_loaded_sync(&self, name: &str) -> bool {
        self.inner().loaded.contains(name)
    }

    /// Number of partitions currently present
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner().stores.len()
    }

    /// Whether the store holds no partitions
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner().stores.is_empty()
    }
}

#[async_trait::async_trait]
impl BackingStore for MemoryBackingStore {
    async fn create(&self, name: &str, generator: &str) -> Result<StoreHandle, StoreError> {
        let mut inner = self.inner();
        if let Some(reason) = inner.fail_create.get(name) {
            return Err(StoreError::new(reason.clone()));
        }
        if inner.stores.contains_key(name) {
            return Err(StoreError::new(format!("store {name} already exists")));
        }
        inner.stores.insert(
            name.to_string(),
            StoreRecord {
                generator: generator.to_string(),
                settings: None,
            },
        );
        inner.loaded.insert(name.to_string());
        inner.creation_order.push(name.to_string());
        Ok(StoreHandle::new(name))
    }

    async fn configure(
        &self,
        handle: &StoreHandle,
        settings: &PartitionSettings,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner();
        match inner.stores.get_mut(handle.as_str()) {
            Some(record) => {
                record.settings = Some(settings.clone());
                Ok(())
            }
            None => Err(StoreError::new(format!(
                "cannot configure unknown store {handle}"
            ))),
        }
    }

    async fn exists(&self, name: &str) -> bool {
        self.inner().stores.contains_key(name)
    }

    async fn is_loaded(&self, handle: &StoreHandle) -> bool {
        self.inner().loaded.contains(handle.as_str())
    }

    async fn unload(&self, handle: &StoreHandle) -> Result<(), StoreError> {
        let mut inner = self.inner();
        if inner.fail_unload.contains(handle.as_str()) {
            return Err(StoreError::new(format!("unload of {handle} refused")));
        }
        inner.loaded.remove(handle.as_str());
        Ok(())
    }
}
