//! Backing-store collaborator seam
//!
//! The actual lifecycle of a spatial partition (creation, terrain content,
//! loading, unloading) lives outside this workspace. The orchestrator only
//! drives it through [`BackingStore`]: an async factory plus idempotency
//! checks. Settings in [`PartitionSettings`] are applied by implementations
//! strictly after a creation has succeeded.

use serde::{Deserialize, Serialize};

/// Opaque reference to an external spatial partition.
///
/// The handle carries the store's external name; a band and its backing
/// store share that name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreHandle(String);

impl StoreHandle {
    /// Create a handle from a store name
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// External name of the store
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Difficulty applied to a freshly created partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    /// No hostile simulation at all
    Peaceful,
    /// Reduced hostile simulation
    Easy,
    /// Standard hostile simulation
    Normal,
    /// Maximum hostile simulation
    Hard,
}

/// Game mode applied to a freshly created partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    /// Resource-gathering mode with damage
    Survival,
    /// Unrestricted building mode
    Creative,
    /// Exploration mode with restricted interaction
    Adventure,
    /// Non-interacting observer mode
    Spectator,
}

/// Baseline policy for every partition the orchestrator creates.
///
/// Band partitions are pure terrain slices, so simulation extras stay off:
/// no weather, no persistent spawn retention, no PvP, no progression
/// grants, flight allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionSettings {
    /// Whether weather simulation runs in the partition
    pub allow_weather: bool,
    /// Whether the spawn region stays resident in memory
    pub keep_spawn_loaded: bool,
    /// Whether occupants may fly
    pub allow_flight: bool,
    /// Fixed difficulty
    pub difficulty: Difficulty,
    /// Fixed game mode
    pub game_mode: GameMode,
    /// Whether occupants can damage each other
    pub pvp: bool,
    /// Whether progression milestones are granted in the partition
    pub grant_progression: bool,
}

impl Default for PartitionSettings {
    fn default() -> Self {
        Self {
            allow_weather: false,
            keep_spawn_loaded: false,
            allow_flight: true,
            difficulty: Difficulty::Peaceful,
            game_mode: GameMode::Creative,
            pvp: false,
            grant_progression: false,
        }
    }
}

/// Failure reason reported by the backing store
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct StoreError(pub String);

impl StoreError {
    /// Create a failure reason
    #[inline]
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Async factory for spatial partitions.
///
/// Creation is inherently asynchronous and may take several host scheduling
/// ticks; the orchestrator awaits the returned future and never retries a
/// failed creation.
#[async_trait::async_trait]
pub trait BackingStore: Send + Sync {
    /// Create a partition named `name` driven by `generator`.
    ///
    /// # Errors
    /// Returns the backing store's failure reason; the store may or may not
    /// have left partial state behind (no rollback is attempted).
    async fn create(&self, name: &str, generator: &str) -> Result<StoreHandle, StoreError>;

    /// Apply the baseline policy to a successfully created partition.
    async fn configure(&self, handle: &StoreHandle, settings: &PartitionSettings)
        -> Result<(), StoreError>;

    /// Whether a partition with this external name exists.
    async fn exists(&self, name: &str) -> bool;

    /// Whether the partition is currently loaded by the host.
    async fn is_loaded(&self, handle: &StoreHandle) -> bool;

    /// Unload the partition. Best-effort from the orchestrator's view.
    async fn unload(&self, handle: &StoreHandle) -> Result<(), StoreError>;
}
