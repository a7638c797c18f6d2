//! Stratum Orchestrator - plan realization and lifecycle
//!
//! Everything above the pure band logic:
//! - Operator configuration with versioned self-migration
//! - Band plan enumeration and validation
//! - Asynchronous, staggered partition creation with a completion barrier
//! - Default-partition swap across the host's top-level files
//! - Registry reconstruction at host startup
//! - The operator command surface
//!
//! # Example
//!
//! ```rust,ignore
//! use stratum_orchestrator::StratumService;
//!
//! let mut service = StratumService::start(data_dir, server_root, "1.21.11", store)?;
//! let report = service.init().await?;
//! println!("created {} partitions", report.bands);
//! ```

#![warn(unreachable_pub)]

pub mod command;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod plan;
pub mod server_config;
pub mod service;
pub mod tracker;

pub use command::{CommandSource, PERM_INIT, PERM_RELOAD};
pub use config::{ConfigManager, CONFIG_FILE_NAME};
pub use error::{ConfigError, CreationFailure, OrchestratorError};
pub use orchestrator::{InitReport, Orchestrator, DEFAULT_DELAY_INCREMENT};
pub use plan::{PlanParams, PlannedBand, GENERATOR_PREFIX};
pub use server_config::{bind_generator, ServerProperties};
pub use service::{ReloadReport, StratumService};
pub use tracker::PartitionLoadTracker;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
