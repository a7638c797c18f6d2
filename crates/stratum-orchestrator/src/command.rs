//! Operator command surface
//!
//! Host-agnostic handlers for the two operator commands. The host adapts its
//! own command sender type to [`CommandSource`] and forwards invocations;
//! permission checks and user-facing messages live here so every host frontend
//! behaves the same.

use crate::error::OrchestratorError;
use crate::service::StratumService;
use stratum_core::BackingStore;

/// Permission required to reload the configuration
pub const PERM_RELOAD: &str = "stratum.reload";
/// Permission required to realize the band plan
pub const PERM_INIT: &str = "stratum.init";

const NO_PERMISSION: &str = "You do not have permission to do that.";

/// Whoever invoked a command: an operator console, an in-game occupant, or a
/// test double.
pub trait CommandSource {
    /// Display name of the invoker, for logging
    fn name(&self) -> &str;

    /// Whether the invoker holds a permission node
    fn has_permission(&self, permission: &str) -> bool;

    /// Send a message back to the invoker
    fn reply(&mut self, message: &str);
}

/// Handle the reload command: re-read the configuration and clear the
/// registry. Returns whether the reload succeeded.
pub fn reload<S: BackingStore + 'static>(
    service: &mut StratumService<S>,
    source: &mut dyn CommandSource,
) -> bool {
    if !source.has_permission(PERM_RELOAD) {
        source.reply(NO_PERMISSION);
        return false;
    }
    tracing::info!(invoker = source.name(), "reload requested");
    match service.reload() {
        Ok(report) => {
            source.reply(&format!(
                "Configuration reloaded in {} ms (config-version {} -> {}).",
                report.elapsed.as_millis(),
                report.previous_version,
                report.current_version
            ));
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "reload failed");
            source.reply(&format!("Reload failed: {e}"));
            false
        }
    }
}

/// Handle the init command: realize the band plan. Returns whether the plan
/// was realized.
pub async fn init<S: BackingStore + 'static>(
    service: &mut StratumService<S>,
    source: &mut dyn CommandSource,
) -> bool {
    if !source.has_permission(PERM_INIT) {
        source.reply(NO_PERMISSION);
        return false;
    }
    tracing::info!(invoker = source.name(), "init requested");
    source.reply("Creating partitions, this may take a while...");
    match service.init().await {
        Ok(report) => {
            source.reply(&format!(
                "Created {} partitions covering {}..{} in {} ms.",
                report.bands,
                report.global_min,
                report.global_max,
                report.elapsed.as_millis()
            ));
            source.reply("Restart the host to apply the changes.");
            true
        }
        Err(e @ OrchestratorError::AlreadyInitialized) => {
            source.reply(&format!("Init refused: {e}"));
            false
        }
        Err(e) => {
            tracing::error!(error = %e, "init failed");
            source.reply(&format!("Init failed: {e}"));
            false
        }
    }
}
