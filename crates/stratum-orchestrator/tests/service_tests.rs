//! Service-level tests: lifecycle wiring, reload semantics, and crossing
//! evaluation through the assembled service.

use pretty_assertions::assert_eq;
use std::fs;
use std::sync::Arc;
use stratum_core::{OccupantId, PositionEvent, StoreHandle};
use stratum_orchestrator::{StratumService, CONFIG_FILE_NAME};
use stratum_test_utils::MemoryBackingStore;
use tempfile::TempDir;

const THREE_BAND_CONFIG: &str = "config-version: 2\n\
    worldHeight: 1024\n\
    bufferSize: 256\n\
    globalMin: 0\n\
    globalMax: 3072\n\
    worldBaseName: earth\n";

fn service(dir: &TempDir) -> StratumService<MemoryBackingStore> {
    fs::write(dir.path().join(CONFIG_FILE_NAME), THREE_BAND_CONFIG).unwrap();
    fs::write(dir.path().join("server.properties"), "level-name=world\n").unwrap();
    let store = Arc::new(MemoryBackingStore::new().with_existing("world", "default"));
    StratumService::start(dir.path(), dir.path(), "1.21.11", store).unwrap()
}

#[tokio::test(start_paused = true)]
async fn init_then_evaluate_remaps_a_downward_crossing() {
    let dir = TempDir::new().unwrap();
    let mut service = service(&dir);
    service.init().await.unwrap();

    // occupant sinks below the teleport floor of the middle band
    let event = PositionEvent {
        occupant: OccupantId(7),
        store: StoreHandle::new("earth_1024_2048"),
        local_y: -130.0,
    };
    let outcome = service.evaluate_move(&event).unwrap();
    assert_eq!(outcome.global_y, 894);
    let remap = outcome.remap.unwrap();
    assert_eq!(remap.target.as_str(), "earth_0_1024");
    assert_eq!(remap.local_y, -130.0 + 1024.0);
}

#[tokio::test(start_paused = true)]
async fn position_inside_the_band_needs_no_remap() {
    let dir = TempDir::new().unwrap();
    let mut service = service(&dir);
    service.init().await.unwrap();

    let event = PositionEvent {
        occupant: OccupantId(7),
        store: StoreHandle::new("earth_1024_2048"),
        local_y: 500.0,
    };
    let outcome = service.evaluate_move(&event).unwrap();
    assert_eq!(outcome.global_y, 1524);
    assert!(outcome.remap.is_none());
}

#[tokio::test(start_paused = true)]
async fn events_from_unregistered_stores_are_ignored() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir);

    let event = PositionEvent {
        occupant: OccupantId(7),
        store: StoreHandle::new("nether"),
        local_y: 64.0,
    };
    assert!(service.evaluate_move(&event).is_none());
}

#[tokio::test(start_paused = true)]
async fn reload_clears_the_registry_and_rereads_the_config() {
    let dir = TempDir::new().unwrap();
    let mut service = service(&dir);
    service.init().await.unwrap();
    assert_eq!(service.registry().len(), 3);

    fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "config-version: 2\nworldHeight: 512\nbufferSize: 128\n\
         globalMin: 0\nglobalMax: 1024\nworldBaseName: earth\n",
    )
    .unwrap();

    let report = service.reload().unwrap();
    assert_eq!(report.previous_version, 2);
    assert_eq!(report.current_version, 2);
    assert!(service.registry().is_empty());
    assert_eq!(service.config().world_height(), 512);
}

#[tokio::test(start_paused = true)]
async fn load_tracker_follows_the_live_plan() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir);

    let mut tracker = service.load_tracker();
    assert_eq!(tracker.pending_len(), 3);
    tracker.mark_loaded("earth_0_1024");
    tracker.mark_loaded("earth_1024_2048");
    assert!(tracker.mark_loaded("earth_2048_3072"));
}
