//! End-to-end tests for band plan realization against an in-memory
//! backing store and a real temporary server root.

use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use stratum_core::BandRegistry;
use stratum_descriptor::DescriptorStore;
use stratum_orchestrator::{ConfigManager, Orchestrator, OrchestratorError};
use stratum_test_utils::MemoryBackingStore;
use tempfile::TempDir;

const THREE_BAND_CONFIG: &str = "config-version: 2\n\
    worldHeight: 1024\n\
    bufferSize: 256\n\
    globalMin: 0\n\
    globalMax: 3072\n\
    worldBaseName: earth\n";

struct Fixture {
    dir: TempDir,
    config: ConfigManager,
    registry: BandRegistry,
    store: Arc<MemoryBackingStore>,
    orchestrator: Orchestrator<MemoryBackingStore>,
}

impl Fixture {
    fn new(config_yaml: &str) -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.yml"), config_yaml).unwrap();
        fs::write(
            dir.path().join("server.properties"),
            "motd=test host\nlevel-name=world\n",
        )
        .unwrap();

        let config = ConfigManager::load(dir.path()).unwrap();
        let registry = BandRegistry::new(config.world_height(), config.buffer_size());
        let store = Arc::new(MemoryBackingStore::new().with_existing("world", "default"));
        let orchestrator = Orchestrator::new(Arc::clone(&store), dir.path(), "1.21.11");
        Self {
            dir,
            config,
            registry,
            store,
            orchestrator,
        }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    async fn init(&mut self) -> Result<stratum_orchestrator::InitReport, OrchestratorError> {
        self.orchestrator
            .init(&mut self.registry, &self.config)
            .await
    }
}

#[tokio::test(start_paused = true)]
async fn init_creates_every_band_and_swaps_the_default() {
    let mut fx = Fixture::new(THREE_BAND_CONFIG);
    let report = fx.init().await.unwrap();

    assert_eq!(report.bands, 3);
    assert_eq!(report.global_min, 0);
    assert_eq!(report.global_max, 3072);
    assert_eq!(report.new_default, "earth_0_1024");

    let mut created = fx.store.created_names();
    created.sort();
    assert_eq!(
        created,
        vec!["earth_0_1024", "earth_1024_2048", "earth_2048_3072"]
    );
    assert_eq!(
        fx.store.generator_for("earth_1024_2048").unwrap(),
        "terraoffset:-1024"
    );
    assert!(fx.store.settings_for("earth_0_1024").is_some());

    // registry resolves coordinates to the new bands
    assert_eq!(
        fx.registry.lookup_by_coordinate(1500).unwrap().name(),
        "earth_1024_2048"
    );
}

#[tokio::test(start_paused = true)]
async fn staggered_requests_complete_in_ascending_plan_order() {
    let mut fx = Fixture::new(THREE_BAND_CONFIG);
    fx.init().await.unwrap();

    // task k sleeps k * delay_increment before creating; on virtual time the
    // distinct delays make completion order deterministic
    assert_eq!(
        fx.store.created_names(),
        vec!["earth_0_1024", "earth_1024_2048", "earth_2048_3072"]
    );
}

#[tokio::test(start_paused = true)]
async fn init_rewrites_the_server_files() {
    let mut fx = Fixture::new(THREE_BAND_CONFIG);
    fx.init().await.unwrap();

    let props = fs::read_to_string(fx.root().join("server.properties")).unwrap();
    assert!(props.contains("level-name=earth_0_1024"));
    assert!(props.contains("motd=test host"));

    let bindings: serde_yaml::Value =
        serde_yaml::from_str(&fs::read_to_string(fx.root().join("bindings.yml")).unwrap())
            .unwrap();
    assert_eq!(
        bindings["partitions"]["earth_0_1024"]["generator"],
        serde_yaml::Value::String("terraoffset:0".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn init_persists_the_descriptor_in_old_and_new_defaults() {
    let mut fx = Fixture::new(THREE_BAND_CONFIG);
    fx.init().await.unwrap();

    for store in ["world", "earth_0_1024"] {
        let descriptor = DescriptorStore::load(fx.root(), store).unwrap();
        assert_eq!(descriptor.min_y, -256);
        assert_eq!(descriptor.height, 1024 + 512);
    }
}

#[tokio::test(start_paused = true)]
async fn init_unloads_the_previous_default() {
    let mut fx = Fixture::new(THREE_BAND_CONFIG);
    assert!(fx.store.is_loaded_sync("world"));
    fx.init().await.unwrap();
    assert!(!fx.store.is_loaded_sync("world"));
}

#[tokio::test(start_paused = true)]
async fn second_init_is_refused() {
    let mut fx = Fixture::new(THREE_BAND_CONFIG);
    fx.init().await.unwrap();

    let err = fx.init().await.unwrap_err();
    assert!(matches!(err, OrchestratorError::AlreadyInitialized));
}

#[tokio::test(start_paused = true)]
async fn creation_failure_aborts_and_names_the_band() {
    let mut fx = Fixture::new(THREE_BAND_CONFIG);
    fx.store.fail_creation_of("earth_1024_2048", "disk full");

    let err = fx.init().await.unwrap_err();
    match err {
        OrchestratorError::PartitionCreation { failures } => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].band, "earth_1024_2048");
            assert_eq!(failures[0].reason, "disk full");
        }
        other => panic!("expected PartitionCreation, got {other}"),
    }

    // nothing registered and the default partition untouched
    assert!(fx.registry.is_empty());
    let props = fs::read_to_string(fx.root().join("server.properties")).unwrap();
    assert!(props.contains("level-name=world"));

    // successfully created bands are left in the backing system
    assert!(fx.store.created_names().contains(&"earth_0_1024".to_string()));
}

#[tokio::test(start_paused = true)]
async fn pre_existing_band_store_counts_as_a_failure() {
    let mut fx = Fixture::new(THREE_BAND_CONFIG);
    fx.store.add_store("earth_2048_3072", "terraoffset:-2048");

    let err = fx.init().await.unwrap_err();
    match err {
        OrchestratorError::PartitionCreation { failures } => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].band, "earth_2048_3072");
            assert!(failures[0].reason.contains("already exists"));
        }
        other => panic!("expected PartitionCreation, got {other}"),
    }
}

#[tokio::test(start_paused = true)]
async fn invalid_plan_parameters_abort_before_any_creation() {
    let mut fx = Fixture::new(
        "config-version: 2\nworldHeight: 1000\nbufferSize: 256\n\
         globalMin: 0\nglobalMax: 3000\nworldBaseName: earth\n",
    );
    let err = fx.init().await.unwrap_err();
    assert!(matches!(err, OrchestratorError::InvalidConfiguration(_)));
    assert_eq!(fx.store.created_names().len(), 0);
}

#[tokio::test(start_paused = true)]
async fn missing_level_name_is_a_server_config_error() {
    let mut fx = Fixture::new(THREE_BAND_CONFIG);
    fs::write(fx.root().join("server.properties"), "motd=test host\n").unwrap();

    let err = fx.init().await.unwrap_err();
    assert!(matches!(err, OrchestratorError::ServerConfig(_)));
}

#[tokio::test(start_paused = true)]
async fn failed_unload_of_the_old_default_does_not_fail_init() {
    let mut fx = Fixture::new(THREE_BAND_CONFIG);
    fx.store.fail_unload_of("world");

    let report = fx.init().await.unwrap();
    assert_eq!(report.bands, 3);
    assert!(fx.store.is_loaded_sync("world"));
}
