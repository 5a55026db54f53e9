use std::sync::Arc;

use axum::Router;
use tempfile::TempDir;
use tokio::sync::broadcast;

use deckpicker_backend::config::{Config, DeckListConfig};
use deckpicker_backend::routes::build_router;
use deckpicker_backend::state::AppState;
use deckpicker_backend::store::Store;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub config: Config,
    _temp_dir: TempDir,
}

impl TestApp {
    pub fn store(&self) -> &Store {
        self.state.store()
    }
}

// Config is built directly so parallel tests never race on env vars.
fn test_config(sled_path: String, filter_max_len: usize) -> Config {
    Config {
        host: std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
        port: 3000,
        log_level: "info".to_string(),
        enable_file_logs: false,
        log_dir: "./logs".to_string(),
        sled_path,
        cors_origin: "http://localhost:5173".to_string(),
        deck_list: DeckListConfig { filter_max_len },
    }
}

async fn spawn_with_filter_limit(filter_max_len: usize) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let sled_path = temp_dir.path().join("deckpicker-test.sled");
    let config = test_config(sled_path.to_string_lossy().to_string(), filter_max_len);

    let store = Arc::new(Store::open(&config.sled_path).expect("open store"));
    store.run_migrations().expect("run migrations");

    let (shutdown_tx, _) = broadcast::channel::<()>(8);
    let state = AppState::new(store, &config, shutdown_tx);
    let app = build_router(state.clone());

    TestApp {
        app,
        state,
        config,
        _temp_dir: temp_dir,
    }
}

pub async fn spawn_test_server() -> TestApp {
    spawn_with_filter_limit(200).await
}

pub async fn spawn_test_server_with_filter_limit(filter_max_len: usize) -> TestApp {
    spawn_with_filter_limit(filter_max_len).await
}
