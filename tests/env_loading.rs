//! Tests for env-file selection and loading.
//!
//! These change the working directory and process environment, so every test
//! is `#[serial]` and runs inside its own temporary directory.

use std::{fs, path::PathBuf};

use news_aggregator::{AppState, DatabaseConfig, Environment, config};
use serial_test::serial;
use tempfile::TempDir;

const MANAGED_VARS: &[&str] = &[
    "ENVIRONMENT",
    "RUST_LOG",
    "POSTGRES_USER",
    "POSTGRES_PASSWORD",
    "POSTGRES_HOST",
    "POSTGRES_PORT",
    "POSTGRES_DB",
];

/// Moves into a fresh temp directory with a clean environment and restores
/// the previous working directory on drop.
struct Workspace {
    dir: TempDir,
    previous: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        for var in MANAGED_VARS {
            unsafe {
                std::env::remove_var(var);
            }
        }
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let previous = std::env::current_dir().expect("failed to read cwd");
        std::env::set_current_dir(dir.path()).expect("failed to enter temp dir");
        Self { dir, previous }
    }

    fn write(&self, name: &str, contents: &str) {
        fs::write(self.dir.path().join(name), contents).expect("failed to write env file");
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.previous);
        for var in MANAGED_VARS {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }
}

#[test]
#[serial]
fn missing_env_file_falls_back_to_defaults() {
    let _ws = Workspace::new();

    assert!(!config::load_env_file(Environment::Dev));
    let config = DatabaseConfig::from_env().expect("defaults should load");
    assert_eq!(config, DatabaseConfig::default());
}

#[test]
#[serial]
fn dev_env_file_values_reach_database_config() {
    let ws = Workspace::new();
    ws.write(".env.dev", "POSTGRES_DB=headlines\nPOSTGRES_PORT=6543\n");

    assert!(config::load_env_file(Environment::Dev));
    let config = DatabaseConfig::from_env().expect("config should load");
    assert_eq!(config.database, "headlines");
    assert_eq!(config.port, 6543);
    assert_eq!(config.host, "localhost");
}

#[test]
#[serial]
fn process_variables_take_precedence_over_env_file() {
    let ws = Workspace::new();
    ws.write(".env.dev", "POSTGRES_DB=from_file\nPOSTGRES_USER=reader\n");
    unsafe {
        std::env::set_var("POSTGRES_DB", "from_process");
    }

    assert!(config::load_env_file(Environment::Dev));
    let config = DatabaseConfig::from_env().expect("config should load");
    assert_eq!(config.database, "from_process");
    assert_eq!(config.user, "reader");
}

#[test]
#[serial]
fn init_environment_loads_file_before_log_filter_is_read() {
    let ws = Workspace::new();
    ws.write(".env.dev", "RUST_LOG=news_aggregator=debug\n");

    assert!(std::env::var("RUST_LOG").is_err());
    let environment = config::init_environment();

    assert_eq!(environment, Environment::Dev);
    assert_eq!(
        std::env::var("RUST_LOG").as_deref(),
        Ok("news_aggregator=debug")
    );
}

#[tokio::test]
#[serial]
async fn prod_state_reads_default_env_file() {
    let ws = Workspace::new();
    ws.write(".env", "POSTGRES_HOST=db.prod\n");
    ws.write(".env.dev", "POSTGRES_HOST=db.dev\n");
    unsafe {
        std::env::set_var("ENVIRONMENT", "prod");
    }

    let state = AppState::new().expect("state should build");
    assert_eq!(state.environment, Environment::Prod);
    assert_eq!(state.config.host, "db.prod");
    assert_eq!(state.engine.size(), 0);
}

#[tokio::test]
#[serial]
async fn malformed_port_in_env_file_is_reported() {
    let ws = Workspace::new();
    ws.write(".env.dev", "POSTGRES_PORT=not-a-port\n");

    let result = AppState::new();
    assert!(matches!(
        result,
        Err(news_aggregator::Error::InvalidPort { ref value, .. }) if value == "not-a-port"
    ));
}
