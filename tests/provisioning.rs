//! Tests for engine construction and the session factory.
//!
//! None of these need a running database: the engine connects lazily, and
//! the failure tests point at a port nothing listens on.

use std::time::Duration;

use news_aggregator::{
    AppState, DatabaseConfig, Engine, EngineOptions, Environment, Error, SessionConfig,
    SessionFactory,
};

fn unreachable_config() -> DatabaseConfig {
    DatabaseConfig {
        host: "127.0.0.1".to_string(),
        port: 1,
        ..DatabaseConfig::default()
    }
}

fn fast_timeout() -> EngineOptions {
    EngineOptions {
        acquire_timeout: Duration::from_secs(1),
        ..EngineOptions::default()
    }
}

#[tokio::test]
async fn engine_construction_does_not_connect() {
    let engine = Engine::with_options(&unreachable_config(), fast_timeout());
    assert_eq!(engine.size(), 0);
    assert!(!engine.is_closed());
}

#[tokio::test]
async fn sessions_are_distinct_but_share_one_engine() {
    let state = AppState::from_config(
        Environment::Dev,
        DatabaseConfig::default(),
        EngineOptions::default(),
    );

    let first = state.get_session();
    let second = state.get_session();

    assert_ne!(first.id(), second.id());
    assert!(first.engine().ptr_eq(second.engine()));
    assert!(first.engine().ptr_eq(&state.engine));
}

#[tokio::test]
async fn factory_calls_never_build_a_new_engine() {
    let engine = Engine::new(&DatabaseConfig::default());
    let factory = SessionFactory::new(engine.clone());

    for _ in 0..50 {
        let session = factory.get_session();
        assert!(session.engine().ptr_eq(&engine));
    }
    assert_eq!(engine.size(), 0);
}

#[tokio::test]
async fn factory_sessions_disable_autocommit_and_autoflush() {
    let state = AppState::from_config(
        Environment::Prod,
        DatabaseConfig::default(),
        EngineOptions::default(),
    );
    let session = state.get_session();

    assert_eq!(
        session.config(),
        SessionConfig {
            autocommit: false,
            autoflush: false,
        }
    );
}

#[tokio::test]
async fn connectivity_errors_reach_the_caller() {
    let engine = Engine::with_options(&unreachable_config(), fast_timeout());
    let factory = SessionFactory::new(engine);
    let mut session = factory.get_session();

    let result = session.connection().await;
    assert!(matches!(result, Err(Error::Database(_))));
    assert!(!session.in_transaction());
}

#[tokio::test]
async fn closed_engine_rejects_new_connections() {
    let engine = Engine::with_options(&unreachable_config(), fast_timeout());
    engine.close().await;
    assert!(engine.is_closed());

    let mut session = SessionFactory::new(engine).get_session();
    let result = session.connection().await;
    assert!(matches!(result, Err(Error::Database(sqlx::Error::PoolClosed))));
}
