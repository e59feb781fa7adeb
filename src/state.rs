//! Application context shared by every handler.

use std::sync::Arc;

use crate::{
    config::{self, DatabaseConfig, Environment},
    db::{Engine, EngineOptions},
    error::Result,
    session::{Session, SessionFactory},
};

/// Shared application state, built once at startup and injected into handlers.
///
/// Holds the single [`Engine`] for the process and the factory that binds
/// new sessions to it.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Environment the process was started in.
    pub environment: Environment,
    /// Configuration the engine was built from.
    pub config: Arc<DatabaseConfig>,
    /// Shared connection pool
    pub engine: Engine,
    /// Session factory bound to `engine`
    pub sessions: SessionFactory,
}

impl AppState {
    /// Creates the application state from the process environment.
    ///
    /// Selects and loads the env file for `ENVIRONMENT`, then defers to
    /// [`AppState::load`]. No database connection is opened here.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidPort`] if `POSTGRES_PORT` is malformed.
    pub fn new() -> Result<Self> {
        Self::load(config::init_environment())
    }

    /// Reads the `POSTGRES_*` variables and builds the engine, assuming the
    /// env file for `environment` has already been loaded.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidPort`] if `POSTGRES_PORT` is malformed.
    pub fn load(environment: Environment) -> Result<Self> {
        let config = DatabaseConfig::from_env()?;
        Ok(Self::from_config(environment, config, EngineOptions::default()))
    }

    /// Builds the state from an already-loaded configuration.
    pub fn from_config(
        environment: Environment,
        config: DatabaseConfig,
        options: EngineOptions,
    ) -> Self {
        let engine = Engine::with_options(&config, options);
        let sessions = SessionFactory::new(engine.clone());
        Self {
            environment,
            config: Arc::new(config),
            engine,
            sessions,
        }
    }

    /// Returns a new session bound to the shared engine.
    pub fn get_session(&self) -> Session {
        self.sessions.get_session()
    }
}
