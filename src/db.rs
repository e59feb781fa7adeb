//! Shared connection pool for the news aggregator database.
//!
//! The [`Engine`] is built once at startup and cloned into whatever needs
//! database access. Construction never touches the network: the pool opens
//! its first connection when a session first asks for one.

use std::{sync::Arc, time::Duration};

use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::config::DatabaseConfig;

/// Fixed pool parameters applied when the engine is built.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Upper bound on open connections.
    pub max_connections: u32,
    /// How long a caller waits for a connection before the pool gives up.
    pub acquire_timeout: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

/// Process-wide handle over the Postgres connection pool.
///
/// Cloning is cheap and every clone refers to the same pool, which
/// [`Engine::ptr_eq`] can confirm.
#[derive(Clone)]
pub struct Engine {
    pool: Arc<PgPool>,
}

impl Engine {
    /// Builds an engine with [`EngineOptions::default`].
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: &DatabaseConfig) -> Self {
        Self::with_options(config, EngineOptions::default())
    }

    /// Builds an engine without connecting. Unreachable hosts and bad
    /// credentials surface on first use, not here.
    pub fn with_options(config: &DatabaseConfig, options: EngineOptions) -> Self {
        tracing::info!(
            db.host = %config.host,
            db.port = config.port,
            db.name = %config.database,
            db.user = %config.user,
            max_connections = options.max_connections,
            "Creating lazy Postgres pool"
        );

        let pool = PgPoolOptions::new()
            .max_connections(options.max_connections)
            .acquire_timeout(options.acquire_timeout)
            .connect_lazy_with(config.connect_options());

        Self {
            pool: Arc::new(pool),
        }
    }

    /// The underlying pool, for callers that need it directly (e.g. migrations).
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Whether two handles share the same pool.
    pub fn ptr_eq(&self, other: &Engine) -> bool {
        Arc::ptr_eq(&self.pool, &other.pool)
    }

    /// Number of connections currently open, idle or in use.
    pub fn size(&self) -> u32 {
        self.pool.size()
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    /// Closes the pool and waits for checked-out connections to be returned.
    pub async fn close(&self) {
        tracing::info!("Closing Postgres pool");
        self.pool.close().await;
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("size", &self.pool.size())
            .field("closed", &self.pool.is_closed())
            .finish()
    }
}
