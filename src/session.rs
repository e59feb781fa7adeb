//! Per-request unit-of-work handles bound to the shared [`Engine`].
//!
//! A [`SessionFactory`] hands out a fresh [`Session`] on every call. Sessions
//! produced by the factory have autocommit and autoflush disabled: the first
//! statement opens a transaction, and nothing is persisted until the caller
//! commits. Closing or dropping a session with uncommitted work rolls it back.
//!
//! ```rust,no_run
//! # async fn example(factory: news_aggregator::SessionFactory) -> news_aggregator::Result<()> {
//! let mut session = factory.get_session();
//! sqlx::query("UPDATE articles SET read = true WHERE id = $1")
//!     .bind(42_i64)
//!     .execute(session.connection().await?)
//!     .await?;
//! session.commit().await?;
//! session.close().await?;
//! # Ok(())
//! # }
//! ```

use sqlx::{PgConnection, Postgres, Transaction, pool::PoolConnection};
use uuid::Uuid;

use crate::{db::Engine, error::Result};

/// Behaviour flags for sessions created by a factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// When `false`, statements run inside a transaction the caller must commit.
    pub autocommit: bool,
    /// Sessions never flush on their own; the flag is carried for callers
    /// that inspect it.
    pub autoflush: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            autocommit: false,
            autoflush: false,
        }
    }
}

/// Produces sessions bound to one shared engine.
#[derive(Debug, Clone)]
pub struct SessionFactory {
    engine: Engine,
    config: SessionConfig,
}

impl SessionFactory {
    pub fn new(engine: Engine) -> Self {
        Self::with_config(engine, SessionConfig::default())
    }

    pub fn with_config(engine: Engine, config: SessionConfig) -> Self {
        Self { engine, config }
    }

    /// Returns a new session. No connection is acquired until the session is used.
    pub fn get_session(&self) -> Session {
        let session = Session {
            id: Uuid::new_v4(),
            engine: self.engine.clone(),
            config: self.config,
            slot: Slot::Idle,
        };
        tracing::debug!(session_id = %session.id, "Session created");
        session
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }
}

enum Slot {
    Idle,
    Connection(PoolConnection<Postgres>),
    Transaction(Transaction<'static, Postgres>),
}

/// A unit of work against the database.
///
/// The caller owns the session and is responsible for committing and closing it.
pub struct Session {
    id: Uuid,
    engine: Engine,
    config: SessionConfig,
    slot: Slot,
}

impl Session {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    /// The engine this session draws connections from.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Whether a transaction is currently open on this session.
    pub fn in_transaction(&self) -> bool {
        matches!(self.slot, Slot::Transaction(_))
    }

    /// Returns the connection to run statements on, acquiring one from the
    /// pool on first use. Without autocommit a transaction is begun as well.
    ///
    /// # Errors
    /// Any connectivity error from the pool is returned as [`crate::Error::Database`].
    pub async fn connection(&mut self) -> Result<&mut PgConnection> {
        if matches!(self.slot, Slot::Idle) {
            let pool = self.engine.pool();
            self.slot = if self.config.autocommit {
                Slot::Connection(pool.acquire().await?)
            } else {
                Slot::Transaction(pool.begin().await?)
            };
            tracing::debug!(
                session_id = %self.id,
                autocommit = self.config.autocommit,
                "Session acquired connection"
            );
        }

        match &mut self.slot {
            Slot::Connection(conn) => Ok(&mut **conn),
            Slot::Transaction(tx) => Ok(&mut **tx),
            Slot::Idle => unreachable!("session slot is filled above"),
        }
    }

    /// Commits the open transaction, if any, and releases its connection.
    /// The session stays usable; the next statement begins a new transaction.
    pub async fn commit(&mut self) -> Result<()> {
        if let Slot::Transaction(tx) = std::mem::replace(&mut self.slot, Slot::Idle) {
            tx.commit().await?;
            tracing::debug!(session_id = %self.id, "Session committed");
        }
        Ok(())
    }

    /// Rolls back the open transaction, if any, and releases its connection.
    pub async fn rollback(&mut self) -> Result<()> {
        if let Slot::Transaction(tx) = std::mem::replace(&mut self.slot, Slot::Idle) {
            tx.rollback().await?;
            tracing::debug!(session_id = %self.id, "Session rolled back");
        }
        Ok(())
    }

    /// Ends the session, discarding uncommitted work and returning the
    /// connection to the pool.
    pub async fn close(mut self) -> Result<()> {
        self.rollback().await?;
        tracing::debug!(session_id = %self.id, "Session closed");
        Ok(())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("in_transaction", &self.in_transaction())
            .finish()
    }
}
