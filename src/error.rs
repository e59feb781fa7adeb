//! Error types for database provisioning.
//!
//! Missing configuration is never an error here: every setting has a default.
//! What remains is a malformed port and whatever the pool reports at first use.

use std::num::ParseIntError;

use thiserror::Error;

/// Errors produced while loading configuration or using the connection pool.
#[derive(Debug, Error)]
pub enum Error {
    /// `POSTGRES_PORT` was set but is not a valid TCP port.
    #[error("invalid POSTGRES_PORT value {value:?}: {source}")]
    InvalidPort {
        /// The raw value read from the environment.
        value: String,
        #[source]
        source: ParseIntError,
    },
    /// Connectivity or query error from the underlying pool, passed through unchanged.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
