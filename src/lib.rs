//! Library entry point for the news aggregator database layer.
//!
//! Exports configuration, the shared engine, the session factory, and the
//! application state for use by the binary and integration tests.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod session;
pub mod state;

pub use config::{DatabaseConfig, Environment};
pub use db::{Engine, EngineOptions};
pub use error::{Error, Result};
pub use logging::*;
pub use session::{Session, SessionConfig, SessionFactory};
pub use state::AppState;
