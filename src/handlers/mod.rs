//! HTTP handlers for the news aggregator service.

pub mod health;

pub use health::configure_health_routes;
