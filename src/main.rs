//! Main entry point for the news aggregator service.
//!
//! Loads the environment-specific configuration, builds the shared database
//! engine once, and serves the health endpoints with request tracing.

use actix_web::{App, HttpServer, web};
use anyhow::Context;
use news_aggregator::{AppState, config, get_subscriber, handlers, init_subscriber};
use tracing_actix_web::TracingLogger;

/// Main entry point. Configures and runs the Actix Web server.
///
/// - Loads `.env` (prod) or `.env.dev` before anything reads the environment.
/// - Initializes Bunyan JSON tracing to stdout.
/// - Builds the lazy Postgres engine.
/// - Registers the health routes.
/// - Closes the pool on Ctrl-C.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    handlers::health::start_uptime_clock();
    let environment = config::init_environment();

    let subscriber = get_subscriber(
        "news_aggregator".to_string(),
        "info".to_string(),
        std::io::stdout,
    );
    init_subscriber(subscriber);

    let app_state = AppState::load(environment).context("failed to init app_state")?;
    tracing::info!(
        environment = app_state.environment.as_str(),
        "Application state initialized"
    );

    let host = std::env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = match std::env::var("APP_PORT") {
        Ok(value) => value
            .parse::<u16>()
            .with_context(|| format!("invalid APP_PORT value {value:?}"))?,
        Err(_) => 8080,
    };

    let engine = app_state.engine.clone();
    let data = web::Data::new(app_state);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(TracingLogger::default())
            .configure(handlers::configure_health_routes)
    })
    .bind((host.as_str(), port))?
    .run();

    tracing::info!(%host, port, "Server listening");

    let srv_handle = server.handle();
    let server_task = tokio::spawn(server);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Shutdown signal received");
            srv_handle.stop(true).await;
        }
        res = server_task => {
            if let Err(e) = res {
                tracing::error!("Server task failed: {}", e);
            }
        }
    }

    engine.close().await;
    Ok(())
}
