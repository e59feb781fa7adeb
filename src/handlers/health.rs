//! Health check endpoints for the news aggregator API.
//!
//! `/api/health` reports liveness without touching the database.
//! `/api/health/db` opens a session through the shared factory and runs a
//! trivial query, so it exercises the same path request handlers use.

use actix_web::{HttpResponse, Responder, web};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::time::{Duration, Instant};

use crate::AppState;

static START_TIME: Lazy<Instant> = Lazy::new(Instant::now);

/// Pins the uptime clock to now. Call once at process start; later calls are no-ops.
pub fn start_uptime_clock() {
    Lazy::force(&START_TIME);
}

/// Time elapsed since [`start_uptime_clock`] (or the first health request,
/// if the clock was never started explicitly).
pub fn uptime() -> Duration {
    START_TIME.elapsed()
}

#[derive(Serialize)]
struct Liveness {
    status: &'static str,
    /// Human-readable uptime string.
    uptime: String,
}

#[derive(Serialize)]
struct DatabaseHealth {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Returns a JSON response indicating the API is up.
///
/// # Example
/// ```json
/// { "status": "ok", "uptime": "2h 14m 3s" }
/// ```
#[tracing::instrument]
pub async fn health_check() -> impl Responder {
    tracing::info!("Health check endpoint called");
    HttpResponse::Ok().json(Liveness {
        status: "ok",
        uptime: humantime::format_duration(uptime()).to_string(),
    })
}

/// Checks that a session can reach the database.
///
/// # Success Response (200 OK)
/// ```json
/// { "status": "ok", "database": "reachable" }
/// ```
///
/// # Error Response (503 Service Unavailable)
/// ```json
/// { "status": "unavailable", "error": "database error: pool timed out while waiting for an open connection" }
/// ```
#[tracing::instrument(skip(app_state))]
pub async fn database_health(app_state: web::Data<AppState>) -> impl Responder {
    let mut session = app_state.get_session();
    let session_id = session.id();

    let probe = async {
        let conn = session.connection().await?;
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(conn)
            .await?;
        Ok::<_, crate::Error>(())
    }
    .await;

    // Read-only probe; nothing to commit.
    if let Err(e) = session.close().await {
        tracing::warn!(%session_id, error = %e, "Failed to close health-check session");
    }

    match probe {
        Ok(()) => HttpResponse::Ok().json(DatabaseHealth {
            status: "ok",
            database: Some("reachable"),
            error: None,
        }),
        Err(e) => {
            tracing::error!(%session_id, error = %e, "Database health check failed");
            HttpResponse::ServiceUnavailable().json(DatabaseHealth {
                status: "unavailable",
                database: None,
                error: Some(e.to_string()),
            })
        }
    }
}

/// Registers the health endpoints under `/api/health`.
pub fn configure_health_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/health")
            .route("", web::get().to(health_check))
            .route("/db", web::get().to(database_health)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime_clock_is_not_reset_by_later_calls() {
        start_uptime_clock();
        let before = uptime();
        std::thread::sleep(Duration::from_millis(20));
        start_uptime_clock();
        assert!(uptime() >= before + Duration::from_millis(20));
    }
}
