//! Liveness and readiness endpoints.
//!
//! `/health` never touches the database. `/ready` answers 200 only once
//! `DbPool::ping` succeeds, so load balancers hold traffic while the store
//! is down.

use actix_web::{HttpResponse, get, web};
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::db::DbPool;
use crate::error::{AppError, AppResult};

/// Service status report.
#[derive(Serialize, ToSchema)]
pub struct ServiceStatus {
    status: &'static str,
    version: &'static str,
    /// Only reported by `/ready`
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<&'static str>,
}

impl ServiceStatus {
    fn new(status: &'static str, database: Option<&'static str>) -> Self {
        ServiceStatus {
            status,
            version: env!("CARGO_PKG_VERSION"),
            database,
        }
    }
}

/// Process liveness.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Process is up", body = ServiceStatus)
    )
)]
#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ServiceStatus::new("healthy", None))
}

/// Readiness: the test run store answers.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Store reachable", body = ServiceStatus),
        (status = 503, description = "Store unreachable", body = crate::error::ErrorResponse)
    )
)]
#[get("/ready")]
pub async fn ready(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    pool.ping().await.map_err(|e| {
        warn!("Readiness check failed: {}", e);
        AppError::Unavailable
    })?;

    Ok(HttpResponse::Ok().json(ServiceStatus::new("ready", Some("connected"))))
}

/// Configure health routes.
pub fn configure_health_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(ready);
}
