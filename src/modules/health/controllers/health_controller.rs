use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use sqlx::SqlitePool;

/// Health check response structure
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub timestamp: String,
}

/// GET /health - Liveness probe
/// Returns 200 if the application can respond at all; no dependency checks
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        service: "servicedesk".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// GET /ready - Readiness probe
/// Returns 200 once the database answers a trivial query
pub async fn readiness_check(pool: web::Data<SqlitePool>) -> impl Responder {
    match sqlx::query("SELECT 1").fetch_one(pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({ "ready": true })),
        Err(e) => {
            tracing::error!(error = %e, "Readiness check failed");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({ "ready": false }))
        }
    }
}

/// Configure health routes (mounted at the root, outside /api)
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/ready", web::get().to(readiness_check));
}
