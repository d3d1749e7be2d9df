//! Liveness handler

use crate::dto::{ApiResponse, HealthResponse};
use actix_web::{web, HttpResponse};

/// Liveness probe
///
/// GET /api/v1/health
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(HealthResponse::default()))
}

/// Configure the health route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health));
}
