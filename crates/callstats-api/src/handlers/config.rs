//! Backend configuration passthrough

use crate::dto::ApiResponse;
use actix_web::{web, HttpResponse};
use callstats_core::AppError;
use callstats_services::DashboardService;
use tracing::instrument;

/// Latest configuration document fetched from the backend
///
/// GET /api/v1/config
#[instrument(skip(dashboard))]
pub async fn get_config(
    dashboard: web::Data<DashboardService>,
) -> Result<HttpResponse, AppError> {
    let config = dashboard
        .config()
        .ok_or_else(|| AppError::NotFound("configuration has not been fetched yet".to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(config)))
}

/// Configure the configuration route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/config", web::get().to(get_config));
}
