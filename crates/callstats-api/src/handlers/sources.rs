//! Source handlers
//!
//! Refresh status and on-demand refresh of the upstream sources.

use crate::dto::{ApiResponse, RefreshResponse};
use actix_web::{web, HttpResponse};
use callstats_core::models::SourceKind;
use callstats_core::AppError;
use callstats_services::RefreshScheduler;
use tracing::{info, instrument};

/// List refresh status of every source
///
/// GET /api/v1/sources
#[instrument(skip(scheduler))]
pub async fn list_sources(
    scheduler: web::Data<RefreshScheduler>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(ApiResponse::success(scheduler.statuses())))
}

/// Refresh one source now
///
/// POST /api/v1/sources/{source}/refresh
///
/// Returns `skipped` when a cycle for the source is already running.
#[instrument(skip(scheduler))]
pub async fn refresh_source(
    scheduler: web::Data<RefreshScheduler>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let source: SourceKind = path.parse()?;
    let outcome = scheduler.refresh(source).await;
    info!(%source, ?outcome, "On-demand refresh");

    Ok(HttpResponse::Ok().json(ApiResponse::success(RefreshResponse { source, outcome })))
}

/// Configure source routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/sources")
            .route("", web::get().to(list_sources))
            .route("/{source}/refresh", web::post().to(refresh_source)),
    );
}
