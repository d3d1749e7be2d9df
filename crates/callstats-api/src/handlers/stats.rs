//! Statistics handlers
//!
//! HTTP handlers for the overview and call statistics screens. Every handler
//! reads one memoised `DashboardData`, so a response never mixes snapshots.

use crate::dto::{ApiResponse, OverviewResponse, PaginationParams};
use actix_web::{web, HttpResponse};
use callstats_core::AppError;
use callstats_services::{DashboardService, RefreshScheduler};
use tracing::{debug, instrument};
use validator::Validate;

/// Get the overview summary
///
/// GET /api/v1/stats/overview
#[instrument(skip(dashboard, scheduler))]
pub async fn get_overview(
    dashboard: web::Data<DashboardService>,
    scheduler: web::Data<RefreshScheduler>,
) -> Result<HttpResponse, AppError> {
    let response = OverviewResponse {
        overview: dashboard.overview(),
        sources: scheduler.statuses(),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

/// Get the full statistics report
///
/// GET /api/v1/stats/calls
#[instrument(skip(dashboard))]
pub async fn get_call_stats(
    dashboard: web::Data<DashboardService>,
) -> Result<HttpResponse, AppError> {
    let data = dashboard.current();
    debug!(calls = data.view.total_calls, "Serving statistics report");

    Ok(HttpResponse::Ok().json(ApiResponse::success(&data.report)))
}

/// Get the hour-of-day series, paginated
///
/// GET /api/v1/stats/hourly
#[instrument(skip(dashboard))]
pub async fn get_hourly(
    dashboard: web::Data<DashboardService>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse, AppError> {
    query.validate()?;
    let data = dashboard.current();

    Ok(HttpResponse::Ok().json(query.paginate(&data.view.hourly)))
}

/// Get the most recent calls, newest first, paginated
///
/// GET /api/v1/stats/recent-calls
#[instrument(skip(dashboard))]
pub async fn get_recent_calls(
    dashboard: web::Data<DashboardService>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse, AppError> {
    query.validate()?;
    let data = dashboard.current();

    Ok(HttpResponse::Ok().json(query.paginate(&data.recent)))
}

/// Get the trunk table with server names and load, paginated
///
/// GET /api/v1/stats/trunks
#[instrument(skip(dashboard))]
pub async fn get_trunks(
    dashboard: web::Data<DashboardService>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse, AppError> {
    query.validate()?;
    let data = dashboard.current();

    Ok(HttpResponse::Ok().json(query.paginate(&data.trunks)))
}

/// Configure statistics routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/stats")
            .route("/overview", web::get().to(get_overview))
            .route("/calls", web::get().to(get_call_stats))
            .route("/hourly", web::get().to(get_hourly))
            .route("/recent-calls", web::get().to(get_recent_calls))
            .route("/trunks", web::get().to(get_trunks)),
    );
}
