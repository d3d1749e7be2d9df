//! Call statistics dashboard server
//!
//! Polls the dashboard backend on per-source cadences, keeps the latest
//! snapshot of every source and serves the derived statistics as JSON.

use actix_cors::Cors;
use actix_web::{http::header, middleware, web, App, HttpResponse, HttpServer};
use anyhow::Context;
use callstats_analytics::AggregateOptions;
use callstats_client::HttpBoundaryClient;
use callstats_core::config::AppConfig;
use callstats_services::{DashboardService, RefreshScheduler, SnapshotStore};
use std::env;
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging
fn init_tracing() {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "callstats_dashboard={0},callstats_api={0},callstats_services={0},\
             callstats_client={0},callstats_analytics={0},actix_web=info,reqwest=warn",
            log_level
        ))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    info!(
        "Starting call statistics dashboard v{}",
        env!("CARGO_PKG_VERSION")
    );

    let config = AppConfig::load().context("failed to load configuration")?;
    let options =
        AggregateOptions::from_config(&config.analytics).context("invalid analytics settings")?;

    let boundary = HttpBoundaryClient::new(&config.boundary)
        .context("failed to build the backend client")?;
    info!(
        base_url = boundary.base_url(),
        timeout_ms = config.boundary.timeout_ms,
        "Dashboard backend configured"
    );

    let store = Arc::new(SnapshotStore::new());
    let scheduler = Arc::new(RefreshScheduler::new(
        Arc::new(boundary),
        store.clone(),
        &config.refresh,
    ));
    scheduler.start();

    let dashboard = web::Data::new(DashboardService::new(store, options));
    let scheduler_data = web::Data::from(scheduler.clone());

    let bind_addr = config.server_addr();
    let workers = config.server.workers;
    let cors_origins = config.server.cors_origins.clone();
    info!(
        "Starting HTTP server on {} with {} workers",
        bind_addr, workers
    );

    HttpServer::new(move || {
        let cors_origins_inner = cors_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _req_head| {
                let origins: Vec<&str> = cors_origins_inner.split(',').collect();
                if let Ok(origin_str) = origin.to_str() {
                    origins.iter().any(|o| o.trim() == origin_str)
                } else {
                    false
                }
            })
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            .app_data(dashboard.clone())
            .app_data(scheduler_data.clone())
            .wrap(cors)
            .wrap(TracingLogger::default())
            .wrap(middleware::Logger::new("%a \"%r\" %s %b %Dms"))
            .wrap(middleware::NormalizePath::trim())
            .service(web::scope("/api/v1").configure(callstats_api::configure))
            .route(
                "/",
                web::get().to(|| async {
                    HttpResponse::Found()
                        .append_header(("Location", "/api/v1/health"))
                        .finish()
                }),
            )
    })
    .workers(workers)
    .bind(&bind_addr)
    .with_context(|| format!("failed to bind {}", bind_addr))?
    .run()
    .await?;

    info!("HTTP server stopped, cancelling refresh cycles");
    scheduler.shutdown().await;

    Ok(())
}
