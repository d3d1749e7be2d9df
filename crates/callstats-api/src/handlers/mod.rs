//! HTTP request handlers

pub mod config;
pub mod health;
pub mod sources;
pub mod stats;

use actix_web::{error::QueryPayloadError, web, HttpRequest};
use callstats_core::AppError;

pub use config::configure as configure_config;
pub use health::configure as configure_health;
pub use sources::configure as configure_sources;
pub use stats::configure as configure_stats;

/// Render malformed query strings with the JSON error body
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: QueryPayloadError, _req: &HttpRequest| {
        AppError::InvalidInput(err.to_string()).into()
    })
}

/// Register every route; mount under `/api/v1`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(query_config())
        .configure(configure_health)
        .configure(configure_stats)
        .configure(configure_sources)
        .configure(configure_config);
}
