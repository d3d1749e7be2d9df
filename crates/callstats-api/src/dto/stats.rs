//! Statistics DTOs

use callstats_core::models::SourceKind;
use callstats_services::{CycleOutcome, Overview, SourceStatus};
use serde::Serialize;

/// Liveness response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process serves requests
    pub status: &'static str,
    /// Crate version
    pub version: &'static str,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// Overview screen payload
#[derive(Debug, Clone, Serialize)]
pub struct OverviewResponse {
    /// Totals, hourly series and backend counters
    #[serde(flatten)]
    pub overview: Overview,
    /// Freshness of every source
    pub sources: Vec<SourceStatus>,
}

/// Result of an on-demand refresh
#[derive(Debug, Clone, Serialize)]
pub struct RefreshResponse {
    /// Source that was asked to refresh
    pub source: SourceKind,
    /// What happened
    #[serde(flatten)]
    pub outcome: CycleOutcome,
}
