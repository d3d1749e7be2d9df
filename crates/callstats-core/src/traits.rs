//! Common traits for the data boundary
//!
//! Defines the read-only view of the upstream dashboard backend.

use crate::error::AppError;
use crate::models::{CallBatch, Hub, Server, SystemStats, Tariff, Trunk};
use async_trait::async_trait;

/// Read-only access to the upstream backend
///
/// Every method acquires one full snapshot of its source. Implementations
/// validate payloads before returning them.
#[async_trait]
pub trait StatsBoundary: Send + Sync {
    /// GET `/get/call-statistics`
    async fn fetch_call_records(&self) -> Result<CallBatch, AppError>;

    /// GET `/get/tarif`
    async fn fetch_tariffs(&self) -> Result<Vec<Tariff>, AppError>;

    /// GET `/get/trunk`
    async fn fetch_trunks(&self) -> Result<Vec<Trunk>, AppError>;

    /// GET `/get/server`
    async fn fetch_servers(&self) -> Result<Vec<Server>, AppError>;

    /// GET `/get/hub`
    async fn fetch_hubs(&self) -> Result<Vec<Hub>, AppError>;

    /// GET `/system/stats`
    async fn fetch_system_stats(&self) -> Result<SystemStats, AppError>;

    /// GET `/config`, kept opaque
    async fn fetch_config(&self) -> Result<serde_json::Value, AppError>;
}
