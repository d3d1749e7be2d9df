//! HTTP JSON client for the dashboard backend
//!
//! Read-only GETs against the `/get/...`, `/system/stats` and `/config`
//! endpoints, with a bounded retry.

use crate::payload;
use async_trait::async_trait;
use callstats_core::config::BoundaryConfig;
use callstats_core::models::{CallBatch, Hub, Server, SourceKind, SystemStats, Tariff, Trunk};
use callstats_core::traits::StatsBoundary;
use callstats_core::{AppError, AppResult};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, ClientBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Upper bound on retries after a failed request
pub const MAX_RETRIES: u32 = 1;

const RETRY_DELAY: Duration = Duration::from_millis(200);

/// Retry policy for boundary requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
}

impl RetryPolicy {
    /// Values above [`MAX_RETRIES`] are clamped
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries: max_retries.min(MAX_RETRIES),
        }
    }

    #[inline]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    #[inline]
    pub fn should_retry(&self, attempt: u32, error: &AppError) -> bool {
        attempt < self.max_retries && error.is_retryable()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(MAX_RETRIES)
    }
}

/// Client for the upstream dashboard backend
pub struct HttpBoundaryClient {
    http_client: Client,
    base_url: String,
    auth_token: Option<String>,
    timeout_ms: u64,
    retry: RetryPolicy,
}

impl HttpBoundaryClient {
    /// Create a client from the boundary section of the configuration
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let client = HttpBoundaryClient::new(&BoundaryConfig {
    ///     base_url: "http://127.0.0.1:8080/api".into(),
    ///     ..Default::default()
    /// })?;
    /// let batch = client.fetch_call_records().await?;
    /// ```
    pub fn new(config: &BoundaryConfig) -> AppResult<Self> {
        let http_client = ClientBuilder::new()
            .timeout(Duration::from_millis(config.timeout_ms))
            .pool_max_idle_per_host(8)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .map_err(|e| AppError::BoundaryConnection(e.to_string()))?;

        if config.max_retries > MAX_RETRIES {
            warn!(
                configured = config.max_retries,
                max = MAX_RETRIES,
                "Clamping boundary max_retries"
            );
        }

        info!(base_url = %config.base_url, timeout_ms = config.timeout_ms, "Boundary client ready");

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone().filter(|t| !t.is_empty()),
            timeout_ms: config.timeout_ms,
            retry: RetryPolicy::new(config.max_retries),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET `path` and decode the body, retrying at most once
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn get_json<R>(&self, path: &str) -> AppResult<R>
    where
        R: DeserializeOwned,
    {
        let mut attempt = 0;
        loop {
            match self.get_once(path).await {
                Ok(body) => return Ok(body),
                Err(e) if self.retry.should_retry(attempt, &e) => {
                    attempt += 1;
                    warn!(path, attempt, error = %e, "Boundary request failed, retrying");
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_once<R>(&self, path: &str) -> AppResult<R>
    where
        R: DeserializeOwned,
    {
        let mut request = self.http_client.get(self.url(path));
        if let Some(token) = &self.auth_token {
            request = request.header(AUTHORIZATION, token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::BoundaryTimeout(self.timeout_ms)
            } else {
                AppError::BoundaryConnection(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::BoundaryStatus {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                AppError::BoundaryTimeout(self.timeout_ms)
            } else {
                AppError::BoundaryConnection(e.to_string())
            }
        })?;

        debug!(path, bytes = body.len(), "Boundary response received");

        serde_json::from_slice(&body)
            .map_err(|e| AppError::BoundaryDecode(format!("{}: {}", path, e)))
    }

    async fn get_list(&self, source: SourceKind) -> AppResult<Vec<Value>> {
        self.get_json(source.path()).await
    }
}

#[async_trait]
impl StatsBoundary for HttpBoundaryClient {
    async fn fetch_call_records(&self) -> Result<CallBatch, AppError> {
        let batch = payload::call_batch(self.get_list(SourceKind::CallRecords).await?);
        if batch.rejected > 0 {
            warn!(
                kept = batch.len(),
                rejected = batch.rejected,
                "Call record batch had rejected entries"
            );
        }
        Ok(batch)
    }

    async fn fetch_tariffs(&self) -> Result<Vec<Tariff>, AppError> {
        Ok(payload::reference_list(self.get_list(SourceKind::Tariffs).await?))
    }

    async fn fetch_trunks(&self) -> Result<Vec<Trunk>, AppError> {
        Ok(payload::reference_list(self.get_list(SourceKind::Trunks).await?))
    }

    async fn fetch_servers(&self) -> Result<Vec<Server>, AppError> {
        Ok(payload::reference_list(self.get_list(SourceKind::Servers).await?))
    }

    async fn fetch_hubs(&self) -> Result<Vec<Hub>, AppError> {
        Ok(payload::reference_list(self.get_list(SourceKind::Hubs).await?))
    }

    async fn fetch_system_stats(&self) -> Result<SystemStats, AppError> {
        self.get_json(SourceKind::SystemStats.path()).await
    }

    async fn fetch_config(&self) -> Result<Value, AppError> {
        self.get_json(SourceKind::Config.path()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HttpBoundaryClient::new(&BoundaryConfig {
            base_url: "http://localhost:8080/api/".into(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(client.base_url(), "http://localhost:8080/api");
        assert_eq!(client.url("/get/trunk"), "http://localhost:8080/api/get/trunk");
    }

    #[test]
    fn test_retries_are_clamped() {
        assert_eq!(RetryPolicy::new(0).max_retries(), 0);
        assert_eq!(RetryPolicy::new(1).max_retries(), 1);
        assert_eq!(RetryPolicy::new(5).max_retries(), 1);
    }

    #[test]
    fn test_only_transient_errors_retry() {
        let policy = RetryPolicy::default();
        let server_error = AppError::BoundaryStatus {
            status: 503,
            path: "/get/trunk".into(),
        };
        let client_error = AppError::BoundaryStatus {
            status: 404,
            path: "/get/trunk".into(),
        };

        assert!(policy.should_retry(0, &server_error));
        assert!(!policy.should_retry(1, &server_error));
        assert!(policy.should_retry(0, &AppError::BoundaryTimeout(5000)));
        assert!(!policy.should_retry(0, &client_error));
        assert!(!policy.should_retry(0, &AppError::BoundaryDecode("x".into())));
        assert!(!RetryPolicy::new(0).should_retry(0, &server_error));
    }
}
