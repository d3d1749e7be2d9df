//! Refresh scheduler
//!
//! One task per source, each with its own cadence. A task awaits its cycle
//! before sleeping, so a slow backend never piles up requests. On-demand
//! refreshes share the same per-source in-flight flag and report
//! [`CycleOutcome::Skipped`] instead of starting a second request.

use crate::snapshot::{CellStatus, SnapshotStore};
use callstats_core::config::RefreshConfig;
use callstats_core::models::SourceKind;
use callstats_core::traits::StatsBoundary;
use callstats_core::AppError;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Result of one refresh cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CycleOutcome {
    Refreshed { version: u64 },
    Failed { error: String },
    /// Another cycle for the same source was still running
    Skipped,
}

/// Status of one source as reported to the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceStatus {
    pub source: SourceKind,
    /// `None` means on demand only
    pub cadence_secs: Option<u64>,
    pub in_flight: bool,
    #[serde(flatten)]
    pub cell: CellStatus,
}

/// Clears the in-flight flag when a cycle settles or is dropped
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Periodic re-acquisition of every source
pub struct RefreshScheduler {
    boundary: Arc<dyn StatsBoundary>,
    store: Arc<SnapshotStore>,
    cadences: HashMap<SourceKind, Option<Duration>>,
    in_flight: HashMap<SourceKind, AtomicBool>,
    shutdown: CancellationToken,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl RefreshScheduler {
    pub fn new(
        boundary: Arc<dyn StatsBoundary>,
        store: Arc<SnapshotStore>,
        refresh: &RefreshConfig,
    ) -> Self {
        Self {
            boundary,
            store,
            cadences: SourceKind::ALL
                .into_iter()
                .map(|source| (source, refresh.cadence(source)))
                .collect(),
            in_flight: SourceKind::ALL
                .into_iter()
                .map(|source| (source, AtomicBool::new(false)))
                .collect(),
            shutdown: CancellationToken::new(),
            handles: Mutex::new(Vec::new()),
        }
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    pub fn cadence(&self, source: SourceKind) -> Option<Duration> {
        self.cadences.get(&source).copied().flatten()
    }

    pub fn is_in_flight(&self, source: SourceKind) -> bool {
        self.in_flight
            .get(&source)
            .map_or(false, |flag| flag.load(Ordering::Acquire))
    }

    /// Spawn one task per source. Sources without a cadence are fetched once.
    pub fn start(self: &Arc<Self>) {
        let mut handles = self.handles.lock();
        if !handles.is_empty() {
            warn!("Refresh scheduler already started");
            return;
        }

        for source in SourceKind::ALL {
            let scheduler = Arc::clone(self);
            let token = self.shutdown.child_token();
            handles.push(tokio::spawn(async move {
                scheduler.run_source(source, token).await;
            }));
        }

        info!(sources = handles.len(), "Refresh scheduler started");
    }

    async fn run_source(&self, source: SourceKind, token: CancellationToken) {
        let cadence = self.cadence(source);
        debug!(%source, ?cadence, "Refresh task running");

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                outcome = self.refresh(source) => {
                    if let CycleOutcome::Failed { error } = &outcome {
                        warn!(%source, %error, "Refresh cycle failed, keeping last snapshot");
                    }
                }
            }

            let Some(period) = cadence else { break };

            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(period) => {}
            }
        }

        debug!(%source, "Refresh task stopped");
    }

    /// Run one cycle for `source` unless one is already running
    #[instrument(skip(self))]
    pub async fn refresh(&self, source: SourceKind) -> CycleOutcome {
        let Some(flag) = self.in_flight.get(&source) else {
            return CycleOutcome::Skipped;
        };
        let Some(_guard) = InFlightGuard::acquire(flag) else {
            debug!("Cycle already in flight, skipping");
            return CycleOutcome::Skipped;
        };

        match self.acquire(source).await {
            Ok(version) => {
                debug!(version, "Snapshot replaced");
                CycleOutcome::Refreshed { version }
            }
            Err(e) => {
                self.store.record_failure(source, &e);
                CycleOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    async fn acquire(&self, source: SourceKind) -> Result<u64, AppError> {
        let store = &self.store;
        let version = match source {
            SourceKind::CallRecords => {
                let batch = self.boundary.fetch_call_records().await?;
                store.call_records.replace(batch)
            }
            SourceKind::Tariffs => store.tariffs.replace(self.boundary.fetch_tariffs().await?),
            SourceKind::Trunks => store.trunks.replace(self.boundary.fetch_trunks().await?),
            SourceKind::Servers => store.servers.replace(self.boundary.fetch_servers().await?),
            SourceKind::Hubs => store.hubs.replace(self.boundary.fetch_hubs().await?),
            SourceKind::SystemStats => store
                .system_stats
                .replace(self.boundary.fetch_system_stats().await?),
            SourceKind::Config => store.config.replace(self.boundary.fetch_config().await?),
        };
        Ok(version)
    }

    pub fn status(&self, source: SourceKind) -> SourceStatus {
        SourceStatus {
            source,
            cadence_secs: self.cadence(source).map(|d| d.as_secs()),
            in_flight: self.is_in_flight(source),
            cell: self.store.status(source),
        }
    }

    pub fn statuses(&self) -> Vec<SourceStatus> {
        SourceKind::ALL.into_iter().map(|s| self.status(s)).collect()
    }

    /// Cancel every task and wait for them to finish
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let handles: Vec<JoinHandle<()>> = self.handles.lock().drain(..).collect();
        for result in futures::future::join_all(handles).await {
            if let Err(e) = result {
                warn!(error = %e, "Refresh task ended abnormally");
            }
        }
        info!("Refresh scheduler stopped");
    }
}
