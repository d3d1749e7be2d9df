//! Snapshot store
//!
//! Each source keeps its last successful value behind an `Arc`. A refresh
//! swaps the whole value; a failure only touches the bookkeeping, so readers
//! keep seeing the last good snapshot.

use callstats_core::models::{CallBatch, Hub, Server, SourceKind, SystemStats, Tariff, Trunk};
use callstats_core::AppError;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

/// One successfully acquired value
#[derive(Debug)]
pub struct Snapshot<T> {
    pub value: T,
    pub fetched_at: DateTime<Utc>,
    /// Starts at 1, grows by one per replacement
    pub version: u64,
}

/// Freshness and failure bookkeeping of one cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellStatus {
    pub version: Option<u64>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub last_attempt: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
}

#[derive(Debug)]
struct CellState<T> {
    current: Option<Arc<Snapshot<T>>>,
    last_attempt: Option<DateTime<Utc>>,
    consecutive_failures: u32,
    last_error: Option<String>,
}

/// Last good snapshot of one source
#[derive(Debug)]
pub struct SnapshotCell<T> {
    source: SourceKind,
    state: RwLock<CellState<T>>,
}

impl<T> SnapshotCell<T> {
    pub fn new(source: SourceKind) -> Self {
        Self {
            source,
            state: RwLock::new(CellState {
                current: None,
                last_attempt: None,
                consecutive_failures: 0,
                last_error: None,
            }),
        }
    }

    #[inline]
    pub fn source(&self) -> SourceKind {
        self.source
    }

    /// Last good snapshot, if any acquisition ever succeeded
    pub fn current(&self) -> Option<Arc<Snapshot<T>>> {
        self.state.read().current.clone()
    }

    pub fn version(&self) -> Option<u64> {
        self.state.read().current.as_ref().map(|s| s.version)
    }

    /// Replace the whole value and return the new version
    pub fn replace(&self, value: T) -> u64 {
        let now = Utc::now();
        let mut state = self.state.write();
        let version = state.current.as_ref().map_or(1, |s| s.version + 1);

        state.current = Some(Arc::new(Snapshot {
            value,
            fetched_at: now,
            version,
        }));
        state.last_attempt = Some(now);
        state.consecutive_failures = 0;
        state.last_error = None;

        version
    }

    /// Note a failed acquisition; the current snapshot is kept
    pub fn record_failure(&self, error: &AppError) {
        let mut state = self.state.write();
        state.last_attempt = Some(Utc::now());
        state.consecutive_failures += 1;
        state.last_error = Some(error.to_string());
    }

    pub fn status(&self) -> CellStatus {
        let state = self.state.read();
        CellStatus {
            version: state.current.as_ref().map(|s| s.version),
            fetched_at: state.current.as_ref().map(|s| s.fetched_at),
            last_attempt: state.last_attempt,
            consecutive_failures: state.consecutive_failures,
            last_error: state.last_error.clone(),
        }
    }
}

/// One cell per source
#[derive(Debug)]
pub struct SnapshotStore {
    pub call_records: SnapshotCell<CallBatch>,
    pub tariffs: SnapshotCell<Vec<Tariff>>,
    pub trunks: SnapshotCell<Vec<Trunk>>,
    pub servers: SnapshotCell<Vec<Server>>,
    pub hubs: SnapshotCell<Vec<Hub>>,
    pub system_stats: SnapshotCell<SystemStats>,
    pub config: SnapshotCell<serde_json::Value>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self {
            call_records: SnapshotCell::new(SourceKind::CallRecords),
            tariffs: SnapshotCell::new(SourceKind::Tariffs),
            trunks: SnapshotCell::new(SourceKind::Trunks),
            servers: SnapshotCell::new(SourceKind::Servers),
            hubs: SnapshotCell::new(SourceKind::Hubs),
            system_stats: SnapshotCell::new(SourceKind::SystemStats),
            config: SnapshotCell::new(SourceKind::Config),
        }
    }

    pub fn status(&self, source: SourceKind) -> CellStatus {
        match source {
            SourceKind::CallRecords => self.call_records.status(),
            SourceKind::Tariffs => self.tariffs.status(),
            SourceKind::Trunks => self.trunks.status(),
            SourceKind::Servers => self.servers.status(),
            SourceKind::Hubs => self.hubs.status(),
            SourceKind::SystemStats => self.system_stats.status(),
            SourceKind::Config => self.config.status(),
        }
    }

    pub fn record_failure(&self, source: SourceKind, error: &AppError) {
        match source {
            SourceKind::CallRecords => self.call_records.record_failure(error),
            SourceKind::Tariffs => self.tariffs.record_failure(error),
            SourceKind::Trunks => self.trunks.record_failure(error),
            SourceKind::Servers => self.servers.record_failure(error),
            SourceKind::Hubs => self.hubs.record_failure(error),
            SourceKind::SystemStats => self.system_stats.record_failure(error),
            SourceKind::Config => self.config.record_failure(error),
        }
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
