//! Dashboard service
//!
//! Reads every snapshot once per pass, aggregates, and memoises the result by
//! snapshot versions. Concurrent readers share one `Arc<DashboardData>`.

use crate::snapshot::{Snapshot, SnapshotStore};
use callstats_analytics::timeseries::fill_hours;
use callstats_analytics::{
    aggregate, recent_calls, trunk_table, AggregateOptions, AggregateView, RecentCall,
    ReferenceLookups, StatsReport, TimeSeriesPoint, TrunkRow,
};
use callstats_core::models::{CallBatch, SystemStats};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Versions of the snapshots a report was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SnapshotKey {
    pub call_records: Option<u64>,
    pub tariffs: Option<u64>,
    pub trunks: Option<u64>,
    pub servers: Option<u64>,
    pub hubs: Option<u64>,
}

/// Everything derived from one consistent set of snapshots
#[derive(Debug)]
pub struct DashboardData {
    pub key: SnapshotKey,
    pub view: AggregateView,
    pub report: StatsReport,
    /// Newest first
    pub recent: Vec<RecentCall>,
    pub trunks: Vec<TrunkRow>,
    /// Rejected and unassigned counts of the batch in use
    pub rejected: usize,
    pub unassigned: usize,
    /// When the call records in use were fetched
    pub records_fetched_at: Option<DateTime<Utc>>,
}

/// Summary for the overview screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub total_calls: u64,
    pub total_revenue: Decimal,
    pub total_duration_seconds: i64,
    pub rejected_records: usize,
    pub unassigned_records: usize,
    /// All 24 hour-of-day slots
    pub hourly: Vec<TimeSeriesPoint>,
    pub system: Option<SystemStats>,
    pub records_fetched_at: Option<DateTime<Utc>>,
}

/// Last acquired backend configuration, passed through unchanged
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigDocument {
    pub value: serde_json::Value,
    pub version: u64,
    pub fetched_at: DateTime<Utc>,
}

/// Builds reports from the snapshot store
pub struct DashboardService {
    store: Arc<SnapshotStore>,
    options: AggregateOptions,
    cache: Mutex<Option<Arc<DashboardData>>>,
}

impl DashboardService {
    pub fn new(store: Arc<SnapshotStore>, options: AggregateOptions) -> Self {
        Self {
            store,
            options,
            cache: Mutex::new(None),
        }
    }

    pub fn options(&self) -> &AggregateOptions {
        &self.options
    }

    /// Report for the current snapshots, rebuilt only when a version moved
    #[instrument(skip(self))]
    pub fn current(&self) -> Arc<DashboardData> {
        let records = self.store.call_records.current();
        let tariffs = self.store.tariffs.current();
        let trunks = self.store.trunks.current();
        let servers = self.store.servers.current();
        let hubs = self.store.hubs.current();

        let key = SnapshotKey {
            call_records: version(&records),
            tariffs: version(&tariffs),
            trunks: version(&trunks),
            servers: version(&servers),
            hubs: version(&hubs),
        };

        let mut cache = self.cache.lock();
        if let Some(data) = cache.as_ref().filter(|data| data.key == key) {
            return Arc::clone(data);
        }

        let empty = CallBatch::default();
        let batch = records.as_ref().map_or(&empty, |s| &s.value);
        let trunk_list = trunks.as_ref().map_or(&[][..], |s| s.value.as_slice());

        let lookups = ReferenceLookups::build(
            tariffs.as_ref().map_or(&[][..], |s| s.value.as_slice()),
            trunk_list,
            servers.as_ref().map_or(&[][..], |s| s.value.as_slice()),
            hubs.as_ref().map_or(&[][..], |s| s.value.as_slice()),
        );

        let view = aggregate(&batch.records, &self.options);
        let report = StatsReport::build(&view, &lookups, self.options.top_n);
        let data = Arc::new(DashboardData {
            key,
            recent: recent_calls(&batch.records, &lookups),
            trunks: trunk_table(trunk_list, &lookups, &view),
            rejected: batch.rejected,
            unassigned: batch.unassigned,
            records_fetched_at: records.as_ref().map(|s| s.fetched_at),
            view,
            report,
        });

        debug!(?key, calls = data.view.total_calls, "Dashboard data rebuilt");
        *cache = Some(Arc::clone(&data));
        data
    }

    /// Totals, the dense hourly series and the backend's own counters
    pub fn overview(&self) -> Overview {
        let data = self.current();
        Overview {
            total_calls: data.view.total_calls,
            total_revenue: data.report.totals.total_revenue,
            total_duration_seconds: data.view.total_duration_seconds,
            rejected_records: data.rejected,
            unassigned_records: data.unassigned,
            hourly: fill_hours(&data.view.hourly),
            system: self.store.system_stats.current().map(|s| s.value.clone()),
            records_fetched_at: data.records_fetched_at,
        }
    }

    /// Backend configuration, `None` until the first successful fetch
    pub fn config(&self) -> Option<ConfigDocument> {
        self.store.config.current().map(|s| ConfigDocument {
            value: s.value.clone(),
            version: s.version,
            fetched_at: s.fetched_at,
        })
    }
}

fn version<T>(snapshot: &Option<Arc<Snapshot<T>>>) -> Option<u64> {
    snapshot.as_ref().map(|s| s.version)
}
