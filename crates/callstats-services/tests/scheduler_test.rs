//! Refresh scheduler tests

use async_trait::async_trait;
use callstats_core::config::RefreshConfig;
use callstats_core::models::{CallBatch, CallRecord, Hub, Server, SourceKind, SystemStats, Tariff, Trunk};
use callstats_core::traits::StatsBoundary;
use callstats_core::AppError;
use callstats_services::{CycleOutcome, RefreshScheduler, SnapshotStore};
use mockall::mock;
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

mock! {
    pub Boundary {}

    #[async_trait]
    impl StatsBoundary for Boundary {
        async fn fetch_call_records(&self) -> Result<CallBatch, AppError>;
        async fn fetch_tariffs(&self) -> Result<Vec<Tariff>, AppError>;
        async fn fetch_trunks(&self) -> Result<Vec<Trunk>, AppError>;
        async fn fetch_servers(&self) -> Result<Vec<Server>, AppError>;
        async fn fetch_hubs(&self) -> Result<Vec<Hub>, AppError>;
        async fn fetch_system_stats(&self) -> Result<SystemStats, AppError>;
        async fn fetch_config(&self) -> Result<serde_json::Value, AppError>;
    }
}

fn batch_of(costs: &[rust_decimal::Decimal]) -> CallBatch {
    CallBatch::new(
        costs
            .iter()
            .enumerate()
            .map(|(i, cost)| CallRecord {
                id: i as i64,
                call_id: format!("c-{}", i),
                trunk_id: 1,
                tarif_id: 1,
                duration_seconds: 30,
                cost: *cost,
                ..Default::default()
            })
            .collect(),
    )
}

/// Counts calls and takes `delay` to answer each one
struct SlowBoundary {
    delay: Duration,
    call_records: AtomicUsize,
    other: AtomicUsize,
}

impl SlowBoundary {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            call_records: AtomicUsize::new(0),
            other: AtomicUsize::new(0),
        }
    }

    async fn other<T: Default>(&self) -> Result<T, AppError> {
        self.other.fetch_add(1, Ordering::SeqCst);
        Ok(T::default())
    }
}

#[async_trait]
impl StatsBoundary for SlowBoundary {
    async fn fetch_call_records(&self) -> Result<CallBatch, AppError> {
        self.call_records.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(CallBatch::default())
    }

    async fn fetch_tariffs(&self) -> Result<Vec<Tariff>, AppError> {
        self.other().await
    }

    async fn fetch_trunks(&self) -> Result<Vec<Trunk>, AppError> {
        self.other().await
    }

    async fn fetch_servers(&self) -> Result<Vec<Server>, AppError> {
        self.other().await
    }

    async fn fetch_hubs(&self) -> Result<Vec<Hub>, AppError> {
        self.other().await
    }

    async fn fetch_system_stats(&self) -> Result<SystemStats, AppError> {
        self.other().await
    }

    async fn fetch_config(&self) -> Result<serde_json::Value, AppError> {
        self.other().await
    }
}

fn cadence(call_records_secs: u64) -> RefreshConfig {
    RefreshConfig {
        call_records_secs,
        system_stats_secs: 0,
        config_secs: 0,
        reference_secs: 0,
    }
}

#[tokio::test]
async fn refresh_replaces_snapshot() {
    let mut boundary = MockBoundary::new();
    boundary
        .expect_fetch_call_records()
        .times(2)
        .returning(|| Ok(batch_of(&[dec!(1.00), dec!(2.00)])));

    let store = Arc::new(SnapshotStore::new());
    let scheduler = RefreshScheduler::new(Arc::new(boundary), store.clone(), &cadence(5));

    assert_eq!(
        scheduler.refresh(SourceKind::CallRecords).await,
        CycleOutcome::Refreshed { version: 1 }
    );
    assert_eq!(
        scheduler.refresh(SourceKind::CallRecords).await,
        CycleOutcome::Refreshed { version: 2 }
    );
    assert_eq!(store.call_records.current().unwrap().value.len(), 2);
}

#[tokio::test]
async fn failure_keeps_last_snapshot() {
    let mut boundary = MockBoundary::new();
    let mut seq = mockall::Sequence::new();
    boundary
        .expect_fetch_trunks()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| {
            Ok(vec![Trunk {
                id: 1,
                name: "Main".into(),
                server_id: 1,
                capacity: 30,
                cost_per_channel: dec!(0),
            }])
        });
    boundary
        .expect_fetch_trunks()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| Err(AppError::BoundaryTimeout(5000)));

    let store = Arc::new(SnapshotStore::new());
    let scheduler = RefreshScheduler::new(Arc::new(boundary), store.clone(), &cadence(5));

    scheduler.refresh(SourceKind::Trunks).await;
    let outcome = scheduler.refresh(SourceKind::Trunks).await;

    assert!(matches!(outcome, CycleOutcome::Failed { .. }));
    let status = scheduler.status(SourceKind::Trunks);
    assert_eq!(status.cell.version, Some(1));
    assert_eq!(status.cell.consecutive_failures, 1);
    assert_eq!(store.trunks.current().unwrap().value[0].name, "Main");
}

#[tokio::test]
async fn failure_without_snapshot_leaves_store_empty() {
    let mut boundary = MockBoundary::new();
    boundary
        .expect_fetch_system_stats()
        .returning(|| Err(AppError::BoundaryConnection("refused".into())));

    let store = Arc::new(SnapshotStore::new());
    let scheduler = RefreshScheduler::new(Arc::new(boundary), store.clone(), &cadence(5));

    scheduler.refresh(SourceKind::SystemStats).await;

    assert!(store.system_stats.current().is_none());
    assert!(scheduler.status(SourceKind::SystemStats).cell.last_error.is_some());
}

#[tokio::test(start_paused = true)]
async fn concurrent_refresh_is_skipped() {
    let boundary = Arc::new(SlowBoundary::new(Duration::from_secs(3)));
    let scheduler = Arc::new(RefreshScheduler::new(
        boundary.clone(),
        Arc::new(SnapshotStore::new()),
        &cadence(5),
    ));

    let (first, second) = tokio::join!(
        scheduler.refresh(SourceKind::CallRecords),
        scheduler.refresh(SourceKind::CallRecords),
    );

    assert_eq!(first, CycleOutcome::Refreshed { version: 1 });
    assert_eq!(second, CycleOutcome::Skipped);
    assert_eq!(boundary.call_records.load(Ordering::SeqCst), 1);
    assert!(!scheduler.is_in_flight(SourceKind::CallRecords));
}

#[tokio::test(start_paused = true)]
async fn cycles_follow_cadence_and_never_overlap() {
    // 2s per request, 5s sleep after each: cycles start at 0, 7, 14
    let boundary = Arc::new(SlowBoundary::new(Duration::from_secs(2)));
    let scheduler = Arc::new(RefreshScheduler::new(
        boundary.clone(),
        Arc::new(SnapshotStore::new()),
        &cadence(5),
    ));

    scheduler.start();
    tokio::time::sleep(Duration::from_secs(15)).await;

    assert_eq!(boundary.call_records.load(Ordering::SeqCst), 3);
    // On-demand sources are fetched exactly once
    assert_eq!(boundary.other.load(Ordering::SeqCst), 6);

    scheduler.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn shutdown_abandons_in_flight_cycle() {
    let boundary = Arc::new(SlowBoundary::new(Duration::from_secs(60)));
    let store = Arc::new(SnapshotStore::new());
    let scheduler = Arc::new(RefreshScheduler::new(boundary.clone(), store.clone(), &cadence(5)));

    scheduler.start();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(scheduler.is_in_flight(SourceKind::CallRecords));

    scheduler.shutdown().await;

    assert!(!scheduler.is_in_flight(SourceKind::CallRecords));
    assert!(store.call_records.current().is_none());
    assert!(store.tariffs.current().is_some());
}

#[tokio::test]
async fn statuses_cover_every_source() {
    let scheduler = RefreshScheduler::new(
        Arc::new(MockBoundary::new()),
        Arc::new(SnapshotStore::new()),
        &RefreshConfig::statistics(),
    );

    let statuses = scheduler.statuses();

    assert_eq!(statuses.len(), SourceKind::ALL.len());
    let records = statuses
        .iter()
        .find(|s| s.source == SourceKind::CallRecords)
        .unwrap();
    assert_eq!(records.cadence_secs, Some(5));
    let tariffs = statuses.iter().find(|s| s.source == SourceKind::Tariffs).unwrap();
    assert_eq!(tariffs.cadence_secs, None);
}
