//! Services for the call statistics dashboard
//!
//! This crate keeps the acquired data fresh and turns it into reports:
//!
//! - [`SnapshotStore`] - last good snapshot per source, replaced wholesale
//! - [`RefreshScheduler`] - one refresh task per source, never two requests
//!   in flight for the same source
//! - [`DashboardService`] - aggregates one consistent set of snapshots and
//!   memoises the result by snapshot versions
//!
//! Services are wrapped in `Arc` and shared with the HTTP handlers.

pub mod dashboard;
pub mod scheduler;
pub mod snapshot;

pub use dashboard::{ConfigDocument, DashboardData, DashboardService, Overview, SnapshotKey};
pub use scheduler::{CycleOutcome, RefreshScheduler, SourceStatus};
pub use snapshot::{CellStatus, Snapshot, SnapshotCell, SnapshotStore};
