//! Call statistics analytics
//!
//! Turns an unordered batch of call records plus small reference lists into
//! display-ready aggregates:
//!
//! - [`resolver`] - id to name lookups with deterministic fallback labels
//! - [`aggregation`] - group-by tariff/trunk, totals, rankings and shares
//! - [`buckets`] - duration and cost histograms over half-open ranges
//! - [`timeseries`] - hour-of-day and daily series
//! - [`topology`] - trunk to server to hub roll-up
//! - [`report`] - labelled rows and chart slices for the dashboard
//! - [`pagination`] - stateless windowing of any slice
//!
//! Everything here is synchronous and pure: the same input always yields the
//! same output.

#![forbid(unsafe_code)]

pub mod aggregation;
pub mod buckets;
pub mod pagination;
pub mod report;
pub mod resolver;
pub mod share;
pub mod timeseries;
pub mod topology;

pub use aggregation::{aggregate, AggregateOptions, AggregateView, Dimension, GroupAggregate};
pub use buckets::{BucketAggregate, BucketSet, BucketSpec};
pub use pagination::{page, paginate, total_pages, Page, PageMeta};
pub use report::{recent_calls, trunk_table, RecentCall, StatsReport, TrunkRow};
pub use resolver::{NameResolver, ReferenceLookups};
pub use share::{count_share, ratio, revenue_share};
pub use timeseries::{DailyPoint, TimeSeriesPoint};
pub use topology::{rollup_by_hub, Topology};
