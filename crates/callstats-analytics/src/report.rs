//! Display-ready report
//!
//! Joins an [`AggregateView`] with the reference lookups. Money is rounded to
//! two decimal places here and nowhere earlier.

use crate::aggregation::{AggregateView, Dimension, GroupAggregate};
use crate::buckets::BucketAggregate;
use crate::resolver::{NameResolver, ReferenceLookups};
use crate::share::count_share;
use crate::timeseries::{DailyPoint, TimeSeriesPoint};
use crate::topology::rollup_by_hub;
use callstats_core::models::{CallRecord, Trunk};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Label of the hub row collecting trunks with no known hub
pub const UNROUTED_LABEL: &str = "Unrouted";

const MONEY_DP: u32 = 2;

#[inline]
fn money(value: Decimal) -> Decimal {
    value.round_dp(MONEY_DP)
}

/// Batch-wide totals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Totals {
    pub total_calls: u64,
    pub total_revenue: Decimal,
    pub total_duration_seconds: i64,
    pub average_cost: Option<Decimal>,
    pub average_duration: Option<f64>,
}

/// One slice of a pie or bar chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSlice {
    pub id: i32,
    pub label: String,
    pub count: u64,
    pub revenue: Decimal,
    pub share: f64,
}

/// One row of the tariff or trunk table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRow {
    pub id: i32,
    pub label: String,
    pub count: u64,
    pub revenue: Decimal,
    pub duration_seconds: i64,
    pub average_cost: Option<Decimal>,
    pub average_duration: Option<f64>,
    pub revenue_share: f64,
    pub load_share: f64,
}

/// One row of the hub table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HubRow {
    /// `None` for the unrouted row
    pub hub_id: Option<i32>,
    pub label: String,
    pub count: u64,
    pub revenue: Decimal,
    pub revenue_share: f64,
    pub load_share: f64,
}

/// Everything the statistics dashboard renders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub totals: Totals,
    /// Top tariffs by revenue
    pub tariff_chart: Vec<ChartSlice>,
    /// Top trunks by call count
    pub trunk_chart: Vec<ChartSlice>,
    pub tariffs: Vec<GroupRow>,
    pub trunks: Vec<GroupRow>,
    pub hubs: Vec<HubRow>,
    pub duration_histogram: Vec<BucketAggregate>,
    pub cost_histogram: Vec<BucketAggregate>,
    pub hourly: Vec<TimeSeriesPoint>,
    pub daily: Vec<DailyPoint>,
}

impl StatsReport {
    pub fn build(view: &AggregateView, lookups: &ReferenceLookups, top_n: usize) -> Self {
        let overall = GroupAggregate {
            count: view.total_calls,
            revenue: view.total_revenue,
            duration_seconds: view.total_duration_seconds,
        };

        Self {
            totals: Totals {
                total_calls: view.total_calls,
                total_revenue: money(view.total_revenue),
                total_duration_seconds: view.total_duration_seconds,
                average_cost: overall.average_cost().map(money),
                average_duration: overall.average_duration(),
            },
            tariff_chart: chart(view, Dimension::Tariff, &lookups.tariffs, top_n),
            trunk_chart: chart(view, Dimension::Trunk, &lookups.trunks, top_n),
            tariffs: table(view, Dimension::Tariff, &lookups.tariffs),
            trunks: table(view, Dimension::Trunk, &lookups.trunks),
            hubs: hub_table(view, lookups),
            duration_histogram: view.duration_histogram.clone(),
            cost_histogram: view.cost_histogram.clone(),
            hourly: view.hourly.clone(),
            daily: view.daily.clone(),
        }
    }
}

fn chart(
    view: &AggregateView,
    dimension: Dimension,
    names: &NameResolver,
    top_n: usize,
) -> Vec<ChartSlice> {
    view.top(dimension, top_n)
        .into_iter()
        .map(|(id, group)| ChartSlice {
            id,
            label: names.label(id),
            count: group.count,
            revenue: money(group.revenue),
            share: view.share(dimension, id),
        })
        .collect()
}

fn table(view: &AggregateView, dimension: Dimension, names: &NameResolver) -> Vec<GroupRow> {
    view.ranked(dimension)
        .into_iter()
        .map(|(id, group)| GroupRow {
            id,
            label: names.label(id),
            count: group.count,
            revenue: money(group.revenue),
            duration_seconds: group.duration_seconds,
            average_cost: group.average_cost().map(money),
            average_duration: group.average_duration(),
            revenue_share: view.revenue_share(group),
            load_share: view.load_share(group),
        })
        .collect()
}

fn hub_table(view: &AggregateView, lookups: &ReferenceLookups) -> Vec<HubRow> {
    let mut rows: Vec<HubRow> = rollup_by_hub(&view.by_trunk, &lookups.topology)
        .into_iter()
        .map(|(hub_id, group)| HubRow {
            hub_id,
            label: hub_id
                .map(|id| lookups.hubs.label(id))
                .unwrap_or_else(|| UNROUTED_LABEL.to_string()),
            count: group.count,
            revenue: money(group.revenue),
            revenue_share: view.revenue_share(&group),
            load_share: view.load_share(&group),
        })
        .collect();

    // Revenue first, then known hubs by id, unrouted last
    rows.sort_by(|a, b| {
        b.revenue
            .cmp(&a.revenue)
            .then_with(|| a.hub_id.is_none().cmp(&b.hub_id.is_none()))
            .then_with(|| a.hub_id.cmp(&b.hub_id))
    });

    rows
}

/// One row of the recent calls table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentCall {
    pub id: i64,
    pub call_id: String,
    pub trunk_id: i32,
    pub trunk: String,
    pub tarif_id: i32,
    pub tariff: String,
    pub duration_seconds: i64,
    /// `M:SS`
    pub duration: String,
    pub cost: Decimal,
    pub call_time: DateTime<Utc>,
}

/// The batch newest first, with resolved labels
pub fn recent_calls(records: &[CallRecord], lookups: &ReferenceLookups) -> Vec<RecentCall> {
    records
        .iter()
        .rev()
        .map(|call| RecentCall {
            id: call.id,
            call_id: call.call_id.clone(),
            trunk_id: call.trunk_id,
            trunk: lookups.trunks.label(call.trunk_id),
            tarif_id: call.tarif_id,
            tariff: lookups.tariffs.label(call.tarif_id),
            duration_seconds: call.duration_seconds,
            duration: call.formatted_duration(),
            cost: money(call.cost),
            call_time: call.call_time,
        })
        .collect()
}

/// One row of the trunk reference table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrunkRow {
    pub id: i32,
    pub name: String,
    pub server_id: i32,
    pub server: String,
    pub hub: Option<String>,
    pub capacity: i32,
    pub cost_per_channel: Decimal,
    pub calls: u64,
    pub revenue: Decimal,
    pub load_share: f64,
}

/// Trunk reference list joined with server names and per-trunk load
pub fn trunk_table(trunks: &[Trunk], lookups: &ReferenceLookups, view: &AggregateView) -> Vec<TrunkRow> {
    trunks
        .iter()
        .map(|trunk| {
            let load = view.by_trunk.get(&trunk.id);
            let calls = load.map_or(0, |g| g.count);
            TrunkRow {
                id: trunk.id,
                name: trunk.name.clone(),
                server_id: trunk.server_id,
                server: lookups.servers.label(trunk.server_id),
                hub: lookups.topology.hub_of(trunk.id).map(|id| lookups.hubs.label(id)),
                capacity: trunk.capacity,
                cost_per_channel: trunk.cost_per_channel,
                calls,
                revenue: money(load.map_or(Decimal::ZERO, |g| g.revenue)),
                load_share: count_share(calls, view.total_calls),
            }
        })
        .collect()
}
