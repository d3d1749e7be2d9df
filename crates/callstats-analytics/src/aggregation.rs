//! Aggregation engine
//!
//! One pass over a batch of call records produces every grouped, bucketed and
//! time-keyed view the dashboard needs. Nothing is kept between passes.

use crate::buckets::{BucketAggregate, BucketSet};
use crate::share::{count_share, revenue_share};
use crate::timeseries::{daily_points, hourly_points, DailyPoint, TimeSeriesPoint};
use callstats_core::config::AnalyticsConfig;
use callstats_core::models::{CallRecord, EntityKind};
use callstats_core::AppResult;
use chrono::NaiveDate;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Default number of groups shown in a chart
pub const DEFAULT_TOP_N: usize = 8;

/// Calls, revenue and talk time for one group key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupAggregate {
    pub count: u64,
    pub revenue: Decimal,
    pub duration_seconds: i64,
}

impl GroupAggregate {
    /// Sums saturate instead of overflowing
    #[inline]
    pub fn record(&mut self, call: &CallRecord) {
        self.count = self.count.saturating_add(1);
        self.revenue = self.revenue.saturating_add(call.cost);
        self.duration_seconds = self.duration_seconds.saturating_add(call.duration_seconds);
    }

    #[inline]
    pub fn merge(&mut self, other: &GroupAggregate) {
        self.count = self.count.saturating_add(other.count);
        self.revenue = self.revenue.saturating_add(other.revenue);
        self.duration_seconds = self.duration_seconds.saturating_add(other.duration_seconds);
    }

    /// Revenue per call; `None` for an empty group
    pub fn average_cost(&self) -> Option<Decimal> {
        if self.count == 0 {
            return None;
        }
        self.revenue.checked_div(Decimal::from(self.count))
    }

    /// Seconds per call; `None` for an empty group
    pub fn average_duration(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some(self.duration_seconds as f64 / self.count as f64)
    }
}

/// Foreign key a batch can be grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Tariff,
    Trunk,
}

impl Dimension {
    #[inline]
    pub fn key(&self, call: &CallRecord) -> i32 {
        match self {
            Self::Tariff => call.tarif_id,
            Self::Trunk => call.trunk_id,
        }
    }

    #[inline]
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Tariff => EntityKind::Tariff,
            Self::Trunk => EntityKind::Trunk,
        }
    }
}

/// Knobs for one aggregation pass
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateOptions {
    pub duration_buckets: BucketSet,
    pub cost_buckets: BucketSet,
    /// Chart cap; tables always keep every group
    pub top_n: usize,
    /// Zone the hour-of-day and the calendar date are taken in
    pub timezone: Tz,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            duration_buckets: BucketSet::duration_default(),
            cost_buckets: BucketSet::cost_default(),
            top_n: DEFAULT_TOP_N,
            timezone: Tz::UTC,
        }
    }
}

impl AggregateOptions {
    /// Default buckets with the configured cap and timezone
    pub fn from_config(config: &AnalyticsConfig) -> AppResult<Self> {
        Ok(Self {
            top_n: config.top_n,
            timezone: config.tz()?,
            ..Self::default()
        })
    }
}

/// Everything derived from one batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateView {
    pub total_calls: u64,
    pub total_revenue: Decimal,
    pub total_duration_seconds: i64,
    pub by_tariff: BTreeMap<i32, GroupAggregate>,
    pub by_trunk: BTreeMap<i32, GroupAggregate>,
    pub duration_histogram: Vec<BucketAggregate>,
    pub cost_histogram: Vec<BucketAggregate>,
    /// Hour-of-day points, ascending by label; calendar days are merged
    pub hourly: Vec<TimeSeriesPoint>,
    pub daily: Vec<DailyPoint>,
}

impl AggregateView {
    /// View of an empty batch
    pub fn empty(options: &AggregateOptions) -> Self {
        aggregate(&[], options)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.total_calls == 0
    }

    pub fn groups(&self, dimension: Dimension) -> &BTreeMap<i32, GroupAggregate> {
        match dimension {
            Dimension::Tariff => &self.by_tariff,
            Dimension::Trunk => &self.by_trunk,
        }
    }

    /// Every group, best first.
    ///
    /// Tariffs rank by revenue, trunks by call count; ties go to the lower id.
    pub fn ranked(&self, dimension: Dimension) -> Vec<(i32, &GroupAggregate)> {
        let mut entries: Vec<(i32, &GroupAggregate)> = self
            .groups(dimension)
            .iter()
            .map(|(id, group)| (*id, group))
            .collect();

        entries.sort_by(|(a_id, a), (b_id, b)| {
            let primary = match dimension {
                Dimension::Tariff => b.revenue.cmp(&a.revenue),
                Dimension::Trunk => b.count.cmp(&a.count),
            };
            match primary {
                Ordering::Equal => a_id.cmp(b_id),
                other => other,
            }
        });

        entries
    }

    /// At most `n` best groups
    pub fn top(&self, dimension: Dimension, n: usize) -> Vec<(i32, &GroupAggregate)> {
        let mut ranked = self.ranked(dimension);
        ranked.truncate(n);
        ranked
    }

    #[inline]
    pub fn revenue_share(&self, group: &GroupAggregate) -> f64 {
        revenue_share(group.revenue, self.total_revenue)
    }

    #[inline]
    pub fn load_share(&self, group: &GroupAggregate) -> f64 {
        count_share(group.count, self.total_calls)
    }

    /// Share on the metric the dimension ranks by; `0.0` for unseen ids
    pub fn share(&self, dimension: Dimension, id: i32) -> f64 {
        match (dimension, self.groups(dimension).get(&id)) {
            (Dimension::Tariff, Some(group)) => self.revenue_share(group),
            (Dimension::Trunk, Some(group)) => self.load_share(group),
            (_, None) => 0.0,
        }
    }
}

/// Aggregate a batch in a single pass
#[instrument(skip_all, fields(records = records.len()))]
pub fn aggregate(records: &[CallRecord], options: &AggregateOptions) -> AggregateView {
    let tz = &options.timezone;

    let mut total_revenue = Decimal::ZERO;
    let mut total_duration_seconds = 0i64;
    let mut by_tariff: BTreeMap<i32, GroupAggregate> = BTreeMap::new();
    let mut by_trunk: BTreeMap<i32, GroupAggregate> = BTreeMap::new();
    let mut duration_histogram = options.duration_buckets.empty_aggregates();
    let mut cost_histogram = options.cost_buckets.empty_aggregates();
    let mut hours: [TimeSeriesPoint; 24] =
        std::array::from_fn(|hour| TimeSeriesPoint::empty(hour as u32));
    let mut days: BTreeMap<NaiveDate, DailyPoint> = BTreeMap::new();

    for call in records {
        total_revenue = total_revenue.saturating_add(call.cost);
        total_duration_seconds = total_duration_seconds.saturating_add(call.duration_seconds);

        by_tariff.entry(call.tarif_id).or_default().record(call);
        by_trunk.entry(call.trunk_id).or_default().record(call);

        let slot = &mut duration_histogram[options
            .duration_buckets
            .position(Decimal::from(call.duration_seconds))];
        slot.count += 1;
        slot.revenue = slot.revenue.saturating_add(call.cost);

        let slot = &mut cost_histogram[options.cost_buckets.position(call.cost)];
        slot.count += 1;
        slot.revenue = slot.revenue.saturating_add(call.cost);

        let hour = &mut hours[call.local_hour(tz) as usize];
        hour.count += 1;
        hour.revenue = hour.revenue.saturating_add(call.cost);
        hour.duration_seconds = hour.duration_seconds.saturating_add(call.duration_seconds);

        let date = call.local_date(tz);
        let day = days.entry(date).or_insert_with(|| DailyPoint {
            date,
            count: 0,
            revenue: Decimal::ZERO,
            duration_seconds: 0,
        });
        day.count += 1;
        day.revenue = day.revenue.saturating_add(call.cost);
        day.duration_seconds = day.duration_seconds.saturating_add(call.duration_seconds);
    }

    debug!(
        tariffs = by_tariff.len(),
        trunks = by_trunk.len(),
        days = days.len(),
        "Aggregation pass complete"
    );

    AggregateView {
        total_calls: records.len() as u64,
        total_revenue,
        total_duration_seconds,
        by_tariff,
        by_trunk,
        duration_histogram,
        cost_histogram,
        hourly: hourly_points(&hours),
        daily: daily_points(days),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callstats_core::models::parse_call_time;
    use rust_decimal_macros::dec;

    fn call(id: i64, tarif_id: i32, trunk_id: i32, cost: Decimal, secs: i64, at: &str) -> CallRecord {
        CallRecord {
            id,
            call_id: format!("c-{}", id),
            trunk_id,
            tarif_id,
            duration_seconds: secs,
            cost,
            call_time: parse_call_time(at).unwrap(),
        }
    }

    #[test]
    fn test_group_by_tariff_and_trunk() {
        let batch = vec![
            call(1, 1, 10, dec!(10.00), 30, "2024-03-05 09:10:00"),
            call(2, 1, 11, dec!(20.00), 90, "2024-03-05 09:20:00"),
            call(3, 2, 10, dec!(5.00), 400, "2024-03-05 14:00:00"),
        ];

        let view = aggregate(&batch, &AggregateOptions::default());

        assert_eq!(view.total_calls, 3);
        assert_eq!(view.total_revenue, dec!(35.00));
        assert_eq!(view.by_tariff[&1].count, 2);
        assert_eq!(view.by_tariff[&1].revenue, dec!(30.00));
        assert_eq!(view.by_trunk[&10].count, 2);
        assert_eq!(view.by_trunk[&10].duration_seconds, 430);
        assert!(!view.by_tariff.contains_key(&3));
    }

    #[test]
    fn test_extreme_values_saturate() {
        let batch = vec![
            call(1, 1, 1, Decimal::MAX, i64::MAX, "2024-03-05 09:00:00"),
            call(2, 1, 1, Decimal::MAX, 10, "2024-03-05 09:30:00"),
        ];

        let view = aggregate(&batch, &AggregateOptions::default());

        assert_eq!(view.total_calls, 2);
        assert_eq!(view.total_revenue, Decimal::MAX);
        assert_eq!(view.total_duration_seconds, i64::MAX);
        assert_eq!(view.by_tariff[&1].revenue, Decimal::MAX);
        assert_eq!(view.by_trunk[&1].duration_seconds, i64::MAX);
        assert_eq!(view.hourly[0].duration_seconds, i64::MAX);
        assert_eq!(view.daily[0].revenue, Decimal::MAX);

        let mut merged = view.by_trunk[&1].clone();
        merged.merge(&view.by_tariff[&1]);
        assert_eq!(merged.count, 4);
        assert_eq!(merged.revenue, Decimal::MAX);
    }

    #[test]
    fn test_ranking_ties_break_by_id() {
        let batch = vec![
            call(1, 5, 3, dec!(2.00), 10, "2024-03-05 09:00:00"),
            call(2, 4, 2, dec!(2.00), 10, "2024-03-05 09:00:00"),
            call(3, 9, 1, dec!(7.00), 10, "2024-03-05 09:00:00"),
        ];

        let view = aggregate(&batch, &AggregateOptions::default());

        let tariffs: Vec<i32> = view.ranked(Dimension::Tariff).iter().map(|(id, _)| *id).collect();
        assert_eq!(tariffs, vec![9, 4, 5]);

        let trunks: Vec<i32> = view.ranked(Dimension::Trunk).iter().map(|(id, _)| *id).collect();
        assert_eq!(trunks, vec![1, 2, 3]);
    }

    #[test]
    fn test_top_caps_but_groups_keep_everything() {
        let batch: Vec<CallRecord> = (0..12)
            .map(|i| call(i, i as i32, 1, Decimal::from(i), 10, "2024-03-05 09:00:00"))
            .collect();

        let view = aggregate(&batch, &AggregateOptions::default());

        assert_eq!(view.top(Dimension::Tariff, DEFAULT_TOP_N).len(), 8);
        assert_eq!(view.top(Dimension::Tariff, DEFAULT_TOP_N)[0].0, 11);
        assert_eq!(view.by_tariff.len(), 12);
    }

    #[test]
    fn test_hourly_collapses_days() {
        let batch = vec![
            call(1, 1, 1, dec!(1.00), 60, "2024-03-05 09:15:00"),
            call(2, 1, 1, dec!(2.00), 60, "2024-03-06 09:45:00"),
            call(3, 1, 1, dec!(3.00), 60, "2024-03-06 23:59:59"),
        ];

        let view = aggregate(&batch, &AggregateOptions::default());

        assert_eq!(view.hourly.len(), 2);
        assert_eq!(view.hourly[0].label, "09:00");
        assert_eq!(view.hourly[0].count, 2);
        assert_eq!(view.hourly[0].revenue, dec!(3.00));
        assert_eq!(view.hourly[1].label, "23:00");

        assert_eq!(view.daily.len(), 2);
        assert_eq!(view.daily[0].date.to_string(), "2024-03-05");
        assert_eq!(view.daily[1].count, 2);
    }

    #[test]
    fn test_hourly_respects_timezone() {
        let batch = vec![call(1, 1, 1, dec!(1.00), 60, "2024-03-05 22:30:00")];
        let options = AggregateOptions {
            timezone: Tz::Asia__Tokyo,
            ..Default::default()
        };

        let view = aggregate(&batch, &options);

        assert_eq!(view.hourly[0].label, "07:00");
        assert_eq!(view.daily[0].date.to_string(), "2024-03-06");
    }

    #[test]
    fn test_averages() {
        let mut group = GroupAggregate::default();
        assert_eq!(group.average_cost(), None);
        assert_eq!(group.average_duration(), None);

        group.record(&call(1, 1, 1, dec!(3.00), 30, "2024-03-05 09:00:00"));
        group.record(&call(2, 1, 1, dec!(1.00), 90, "2024-03-05 09:00:00"));

        assert_eq!(group.average_cost(), Some(dec!(2.00)));
        assert_eq!(group.average_duration(), Some(60.0));
    }

    #[test]
    fn test_share_of_unseen_id_is_zero() {
        let view = AggregateView::empty(&AggregateOptions::default());

        assert!(view.is_empty());
        assert_eq!(view.share(Dimension::Tariff, 1), 0.0);
        assert_eq!(view.share(Dimension::Trunk, 1), 0.0);
        assert_eq!(view.duration_histogram.len(), 6);
        assert!(view.hourly.is_empty());
    }
}
