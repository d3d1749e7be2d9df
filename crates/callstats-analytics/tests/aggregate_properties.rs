//! Invariants that hold for any batch

use callstats_analytics::{aggregate, page, total_pages, AggregateOptions, Dimension, ReferenceLookups, StatsReport};
use callstats_core::models::CallRecord;
use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn arb_record() -> impl Strategy<Value = CallRecord> {
    (
        any::<i64>(),
        0i32..12,
        0i32..6,
        0i64..5_000,
        0i64..10_000,
        0i64..(7 * 86_400),
    )
        .prop_map(|(id, tarif_id, trunk_id, secs, cents, offset)| CallRecord {
            id,
            call_id: format!("call-{}", id),
            trunk_id,
            tarif_id,
            duration_seconds: secs,
            cost: Decimal::new(cents, 2),
            call_time: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(offset),
        })
}

fn arb_batch() -> impl Strategy<Value = Vec<CallRecord>> {
    prop::collection::vec(arb_record(), 0..200)
}

proptest! {
    #[test]
    fn group_counts_and_revenue_sum_to_batch(batch in arb_batch()) {
        let view = aggregate(&batch, &AggregateOptions::default());
        let total_cost: Decimal = batch.iter().map(|r| r.cost).sum();

        for dimension in [Dimension::Tariff, Dimension::Trunk] {
            let groups = view.groups(dimension);
            prop_assert_eq!(groups.values().map(|g| g.count).sum::<u64>(), batch.len() as u64);
            prop_assert_eq!(groups.values().map(|g| g.revenue).sum::<Decimal>(), total_cost);
        }
        prop_assert_eq!(view.total_revenue, total_cost);
    }

    #[test]
    fn every_record_lands_in_one_bucket(batch in arb_batch()) {
        let view = aggregate(&batch, &AggregateOptions::default());

        prop_assert_eq!(view.duration_histogram.iter().map(|b| b.count).sum::<u64>(), batch.len() as u64);
        prop_assert_eq!(view.cost_histogram.iter().map(|b| b.count).sum::<u64>(), batch.len() as u64);
        prop_assert_eq!(view.hourly.iter().map(|p| p.count).sum::<u64>(), batch.len() as u64);
        prop_assert_eq!(view.daily.iter().map(|p| p.count).sum::<u64>(), batch.len() as u64);
    }

    #[test]
    fn shares_are_bounded_and_sum_to_one(batch in arb_batch()) {
        let view = aggregate(&batch, &AggregateOptions::default());

        for dimension in [Dimension::Tariff, Dimension::Trunk] {
            let shares: Vec<f64> = view
                .groups(dimension)
                .keys()
                .map(|id| view.share(dimension, *id))
                .collect();

            prop_assert!(shares.iter().all(|s| s.is_finite() && (0.0..=1.0).contains(s)));

            let sum: f64 = shares.iter().sum();
            let revenue_is_zero = view.total_revenue.is_zero();
            if batch.is_empty() || (dimension == Dimension::Tariff && revenue_is_zero) {
                prop_assert_eq!(sum, 0.0);
            } else {
                prop_assert!((sum - 1.0).abs() < 1e-6, "sum = {}", sum);
            }
        }
    }

    #[test]
    fn hub_rollup_preserves_totals(batch in arb_batch()) {
        let view = aggregate(&batch, &AggregateOptions::default());
        let report = StatsReport::build(&view, &ReferenceLookups::default(), 8);

        prop_assert_eq!(report.hubs.iter().map(|h| h.count).sum::<u64>(), batch.len() as u64);
        prop_assert!(report.tariff_chart.len() <= 8);
        prop_assert_eq!(report.tariffs.len(), view.by_tariff.len());
    }

    #[test]
    fn page_never_panics(len in 0usize..100, index in 0usize..50, size in 0usize..20) {
        let items: Vec<usize> = (0..len).collect();
        let window = page(&items, index, size);

        prop_assert!(window.len() <= size);
        if size > 0 && len > 0 {
            prop_assert!(!window.is_empty());
            prop_assert!(index < total_pages(len, size) || window.last() == items.last());
        }
    }
}
