//! Time series points
//!
//! Hourly buckets collapse every day onto the same 24 hour-of-day slots;
//! daily buckets keep the calendar date.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Totals for one hour-of-day slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSeriesPoint {
    /// `"HH:00"`
    pub label: String,
    pub count: u64,
    pub revenue: Decimal,
    pub duration_seconds: i64,
}

impl TimeSeriesPoint {
    pub fn empty(hour: u32) -> Self {
        Self {
            label: format!("{:02}:00", hour),
            count: 0,
            revenue: Decimal::ZERO,
            duration_seconds: 0,
        }
    }
}

/// Totals for one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub count: u64,
    pub revenue: Decimal,
    pub duration_seconds: i64,
}

/// Sparse hourly points, ordered by label
pub(crate) fn hourly_points(slots: &[TimeSeriesPoint; 24]) -> Vec<TimeSeriesPoint> {
    slots.iter().filter(|p| p.count > 0).cloned().collect()
}

/// Daily points in ascending date order
pub(crate) fn daily_points(days: BTreeMap<NaiveDate, DailyPoint>) -> Vec<DailyPoint> {
    days.into_values().collect()
}

/// All 24 hour-of-day slots, zero-filled where a sparse series has no entry
pub fn fill_hours(sparse: &[TimeSeriesPoint]) -> Vec<TimeSeriesPoint> {
    (0..24)
        .map(|hour| {
            let empty = TimeSeriesPoint::empty(hour);
            sparse
                .iter()
                .find(|p| p.label == empty.label)
                .cloned()
                .unwrap_or(empty)
        })
        .collect()
}
