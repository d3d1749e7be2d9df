//! Histogram buckets
//!
//! A [`BucketSet`] is an ordered list of half-open ranges `[min, max)` that
//! starts at zero, has no gaps or overlaps, and ends with one unbounded bucket.
//! Every value therefore lands in exactly one bucket.

use callstats_core::{AppError, AppResult};
use rust_decimal::Decimal;
use serde::Serialize;

/// One half-open range; `max == None` means unbounded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketSpec {
    pub label: String,
    pub min: Decimal,
    pub max: Option<Decimal>,
}

impl BucketSpec {
    pub fn new(label: impl Into<String>, min: Decimal, max: Option<Decimal>) -> Self {
        Self {
            label: label.into(),
            min,
            max,
        }
    }

    fn bounded(label: &str, min: i64, max: i64) -> Self {
        Self::new(label, Decimal::from(min), Some(Decimal::from(max)))
    }

    fn open(label: &str, min: i64) -> Self {
        Self::new(label, Decimal::from(min), None)
    }

    /// `min <= value < max`
    pub fn contains(&self, value: Decimal) -> bool {
        value >= self.min && self.max.map_or(true, |max| value < max)
    }
}

/// Per-bucket totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketAggregate {
    pub label: String,
    pub min: Decimal,
    pub max: Option<Decimal>,
    pub count: u64,
    pub revenue: Decimal,
}

/// Validated, ordered bucket layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketSet {
    specs: Vec<BucketSpec>,
}

impl BucketSet {
    /// Validate and build a bucket layout
    pub fn new(specs: Vec<BucketSpec>) -> AppResult<Self> {
        let first = specs
            .first()
            .ok_or_else(|| AppError::InvalidBuckets("at least one bucket is required".into()))?;

        if first.min != Decimal::ZERO {
            return Err(AppError::InvalidBuckets(format!(
                "first bucket '{}' must start at 0, starts at {}",
                first.label, first.min
            )));
        }

        for pair in specs.windows(2) {
            let (current, next) = (&pair[0], &pair[1]);
            match current.max {
                None => {
                    return Err(AppError::InvalidBuckets(format!(
                        "only the last bucket may be unbounded, '{}' is not last",
                        current.label
                    )));
                }
                Some(max) if max <= current.min => {
                    return Err(AppError::InvalidBuckets(format!(
                        "bucket '{}' is empty or inverted",
                        current.label
                    )));
                }
                Some(max) if max != next.min => {
                    return Err(AppError::InvalidBuckets(format!(
                        "buckets '{}' and '{}' are not contiguous ({} != {})",
                        current.label, next.label, max, next.min
                    )));
                }
                Some(_) => {}
            }
        }

        if let Some(last) = specs.last() {
            if last.max.is_some() {
                return Err(AppError::InvalidBuckets(format!(
                    "last bucket '{}' must be unbounded",
                    last.label
                )));
            }
        }

        Ok(Self { specs })
    }

    /// Call duration layout in seconds
    pub fn duration_default() -> Self {
        Self {
            specs: vec![
                BucketSpec::bounded("0-30s", 0, 30),
                BucketSpec::bounded("30-60s", 30, 60),
                BucketSpec::bounded("1-2m", 60, 120),
                BucketSpec::bounded("2-5m", 120, 300),
                BucketSpec::bounded("5-10m", 300, 600),
                BucketSpec::open("10m+", 600),
            ],
        }
    }

    /// Call cost layout in currency units
    pub fn cost_default() -> Self {
        Self {
            specs: vec![
                BucketSpec::bounded("0-1", 0, 1),
                BucketSpec::bounded("1-5", 1, 5),
                BucketSpec::bounded("5-10", 5, 10),
                BucketSpec::bounded("10-20", 10, 20),
                BucketSpec::bounded("20-50", 20, 50),
                BucketSpec::open("50+", 50),
            ],
        }
    }

    #[inline]
    pub fn specs(&self) -> &[BucketSpec] {
        &self.specs
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Index of the bucket holding `value`.
    ///
    /// Values below zero land in the first bucket.
    pub fn position(&self, value: Decimal) -> usize {
        self.specs
            .partition_point(|spec| spec.min <= value)
            .saturating_sub(1)
    }

    /// Zeroed accumulator rows in bucket order
    pub fn empty_aggregates(&self) -> Vec<BucketAggregate> {
        self.specs
            .iter()
            .map(|spec| BucketAggregate {
                label: spec.label.clone(),
                min: spec.min,
                max: spec.max,
                count: 0,
                revenue: Decimal::ZERO,
            })
            .collect()
    }
}
