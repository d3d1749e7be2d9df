//! Call record model
//!
//! One logged call as produced by the ingestion/simulation process.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Timestamp layout written by the ingestion process (UTC)
pub const CALL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Foreign id used when a record arrives without a trunk or tariff reference
pub const UNASSIGNED_ID: i32 = 0;

/// Longest call accepted from the backend (one week)
pub const MAX_DURATION_SECONDS: i64 = 7 * 24 * 3600;

/// Highest cost accepted for a single call
pub const MAX_COST: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Call record (CDR)
///
/// Immutable once acquired. A batch of these is replaced wholesale on every
/// refresh cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRecord {
    /// Unique identifier
    pub id: i64,

    /// Routing correlation id
    pub call_id: String,

    /// Trunk that carried the call (may not resolve to a known trunk)
    pub trunk_id: i32,

    /// Tariff applied to the call (may not resolve to a known tariff)
    pub tarif_id: i32,

    /// Call duration in seconds, never negative
    pub duration_seconds: i64,

    /// Billed cost, never negative
    pub cost: Decimal,

    /// When the call took place, second precision
    pub call_time: DateTime<Utc>,
}

impl CallRecord {
    /// Hour of day (0-23) of the call in the given timezone
    #[inline]
    pub fn local_hour(&self, tz: &Tz) -> u32 {
        self.call_time.with_timezone(tz).hour()
    }

    /// Calendar date of the call in the given timezone
    #[inline]
    pub fn local_date(&self, tz: &Tz) -> NaiveDate {
        self.call_time.with_timezone(tz).date_naive()
    }

    /// Duration for display (`M:SS`, minutes unpadded)
    pub fn formatted_duration(&self) -> String {
        let mins = self.duration_seconds / 60;
        let secs = self.duration_seconds % 60;
        format!("{}:{:02}", mins, secs)
    }
}

impl Default for CallRecord {
    fn default() -> Self {
        Self {
            id: 0,
            call_id: String::new(),
            trunk_id: UNASSIGNED_ID,
            tarif_id: UNASSIGNED_ID,
            duration_seconds: 0,
            cost: Decimal::ZERO,
            call_time: DateTime::<Utc>::default(),
        }
    }
}

/// One acquired batch of call records
///
/// Carries the bookkeeping of the acquisition boundary: how many entries were
/// rejected as malformed and how many were kept without a foreign reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallBatch {
    pub records: Vec<CallRecord>,
    pub rejected: usize,
    pub unassigned: usize,
}

impl CallBatch {
    pub fn new(records: Vec<CallRecord>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parse a call timestamp.
///
/// Accepts the ingestion layout `YYYY-MM-DD HH:MM:SS` (interpreted as UTC) and
/// RFC 3339.
pub fn parse_call_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, CALL_TIME_FORMAT) {
        return Some(Utc.from_utc_datetime(&naive));
    }

    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
