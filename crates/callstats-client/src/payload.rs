//! Payload validation at the acquisition boundary
//!
//! Lists are decoded entry by entry so one malformed element never costs the
//! rest of the batch. Rejected entries are logged and counted.

use callstats_core::models::{
    parse_call_time, CallBatch, CallRecord, ReferenceEntity, MAX_COST, MAX_DURATION_SECONDS,
    UNASSIGNED_ID,
};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use validator::{Validate, ValidationError};

/// Call record as it arrives on the wire
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CallRecordPayload {
    pub id: i64,

    #[validate(length(min = 1, message = "call_id is required"))]
    pub call_id: String,

    /// Missing or null references are kept under [`UNASSIGNED_ID`]
    #[serde(default)]
    pub trunk_id: Option<i32>,

    #[serde(default)]
    pub tarif_id: Option<i32>,

    #[validate(custom(function = "bounded_duration"))]
    pub duration_seconds: i64,

    #[validate(custom(function = "bounded_cost"))]
    pub cost: Decimal,

    #[validate(custom(function = "parseable_call_time"))]
    pub call_time: String,
}

fn bounded_duration(duration: i64) -> Result<(), ValidationError> {
    if duration < 0 {
        return Err(ValidationError::new("negative_duration"));
    }
    if duration > MAX_DURATION_SECONDS {
        return Err(ValidationError::new("duration_too_long"));
    }
    Ok(())
}

fn bounded_cost(cost: &Decimal) -> Result<(), ValidationError> {
    if cost.is_sign_negative() && !cost.is_zero() {
        return Err(ValidationError::new("negative_cost"));
    }
    if *cost > MAX_COST {
        return Err(ValidationError::new("cost_too_large"));
    }
    Ok(())
}

fn parseable_call_time(raw: &str) -> Result<(), ValidationError> {
    if parse_call_time(raw).is_none() {
        return Err(ValidationError::new("call_time_format"));
    }
    Ok(())
}

impl CallRecordPayload {
    /// Whether either foreign reference is missing
    pub fn is_unassigned(&self) -> bool {
        self.trunk_id.is_none() || self.tarif_id.is_none()
    }

    /// Convert a validated payload; `None` if the timestamp does not parse
    pub fn into_record(self) -> Option<CallRecord> {
        let call_time = parse_call_time(&self.call_time)?;
        Some(CallRecord {
            id: self.id,
            call_id: self.call_id,
            trunk_id: self.trunk_id.unwrap_or(UNASSIGNED_ID),
            tarif_id: self.tarif_id.unwrap_or(UNASSIGNED_ID),
            duration_seconds: self.duration_seconds,
            cost: self.cost,
            call_time,
        })
    }
}

fn entry_id(value: &Value) -> String {
    value
        .get("id")
        .map(Value::to_string)
        .unwrap_or_else(|| "?".to_string())
}

/// Validate every entry of a call record list
pub fn call_batch(entries: Vec<Value>) -> CallBatch {
    let mut batch = CallBatch::default();

    for entry in entries {
        let id = entry_id(&entry);

        let payload: CallRecordPayload = match serde_json::from_value(entry) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(id = %id, reason = %e, "Rejecting malformed call record");
                batch.rejected += 1;
                continue;
            }
        };

        if let Err(e) = payload.validate() {
            warn!(id = %id, reason = %e, "Rejecting invalid call record");
            batch.rejected += 1;
            continue;
        }

        if payload.is_unassigned() {
            debug!(id = %id, "Call record without trunk or tariff, keeping as unassigned");
            batch.unassigned += 1;
        }

        match payload.into_record() {
            Some(record) => batch.records.push(record),
            None => {
                warn!(id = %id, "Rejecting call record with unparseable call_time");
                batch.rejected += 1;
            }
        }
    }

    batch
}

/// Decode a reference list, skipping entries without a usable id or name
pub fn reference_list<T>(entries: Vec<Value>) -> Vec<T>
where
    T: DeserializeOwned + ReferenceEntity,
{
    entries
        .into_iter()
        .filter_map(|entry| {
            let id = entry_id(&entry);
            serde_json::from_value::<T>(entry)
                .map_err(|e| {
                    warn!(kind = %T::KIND, id = %id, reason = %e, "Rejecting malformed reference entry");
                })
                .ok()
        })
        .collect()
}
