//! Domain models for the call statistics dashboard
//!
//! This module contains all the core domain models used throughout the application.

pub mod call;
pub mod reference;
pub mod source;
pub mod system;

pub use call::{
    parse_call_time, CallBatch, CallRecord, CALL_TIME_FORMAT, MAX_COST, MAX_DURATION_SECONDS,
    UNASSIGNED_ID,
};
pub use reference::{EntityKind, Hub, ReferenceEntity, Server, Tariff, Trunk};
pub use source::SourceKind;
pub use system::{ActiveCount, CallTotals, DatabaseCounts, SystemStats};
