//! Upstream boundary client
//!
//! [`HttpBoundaryClient`] implements [`callstats_core::traits::StatsBoundary`]
//! over HTTP/JSON. Payloads are validated in [`payload`] before they become
//! domain models.

pub mod client;
pub mod payload;

pub use client::{HttpBoundaryClient, RetryPolicy, MAX_RETRIES};
pub use payload::{call_batch, reference_list, CallRecordPayload};
