//! Data Transfer Objects (DTOs) for API requests and responses

pub mod common;
pub mod stats;

pub use common::*;
pub use stats::*;
