//! API layer for the call statistics dashboard
//!
//! HTTP handlers serving the aggregates, paginated views and source status
//! to the dashboard renderer.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod dto;
pub mod handlers;

// Re-export DTOs (common types)
pub use dto::{ApiResponse, PaginatedResponse, PaginationParams};

// Re-export handler configuration functions
pub use handlers::{
    configure, configure_config, configure_health, configure_sources, configure_stats, query_config,
};
