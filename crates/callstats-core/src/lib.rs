//! CallStats Core Library
//!
//! This crate provides the foundational types, traits, and error handling
//! for the call statistics dashboard. It includes:
//!
//! - Domain models (CallRecord, Tariff, Trunk, Server, Hub, SystemStats)
//! - The acquisition boundary trait implemented by the HTTP client
//! - Unified error handling with HTTP response mapping
//! - Application configuration

pub mod config;
pub mod error;
pub mod models;
pub mod traits;

pub use config::AppConfig;
pub use error::AppError;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
