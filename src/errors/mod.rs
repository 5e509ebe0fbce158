//! Centralized error handling for the Hacker News aggregator
//!
//! This module provides the error types used across the application layers
//! and convenience aliases for results carrying them.
//!
//! # Error Categories
//!
//! - **Source Errors**: upstream Hacker News API connectivity and decoding
//! - **Web Errors**: HTTP request/response handling issues
//! - **Configuration Errors**: invalid or unreadable configuration

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Source Results
pub type SourceResult<T> = Result<T, SourceError>;
