//! Error type definitions for the Hacker News aggregator
//!
//! This module defines all error types used throughout the application,
//! providing a hierarchical error system that makes debugging and error
//! handling more straightforward.

use thiserror::Error;

/// Top-level application error type
///
/// This enum represents all possible errors that can occur in the application.
/// It uses `thiserror` to provide automatic error trait implementations and
/// proper error chaining.
#[derive(Error, Debug)]
pub enum AppError {
    /// Upstream item store errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Web layer errors
    #[error("Web error: {0}")]
    Web(#[from] WebError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Upstream item store specific errors
#[derive(Error, Debug)]
pub enum SourceError {
    /// Network connection timeouts
    #[error("Connection timeout: {url}")]
    Timeout { url: String },

    /// HTTP errors from the upstream API
    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },

    /// Transport-level fetch failures
    #[error("Fetch failed: {url} - {message}")]
    FetchFailed { url: String, message: String },

    /// Decoding errors for upstream payloads
    #[error("Decode error: {endpoint} - {message}")]
    DecodeError { endpoint: String, message: String },
}

/// Web layer specific errors
#[derive(Error, Debug)]
pub enum WebError {
    /// Invalid request format
    #[error("Invalid request: {field} - {message}")]
    InvalidRequest { field: String, message: String },

    /// JSON parsing errors
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a configuration error with a custom message
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl SourceError {
    /// Create a timeout error
    pub fn timeout<U: Into<String>>(url: U) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Create a fetch failed error
    pub fn fetch_failed<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::FetchFailed {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode_error<E: Into<String>, M: Into<String>>(endpoint: E, message: M) -> Self {
        Self::DecodeError {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }
}

impl WebError {
    /// Create an invalid request error
    pub fn invalid_request<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::InvalidRequest {
            field: field.into(),
            message: message.into(),
        }
    }
}
