//! Common error types for edge-control.
//!
//! This module provides a centralized Error enum using thiserror, with
//! conversions from the underlying error types used by start-up and the
//! server task. Per-request failures of the temperature daemon have their
//! own type, [`crate::temperature::DaemonError`].

use thiserror::Error;

/// Main error type for edge-control operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors from tokio or std
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client construction errors
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Convenience type alias for Results using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
