//! Discovery Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A discovery error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for discovery and fetch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The configured URL (or one found in a page) can't be parsed.
    #[display("invalid URL: {_0}")]
    InvalidUrl(#[error(not(source))] String),
    /// The HTTP client could not be constructed.
    #[display("failed to build HTTP client")]
    Client,
    /// The request never produced a response (DNS, connect, timeout).
    #[display("request failed: {_0}")]
    Request(#[error(not(source))] String),
    /// The server answered with a non-success status.
    #[display("{url} responded with HTTP {status}")]
    Status {
        url: String,
        status: u16,
    },
    /// The response body could not be read or decoded.
    #[display("failed to read response body")]
    Body,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(_) | Self::Body => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidUrl(_) | Self::Client => false,
        }
    }
}
