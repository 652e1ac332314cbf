//! Extraction Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An extraction error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A configured CSS selector does not parse.
    #[display("invalid selector: {_0}")]
    InvalidSelector(#[error(not(source))] String),
    /// None of the configured content roots exist in the page.
    #[display("no content root found in {_0}")]
    ContentNotFound(#[error(not(source))] String),
}
