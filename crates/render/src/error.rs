//! Render Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A render error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for render operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("chrome/chromium not detected on your system")]
    ChromeNotFound,
    /// Chrome ran past the page timeout and was killed.
    #[display("Chrome did not finish before the page timeout")]
    ChromeTimeout,
    /// Chrome exited with a non-zero exit code (`-1` when killed by a signal).
    #[display("Chrome exited with code: {_0}")]
    ChromeFailed(#[error(not(source))] i32),
    /// Chrome exited cleanly but produced nothing usable.
    #[display("Chrome produced no output")]
    EmptyOutput,
    /// Asset was not loadable (either file or builtin).
    #[display("asset not found: {_0}")]
    AssetNotFound(#[error(not(source))] String),
    #[display("I/O error")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ChromeTimeout | Self::ChromeFailed(_) | Self::EmptyOutput)
    }
}
