//! Configuration Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// One of the configuration sources could not be read or deserialized.
    #[display("failed to load configuration")]
    Load,
    /// The merged configuration is well-formed but unusable.
    #[display("invalid configuration: {_0}")]
    Invalid(#[error(not(source))] String),
    /// The configuration file extension isn't one of YAML, TOML or JSON.
    #[display("unsupported configuration format: {_0}")]
    UnsupportedFormat(#[error(not(source))] String),
}
