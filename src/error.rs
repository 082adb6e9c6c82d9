//! Error types for study-harvest.
//!
//! Defines the main error enum used throughout the crate.

use thiserror::Error;

/// Main error type for harvest operations.
#[derive(Error, Debug)]
pub enum HarvestError {
    /// Database connection errors (host unreachable, auth failed, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution errors (syntax errors, bad bindings, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// Survey export errors (unknown format, client construction, etc.)
    #[error("Export error: {0}")]
    Export(String),

    /// Configuration errors (invalid config file, missing required sections, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The export never completed within the allowed polling attempts.
    #[error("Export polling gave up after {0} attempts")]
    RetriesExceeded(u32),
}

impl HarvestError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates an export error with the given message.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Query(_) => "Query Error",
            Self::Export(_) => "Export Error",
            Self::Config(_) => "Configuration Error",
            Self::RetriesExceeded(_) => "Export Error",
        }
    }
}

/// Result type alias using HarvestError.
pub type Result<T> = std::result::Result<T, HarvestError>;
