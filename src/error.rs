// src/error.rs

use thiserror::Error;

/// Core error types for pcurate
#[derive(Error, Debug)]
pub enum Error {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The package is not explicitly installed
    #[error("Package not explicitly installed: {0}")]
    PackageNotFound(String),

    /// The persisted store exists but cannot be read
    #[error("Curated store at {path} is corrupt: {reason}")]
    StoreCorrupt { path: String, reason: String },

    /// The package manager could not be queried
    #[error("Package manager unavailable: {0}")]
    FactSourceUnavailable(String),

    /// The filter rule file exists but cannot be read
    #[error("Failed to read filter file {path}: {reason}")]
    FilterRead { path: String, reason: String },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to render delimited output
    #[error("Output error: {0}")]
    Output(#[from] csv::Error),
}

/// Result type alias using pcurate's Error type
pub type Result<T> = std::result::Result<T, Error>;
