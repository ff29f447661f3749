//! Error types for cardwall.
//!
//! Card decoration itself never fails: bad blocker dates, unknown filter
//! prefixes and dangling members all degrade inside the core. Errors here
//! cover startup configuration and the data sources feeding the dashboard.

use std::path::PathBuf;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Sticker catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Sticker catalog loading errors.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read sticker file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse sticker definitions: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Sticker {name} has an invalid regex: {source}")]
    InvalidRegex {
        name: String,
        #[source]
        source: regex::Error,
    },
}

/// Errors raised while pulling tracker data.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to read tracker export {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed tracker export: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Could not find any members")]
    NoMembers,
}

/// Result type alias for cardwall.
pub type Result<T> = std::result::Result<T, Error>;
