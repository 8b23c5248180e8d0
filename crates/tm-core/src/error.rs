//! Error types for tm-core

use thiserror::Error;

/// Core error type for Tidemark
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C002: Invalid configuration value
    #[error("[C002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C003: Migration identifier rejected
    #[error("[C003] Invalid migration id '{id}': {reason}")]
    InvalidMigrationId { id: String, reason: String },

    /// C004: A down script exists without its up script
    #[error("[C004] Migration '{id}' has no up script (expected {expected_path})")]
    MigrationFileMissing { id: String, expected_path: String },

    /// C005: Migration name cannot be turned into a file slug
    #[error("[C005] Invalid migration name '{name}': {reason}")]
    InvalidMigrationName { name: String, reason: String },

    /// C006: Migrations directory could not be scanned
    #[error("[C006] Invalid migrations directory pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// C007: IO error
    #[error("[C007] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// C008: IO error with file path context
    #[error("[C008] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// C009: YAML parse error
    #[error("[C009] Config parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
