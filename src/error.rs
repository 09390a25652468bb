//! Error types for the layerconf library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for layerconf operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for layerconf operations
#[derive(Error, Debug)]
pub enum Error {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory '{path}': {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Failed to serialize data: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation rejected the write: {}", errors.join("; "))]
    Validation { errors: Vec<String> },

    // -------------------------------------------------------------------------
    // Migration Errors
    // -------------------------------------------------------------------------
    #[error("No migration registered from version '{from}' toward '{to}'")]
    MigrationMissingStep { from: String, to: String },

    // -------------------------------------------------------------------------
    // Backup Errors
    // -------------------------------------------------------------------------
    #[error("Backup failed: {0}")]
    BackupFailed(String),
}

impl Error {
    /// Check if this is a validation rejection (expected, recoverable)
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    /// Check if this is a backup-related error
    #[must_use]
    pub fn is_backup_error(&self) -> bool {
        matches!(self, Error::BackupFailed(_))
    }
}
