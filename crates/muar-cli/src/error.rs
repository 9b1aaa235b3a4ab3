//! Error handling for the muar CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Storage layer error
    #[error("Storage error: {0}")]
    Storage(#[from] muar_storage::StorageError),

    /// Runtime layer error
    #[error("Runtime error: {0}")]
    Runtime(#[from] muar_runtime::RuntimeError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Event file could not be read
    #[error("Cannot read events from {}: {source}", path.display())]
    Input {
        /// Event file
        path: std::path::PathBuf,
        /// Underlying storage error
        source: muar_storage::StorageError,
    },

    /// Generic error
    #[error("Error: {0}")]
    Generic(#[from] anyhow::Error),

    /// User interrupted operation
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Invalid command arguments
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// Missing required file or resource
    #[error("Missing resource: {0}")]
    MissingResource(String),

    /// Table file failed verification
    #[error("Verification failed: {0}")]
    Verification(String),
}

impl CliError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid arguments error
    pub fn invalid_args(msg: impl Into<String>) -> Self {
        Self::InvalidArgs(msg.into())
    }

    /// Create a missing resource error
    pub fn missing_resource(msg: impl Into<String>) -> Self {
        Self::MissingResource(msg.into())
    }

    /// Create a verification error
    pub fn verification(msg: impl Into<String>) -> Self {
        Self::Verification(msg.into())
    }
}
