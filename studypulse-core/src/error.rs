//! Error types for studypulse-core

use thiserror::Error;

/// Main error type for the studypulse-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// The feed driver was started while already running
    #[error("telemetry feed is already running")]
    AlreadyRunning,
}

/// Result type alias for studypulse-core
pub type Result<T> = std::result::Result<T, Error>;
