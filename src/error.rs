use std::io;
use thiserror::Error;

/// Custom error type for the sysdeck library
#[derive(Error, Debug)]
pub enum SysdeckError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sampler lifecycle error: {0}")]
    Lifecycle(String),

    #[error("Metric collection failed: {0}")]
    MetricCollection(String),

    #[error("Not supported on this platform: {0}")]
    Unsupported(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for the sysdeck library
pub type Result<T> = std::result::Result<T, SysdeckError>;

impl SysdeckError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        SysdeckError::Config(msg.into())
    }

    /// Create a lifecycle error (start twice, start after stop)
    pub fn lifecycle<S: Into<String>>(msg: S) -> Self {
        SysdeckError::Lifecycle(msg.into())
    }

    pub fn metric_collection<S: Into<String>>(msg: S) -> Self {
        SysdeckError::MetricCollection(msg.into())
    }

    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        SysdeckError::Unsupported(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        SysdeckError::Other(msg.into())
    }
}
