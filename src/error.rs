//! Error types and handling for Gridwatch
//!
//! This module defines the error types used throughout the application,
//! providing consistent error handling and reporting.

use thiserror::Error;

/// Result type alias for Gridwatch operations
pub type Result<T> = std::result::Result<T, GridwatchError>;

/// Main error type for Gridwatch
#[derive(Debug, Error)]
pub enum GridwatchError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Network/transport/status failures while retrieving a source
    #[error("Fetch error: {message}")]
    Fetch { message: String },

    /// Malformed or missing data in a source response
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Malformed inputs to request signing
    #[error("Signature error: {message}")]
    Signature { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Generic errors with context
    #[error("Error: {message}")]
    Generic { message: String },
}

impl GridwatchError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        GridwatchError::Config {
            message: message.into(),
        }
    }

    /// Create a new fetch error
    pub fn fetch<S: Into<String>>(message: S) -> Self {
        GridwatchError::Fetch {
            message: message.into(),
        }
    }

    /// Create a new parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        GridwatchError::Parse {
            message: message.into(),
        }
    }

    /// Create a new signature error
    pub fn signature<S: Into<String>>(message: S) -> Self {
        GridwatchError::Signature {
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        GridwatchError::Io {
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn generic<S: Into<String>>(message: S) -> Self {
        GridwatchError::Generic {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for GridwatchError {
    fn from(err: std::io::Error) -> Self {
        GridwatchError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for GridwatchError {
    fn from(err: serde_yaml::Error) -> Self {
        GridwatchError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for GridwatchError {
    fn from(err: serde_json::Error) -> Self {
        GridwatchError::Parse {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for GridwatchError {
    fn from(err: reqwest::Error) -> Self {
        GridwatchError::fetch(err.to_string())
    }
}
