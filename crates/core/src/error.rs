//! Error types for ghdrop-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ghdrop-core
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ghdrop-core
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or empty configuration values
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid configuration format
    #[error("Invalid configuration format: {0}")]
    InvalidConfig(String),

    /// Local file does not exist
    #[error("Local file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Non-2xx answer from the contents API
    #[error("GitHub API error (HTTP {status}): {message}")]
    GitHubApi { status: u16, message: String },

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Permission denied
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Not found error
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network error
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// Timeout
    #[error("Operation timed out")]
    Timeout,

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] toml::de::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True when the remote service answered 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else if err.is_connect() {
            Error::Network(err.to_string())
        } else if err.is_request() || err.is_builder() || err.is_decode() {
            Error::HttpClient(err.to_string())
        } else {
            Error::Network(err.to_string())
        }
    }
}
