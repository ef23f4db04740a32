//! Error types for playlist download and configuration storage
//!
//! Parsing itself has no error path: malformed playlist lines are skipped
//! or leave optional fields unset. Only the surrounding I/O can fail.

use thiserror::Error;

/// Playlist download errors
#[derive(Error, Debug)]
pub enum FetchError {
    /// Connection, TLS or timeout failures
    #[error("Request failed: {0}")]
    Request(#[source] ureq::Error),

    /// Server answered with a non-success status
    #[error("HTTP error: {0}")]
    Status(u16),

    /// Body could not be read as UTF-8 text
    #[error("Read failed: {0}")]
    Read(#[source] ureq::Error),
}

/// Configuration file errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
