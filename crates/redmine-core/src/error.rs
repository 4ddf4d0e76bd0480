//! Error types for redmine-tools.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for redmine operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller input failed validation before any I/O happened
    #[error("Invalid arguments: {0}")]
    Validation(String),

    /// HTTP request could not be sent or the response could not be read
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication failed
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// API returned an error
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Binary transfer (download/upload) returned a non-success status
    #[error(
        "{operation} failed: {status} {status_text}{}",
        .body.as_deref().map(|b| format!(" - {}", b)).unwrap_or_default()
    )]
    Transfer {
        operation: &'static str,
        status: u16,
        status_text: String,
        body: Option<String>,
    },

    /// Spreadsheet bytes could not be decoded
    #[error("Spreadsheet parse error: {0}")]
    Parse(String),

    /// Local file does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Operation is not available on this operating system
    #[error("Clipboard upload is only supported on Windows (current platform: {0})")]
    PlatformUnsupported(String),

    /// Clipboard capture process failed or produced unexpected output
    #[error("Clipboard capture failed: {0}")]
    Clipboard(String),

    /// Response body did not have the expected shape
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Local I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Generic error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Map a non-success REST status and response body to an error.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => Error::Auth(message),
            404 => Error::NotFound(message),
            _ => Error::Api { status, message },
        }
    }

    /// Build a transfer error for a failed download.
    pub fn download_failed(status: u16, status_text: impl Into<String>) -> Self {
        Error::Transfer {
            operation: "Download",
            status,
            status_text: status_text.into(),
            body: None,
        }
    }

    /// Build a transfer error for a failed upload, keeping the body for diagnostics.
    pub fn upload_failed(status: u16, status_text: impl Into<String>, body: String) -> Self {
        Error::Transfer {
            operation: "Upload",
            status,
            status_text: status_text.into(),
            body: Some(body),
        }
    }
}

/// Result type alias for redmine operations.
pub type Result<T> = std::result::Result<T, Error>;
