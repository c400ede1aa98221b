//! Error types for image generation.

use std::path::PathBuf;

/// Errors that can occur while generating or persisting an image.
#[derive(Debug, thiserror::Error)]
pub enum ImageForgeError {
    /// API key missing or otherwise unusable before any request was made.
    #[error("configuration error: {0}")]
    Config(String),

    /// An input image file could not be read.
    #[error("failed to read image file {path}: {source}")]
    FileRead {
        /// Path of the unreadable file.
        path: PathBuf,
        /// Underlying io error.
        #[source]
        source: std::io::Error,
    },

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// API returned a non-success HTTP status. Carries the raw upstream
    /// status and body for diagnostics.
    #[error("API error: {status} - {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// A single transport attempt timed out (connect or read).
    #[error("request timed out: {0}")]
    RequestTimeout(String),

    /// The retry budget was exhausted on transport timeouts.
    #[error("timed out after {attempts} attempts: {last_error}")]
    TimeoutExceeded {
        /// Total number of attempts made, including the first.
        attempts: u32,
        /// Message of the last timeout.
        last_error: String,
    },

    /// Response parsed but the parts array was absent.
    #[error("no parts found in response")]
    NoImagePart,

    /// Response parsed but no part carried image data.
    #[error("no image data received in response")]
    NoImageFound,

    /// Response parsed but the image field was absent or empty.
    #[error("no image data in response")]
    NoImageData,

    /// Failed to decode base64 image data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error (e.g., saving the output file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ImageForgeError {
    /// Returns true if this error is a transport timeout eligible for retry.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::RequestTimeout(_) => true,
            Self::Network(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// Result type alias for image generation operations.
pub type Result<T> = std::result::Result<T, ImageForgeError>;
