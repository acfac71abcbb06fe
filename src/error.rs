//! Error types for entender
//!
//! All fallible operations return [`Result`], an alias over [`EntenderError`].
//! Errors carry free-text reasons rather than structured codes; the HTTP
//! layer decides whether a failure becomes an error status or a JSON
//! `{"error": ...}` envelope.

use thiserror::Error;

/// Errors produced by the interpretability pipeline and its HTTP surface
#[derive(Debug, Error)]
pub enum EntenderError {
    /// Tensor or layer shape violation
    #[error("Invalid shape: {reason}")]
    InvalidShape {
        /// What went wrong
        reason: String,
    },

    /// Tokenization or model forward pass failed during attention extraction
    #[error("Extraction failed: {reason}")]
    Extraction {
        /// Underlying failure message
        reason: String,
    },

    /// Caller-supplied parameter is out of range (layer/head index, threshold)
    #[error("Invalid argument: {reason}")]
    InvalidArgument {
        /// What went wrong
        reason: String,
    },

    /// Transport-level failure talking to the hosted chat API
    #[error("Connection to {url} failed: {reason}")]
    Connection {
        /// Endpoint that was contacted
        url: String,
        /// Underlying failure message
        reason: String,
    },

    /// Hosted chat API answered with a non-success status
    #[error("Chat API error (status {status}): {reason}")]
    ChatApi {
        /// HTTP status code returned by the upstream API
        status: u16,
        /// Response body or failure message
        reason: String,
    },

    /// Required credential was not configured
    #[error("Missing credential: {name} is not set")]
    MissingCredential {
        /// Environment variable name
        name: String,
    },
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, EntenderError>;
