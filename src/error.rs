// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Error types for CelestialLens
//!
//! This module defines all error types used throughout the application.
//! Two kinds reach the user: [`AttachmentError`] (local, file level) and
//! [`InferenceError`] (remote, after the streaming attempt ends). [`ApiError`]
//! is the raw transport failure that the classifier turns into an
//! [`InferenceError`].

use std::fmt;

use thiserror::Error;

/// Main error type for CelestialLens operations
#[derive(Error, Debug)]
pub enum LensError {
    /// An attachment could not be encoded; the whole batch is aborted
    #[error("Attachment error: {0}")]
    Attachment(#[from] AttachmentError),

    /// A classified, user-facing inference failure
    #[error("{0}")]
    Inference(#[from] InferenceError),

    /// Raw API errors that have not been classified yet
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Template catalog errors
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Raw transport-level failures from the remote inference service
#[derive(Error, Debug)]
pub enum ApiError {
    /// No usable API credential was supplied
    #[error("Authentication failed: missing or invalid API key")]
    AuthenticationFailed,

    /// Network connectivity error
    #[error("Network error: {0}")]
    Network(String),

    /// Invalid response from API
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// API returned an error status
    #[error("API error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Streaming error
    #[error("Streaming error: {0}")]
    StreamError(String),
}

/// An attachment failed to encode
#[derive(Error, Debug)]
#[error("attachment {attachment_id} could not be encoded: {reason}")]
pub struct AttachmentError {
    /// Identity token of the failing attachment
    pub attachment_id: String,
    /// What went wrong
    pub reason: String,
}

impl AttachmentError {
    pub fn new(attachment_id: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self {
            attachment_id: attachment_id.to_string(),
            reason: reason.into(),
        }
    }
}

/// Category of a classified inference failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceErrorKind {
    /// The service rejected the request for quota/rate reasons (HTTP 429)
    RateLimited,
    /// Anything else
    Unclassified,
    /// The caller cancelled the stream
    Cancelled,
}

impl fmt::Display for InferenceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InferenceErrorKind::RateLimited => "rate_limited",
            InferenceErrorKind::Unclassified => "unclassified",
            InferenceErrorKind::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// A user-facing inference failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct InferenceError {
    /// Failure category
    pub kind: InferenceErrorKind,
    /// Message to render in place of (or next to) the partial result
    pub message: String,
    /// Raw failure text, for logs only
    pub detail: Option<String>,
}

impl InferenceError {
    pub fn new(kind: InferenceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
        }
    }

    /// Attach the raw failure text
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn is_rate_limited(&self) -> bool {
        self.kind == InferenceErrorKind::RateLimited
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind == InferenceErrorKind::Cancelled
    }
}

/// Result type alias for CelestialLens operations
pub type Result<T> = std::result::Result<T, LensError>;

/// Result type alias for raw backend calls
pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => ApiError::ServerError {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => ApiError::Network(err.to_string()),
        }
    }
}

impl From<toml::de::Error> for LensError {
    fn from(err: toml::de::Error) -> Self {
        LensError::Toml(err.to_string())
    }
}
