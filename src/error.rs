// src/error.rs

use std::fmt;

/// Global Application Error Enum.
/// Centralizes error handling for collaborator I/O and session misuse.
#[derive(Debug)]
pub enum AppError {
    // Transport-level failure (connect, timeout, TLS).
    Network(String),

    // Response body could not be decoded into the expected shape.
    Decode(String),

    // 401 from a collaborator; the host redirects to login.
    Unauthorized(String),

    // 404 (unknown test or skill id).
    NotFound(String),

    // 400 or a locally rejected payload.
    BadRequest(String),

    // 5xx or any unexpected status from a collaborator.
    Server(String),

    // Operation not allowed in the session's current state.
    InvalidState(String),

    // Question or option index outside the valid range.
    OutOfRange(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Maps an HTTP status from a collaborator to the matching variant.
    /// `message` is the server-provided error text (or a caller fallback).
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => AppError::Unauthorized(message),
            404 => AppError::NotFound(message),
            400 => AppError::BadRequest(message),
            _ => AppError::Server(message),
        }
    }

    /// True when the host should bounce the user through the login flow.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AppError::Unauthorized(_))
    }
}

/// Converts `reqwest::Error` into the transport or decode variant.
/// Allows using `?` operator on collaborator calls.
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::Decode(err.to_string())
        } else {
            AppError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
