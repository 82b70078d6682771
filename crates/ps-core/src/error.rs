//! # AppError
//!
//! Centralized error handling for the PhotoShare ecosystem.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all ps-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Event, Photo)
    #[error("{0} not found: {1}")]
    NotFound(String, String),

    /// Validation failure (e.g., empty event name, non-image upload)
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Security/Auth failure (bad admin credentials, missing capability)
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The event's photo quota cannot admit the batch.
    #[error("photo quota exceeded: {remaining} slot(s) remaining")]
    QuotaExceeded { remaining: i64 },

    /// One image could not be decoded or re-encoded.
    #[error("image processing failed for {file}: {reason}")]
    ImageError { file: String, reason: String },

    /// Resource already exists (e.g., duplicate event slug)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure (DB down, storage write refused)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    /// Collapses an infrastructure error into the single user-facing variant.
    pub fn internal(err: impl std::fmt::Display) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// A specialized Result type for PhotoShare logic.
pub type Result<T> = std::result::Result<T, AppError>;
