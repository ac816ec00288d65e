//! # AppError
//!
//! Centralized error handling for the Idea Hub engine.
//! Every port implementation maps its native failures into these variants.

use thiserror::Error;

/// The primary error type for all ih-core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Malformed or out-of-range input (e.g., empty title, rating of 11)
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Resource not found (e.g., Idea, Interaction)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// A store constraint was violated outside the upsert path
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure (e.g., DB down, disk full)
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Caller identity could not be established or does not match the request
    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::ValidationError(msg.into())
    }

    pub fn idea_not_found(id: impl ToString) -> Self {
        AppError::NotFound("Idea".to_string(), id.to_string())
    }
}

/// A specialized Result type for Idea Hub logic.
pub type Result<T> = std::result::Result<T, AppError>;
