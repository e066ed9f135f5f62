//! # AppError
//!
//! Centralized error taxonomy for the Hemsaye backend. Variants carry the
//! user-facing message; the HTTP status mapping lives in `hs-api`.

use thiserror::Error;

/// The primary error type for all hs-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing user/message/theory/archive.
    #[error("{0}")]
    NotFound(String),

    /// Duplicate nickname or rank.
    #[error("{0}")]
    Conflict(String),

    /// Policy violation: protected account, self-action, insufficient rank.
    #[error("{0}")]
    Forbidden(String),

    /// Credential mismatch on login.
    #[error("{0}")]
    WrongCredential(String),

    /// Missing or malformed request field.
    #[error("{0}")]
    Validation(String),

    /// Underlying persistence failure, surfaced as a generic server error.
    #[error("internal service error: {0}")]
    Store(#[from] anyhow::Error),
}

/// A specialized Result type for Hemsaye logic.
pub type Result<T> = std::result::Result<T, AppError>;
