//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is an expected, user-facing rejection: it carries a
/// client-facing message and maps to a numeric status classification.
/// Infrastructure failures (connectivity, storage) belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input violates a domain rule.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced record (or named operation) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The requested transition is illegal from the current state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// HTTP-equivalent status classification.
    ///
    /// Conflicts are classified as bad requests (400), not 409: a repeated
    /// transition is a precondition failure on the caller's input.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::Conflict(_) | Self::InvalidId(_) => 400,
            Self::NotFound(_) => 404,
        }
    }

    /// Client-facing message without the category prefix used by `Display`.
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg)
            | Self::InvalidId(msg) => msg,
        }
    }
}
