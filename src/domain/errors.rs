//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// Store unreachable, query failed or timed out.
    #[error("Content store unavailable: {0}")]
    DataUnavailable(String),

    /// Mail transport rejected or failed the send. Never retried here.
    #[error("Digest dispatch failed: {0}")]
    DispatchFailed(String),

    /// Internal misuse (e.g. dispatch with no recipients). Indicates a wiring bug.
    #[error("Precondition violated: {0}")]
    PreconditionViolation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl DomainError {
    /// Stable classification reported as `errorKind` in the invocation result.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::DataUnavailable(_) => "DataUnavailable",
            DomainError::DispatchFailed(_) => "DispatchFailed",
            DomainError::PreconditionViolation(_) => "PreconditionViolation",
            DomainError::Configuration(_) => "Configuration",
        }
    }
}
