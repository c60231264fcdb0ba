//! Error types for the Strata client

use thiserror::Error;

/// Core Strata errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StrataError {
    // Usage errors
    #[error("Invalid usage: {0}")]
    InvalidUsage(String),

    // Algorithm errors
    #[error("Unknown algorithm: {type_name}.{member}")]
    UnknownAlgorithm { type_name: String, member: String },

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    // Bootstrap errors
    #[error("Failed to load algorithm signatures: {0}")]
    LoadFailure(String),

    #[error("Initialization hook {hook} failed: {reason}")]
    HookFailure { hook: String, reason: String },

    #[error("Bootstrap abandoned before it resolved")]
    Abandoned,

    // Transport errors
    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Invalid catalog format: {0}")]
    InvalidCatalog(String),
}

impl StrataError {
    /// Wrap an error raised inside an initialization hook.
    ///
    /// Errors that already are hook failures pass through unchanged so the
    /// innermost hook name is kept.
    pub fn hook_failure(hook: impl Into<String>, err: StrataError) -> Self {
        match err {
            StrataError::HookFailure { .. } => err,
            other => StrataError::HookFailure {
                hook: hook.into(),
                reason: other.to_string(),
            },
        }
    }
}

/// Result type for Strata operations
pub type StrataResult<T> = Result<T, StrataError>;
