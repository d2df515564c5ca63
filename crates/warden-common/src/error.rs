//! Common error types for Warden components.

use thiserror::Error;

/// Common errors across Warden components
#[derive(Debug, Error)]
pub enum WardenError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Shared store unreachable; never collapsed into "no record"
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Store operation timed out; callers treat this like `StoreUnavailable`
    #[error("Store operation timed out: {0}")]
    Timeout(String),

    /// Record could not be encoded or decoded
    #[error("Record encoding error: {0}")]
    Encoding(String),
}

impl WardenError {
    /// Returns true if this error should be retried
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::Timeout(_))
    }
}
