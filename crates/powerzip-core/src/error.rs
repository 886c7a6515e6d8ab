use std::time::Duration;

use thiserror::Error;

/// Error shared by every resolution stage.
///
/// Retryability is carried by the variant itself so callers never re-derive
/// it from transport details.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("invalid ZIP code format: {0:?} (expected 5 digits)")]
    InvalidZipFormat(String),

    #[error("ZIP code {0} is outside Texas")]
    NonTexasZip(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("usage {0} kWh is outside the supported 100-5000 range")]
    InvalidUsage(u32),

    #[error("network error: {message}")]
    Network { message: String, retryable: bool },

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("no service address matched {address:?} in {zip}")]
    NoMatchFound { address: String, zip: String },

    #[error("unknown service point: {0}")]
    UnknownServicePoint(String),
}

impl ResolveError {
    /// Whether the failed operation may succeed if repeated.
    pub fn retryable(&self) -> bool {
        match self {
            ResolveError::Network { retryable, .. } => *retryable,
            ResolveError::Timeout(_) => true,
            _ => false,
        }
    }

    /// Malformed caller input, as opposed to a failure of a lookup.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ResolveError::InvalidZipFormat(_)
                | ResolveError::NonTexasZip(_)
                | ResolveError::InvalidAddress(_)
                | ResolveError::InvalidUsage(_)
        )
    }
}

pub type ResolveResult<T> = Result<T, ResolveError>;
