//! Error types for Roster.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for Roster operations.
pub type Result<T> = core::result::Result<T, Error>;

/// A failed page fetch.
///
/// Fetch failures are recoverable: the engine records them in the pagination
/// phase and waits for the next explicit trigger. They are never retried
/// automatically.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The page source reported a transport failure.
    #[error("transport error: {message}")]
    Transport { message: String },
    /// The page source did not answer within the configured timeout.
    #[error("page fetch timed out after {0:?}")]
    Timeout(Duration),
}

impl FetchError {
    /// Creates a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        FetchError::Transport {
            message: message.into(),
        }
    }

    /// Returns true if the fetch failed because of the timeout.
    #[inline]
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout(_))
    }
}

/// Error types for Roster engine operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A page fetch failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// The persistence collaborator failed.
    #[error("persistence error: {message}")]
    Persistence { message: String },
    /// A snapshot could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The engine task is no longer running.
    #[error("engine has stopped")]
    EngineStopped,
    /// The configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl Error {
    /// Creates a persistence error.
    pub fn persistence(message: impl Into<String>) -> Self {
        Error::Persistence {
            message: message.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfig {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::transport("connection reset");
        assert_eq!(err.to_string(), "transport error: connection reset");

        let err = FetchError::Timeout(Duration::from_secs(3));
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "page fetch timed out after 3s");
    }

    #[test]
    fn test_error_from_fetch_error() {
        let err: Error = FetchError::transport("offline").into();
        assert!(matches!(err, Error::Fetch(FetchError::Transport { .. })));
        assert_eq!(err.to_string(), "transport error: offline");
    }

    #[test]
    fn test_error_constructors() {
        let err = Error::invalid_config("fetch_timeout must be positive");
        assert_eq!(
            err.to_string(),
            "invalid configuration: fetch_timeout must be positive"
        );

        let err = Error::persistence("disk full");
        assert_eq!(err.to_string(), "persistence error: disk full");
    }
}
