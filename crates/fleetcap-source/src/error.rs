//! Error types for fleetcap-source

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while talking to a device telemetry source
#[derive(Error, Debug, Clone)]
pub enum SourceError {
    /// Failed to open a session to the device
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Credentials were rejected or could not be obtained
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Session or request timed out
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// Timeout duration that was exceeded
        timeout: Duration,
    },

    /// A document request failed after the session was established
    #[error("failed to retrieve {document}: {reason}")]
    RequestFailed {
        /// Document that was requested
        document: &'static str,
        /// Failure description
        reason: String,
    },

    /// Retrieved document could not be decoded
    #[error("failed to parse {document}: {reason}")]
    ParseError {
        /// Document that was being decoded
        document: &'static str,
        /// Decoder message
        reason: String,
    },

    /// Process spawn error
    #[error("failed to spawn fetch program: {0}")]
    SpawnError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(String),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    ConfigError(String),
}

impl SourceError {
    /// Whether the error happened before a usable session existed
    #[must_use]
    pub fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            SourceError::ConnectionFailed(_)
                | SourceError::AuthenticationFailed(_)
                | SourceError::Timeout { .. }
        )
    }
}

impl From<std::io::Error> for SourceError {
    fn from(e: std::io::Error) -> Self {
        SourceError::IoError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_failure_classification() {
        assert!(SourceError::ConnectionFailed("refused".to_string()).is_connection_failure());
        assert!(
            SourceError::Timeout {
                timeout: Duration::from_secs(5)
            }
            .is_connection_failure()
        );
        assert!(
            !SourceError::RequestFailed {
                document: "chassis inventory",
                reason: "rpc error".to_string(),
            }
            .is_connection_failure()
        );
    }
}
