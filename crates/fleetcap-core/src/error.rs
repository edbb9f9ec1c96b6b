//! Core error types for fleetcap-core

use thiserror::Error;

/// Errors that can occur in a collection run
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    /// The fleet roster could not be obtained
    #[error("fleet roster unavailable: {0}")]
    RosterUnavailable(String),

    /// The report sink rejected initialization, a write, or finalization
    #[error("report sink error: {0}")]
    SinkError(String),

    /// The audit sink could not record missing devices
    #[error("audit sink error: {0}")]
    AuditError(String),

    /// Collection of a single device failed
    #[error("collection failed for {device}: {reason}")]
    CollectionFailed {
        /// Device identifier
        device: String,
        /// Failure description
        reason: String,
    },

    /// Actor communication error
    #[error("actor communication error: {0}")]
    ActorError(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigError(String),
}
