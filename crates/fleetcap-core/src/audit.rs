//! Missing-device audit

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::error::CoreError;

/// A device that contributed no telemetry to the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingDevice {
    pub device: String,
    pub reason: String,
}

/// Receives the missing-device list once per run
pub trait AuditSink: Send {
    /// Record the devices that produced no telemetry, in roster order
    ///
    /// # Errors
    /// Returns `CoreError::AuditError` if the list cannot be persisted.
    fn record_missing(&mut self, devices: &[MissingDevice]) -> Result<(), CoreError>;
}

/// Audit sink that keeps every recorded list in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryAudit {
    calls: Arc<Mutex<Vec<Vec<MissingDevice>>>>,
}

impl MemoryAudit {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded lists, one per `record_missing` call
    #[must_use]
    pub fn calls(&self) -> Vec<Vec<MissingDevice>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Devices from the most recent call
    #[must_use]
    pub fn missing(&self) -> Vec<MissingDevice> {
        self.calls().pop().unwrap_or_default()
    }
}

impl AuditSink for MemoryAudit {
    fn record_missing(&mut self, devices: &[MissingDevice]) -> Result<(), CoreError> {
        self.calls
            .lock()
            .map_err(|e| CoreError::AuditError(e.to_string()))?
            .push(devices.to_vec());
        Ok(())
    }
}
