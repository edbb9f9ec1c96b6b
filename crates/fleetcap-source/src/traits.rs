//! Telemetry source traits

use async_trait::async_trait;

use crate::credentials::Credentials;
use crate::error::SourceError;
use crate::types::{ChassisInventory, DeviceFacts, InterfaceInformation, LicenseSummary};

/// Opens sessions to devices
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Open a session to `device`
    ///
    /// # Errors
    /// Returns a connection-class `SourceError` if the device is unreachable, rejects the
    /// credentials, or does not answer in time.
    async fn connect(
        &self,
        device: &str,
        credentials: &Credentials,
    ) -> Result<Box<dyn DeviceSession>, SourceError>;

    /// Get source type name
    fn source_type(&self) -> &'static str;
}

/// An open session to a single device
#[async_trait]
pub trait DeviceSession: Send + Sync {
    /// Device identifier this session is bound to
    fn device(&self) -> &str;

    /// Firmware version and hostname facts
    async fn facts(&self) -> Result<DeviceFacts, SourceError>;

    /// Chassis hardware inventory
    async fn chassis_inventory(&self) -> Result<ChassisInventory, SourceError>;

    /// Interface information including media and detail
    async fn interface_information(&self) -> Result<InterfaceInformation, SourceError>;

    /// Interface configuration in `set` format, deactivated statements included
    async fn interface_configuration(&self) -> Result<String, SourceError>;

    /// License feature summary
    async fn license_summary(&self) -> Result<LicenseSummary, SourceError>;

    /// Close the session
    async fn close(&self) -> Result<(), SourceError> {
        Ok(())
    }
}
