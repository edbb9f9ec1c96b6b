//! Replay of captured device documents
//!
//! A capture directory holds one sub-directory per device, each containing the files named by
//! [`Document::file_name`]. This is the layout written by
//! [`RecordingSource`](crate::recorder::RecordingSource).

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::credentials::Credentials;
use crate::error::SourceError;
use crate::traits::{DeviceSession, TelemetrySource};
use crate::types::{ChassisInventory, DeviceFacts, Document, InterfaceInformation, LicenseSummary};

/// Source that replays documents from a capture directory
#[derive(Debug, Clone)]
pub struct CaptureSource {
    root: PathBuf,
}

impl CaptureSource {
    /// Create a capture source rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Capture root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl TelemetrySource for CaptureSource {
    #[instrument(skip(self, _credentials), fields(root = %self.root.display()))]
    async fn connect(
        &self,
        device: &str,
        _credentials: &Credentials,
    ) -> Result<Box<dyn DeviceSession>, SourceError> {
        let dir = self.root.join(device);
        let is_dir = tokio::fs::metadata(&dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);

        if !is_dir {
            return Err(SourceError::ConnectionFailed(format!(
                "no capture for {device} under {}",
                self.root.display()
            )));
        }

        debug!(device = %device, "opened capture");

        Ok(Box::new(CaptureSession {
            device: device.to_string(),
            dir,
        }))
    }

    fn source_type(&self) -> &'static str {
        "capture"
    }
}

/// Session reading one device's capture directory
struct CaptureSession {
    device: String,
    dir: PathBuf,
}

impl CaptureSession {
    async fn read_text(&self, document: Document) -> Result<String, SourceError> {
        let path = self.dir.join(document.file_name());
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| SourceError::RequestFailed {
                document: document.name(),
                reason: format!("{}: {e}", path.display()),
            })
    }

    async fn read_json<T: DeserializeOwned>(&self, document: Document) -> Result<T, SourceError> {
        let text = self.read_text(document).await?;
        serde_json::from_str(&text).map_err(|e| SourceError::ParseError {
            document: document.name(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl DeviceSession for CaptureSession {
    fn device(&self) -> &str {
        &self.device
    }

    async fn facts(&self) -> Result<DeviceFacts, SourceError> {
        self.read_json(Document::Facts).await
    }

    async fn chassis_inventory(&self) -> Result<ChassisInventory, SourceError> {
        self.read_json(Document::ChassisInventory).await
    }

    async fn interface_information(&self) -> Result<InterfaceInformation, SourceError> {
        self.read_json(Document::InterfaceInformation).await
    }

    async fn interface_configuration(&self) -> Result<String, SourceError> {
        self.read_text(Document::InterfaceConfiguration).await
    }

    async fn license_summary(&self) -> Result<LicenseSummary, SourceError> {
        self.read_json(Document::LicenseSummary).await
    }
}
