//! Recording decorator that keeps a copy of every retrieved document

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use crate::credentials::Credentials;
use crate::error::SourceError;
use crate::traits::{DeviceSession, TelemetrySource};
use crate::types::{ChassisInventory, DeviceFacts, Document, InterfaceInformation, LicenseSummary};

/// Wraps a source and writes retrieved documents under `<dir>/<device>/`
///
/// The layout matches what [`CaptureSource`](crate::capture::CaptureSource) replays. Recording
/// is best-effort: write failures are logged and never fail the retrieval.
pub struct RecordingSource {
    inner: Arc<dyn TelemetrySource>,
    dir: PathBuf,
}

impl RecordingSource {
    pub fn new(inner: Arc<dyn TelemetrySource>, dir: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            dir: dir.into(),
        }
    }
}

#[async_trait]
impl TelemetrySource for RecordingSource {
    async fn connect(
        &self,
        device: &str,
        credentials: &Credentials,
    ) -> Result<Box<dyn DeviceSession>, SourceError> {
        let inner = self.inner.connect(device, credentials).await?;
        let dir = self.dir.join(device);

        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            warn!(device = %device, error = %e, "failed to create recording directory");
        }

        Ok(Box::new(RecordingSession { inner, dir }))
    }

    fn source_type(&self) -> &'static str {
        self.inner.source_type()
    }
}

struct RecordingSession {
    inner: Box<dyn DeviceSession>,
    dir: PathBuf,
}

impl RecordingSession {
    async fn record_text(&self, document: Document, text: &str) {
        let path = self.dir.join(document.file_name());
        match tokio::fs::write(&path, text).await {
            Ok(()) => debug!(path = %path.display(), "recorded document"),
            Err(e) => warn!(
                device = %self.inner.device(),
                document = %document,
                error = %e,
                "failed to record document"
            ),
        }
    }

    async fn record_json<T: Serialize>(&self, document: Document, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(text) => self.record_text(document, &text).await,
            Err(e) => warn!(document = %document, error = %e, "failed to encode document"),
        }
    }
}

#[async_trait]
impl DeviceSession for RecordingSession {
    fn device(&self) -> &str {
        self.inner.device()
    }

    async fn facts(&self) -> Result<DeviceFacts, SourceError> {
        let facts = self.inner.facts().await?;
        self.record_json(Document::Facts, &facts).await;
        Ok(facts)
    }

    async fn chassis_inventory(&self) -> Result<ChassisInventory, SourceError> {
        let inventory = self.inner.chassis_inventory().await?;
        self.record_json(Document::ChassisInventory, &inventory).await;
        Ok(inventory)
    }

    async fn interface_information(&self) -> Result<InterfaceInformation, SourceError> {
        let info = self.inner.interface_information().await?;
        self.record_json(Document::InterfaceInformation, &info).await;
        Ok(info)
    }

    async fn interface_configuration(&self) -> Result<String, SourceError> {
        let config = self.inner.interface_configuration().await?;
        self.record_text(Document::InterfaceConfiguration, &config)
            .await;
        Ok(config)
    }

    async fn license_summary(&self) -> Result<LicenseSummary, SourceError> {
        let summary = self.inner.license_summary().await?;
        self.record_json(Document::LicenseSummary, &summary).await;
        Ok(summary)
    }

    async fn close(&self) -> Result<(), SourceError> {
        self.inner.close().await
    }
}
