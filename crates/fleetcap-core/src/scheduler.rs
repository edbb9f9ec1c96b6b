//! Fleet collection scheduler
//!
//! Runs one worker per device under a concurrency limit. Workers hand completed records to the
//! `AggregatorActor`; devices that produce nothing end up on the audit list.

use std::sync::Arc;
use std::time::Duration;

use kameo::actor::ActorRef;
use kameo::error::SendError;
use kameo::prelude::*;
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{error, info, instrument, warn};

use fleetcap_source::credentials::CredentialProvider;
use fleetcap_source::error::SourceError;
use fleetcap_source::traits::TelemetrySource;

use crate::actor::aggregator::{AggregatorActor, AggregatorActorArgs};
use crate::audit::{AuditSink, MissingDevice};
use crate::config::CollectionConfig;
use crate::device::DeviceCollector;
use crate::error::CoreError;
use crate::message::{EmitRecord, Finalize};
use crate::model::DeviceRecord;
use crate::report::{HEADERS, ReportSink};
use crate::roster::FleetRoster;

/// Outcome of a collection run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Devices on the roster
    pub devices_total: usize,
    /// Devices in the order their rows were written
    pub collected: Vec<String>,
    /// Devices that produced no telemetry, in roster order
    pub missing: Vec<MissingDevice>,
    /// Report rows written, header excluded
    pub rows_written: usize,
}

/// Everything a worker needs, shared across workers
struct WorkerContext {
    source: Arc<dyn TelemetrySource>,
    credentials: Arc<dyn CredentialProvider>,
    collector: DeviceCollector,
    connect_timeout: Duration,
    aggregator: ActorRef<AggregatorActor>,
}

impl WorkerContext {
    /// Connect, collect and compute one device record
    async fn collect(&self, device: &str) -> Result<DeviceRecord, SourceError> {
        let credentials = self.credentials.credentials(device)?;

        let session = tokio::time::timeout(
            self.connect_timeout,
            self.source.connect(device, &credentials),
        )
        .await
        .map_err(|_| SourceError::Timeout {
            timeout: self.connect_timeout,
        })??;

        let result = self.collector.collect(session.as_ref()).await;

        if let Err(e) = session.close().await {
            warn!(device = %device, error = %e, "failed to close session");
        }

        result
    }

    #[instrument(skip(self), fields(source = self.source.source_type()))]
    async fn run(&self, device: String) -> Result<(), CoreError> {
        let record = match self.collect(&device).await {
            Ok(record) => record,
            Err(e) => {
                if e.is_connection_failure() {
                    warn!(device = %device, error = %e, "device unreachable");
                } else {
                    error!(device = %device, error = %e, "device collection failed");
                }
                return Err(CoreError::CollectionFailed {
                    device,
                    reason: e.to_string(),
                });
            }
        };

        self.aggregator
            .tell(EmitRecord { record })
            .await
            .map_err(|e| CoreError::CollectionFailed {
                device,
                reason: format!("report aggregator unavailable: {e}"),
            })
    }
}

/// Audit entry for a device whose worker ended in `error`
fn missing_device(device: String, error: CoreError) -> MissingDevice {
    let reason = match error {
        CoreError::CollectionFailed { reason, .. } => reason,
        other => other.to_string(),
    };
    MissingDevice { device, reason }
}

/// Schedules device collection across a fleet
pub struct FleetScheduler {
    source: Arc<dyn TelemetrySource>,
    credentials: Arc<dyn CredentialProvider>,
    config: Arc<CollectionConfig>,
}

impl FleetScheduler {
    pub fn new(
        source: Arc<dyn TelemetrySource>,
        credentials: Arc<dyn CredentialProvider>,
        config: CollectionConfig,
    ) -> Self {
        Self {
            source,
            credentials,
            config: Arc::new(config),
        }
    }

    /// Collect every roster device and build the report
    ///
    /// Per-device failures never abort the run; they are recorded on the audit sink once the
    /// report is finalized.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid, the roster cannot be obtained, or the
    /// report sink fails to initialize, write or finalize, or the audit sink fails.
    pub async fn run(
        &self,
        roster: &dyn FleetRoster,
        mut sink: Box<dyn ReportSink>,
        audit: &mut dyn AuditSink,
    ) -> Result<RunSummary, CoreError> {
        self.config.validate()?;
        let devices = roster.devices()?;
        sink.init(&HEADERS)?;

        let limit = self.config.concurrency.unwrap_or(devices.len()).max(1);
        info!(
            devices = devices.len(),
            concurrency = limit,
            source = self.source.source_type(),
            "starting fleet collection"
        );

        let aggregator = AggregatorActor::spawn(AggregatorActorArgs { sink });
        let context = Arc::new(WorkerContext {
            source: Arc::clone(&self.source),
            credentials: Arc::clone(&self.credentials),
            collector: DeviceCollector::new(Arc::clone(&self.config)),
            connect_timeout: self.config.connect_timeout(),
            aggregator: aggregator.clone(),
        });
        let semaphore = Arc::new(Semaphore::new(limit));

        let mut handles = Vec::with_capacity(devices.len());
        for device in &devices {
            let context = Arc::clone(&context);
            let semaphore = Arc::clone(&semaphore);
            let name = device.clone();

            let handle = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| CoreError::ActorError(format!("worker slot unavailable: {e}")))?;
                context.run(name).await
            });

            handles.push((device.clone(), handle));
        }

        let mut missing = Vec::new();
        for (device, handle) in handles {
            let failure = match handle.await {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e,
                Err(e) => {
                    error!(device = %device, error = %e, "worker panicked");
                    CoreError::CollectionFailed {
                        device: device.clone(),
                        reason: format!("worker panicked: {e}"),
                    }
                }
            };
            missing.push(missing_device(device, failure));
        }
        drop(context);

        let finalized = aggregator.ask(Finalize).await.map_err(|e| match e {
            SendError::HandlerError(inner) => inner,
            other => CoreError::ActorError(other.to_string()),
        });
        aggregator.stop_gracefully().await.ok();
        let aggregate = finalized?;

        audit.record_missing(&missing)?;

        info!(
            collected = aggregate.devices.len(),
            missing = missing.len(),
            rows = aggregate.rows_written,
            "fleet collection finished"
        );

        Ok(RunSummary {
            devices_total: devices.len(),
            collected: aggregate.devices,
            missing,
            rows_written: aggregate.rows_written,
        })
    }
}
