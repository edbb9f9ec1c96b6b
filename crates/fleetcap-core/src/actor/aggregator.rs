//! `AggregatorActor`: single writer of the capacity report
//!
//! Drains device records from its mailbox in arrival order and streams their rows to the
//! report sink, advancing the row cursor by one per row.

use kameo::actor::{ActorRef, WeakActorRef};
use kameo::error::ActorStopReason;
use kameo::message::{Context, Message};
use kameo::prelude::*;
use tracing::{debug, error, info, warn};

use crate::error::CoreError;
use crate::message::{AggregateSummary, EmitRecord, Finalize};
use crate::report::{Cell, FIRST_RECORD_ROW, ReportSink, device_rows};

/// Arguments for spawning an `AggregatorActor`
pub struct AggregatorActorArgs {
    /// Initialized report sink; ownership moves into the actor
    pub sink: Box<dyn ReportSink>,
}

/// Owns the report sink and the row cursor
pub struct AggregatorActor {
    sink: Box<dyn ReportSink>,
    /// Next row to write
    cursor: usize,
    /// Devices in the order their rows were written
    devices: Vec<String>,
    /// First sink failure; later records are dropped
    failure: Option<CoreError>,
    finalized: bool,
}

impl AggregatorActor {
    /// Write every row of a record, one cursor step per row
    fn write_record(&mut self, msg: &EmitRecord) -> Result<usize, CoreError> {
        let mut written = 0;
        for row in device_rows(&msg.record) {
            for (column, cell) in row.into_iter().enumerate() {
                if cell != Cell::Empty {
                    self.sink.write(self.cursor, column, cell)?;
                }
            }
            self.cursor += 1;
            written += 1;
        }
        Ok(written)
    }
}

impl Actor for AggregatorActor {
    type Args = AggregatorActorArgs;
    type Error = CoreError;

    async fn on_start(args: Self::Args, actor_ref: ActorRef<Self>) -> Result<Self, Self::Error> {
        info!(id = %actor_ref.id(), "AggregatorActor starting");

        Ok(Self {
            sink: args.sink,
            cursor: FIRST_RECORD_ROW,
            devices: Vec::new(),
            failure: None,
            finalized: false,
        })
    }

    async fn on_stop(
        &mut self,
        _actor_ref: WeakActorRef<Self>,
        reason: ActorStopReason,
    ) -> Result<(), Self::Error> {
        if self.finalized {
            info!(reason = ?reason, "AggregatorActor stopping");
        } else {
            warn!(
                reason = ?reason,
                rows = self.cursor - FIRST_RECORD_ROW,
                "AggregatorActor stopped before finalize"
            );
        }
        Ok(())
    }
}

// ============================================================================
// Message Handlers
// ============================================================================

impl Message<EmitRecord> for AggregatorActor {
    type Reply = ();

    async fn handle(&mut self, msg: EmitRecord, _ctx: &mut Context<Self, Self::Reply>) {
        let device = msg.record.hostname.clone();

        if self.finalized || self.failure.is_some() {
            warn!(device = %device, "report no longer accepting rows, record dropped");
            return;
        }

        let start = self.cursor;
        match self.write_record(&msg) {
            Ok(rows) => {
                debug!(device = %device, start_row = start, rows, "record written");
                self.devices.push(device);
            }
            Err(e) => {
                error!(device = %device, row = self.cursor, error = %e, "report write failed");
                self.failure = Some(e);
            }
        }
    }
}

impl Message<Finalize> for AggregatorActor {
    type Reply = Result<AggregateSummary, CoreError>;

    async fn handle(
        &mut self,
        _msg: Finalize,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        if let Some(e) = self.failure.take() {
            return Err(e);
        }
        if self.finalized {
            return Err(CoreError::SinkError("report already finalized".to_string()));
        }

        self.sink.finalize()?;
        self.finalized = true;

        let rows_written = self.cursor - FIRST_RECORD_ROW;
        info!(
            rows = rows_written,
            devices = self.devices.len(),
            "report finalized"
        );

        Ok(AggregateSummary {
            rows_written,
            devices: self.devices.clone(),
        })
    }
}
