//! Message types for actor communication
//!
//! Message handlers are implemented in their respective actor modules.

use kameo_macros::Reply;

use crate::model::DeviceRecord;

// ============================================================================
// AggregatorActor Messages
// ============================================================================

/// Stream one completed device record into the report
#[derive(Debug)]
pub struct EmitRecord {
    pub record: DeviceRecord,
}

/// All workers have finished; finalize the report sink
#[derive(Debug)]
pub struct Finalize;

/// Aggregation result returned on finalize
#[derive(Debug, Clone, Reply)]
pub struct AggregateSummary {
    /// Rows written after the header row
    pub rows_written: usize,
    /// Devices in the order their records were written
    pub devices: Vec<String>,
}
