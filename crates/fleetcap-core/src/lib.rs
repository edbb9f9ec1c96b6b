//! fleetcap-core: Capacity computation and fleet aggregation
//!
//! Resolves chassis topology, classifies and addresses interfaces, tallies per-linecard
//! capacity, reconciles license usage, and serializes device records into the report through
//! a single `AggregatorActor` built on kameo.

pub mod actor;
pub mod address;
pub mod audit;
pub mod capacity;
pub mod classify;
pub mod config;
pub mod device;
pub mod error;
pub mod license;
pub mod message;
pub mod model;
pub mod report;
pub mod roster;
pub mod scheduler;
pub mod topology;

pub use actor::aggregator::{AggregatorActor, AggregatorActorArgs};
pub use audit::{AuditSink, MemoryAudit, MissingDevice};
pub use config::{CollectionConfig, LicenseConfig};
pub use device::{DeviceCollector, DeviceDocuments, build_record};
pub use error::CoreError;
pub use message::{AggregateSummary, EmitRecord, Finalize};
pub use model::{
    CapacityTotals, ChannelId, DeviceRecord, Layer, LicenseUsage, LinecardRecord,
    PhysicalInterfaceRecord, PortInventory, PortSpeed,
};
pub use report::{Cell, HEADERS, MemorySink, ReportGrid, ReportSink, Row, device_rows};
pub use roster::{FleetRoster, StaticRoster};
pub use scheduler::{FleetScheduler, RunSummary};
