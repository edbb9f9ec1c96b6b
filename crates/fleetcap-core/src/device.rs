//! Per-device collection and capacity computation

use std::sync::Arc;

use chrono::Utc;
use fleetcap_source::error::SourceError;
use fleetcap_source::traits::DeviceSession;
use fleetcap_source::types::{ChassisInventory, InterfaceInformation, LicenseSummary};
use tracing::{debug, info, instrument, warn};

use crate::address::{AddressResolver, normalize_bundle_speeds};
use crate::capacity::tally_linecard;
use crate::classify::{active_configuration, classify, interface_lines, is_media_interface};
use crate::config::CollectionConfig;
use crate::license::{reconcile, reports_license_usage};
use crate::model::{
    CapacityTotals, DeviceRecord, Layer, LinecardRecord, NOT_APPLICABLE, PhysicalInterfaceRecord,
};
use crate::topology::resolve_topology;

/// Raw documents retrieved for one device
#[derive(Debug, Clone, Default)]
pub struct DeviceDocuments {
    /// Firmware version fact
    pub version: String,
    pub chassis: ChassisInventory,
    pub interfaces: InterfaceInformation,
    /// Interface configuration in `set` format
    pub configuration: String,
    /// Present only when the firmware meters licenses and the retrieval succeeded
    pub license: Option<LicenseSummary>,
}

/// Annotate every media interface with its layer, address and bundle
///
/// Interfaces outside `prefixes` are dropped. Bundle members come back with their speed
/// normalized to the slowest member.
#[must_use]
pub fn annotate_interfaces(
    info: &InterfaceInformation,
    configuration: &str,
    prefixes: &[String],
) -> Vec<PhysicalInterfaceRecord> {
    let active = active_configuration(configuration);
    let resolver = AddressResolver::new(info);

    let mut records: Vec<PhysicalInterfaceRecord> = info
        .physical_interfaces
        .iter()
        .filter_map(|physical| {
            let name = physical.name.as_deref()?.trim();
            if !is_media_interface(name, prefixes) {
                return None;
            }

            let layer = classify(&interface_lines(&active, name));
            let resolution = match layer {
                Layer::L3 => resolver.resolve(name),
                Layer::L2 | Layer::Undetermined => None,
            };

            let status = |value: Option<&String>| {
                value.map_or(NOT_APPLICABLE, |v| v.trim()).to_lowercase()
            };

            Some(PhysicalInterfaceRecord {
                name: name.to_string(),
                admin_status: status(physical.admin_status.as_ref()),
                oper_status: status(physical.oper_status.as_ref()),
                speed: physical
                    .speed
                    .as_deref()
                    .map_or_else(|| "0".to_string(), |s| s.trim().to_string()),
                layer,
                address: resolution.as_ref().map(|r| r.address.clone()),
                bundle: resolution.as_ref().and_then(|r| r.bundle.clone()),
                logical_interface: resolution.map(|r| r.logical_interface),
            })
        })
        .collect();

    normalize_bundle_speeds(&mut records);
    records
}

/// Compute the full device record from its documents
#[must_use]
pub fn build_record(
    hostname: &str,
    documents: &DeviceDocuments,
    config: &CollectionConfig,
) -> DeviceRecord {
    let topology = resolve_topology(&documents.chassis);
    let interfaces = annotate_interfaces(
        &documents.interfaces,
        &documents.configuration,
        &config.interface_prefixes,
    );

    let linecards: Vec<LinecardRecord> = topology
        .linecards
        .into_iter()
        .map(|mut linecard| {
            let capacity = tally_linecard(&mut linecard, &interfaces);
            debug!(
                linecard = %linecard.name,
                channelized = capacity.channelized_ports,
                in_use = capacity.ports_in_use,
                capacity_gbps = capacity.capacity_gbps,
                "linecard tallied"
            );
            LinecardRecord {
                ports_installed: linecard.ports_installed(),
                name: linecard.name,
                slot: linecard.slot,
                model: linecard.model,
                serial: linecard.serial,
                version: linecard.version,
                channelized_ports: capacity.channelized_ports,
                ports_in_use: capacity.ports_in_use,
                capacity_gbps: capacity.capacity_gbps,
                ports: linecard.ports,
            }
        })
        .collect();

    DeviceRecord {
        hostname: hostname.to_string(),
        version: documents.version.clone(),
        chassis_model: topology.model,
        chassis_serial: topology.serial,
        totals: CapacityTotals::from_linecards(&linecards),
        license: reconcile(
            &documents.version,
            documents.license.as_ref(),
            &config.license,
        ),
        linecards,
        collected_at: Utc::now(),
    }
}

/// Retrieves a device's documents and computes its record
pub struct DeviceCollector {
    config: Arc<CollectionConfig>,
}

impl DeviceCollector {
    pub fn new(config: Arc<CollectionConfig>) -> Self {
        Self { config }
    }

    /// Retrieve all documents from an open session
    ///
    /// The license summary is only requested when the firmware meters licenses; a failure to
    /// retrieve it is logged and treated as absent.
    ///
    /// # Errors
    /// Returns the first `SourceError` from a required document.
    #[instrument(skip(self, session), fields(device = %session.device()))]
    pub async fn retrieve(&self, session: &dyn DeviceSession) -> Result<DeviceDocuments, SourceError> {
        let version = session.facts().await?.version.trim().to_string();

        let license = if reports_license_usage(&version, &self.config.license) {
            match session.license_summary().await {
                Ok(summary) => Some(summary),
                Err(e) => {
                    warn!(error = %e, "license summary unavailable, reporting zero usage");
                    None
                }
            }
        } else {
            debug!(version = %version, "firmware predates license metering");
            None
        };

        let configuration = session.interface_configuration().await?;
        let chassis = session.chassis_inventory().await?;
        let interfaces = session.interface_information().await?;

        Ok(DeviceDocuments {
            version,
            chassis,
            interfaces,
            configuration,
            license,
        })
    }

    /// Retrieve documents and build the device record
    ///
    /// # Errors
    /// Returns the first `SourceError` from a required document.
    pub async fn collect(&self, session: &dyn DeviceSession) -> Result<DeviceRecord, SourceError> {
        let documents = self.retrieve(session).await?;
        let record = build_record(session.device(), &documents, &self.config);

        info!(
            device = %record.hostname,
            linecards = record.linecards.len(),
            ports_in_use = record.totals.ports_in_use,
            capacity_gbps = record.totals.capacity_gbps,
            "device collected"
        );

        Ok(record)
    }
}
