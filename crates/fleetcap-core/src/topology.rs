//! Linecard and port inventory resolution from the chassis hardware tree

use std::collections::VecDeque;

use fleetcap_source::types::{ChassisInventory, Module};
use tracing::debug;

use crate::model::{NOT_APPLICABLE, PortInventory};

const LINECARD_PREFIX: &str = "FPC";
const PIC_PREFIX: &str = "PIC";
const TRANSCEIVER_PREFIX: &str = "Xcvr";

/// Resolved chassis hardware
#[derive(Debug, Clone)]
pub struct ChassisTopology {
    pub model: String,
    pub serial: String,
    /// Linecards in inventory traversal order
    pub linecards: Vec<LinecardInventory>,
}

/// A linecard and the transceivers installed under it
#[derive(Debug, Clone)]
pub struct LinecardInventory {
    /// Inventory name (`FPC 0`)
    pub name: String,
    pub slot: u32,
    pub model: String,
    pub serial: String,
    pub version: String,
    pub ports: PortInventory,
}

impl LinecardInventory {
    /// Count of transceiver slots populated on this linecard
    #[must_use]
    pub fn ports_installed(&self) -> usize {
        self.ports.transceiver_count()
    }
}

fn text_or_na(value: Option<&String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| NOT_APPLICABLE.to_string())
}

fn module_name(module: &Module) -> Option<&str> {
    module.name.as_deref().map(str::trim)
}

/// Slot number from a `<prefix> <n>` module name
fn slot_number(name: &str, prefix: &str) -> Option<u32> {
    name.strip_prefix(prefix)?.trim().parse().ok()
}

/// Build the linecard inventory from a chassis hardware tree
///
/// Linecards are searched at every depth, shallowest first. Malformed entries are skipped.
#[must_use]
pub fn resolve_topology(inventory: &ChassisInventory) -> ChassisTopology {
    let chassis = &inventory.chassis;
    let mut linecards: Vec<LinecardInventory> = Vec::new();

    let mut queue: VecDeque<&Module> = chassis.modules.iter().collect();
    while let Some(module) = queue.pop_front() {
        let Some(name) = module_name(module) else {
            debug!("skipping unnamed inventory module");
            continue;
        };

        if name.starts_with(LINECARD_PREFIX) {
            match slot_number(name, LINECARD_PREFIX) {
                Some(slot) if !linecards.iter().any(|lc| lc.name == name) => {
                    linecards.push(resolve_linecard(module, name, slot));
                }
                Some(_) => debug!(linecard = %name, "duplicate linecard entry ignored"),
                None => debug!(linecard = %name, "linecard without numeric slot ignored"),
            }
        }

        queue.extend(module.modules.iter());
    }

    ChassisTopology {
        model: text_or_na(chassis.description.as_ref()),
        serial: text_or_na(chassis.serial_number.as_ref()),
        linecards,
    }
}

fn resolve_linecard(module: &Module, name: &str, slot: u32) -> LinecardInventory {
    let mut ports = PortInventory::new();
    for child in &module.modules {
        collect_transceivers(child, name, &mut ports);
    }

    LinecardInventory {
        name: name.to_string(),
        slot,
        model: text_or_na(module.description.as_ref()),
        serial: text_or_na(module.serial_number.as_ref()),
        version: module
            .version
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string(),
        ports,
    }
}

/// Depth-first walk attaching every transceiver to its parent PIC
fn collect_transceivers(module: &Module, parent: &str, ports: &mut PortInventory) {
    let Some(name) = module_name(module) else {
        debug!(parent = %parent, "skipping unnamed sub-tree");
        return;
    };

    if name.starts_with(TRANSCEIVER_PREFIX) {
        if parent.starts_with(PIC_PREFIX) {
            let inserted = ports.insert_transceiver(
                parent,
                name,
                text_or_na(module.description.as_ref()),
                text_or_na(module.serial_number.as_ref()),
            );
            if !inserted {
                debug!(pic = %parent, transceiver = %name, "duplicate transceiver ignored");
            }
        } else {
            debug!(parent = %parent, transceiver = %name, "transceiver outside a PIC ignored");
        }
    }

    for child in &module.modules {
        collect_transceivers(child, name, ports);
    }
}
