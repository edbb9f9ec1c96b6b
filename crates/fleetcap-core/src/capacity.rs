//! Per-linecard capacity tally

use std::collections::HashSet;

use tracing::debug;

use crate::model::{ChannelId, PhysicalInterfaceRecord, PortSpeed};
use crate::topology::LinecardInventory;

/// Parsed `<prefix>-<fpc>/<pic>/<port>[:<channel>]` interface address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotAddress {
    pub fpc: u32,
    pub pic: u32,
    pub port: u32,
    pub channel: Option<u32>,
}

impl SlotAddress {
    /// Parse an interface name; `None` if it is not a slot address
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let (_, slots) = name.split_once('-')?;
        let mut parts = slots.split('/');
        let fpc = parts.next()?.parse().ok()?;
        let pic = parts.next()?.parse().ok()?;
        let port_part = parts.next()?;
        if parts.next().is_some() {
            return None;
        }

        let (port, channel) = match port_part.split_once(':') {
            Some((port, channel)) => (port.parse().ok()?, Some(channel.parse().ok()?)),
            None => (port_part.parse().ok()?, None),
        };

        Some(Self {
            fpc,
            pic,
            port,
            channel,
        })
    }

    /// Inventory key of the PIC (`PIC 1`)
    #[must_use]
    pub fn pic_key(&self) -> String {
        format!("PIC {}", self.pic)
    }

    /// Inventory key of the transceiver (`Xcvr 3`)
    #[must_use]
    pub fn transceiver_key(&self) -> String {
        format!("Xcvr {}", self.port)
    }

    #[must_use]
    pub fn channel_id(&self) -> ChannelId {
        self.channel.map_or(ChannelId::Default, ChannelId::Numbered)
    }
}

/// Capacity figures computed for one linecard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinecardCapacity {
    pub channelized_ports: usize,
    pub ports_in_use: usize,
    pub capacity_gbps: u64,
}

/// Tally capacity for `linecard` and write resolved speeds into its port inventory
///
/// Only interfaces on the linecard's slot whose PIC and transceiver are present in the
/// inventory take part. Ports in use are counted per distinct PIC/port pair, so several active
/// channels on one transceiver count once while each adds its own speed.
pub fn tally_linecard(
    linecard: &mut LinecardInventory,
    interfaces: &[PhysicalInterfaceRecord],
) -> LinecardCapacity {
    let mut channelized_ports = 0;
    let mut ports_in_use: HashSet<(u32, u32)> = HashSet::new();
    let mut capacity_gbps = 0;

    for interface in interfaces {
        let Some(slot) = SlotAddress::parse(&interface.name) else {
            debug!(interface = %interface.name, "interface name is not a slot address");
            continue;
        };
        let pic_key = slot.pic_key();
        let xcvr_key = slot.transceiver_key();
        if slot.fpc != linecard.slot || !linecard.ports.contains(&pic_key, &xcvr_key) {
            continue;
        }

        if slot.channel.is_some() {
            channelized_ports += 1;
        }

        let speed = if interface.is_in_use() {
            let gbps = interface.speed_gbps();
            ports_in_use.insert((slot.pic, slot.port));
            capacity_gbps += gbps;
            PortSpeed::Gbps(gbps)
        } else {
            PortSpeed::NotApplicable
        };

        linecard
            .ports
            .set_speed(&pic_key, &xcvr_key, &slot.channel_id(), speed);
    }

    LinecardCapacity {
        channelized_ports,
        ports_in_use: ports_in_use.len(),
        capacity_gbps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Layer, PortInventory};

    fn linecard(slot: u32, transceivers: &[(u32, u32)]) -> LinecardInventory {
        let mut ports = PortInventory::new();
        for (pic, port) in transceivers {
            ports.insert_transceiver(
                &format!("PIC {pic}"),
                &format!("Xcvr {port}"),
                "QSFP-100G",
                format!("SN{pic}{port}"),
            );
        }
        LinecardInventory {
            name: format!("FPC {slot}"),
            slot,
            model: "LC".to_string(),
            serial: "LCSN".to_string(),
            version: String::new(),
            ports,
        }
    }

    fn iface(
        name: &str,
        admin: &str,
        speed: &str,
        layer: Layer,
        address: Option<&str>,
    ) -> PhysicalInterfaceRecord {
        PhysicalInterfaceRecord {
            name: name.to_string(),
            admin_status: admin.to_string(),
            oper_status: "up".to_string(),
            speed: speed.to_string(),
            layer,
            address: address.map(ToString::to_string),
            bundle: None,
            logical_interface: None,
        }
    }

    #[test]
    fn test_parse_slot_address() {
        assert_eq!(
            SlotAddress::parse("et-1/2/3"),
            Some(SlotAddress {
                fpc: 1,
                pic: 2,
                port: 3,
                channel: None
            })
        );
        assert_eq!(SlotAddress::parse("et-0/0/5:2").unwrap().channel, Some(2));
        assert_eq!(SlotAddress::parse("ae0"), None);
        assert_eq!(SlotAddress::parse("et-0/0"), None);
        assert_eq!(SlotAddress::parse("et-0/0/1/2"), None);
        assert_eq!(SlotAddress::parse("et-a/0/1"), None);
    }

    #[test]
    fn test_admin_down_contributes_nothing() {
        let mut lc = linecard(0, &[(0, 0), (0, 1)]);
        let interfaces = vec![
            iface("et-0/0/0", "down", "100Gbps", Layer::L2, None),
            iface("et-0/0/1", "down", "100Gbps", Layer::L3, Some("10.0.0.1")),
        ];

        let capacity = tally_linecard(&mut lc, &interfaces);

        assert_eq!(capacity.ports_in_use, 0);
        assert_eq!(capacity.capacity_gbps, 0);
        assert!(lc.ports.leaves().all(|(_, _, c)| c.speed == PortSpeed::NotApplicable));
    }

    #[test]
    fn test_channelized_port_counts_once() {
        let mut lc = linecard(0, &[(0, 4)]);
        let interfaces = vec![
            iface("et-0/0/4:0", "up", "100Gbps", Layer::L2, None),
            iface("et-0/0/4:1", "up", "100Gbps", Layer::L2, None),
            iface("et-0/0/4:2", "up", "100Gbps", Layer::L3, Some("10.0.0.5")),
        ];

        let capacity = tally_linecard(&mut lc, &interfaces);

        assert_eq!(capacity.channelized_ports, 3);
        assert_eq!(capacity.ports_in_use, 1);
        assert_eq!(capacity.capacity_gbps, 300);

        let xcvr = lc.ports.transceiver("PIC 0", "Xcvr 4").unwrap();
        assert_eq!(xcvr.channels.len(), 4);
        assert_eq!(xcvr.channels[0].channel, ChannelId::Default);
        assert_eq!(xcvr.channels[0].speed, PortSpeed::NotApplicable);
        for channel in &xcvr.channels[1..] {
            assert_eq!(channel.serial, "SN04");
            assert_eq!(channel.speed, PortSpeed::Gbps(100));
        }
    }

    #[test]
    fn test_layer3_requires_address() {
        let mut lc = linecard(0, &[(0, 0), (0, 1), (0, 2)]);
        let interfaces = vec![
            iface("et-0/0/0", "up", "100Gbps", Layer::L3, None),
            iface("et-0/0/1", "up", "400Gbps", Layer::L3, Some("10.0.0.1")),
            iface("et-0/0/2", "up", "100Gbps", Layer::Undetermined, None),
        ];

        let capacity = tally_linecard(&mut lc, &interfaces);

        assert_eq!(capacity.ports_in_use, 1);
        assert_eq!(capacity.capacity_gbps, 400);
    }

    #[test]
    fn test_only_matching_slot_and_inventory_counted() {
        let mut lc = linecard(1, &[(0, 0)]);
        let interfaces = vec![
            iface("et-0/0/0", "up", "100Gbps", Layer::L2, None),
            iface("et-1/0/0", "up", "100Gbps", Layer::L2, None),
            iface("et-1/0/9", "up", "100Gbps", Layer::L2, None),
            iface("et-1/3/0", "up", "100Gbps", Layer::L2, None),
        ];

        let capacity = tally_linecard(&mut lc, &interfaces);

        assert_eq!(capacity.ports_in_use, 1);
        assert_eq!(capacity.capacity_gbps, 100);
        assert_eq!(lc.ports.leaf_count(), 1);
    }

    #[test]
    fn test_non_numeric_speed_counts_zero() {
        let mut lc = linecard(0, &[(0, 0)]);
        let interfaces = vec![iface("et-0/0/0", "up", "Unspecified", Layer::L2, None)];

        let capacity = tally_linecard(&mut lc, &interfaces);

        assert_eq!(capacity.ports_in_use, 1);
        assert_eq!(capacity.capacity_gbps, 0);
    }
}
