//! Capacity report data model
//!
//! The port inventory is an explicit tree: PIC → transceiver → channel. Children keep their
//! insertion order so report rows follow inventory traversal order.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Placeholder for missing inventory details and unused port speeds
pub const NOT_APPLICABLE: &str = "N/A";

/// Parse the numeric part of a raw speed string (`100Gbps` → 100)
///
/// Only the first run of digits is read; strings without digits yield `None`.
#[must_use]
pub fn parse_speed(raw: &str) -> Option<u64> {
    let start = raw.find(|c: char| c.is_ascii_digit())?;
    let digits: String = raw[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

// ============================================================================
// Interfaces
// ============================================================================

/// Network layer an interface is configured for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    L2,
    L3,
    Undetermined,
}

/// Annotated physical interface
#[derive(Debug, Clone, Serialize)]
pub struct PhysicalInterfaceRecord {
    pub name: String,
    /// Lowercased admin status (`up`, `down`)
    pub admin_status: String,
    /// Lowercased operational status
    pub oper_status: String,
    /// Raw speed string, rewritten to the bundle minimum for bundle members
    pub speed: String,
    pub layer: Layer,
    pub address: Option<String>,
    /// Bundle logical interface this interface belongs to
    pub bundle: Option<String>,
    pub logical_interface: Option<String>,
}

impl PhysicalInterfaceRecord {
    /// Whether the interface counts toward ports in use
    #[must_use]
    pub fn is_in_use(&self) -> bool {
        self.admin_status == "up"
            && match self.layer {
                Layer::L2 => true,
                Layer::L3 => self.address.is_some(),
                Layer::Undetermined => false,
            }
    }

    /// Numeric speed, zero when the speed string has no digits
    #[must_use]
    pub fn speed_gbps(&self) -> u64 {
        parse_speed(&self.speed).unwrap_or(0)
    }
}

// ============================================================================
// Port Inventory Tree
// ============================================================================

/// Channel key within a transceiver
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ChannelId {
    /// The transceiver itself, when not channelized
    Default,
    Numbered(u32),
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelId::Default => f.write_str("default"),
            ChannelId::Numbered(n) => write!(f, "{n}"),
        }
    }
}

/// Resolved port speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PortSpeed {
    NotApplicable,
    Gbps(u64),
}

impl fmt::Display for PortSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortSpeed::NotApplicable => f.write_str(NOT_APPLICABLE),
            PortSpeed::Gbps(n) => write!(f, "{n}"),
        }
    }
}

/// Leaf of the port inventory
#[derive(Debug, Clone, Serialize)]
pub struct ChannelNode {
    pub channel: ChannelId,
    pub model: String,
    pub serial: String,
    pub speed: PortSpeed,
}

/// Transceiver slot and its channels; the default channel is always first
#[derive(Debug, Clone, Serialize)]
pub struct Transceiver {
    pub name: String,
    pub channels: Vec<ChannelNode>,
}

impl Transceiver {
    fn default_channel(&self) -> Option<&ChannelNode> {
        self.channels.iter().find(|c| c.channel == ChannelId::Default)
    }
}

/// Pluggable interface card
#[derive(Debug, Clone, Serialize)]
pub struct Pic {
    pub name: String,
    pub transceivers: Vec<Transceiver>,
}

/// Port inventory of one linecard
#[derive(Debug, Clone, Default, Serialize)]
pub struct PortInventory {
    pics: Vec<Pic>,
}

impl PortInventory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a transceiver with its default channel
    ///
    /// Returns `false` and leaves the tree unchanged if the PIC/transceiver key already exists.
    pub fn insert_transceiver(
        &mut self,
        pic: &str,
        transceiver: &str,
        model: impl Into<String>,
        serial: impl Into<String>,
    ) -> bool {
        let pic_index = match self.pics.iter().position(|p| p.name == pic) {
            Some(index) => index,
            None => {
                self.pics.push(Pic {
                    name: pic.to_string(),
                    transceivers: Vec::new(),
                });
                self.pics.len() - 1
            }
        };

        let pic = &mut self.pics[pic_index];
        if pic.transceivers.iter().any(|t| t.name == transceiver) {
            return false;
        }

        pic.transceivers.push(Transceiver {
            name: transceiver.to_string(),
            channels: vec![ChannelNode {
                channel: ChannelId::Default,
                model: model.into(),
                serial: serial.into(),
                speed: PortSpeed::NotApplicable,
            }],
        });
        true
    }

    /// Whether the PIC/transceiver pair exists
    #[must_use]
    pub fn contains(&self, pic: &str, transceiver: &str) -> bool {
        self.transceiver(pic, transceiver).is_some()
    }

    #[must_use]
    pub fn transceiver(&self, pic: &str, transceiver: &str) -> Option<&Transceiver> {
        self.pics
            .iter()
            .find(|p| p.name == pic)?
            .transceivers
            .iter()
            .find(|t| t.name == transceiver)
    }

    fn transceiver_mut(&mut self, pic: &str, transceiver: &str) -> Option<&mut Transceiver> {
        self.pics
            .iter_mut()
            .find(|p| p.name == pic)?
            .transceivers
            .iter_mut()
            .find(|t| t.name == transceiver)
    }

    /// Write a speed into a channel node
    ///
    /// Non-default channels are created on demand and always take the default channel's model
    /// and serial. Returns `false` if the transceiver does not exist.
    pub fn set_speed(
        &mut self,
        pic: &str,
        transceiver: &str,
        channel: &ChannelId,
        speed: PortSpeed,
    ) -> bool {
        let Some(xcvr) = self.transceiver_mut(pic, transceiver) else {
            return false;
        };

        if *channel != ChannelId::Default {
            let (model, serial) = xcvr.default_channel().map_or_else(
                || (NOT_APPLICABLE.to_string(), NOT_APPLICABLE.to_string()),
                |d| (d.model.clone(), d.serial.clone()),
            );

            match xcvr.channels.iter_mut().find(|c| c.channel == *channel) {
                Some(node) => {
                    node.model = model;
                    node.serial = serial;
                }
                None => xcvr.channels.push(ChannelNode {
                    channel: channel.clone(),
                    model,
                    serial,
                    speed: PortSpeed::NotApplicable,
                }),
            }
        }

        if let Some(node) = xcvr.channels.iter_mut().find(|c| c.channel == *channel) {
            node.speed = speed;
        }
        true
    }

    /// PICs in insertion order
    #[must_use]
    pub fn pics(&self) -> &[Pic] {
        &self.pics
    }

    /// Number of transceiver slots
    #[must_use]
    pub fn transceiver_count(&self) -> usize {
        self.pics.iter().map(|p| p.transceivers.len()).sum()
    }

    /// All channel leaves in traversal order
    pub fn leaves(&self) -> impl Iterator<Item = (&Pic, &Transceiver, &ChannelNode)> {
        self.pics.iter().flat_map(|pic| {
            pic.transceivers.iter().flat_map(move |xcvr| {
                xcvr.channels.iter().map(move |channel| (pic, xcvr, channel))
            })
        })
    }

    /// Number of channel leaves
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.leaves().count()
    }
}

// ============================================================================
// Device Records
// ============================================================================

/// Capacity figures for one linecard
#[derive(Debug, Clone, Serialize)]
pub struct LinecardRecord {
    /// Inventory name (`FPC 0`)
    pub name: String,
    pub slot: u32,
    pub model: String,
    pub serial: String,
    pub version: String,
    pub ports_installed: usize,
    pub channelized_ports: usize,
    pub ports_in_use: usize,
    pub capacity_gbps: u64,
    pub ports: PortInventory,
}

/// Chassis-wide sums across linecards
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CapacityTotals {
    pub ports_in_use: usize,
    pub ports_installed: usize,
    pub capacity_gbps: u64,
}

impl CapacityTotals {
    /// Sum the linecard figures
    #[must_use]
    pub fn from_linecards(linecards: &[LinecardRecord]) -> Self {
        linecards.iter().fold(Self::default(), |acc, lc| Self {
            ports_in_use: acc.ports_in_use + lc.ports_in_use,
            ports_installed: acc.ports_installed + lc.ports_installed,
            capacity_gbps: acc.capacity_gbps + lc.capacity_gbps,
        })
    }
}

/// Vendor-reported license figures
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LicenseUsage {
    pub used: u64,
    pub available: u64,
    /// `available - used`; negative when over-subscribed
    pub remaining: i64,
}

/// Everything collected for one device
#[derive(Debug, Clone, Serialize)]
pub struct DeviceRecord {
    pub hostname: String,
    pub version: String,
    pub chassis_model: String,
    pub chassis_serial: String,
    pub linecards: Vec<LinecardRecord>,
    pub totals: CapacityTotals,
    pub license: LicenseUsage,
    pub collected_at: DateTime<Utc>,
}

impl DeviceRecord {
    /// Number of report rows this record produces
    #[must_use]
    pub fn row_count(&self) -> usize {
        1 + self
            .linecards
            .iter()
            .map(|lc| 1 + lc.ports.leaf_count())
            .sum::<usize>()
    }
}
