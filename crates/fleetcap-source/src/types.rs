//! Telemetry document definitions
//!
//! Field names follow the device's normalized RPC reply vocabulary (kebab-case), so captured
//! replies deserialize without a translation layer. Every leaf is optional: the core applies
//! default substitution instead of rejecting partial documents.

use serde::{Deserialize, Serialize};

// ============================================================================
// Documents
// ============================================================================

/// Telemetry documents a session can retrieve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Document {
    Facts,
    ChassisInventory,
    InterfaceInformation,
    InterfaceConfiguration,
    LicenseSummary,
}

impl Document {
    /// Stable document name, used as the fetch-program argument
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Document::Facts => "facts",
            Document::ChassisInventory => "chassis-inventory",
            Document::InterfaceInformation => "interface-information",
            Document::InterfaceConfiguration => "interface-configuration",
            Document::LicenseSummary => "license-summary",
        }
    }

    /// File name used inside a per-device capture directory
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Document::Facts => "facts.json",
            Document::ChassisInventory => "chassis_inventory.json",
            Document::InterfaceInformation => "interface_information.json",
            Document::InterfaceConfiguration => "interface_config.set",
            Document::LicenseSummary => "license_summary.json",
        }
    }
}

impl std::fmt::Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Facts
// ============================================================================

/// Basic device facts gathered when a session opens
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DeviceFacts {
    /// Hostname reported by the device
    pub hostname: Option<String>,
    /// Firmware version string (e.g. `22.4R2-S1.6` or `21.4R3-S2-EVO`)
    #[serde(default)]
    pub version: String,
}

// ============================================================================
// Chassis Inventory
// ============================================================================

/// Chassis hardware inventory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ChassisInventory {
    /// Top-level chassis entry; its children are the chassis modules
    #[serde(default)]
    pub chassis: Module,
}

/// One entry of the hardware inventory tree
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Module {
    /// Module name (`FPC 0`, `PIC 1`, `Xcvr 3`, ...)
    pub name: Option<String>,
    /// Model description
    pub description: Option<String>,
    /// Serial number
    pub serial_number: Option<String>,
    /// Hardware revision
    pub version: Option<String>,
    /// Nested modules
    #[serde(default)]
    pub modules: Vec<Module>,
}

impl Module {
    /// Create a named module with no details
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Set model description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set serial number
    #[must_use]
    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial_number = Some(serial.into());
        self
    }

    /// Set hardware revision
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Append a child module
    #[must_use]
    pub fn with_module(mut self, module: Module) -> Self {
        self.modules.push(module);
        self
    }
}

// ============================================================================
// Interface Information
// ============================================================================

/// Interface information (media + detail)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InterfaceInformation {
    #[serde(default)]
    pub physical_interfaces: Vec<PhysicalInterface>,
}

/// Physical interface entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PhysicalInterface {
    pub name: Option<String>,
    pub admin_status: Option<String>,
    pub oper_status: Option<String>,
    /// Raw speed string (`100Gbps`, `Unspecified`, ...)
    pub speed: Option<String>,
    #[serde(default)]
    pub logical_interfaces: Vec<LogicalInterface>,
}

impl PhysicalInterface {
    /// Create a physical interface entry
    pub fn new(
        name: impl Into<String>,
        admin_status: impl Into<String>,
        oper_status: impl Into<String>,
        speed: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            admin_status: Some(admin_status.into()),
            oper_status: Some(oper_status.into()),
            speed: Some(speed.into()),
            logical_interfaces: Vec::new(),
        }
    }

    /// Append a logical interface
    #[must_use]
    pub fn with_logical(mut self, logical: LogicalInterface) -> Self {
        self.logical_interfaces.push(logical);
        self
    }
}

/// Logical (unit) interface entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LogicalInterface {
    pub name: Option<String>,
    #[serde(default)]
    pub address_families: Vec<AddressFamily>,
}

impl LogicalInterface {
    /// Logical interface with a single directly configured address
    pub fn with_address(name: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            address_families: vec![AddressFamily {
                name: Some("inet".to_string()),
                ae_bundle_name: None,
                interface_addresses: vec![InterfaceAddress {
                    ifa_local: Some(local.into()),
                }],
            }],
        }
    }

    /// Logical interface that is a member of an aggregated bundle
    pub fn bundle_member(name: impl Into<String>, bundle: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            address_families: vec![AddressFamily {
                name: Some("aenet".to_string()),
                ae_bundle_name: Some(bundle.into()),
                interface_addresses: Vec::new(),
            }],
        }
    }
}

/// Address family configured on a logical interface
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AddressFamily {
    pub name: Option<String>,
    /// Bundle logical interface this unit belongs to (`ae0.0`)
    pub ae_bundle_name: Option<String>,
    #[serde(default)]
    pub interface_addresses: Vec<InterfaceAddress>,
}

/// Interface address entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InterfaceAddress {
    pub ifa_local: Option<String>,
}

// ============================================================================
// License Summary
// ============================================================================

/// License summary information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LicenseSummary {
    #[serde(default)]
    pub feature_summaries: Vec<FeatureSummary>,
}

/// Metering entry for one licensed feature
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FeatureSummary {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Licensed quantity
    pub licensed: Option<String>,
    /// Quantity in use
    pub used_licensed: Option<String>,
}
