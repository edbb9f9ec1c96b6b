//! Logical address resolution across aggregated bundles

use std::collections::{HashMap, HashSet};

use fleetcap_source::types::{InterfaceInformation, LogicalInterface};
use tracing::warn;

use crate::model::{PhysicalInterfaceRecord, parse_speed};

/// Maximum bundle nesting followed before giving up
pub const MAX_BUNDLE_DEPTH: usize = 8;

/// Address found for a physical interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressResolution {
    /// Logical interface on the physical port that led to the address
    pub logical_interface: String,
    pub address: String,
    /// Bundle the port is a member of, when the address came from it
    pub bundle: Option<String>,
}

/// Resolves addresses against one interface information document
pub struct AddressResolver<'a> {
    info: &'a InterfaceInformation,
}

impl<'a> AddressResolver<'a> {
    pub fn new(info: &'a InterfaceInformation) -> Self {
        Self { info }
    }

    /// Logical interfaces named by `target`, in document order
    ///
    /// A logical interface matches when its name equals `target` or extends it with a unit
    /// (`et-0/0/1` matches `et-0/0/1.0` but not `et-0/0/10.0`).
    fn logical_interfaces(&self, target: &str) -> Vec<(&'a str, &'a LogicalInterface)> {
        self.info
            .physical_interfaces
            .iter()
            .flat_map(|p| p.logical_interfaces.iter())
            .filter_map(|logical| {
                let name = logical.name.as_deref()?.trim();
                let matches = name == target
                    || name
                        .strip_prefix(target)
                        .is_some_and(|rest| rest.starts_with('.'));
                matches.then_some((name, logical))
            })
            .collect()
    }

    /// Resolve the first address reachable from `physical`
    #[must_use]
    pub fn resolve(&self, physical: &str) -> Option<AddressResolution> {
        let mut visited = HashSet::new();
        self.resolve_target(physical, &mut visited, 0)
    }

    fn resolve_target(
        &self,
        target: &str,
        visited: &mut HashSet<String>,
        depth: usize,
    ) -> Option<AddressResolution> {
        if depth > MAX_BUNDLE_DEPTH {
            warn!(interface = %target, depth, "bundle nesting too deep, giving up");
            return None;
        }
        if !visited.insert(target.to_string()) {
            warn!(interface = %target, "bundle membership cycle detected");
            return None;
        }

        for (name, logical) in self.logical_interfaces(target) {
            let bundle = logical
                .address_families
                .iter()
                .find_map(|family| family.ae_bundle_name.as_deref())
                .map(str::trim);

            let resolution = match bundle {
                Some(bundle) => self
                    .resolve_target(bundle, visited, depth + 1)
                    .map(|inner| AddressResolution {
                        logical_interface: name.to_string(),
                        address: inner.address,
                        bundle: Some(bundle.to_string()),
                    }),
                None => direct_address(logical).map(|address| AddressResolution {
                    logical_interface: name.to_string(),
                    address,
                    bundle: None,
                }),
            };

            if resolution.is_some() {
                return resolution;
            }
        }

        None
    }
}

/// First local address configured on a logical interface
fn direct_address(logical: &LogicalInterface) -> Option<String> {
    logical
        .address_families
        .iter()
        .flat_map(|family| family.interface_addresses.iter())
        .find_map(|address| address.ifa_local.as_deref())
        .map(|address| address.trim().to_string())
}

/// Rewrite every bundle member's speed to the slowest member's speed
///
/// Members whose speed has no numeric part do not take part in the minimum.
pub fn normalize_bundle_speeds(records: &mut [PhysicalInterfaceRecord]) {
    let mut minimums: HashMap<String, u64> = HashMap::new();
    for record in records.iter() {
        if let (Some(bundle), Some(speed)) = (&record.bundle, parse_speed(&record.speed)) {
            minimums
                .entry(bundle.clone())
                .and_modify(|min| *min = (*min).min(speed))
                .or_insert(speed);
        }
    }

    for record in records.iter_mut() {
        if let Some(min) = record.bundle.as_ref().and_then(|b| minimums.get(b)) {
            record.speed = format!("{min}Gbps");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Layer;
    use fleetcap_source::types::PhysicalInterface;

    fn info(interfaces: Vec<PhysicalInterface>) -> InterfaceInformation {
        InterfaceInformation {
            physical_interfaces: interfaces,
        }
    }

    #[test]
    fn test_direct_address() {
        let info = info(vec![
            PhysicalInterface::new("et-0/0/10", "up", "up", "100Gbps")
                .with_logical(LogicalInterface::with_address("et-0/0/10.0", "10.9.9.9")),
            PhysicalInterface::new("et-0/0/1", "up", "up", "100Gbps")
                .with_logical(LogicalInterface {
                    name: Some("et-0/0/1.16386".to_string()),
                    address_families: vec![],
                })
                .with_logical(LogicalInterface::with_address("et-0/0/1.0", "10.0.0.1")),
        ]);

        let resolution = AddressResolver::new(&info).resolve("et-0/0/1").unwrap();

        assert_eq!(resolution.logical_interface, "et-0/0/1.0");
        assert_eq!(resolution.address, "10.0.0.1");
        assert_eq!(resolution.bundle, None);
    }

    #[test]
    fn test_bundle_member_takes_bundle_address() {
        let info = info(vec![
            PhysicalInterface::new("et-0/0/0", "up", "up", "100Gbps")
                .with_logical(LogicalInterface::bundle_member("et-0/0/0.0", "ae0.0")),
            PhysicalInterface::new("ae0", "up", "up", "200Gbps")
                .with_logical(LogicalInterface::with_address("ae0.0", "192.0.2.1")),
        ]);

        let resolution = AddressResolver::new(&info).resolve("et-0/0/0").unwrap();

        assert_eq!(resolution.logical_interface, "et-0/0/0.0");
        assert_eq!(resolution.address, "192.0.2.1");
        assert_eq!(resolution.bundle.as_deref(), Some("ae0.0"));
    }

    #[test]
    fn test_unaddressed_bundle_yields_nothing() {
        let info = info(vec![
            PhysicalInterface::new("et-0/0/0", "up", "up", "100Gbps")
                .with_logical(LogicalInterface::bundle_member("et-0/0/0.0", "ae3.0")),
        ]);

        assert!(AddressResolver::new(&info).resolve("et-0/0/0").is_none());
    }

    #[test]
    fn test_cycle_terminates() {
        let info = info(vec![
            PhysicalInterface::new("ae1", "up", "up", "100Gbps")
                .with_logical(LogicalInterface::bundle_member("ae1.0", "ae2.0")),
            PhysicalInterface::new("ae2", "up", "up", "100Gbps")
                .with_logical(LogicalInterface::bundle_member("ae2.0", "ae1.0")),
        ]);

        assert!(AddressResolver::new(&info).resolve("ae1").is_none());
    }

    /// `et-0/0/0` nested through `bundles` bundles; only the innermost carries an address
    fn nested_bundles(bundles: usize) -> InterfaceInformation {
        let mut interfaces = vec![
            PhysicalInterface::new("et-0/0/0", "up", "up", "100Gbps")
                .with_logical(LogicalInterface::bundle_member("et-0/0/0.0", "ae1.0")),
        ];
        for n in 1..bundles {
            interfaces.push(
                PhysicalInterface::new(format!("ae{n}"), "up", "up", "100Gbps").with_logical(
                    LogicalInterface::bundle_member(format!("ae{n}.0"), format!("ae{}.0", n + 1)),
                ),
            );
        }
        interfaces.push(
            PhysicalInterface::new(format!("ae{bundles}"), "up", "up", "100Gbps").with_logical(
                LogicalInterface::with_address(format!("ae{bundles}.0"), "192.0.2.9"),
            ),
        );
        info(interfaces)
    }

    #[test]
    fn test_bundle_nesting_limit() {
        let at_limit = nested_bundles(MAX_BUNDLE_DEPTH);
        let resolution = AddressResolver::new(&at_limit).resolve("et-0/0/0").unwrap();
        assert_eq!(resolution.address, "192.0.2.9");
        assert_eq!(resolution.bundle.as_deref(), Some("ae1.0"));

        let too_deep = nested_bundles(MAX_BUNDLE_DEPTH + 1);
        assert!(AddressResolver::new(&too_deep).resolve("et-0/0/0").is_none());
    }

    fn member(name: &str, speed: &str, bundle: Option<&str>) -> PhysicalInterfaceRecord {
        PhysicalInterfaceRecord {
            name: name.to_string(),
            admin_status: "up".to_string(),
            oper_status: "up".to_string(),
            speed: speed.to_string(),
            layer: Layer::L3,
            address: Some("192.0.2.1".to_string()),
            bundle: bundle.map(ToString::to_string),
            logical_interface: None,
        }
    }

    #[test]
    fn test_bundle_speeds_normalize_to_minimum() {
        let mut records = vec![
            member("et-0/0/0", "100Gbps", Some("ae0.0")),
            member("et-0/0/1", "40Gbps", Some("ae0.0")),
            member("et-0/0/2", "100Gbps", Some("ae0.0")),
            member("et-0/0/3", "100Gbps", None),
            member("et-0/0/4", "10Gbps", Some("ae1.0")),
        ];

        normalize_bundle_speeds(&mut records);

        let speeds: Vec<&str> = records.iter().map(|r| r.speed.as_str()).collect();
        assert_eq!(
            speeds,
            vec!["40Gbps", "40Gbps", "40Gbps", "100Gbps", "10Gbps"]
        );
    }

    #[test]
    fn test_unparseable_member_speed_is_ignored() {
        let mut records = vec![
            member("et-0/0/0", "Unspecified", Some("ae0.0")),
            member("et-0/0/1", "100Gbps", Some("ae0.0")),
        ];

        normalize_bundle_speeds(&mut records);

        assert_eq!(records[0].speed, "100Gbps");
        assert_eq!(records[1].speed, "100Gbps");
    }
}
