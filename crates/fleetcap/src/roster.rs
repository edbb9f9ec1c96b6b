//! Roster loading from YAML or the inline device list

use std::path::PathBuf;

use fleetcap_core::{CoreError, FleetRoster, StaticRoster};
use serde::Deserialize;

use crate::config::Config;

/// `hosts.yaml` layout
#[derive(Debug, Deserialize)]
struct HostsFile {
    #[serde(default)]
    hosts: Vec<String>,
}

/// Roster read from a YAML file with a `hosts:` list
#[derive(Debug, Clone)]
pub struct YamlRoster {
    path: PathBuf,
}

impl YamlRoster {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FleetRoster for YamlRoster {
    fn devices(&self) -> Result<Vec<String>, CoreError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            CoreError::RosterUnavailable(format!("failed to read {}: {e}", self.path.display()))
        })?;
        let file: HostsFile = serde_yaml::from_str(&content).map_err(|e| {
            CoreError::RosterUnavailable(format!("failed to parse {}: {e}", self.path.display()))
        })?;

        Ok(file
            .hosts
            .into_iter()
            .map(|host| host.trim().to_string())
            .filter(|host| !host.is_empty())
            .collect())
    }
}

/// Pick the roster: the YAML file when set, otherwise the inline device list
///
/// # Errors
/// Returns error if neither a roster file nor inline devices are configured
pub fn build_roster(config: &Config) -> eyre::Result<Box<dyn FleetRoster>> {
    if let Some(path) = &config.roster_file {
        return Ok(Box::new(YamlRoster::new(path)));
    }
    if config.devices.is_empty() {
        eyre::bail!("no devices configured; set roster_file or devices, or pass device names");
    }
    Ok(Box::new(StaticRoster::new(config.devices.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("fleetcap-roster-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_yaml_roster_keeps_order() {
        let path = write_temp("hosts.yaml", "hosts:\n  - edge2\n  - edge1\n  - ' core1 '\n");

        let devices = YamlRoster::new(&path).devices().unwrap();

        assert_eq!(devices, vec!["edge2", "edge1", "core1"]);
    }

    #[test]
    fn test_missing_yaml_roster_is_unavailable() {
        let roster = YamlRoster::new("/nonexistent/fleetcap/hosts.yaml");

        assert!(matches!(
            roster.devices(),
            Err(CoreError::RosterUnavailable(_))
        ));
    }

    #[test]
    fn test_malformed_yaml_roster_is_unavailable() {
        let path = write_temp("broken.yaml", "hosts: [edge1\n");

        assert!(matches!(
            YamlRoster::new(&path).devices(),
            Err(CoreError::RosterUnavailable(_))
        ));
    }

    #[test]
    fn test_inline_devices() {
        let config = Config {
            devices: vec!["a".to_string(), "b".to_string()],
            ..Config::default()
        };

        let roster = build_roster(&config).unwrap();

        assert_eq!(roster.devices().unwrap(), vec!["a", "b"]);
        assert!(build_roster(&Config::default()).is_err());
    }
}
