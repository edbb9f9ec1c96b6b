//! Configuration types for fleet collection

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::classify::DEFAULT_MEDIA_PREFIXES;
use crate::error::CoreError;

/// Settings for one collection run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Maximum devices collected at once (unbounded when unset)
    #[serde(default)]
    pub concurrency: Option<usize>,
    /// Seconds allowed for opening a device session
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Media prefixes of interfaces counted for capacity
    #[serde(default = "default_interface_prefixes")]
    pub interface_prefixes: Vec<String>,
    /// License reconciliation settings
    #[serde(default)]
    pub license: LicenseConfig,
}

fn default_connect_timeout_secs() -> u64 {
    30
}

fn default_interface_prefixes() -> Vec<String> {
    DEFAULT_MEDIA_PREFIXES
        .iter()
        .map(ToString::to_string)
        .collect()
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            concurrency: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            interface_prefixes: default_interface_prefixes(),
            license: LicenseConfig::default(),
        }
    }
}

impl CollectionConfig {
    /// Session open timeout
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Check settings that have no usable interpretation
    ///
    /// # Errors
    /// Returns `CoreError::ConfigError` for a zero concurrency limit, a zero timeout, or an
    /// empty prefix list.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.concurrency == Some(0) {
            return Err(CoreError::ConfigError(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.connect_timeout_secs == 0 {
            return Err(CoreError::ConfigError(
                "connect_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.interface_prefixes.is_empty() {
            return Err(CoreError::ConfigError(
                "interface_prefixes must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Version thresholds at which devices start metering bandwidth licenses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseConfig {
    /// First base OS release that reports license usage
    #[serde(default = "default_base_threshold")]
    pub base_threshold: String,
    /// First evolved OS release that reports license usage
    #[serde(default = "default_evolved_threshold")]
    pub evolved_threshold: String,
    /// Description of the feature-summary entry carrying the bandwidth figures
    #[serde(default = "default_feature_description")]
    pub feature_description: String,
}

fn default_base_threshold() -> String {
    "22.2R1".to_string()
}

fn default_evolved_threshold() -> String {
    "21.1".to_string()
}

fn default_feature_description() -> String {
    "Port Bandwidth Usage (PAYG license)".to_string()
}

impl Default for LicenseConfig {
    fn default() -> Self {
        Self {
            base_threshold: default_base_threshold(),
            evolved_threshold: default_evolved_threshold(),
            feature_description: default_feature_description(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CollectionConfig::default();

        assert_eq!(config.concurrency, None);
        assert_eq!(config.connect_timeout(), Duration::from_secs(30));
        assert_eq!(config.interface_prefixes.len(), 5);
        assert_eq!(config.license.base_threshold, "22.2R1");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_deserialization_fills_defaults() {
        let config: CollectionConfig = serde_json::from_str(r#"{"concurrency": 4}"#).unwrap();

        assert_eq!(config.concurrency, Some(4));
        assert_eq!(config.license.evolved_threshold, "21.1");
        assert!(config.interface_prefixes.contains(&"xle".to_string()));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let config = CollectionConfig {
            concurrency: Some(0),
            ..CollectionConfig::default()
        };

        assert!(matches!(config.validate(), Err(CoreError::ConfigError(_))));
    }
}
