//! Bandwidth license reconciliation

use fleetcap_source::types::LicenseSummary;

use crate::config::LicenseConfig;
use crate::model::LicenseUsage;

/// Whether the firmware is new enough to meter bandwidth licenses
///
/// Evolved releases carry `EVO` in their version string. Versions are compared as plain
/// strings, the way the release numbers sort in practice for the supported trains.
#[must_use]
pub fn reports_license_usage(version: &str, config: &LicenseConfig) -> bool {
    let threshold = if version.to_uppercase().contains("EVO") {
        &config.evolved_threshold
    } else {
        &config.base_threshold
    };
    version >= threshold.as_str()
}

fn count(value: Option<&String>) -> u64 {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}

/// Reconcile vendor-reported license usage for a device
///
/// Below the version threshold the figures are all zero regardless of `summary`; the port
/// tally is the only source of truth there. Missing entries or fields count as zero.
#[must_use]
pub fn reconcile(
    version: &str,
    summary: Option<&LicenseSummary>,
    config: &LicenseConfig,
) -> LicenseUsage {
    if !reports_license_usage(version, config) {
        return LicenseUsage::default();
    }

    let Some(feature) = summary.and_then(|s| {
        s.feature_summaries
            .iter()
            .find(|f| {
                f.description.as_deref().map(str::trim)
                    == Some(config.feature_description.as_str())
            })
    }) else {
        return LicenseUsage::default();
    };

    let used = count(feature.used_licensed.as_ref());
    let available = count(feature.licensed.as_ref());

    #[allow(clippy::cast_possible_wrap)]
    let remaining = available as i64 - used as i64;

    LicenseUsage {
        used,
        available,
        remaining,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetcap_source::types::FeatureSummary;

    fn summary(used: &str, licensed: &str) -> LicenseSummary {
        LicenseSummary {
            feature_summaries: vec![
                FeatureSummary {
                    name: Some("scale-subscriber".to_string()),
                    description: Some("Subscriber scale".to_string()),
                    licensed: Some("9".to_string()),
                    used_licensed: Some("9".to_string()),
                },
                FeatureSummary {
                    name: Some("port-bw-usage".to_string()),
                    description: Some("Port Bandwidth Usage (PAYG license)".to_string()),
                    licensed: Some(licensed.to_string()),
                    used_licensed: Some(used.to_string()),
                },
            ],
        }
    }

    #[test]
    fn test_thresholds() {
        let config = LicenseConfig::default();

        assert!(!reports_license_usage("21.4R3-S5.4", &config));
        assert!(reports_license_usage("22.2R1", &config));
        assert!(reports_license_usage("23.2R1.14", &config));
        assert!(!reports_license_usage("20.4R3-S2-EVO", &config));
        assert!(reports_license_usage("21.1R1-EVO", &config));
        assert!(reports_license_usage("22.4R2-s1-evo", &config));
    }

    #[test]
    fn test_below_threshold_is_zero() {
        let config = LicenseConfig::default();
        let summary = summary("800", "1200");

        let usage = reconcile("21.2R3", Some(&summary), &config);

        assert_eq!(usage, LicenseUsage::default());
    }

    #[test]
    fn test_above_threshold_reads_feature() {
        let config = LicenseConfig::default();
        let summary = summary("800", "1200");

        let usage = reconcile("22.4R2", Some(&summary), &config);

        assert_eq!(usage.used, 800);
        assert_eq!(usage.available, 1200);
        assert_eq!(usage.remaining, 400);
    }

    #[test]
    fn test_oversubscribed_remaining_is_negative() {
        let config = LicenseConfig::default();

        let usage = reconcile("23.1R1", Some(&summary("1500", "1000")), &config);

        assert_eq!(usage.remaining, -500);
    }

    #[test]
    fn test_missing_data_defaults_to_zero() {
        let config = LicenseConfig::default();

        assert_eq!(reconcile("23.1R1", None, &config), LicenseUsage::default());
        assert_eq!(
            reconcile("23.1R1", Some(&LicenseSummary::default()), &config),
            LicenseUsage::default()
        );

        let usage = reconcile("23.1R1", Some(&summary("n/a", "400")), &config);
        assert_eq!(usage.used, 0);
        assert_eq!(usage.available, 400);
        assert_eq!(usage.remaining, 400);
    }
}
