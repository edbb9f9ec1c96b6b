//! Interface layer classification from `set`-format configuration

use crate::model::Layer;

/// Media prefixes of interfaces that take part in capacity accounting
pub const DEFAULT_MEDIA_PREFIXES: [&str; 5] = ["et", "ge", "xe", "xle", "fte"];

const DEACTIVATE: &str = "deactivate";

/// Whether `name` is a media interface (`<prefix>-...`) for one of `prefixes`
#[must_use]
pub fn is_media_interface(name: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| {
        name.strip_prefix(prefix.as_str())
            .is_some_and(|rest| rest.starts_with('-'))
    })
}

/// Drop deactivated statements from raw configuration text
///
/// Every `deactivate X` line is removed along with every line containing statement `X` on
/// token boundaries.
#[must_use]
pub fn active_configuration(raw: &str) -> Vec<&str> {
    let deactivated: Vec<&str> = raw
        .lines()
        .filter_map(|line| {
            let rest = line.trim().strip_prefix(DEACTIVATE)?;
            rest.starts_with(char::is_whitespace).then(|| rest.trim())
        })
        .filter(|statement| !statement.is_empty())
        .collect();

    raw.lines()
        .filter(|line| !line.trim_start().starts_with(DEACTIVATE))
        .filter(|line| {
            !deactivated
                .iter()
                .any(|statement| contains_statement(line, statement))
        })
        .collect()
}

/// Substring match that only accepts whole-token occurrences
fn contains_statement(line: &str, statement: &str) -> bool {
    line.match_indices(statement).any(|(start, matched)| {
        let before_ok = line[..start]
            .chars()
            .next_back()
            .is_none_or(char::is_whitespace);
        let after_ok = line[start + matched.len()..]
            .chars()
            .next()
            .is_none_or(char::is_whitespace);
        before_ok && after_ok
    })
}

/// Configuration lines that reference interface `name` as a whole token
#[must_use]
pub fn interface_lines<'a>(config: &[&'a str], name: &str) -> Vec<&'a str> {
    config
        .iter()
        .copied()
        .filter(|line| line.split_whitespace().any(|token| token == name))
        .collect()
}

/// Assign a layer to an interface from the configuration lines that reference it
///
/// Trunk switching with VLAN membership, or any MPLS family, is layer 2 and takes precedence
/// over link-aggregation membership or IPv4/IPv6 addressing, which is layer 3.
#[must_use]
pub fn classify(lines: &[&str]) -> Layer {
    let has = |needle: &str| lines.iter().any(|line| line.contains(needle));

    let trunk = has("ethernet-switching interface-mode trunk")
        && has("ethernet-switching vlan members");
    if trunk || has("family mpls") {
        return Layer::L2;
    }

    if has("ether-options 802.3ad")
        || has("family inet address")
        || has("family inet6 address")
    {
        return Layer::L3;
    }

    Layer::Undetermined
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefixes() -> Vec<String> {
        DEFAULT_MEDIA_PREFIXES.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_media_prefixes() {
        let prefixes = prefixes();
        assert!(is_media_interface("et-0/0/0", &prefixes));
        assert!(is_media_interface("xle-1/2/3:1", &prefixes));
        assert!(is_media_interface("fte-0/1/0", &prefixes));
        assert!(!is_media_interface("ae0", &prefixes));
        assert!(!is_media_interface("em0", &prefixes));
        assert!(!is_media_interface("lo0", &prefixes));
        assert!(!is_media_interface("etx-0/0/0", &prefixes));
    }

    #[test]
    fn test_trunk_with_vlans_is_layer2() {
        let lines = [
            "set interfaces xe-0/0/1 unit 0 family ethernet-switching interface-mode trunk",
            "set interfaces xe-0/0/1 unit 0 family ethernet-switching vlan members v100",
        ];
        assert_eq!(classify(&lines), Layer::L2);
    }

    #[test]
    fn test_trunk_without_vlans_is_not_layer2() {
        let lines = ["set interfaces xe-0/0/1 unit 0 family ethernet-switching interface-mode trunk"];
        assert_eq!(classify(&lines), Layer::Undetermined);
    }

    #[test]
    fn test_mpls_takes_precedence_over_inet() {
        // MPLS alone marks the port layer 2, even on an addressed core link
        let lines = [
            "set interfaces et-0/0/0 unit 0 family inet address 10.0.0.1/31",
            "set interfaces et-0/0/0 unit 0 family mpls",
        ];
        assert_eq!(classify(&lines), Layer::L2);
    }

    #[test]
    fn test_layer3_markers() {
        assert_eq!(
            classify(&["set interfaces et-0/0/2 ether-options 802.3ad ae0"]),
            Layer::L3
        );
        assert_eq!(
            classify(&["set interfaces et-0/0/3 unit 0 family inet6 address 2001:db8::1/127"]),
            Layer::L3
        );
        assert_eq!(
            classify(&["set interfaces et-0/0/4 description spare"]),
            Layer::Undetermined
        );
    }

    #[test]
    fn test_interface_lines_match_whole_names() {
        let config = [
            "set interfaces et-0/0/1 unit 0 family inet address 10.0.0.1/31",
            "set interfaces et-0/0/10 unit 0 family mpls",
            "set interfaces et-0/0/1:2 unit 0 family mpls",
        ];

        let lines = interface_lines(&config, "et-0/0/1");
        assert_eq!(lines, vec![config[0]]);
        assert_eq!(classify(&lines), Layer::L3);
    }

    #[test]
    fn test_deactivated_statements_are_removed() {
        let raw = "set interfaces et-0/0/0 unit 0 family inet address 10.0.0.1/31
set interfaces et-0/0/0 unit 0 family mpls
set interfaces et-0/0/00 unit 0 family mpls
deactivate interfaces et-0/0/0 unit 0 family mpls
set interfaces et-0/0/1 unit 0 family mpls";

        let active = active_configuration(raw);

        assert_eq!(
            active,
            vec![
                "set interfaces et-0/0/0 unit 0 family inet address 10.0.0.1/31",
                "set interfaces et-0/0/00 unit 0 family mpls",
                "set interfaces et-0/0/1 unit 0 family mpls",
            ]
        );
        let lines = interface_lines(&active, "et-0/0/0");
        assert_eq!(classify(&lines), Layer::L3);
    }

    #[test]
    fn test_deactivated_interface_drops_all_its_lines() {
        let raw = "set interfaces et-0/0/5 unit 0 family inet address 10.1.0.1/31
set interfaces et-0/0/5 description uplink
deactivate interfaces et-0/0/5";

        assert!(active_configuration(raw).is_empty());
    }
}
