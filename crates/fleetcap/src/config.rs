//! Configuration loading and types

use std::path::{Path, PathBuf};

use fleetcap_core::CollectionConfig;
use serde::{Deserialize, Serialize};

/// Top-level configuration for a fleetcap run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Scheduling and computation settings
    #[serde(default)]
    pub collection: CollectionConfig,
    /// Where device documents come from
    #[serde(default)]
    pub source: SourceConfig,
    /// Output artifacts
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub log: LogConfig,
    /// Inline roster, used when no roster file is set
    #[serde(default)]
    pub devices: Vec<String>,
    /// YAML roster file with a `hosts:` list
    #[serde(default)]
    pub roster_file: Option<PathBuf>,
}

/// Telemetry source kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Replay captured documents from disk
    #[default]
    Capture,
    /// Run an external fetch program per document
    Command,
}

/// Telemetry source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,
    /// Capture directory for `capture` sources
    #[serde(default = "default_capture_dir")]
    pub capture_dir: PathBuf,
    /// Fetch program for `command` sources
    #[serde(default)]
    pub program: Option<PathBuf>,
    /// Arguments placed before the device and document name
    #[serde(default)]
    pub args: Vec<String>,
    /// Per-command timeout in seconds
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
    /// Record every retrieved document under this directory
    #[serde(default)]
    pub record_dir: Option<PathBuf>,
    /// Environment variable holding the device username
    #[serde(default = "default_username_var")]
    pub username_var: String,
    /// Environment variable holding the device password
    #[serde(default = "default_password_var")]
    pub password_var: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            capture_dir: default_capture_dir(),
            program: None,
            args: Vec::new(),
            command_timeout_secs: default_command_timeout_secs(),
            record_dir: None,
            username_var: default_username_var(),
            password_var: default_password_var(),
        }
    }
}

fn default_capture_dir() -> PathBuf {
    PathBuf::from("captures")
}

fn default_command_timeout_secs() -> u64 {
    60
}

fn default_username_var() -> String {
    fleetcap_source::EnvCredentials::USERNAME_VAR.to_string()
}

fn default_password_var() -> String {
    fleetcap_source::EnvCredentials::PASSWORD_VAR.to_string()
}

/// Output artifact locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Capacity report file
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Missing-device list
    #[serde(default = "default_audit")]
    pub audit: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            audit: default_audit(),
        }
    }
}

fn default_output() -> PathBuf {
    PathBuf::from("capacity_report.json")
}

fn default_audit() -> PathBuf {
    PathBuf::from("missing_devices.txt")
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("failed to read {}: {e}", path.display()))?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// First existing config file from the environment or the default paths
    pub fn locate() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("FLEETCAP_CONFIG") {
            return Some(PathBuf::from(path));
        }

        let paths = [
            Some(PathBuf::from("fleetcap.toml")),
            Some(PathBuf::from("/etc/fleetcap/fleetcap.toml")),
            dirs::config_dir().map(|p| p.join("fleetcap/fleetcap.toml")),
        ];

        paths.into_iter().flatten().find(|path| path.exists())
    }

    /// Load from `path`, or from the default locations, or use defaults
    ///
    /// Returns the file that was read, if any.
    ///
    /// # Errors
    /// Returns error if a located file cannot be read or parsed
    pub fn load_or_default(path: Option<&Path>) -> eyre::Result<(Self, Option<PathBuf>)> {
        let path = path.map(Path::to_path_buf).or_else(Self::locate);
        match path {
            Some(path) => Ok((Self::load(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }
}
