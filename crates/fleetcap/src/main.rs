//! fleetcap
//!
//! One-shot capacity report across a fleet of network devices

use std::path::PathBuf;

use clap::Parser;
use color_eyre::Result;
use fleetcap_core::FleetScheduler;
use tracing::{info, warn};

mod config;
mod factory;
mod logging;
mod roster;
mod sink;

use config::{Config, LogFormat, SourceKind};
use sink::{FileAuditSink, JsonReportSink};

#[derive(Parser)]
#[command(name = "fleetcap")]
#[command(about = "Collect linecard and port capacity across a device fleet", long_about = None)]
struct Cli {
    /// Configuration file (defaults to FLEETCAP_CONFIG or fleetcap.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// YAML roster with a `hosts:` list
    #[arg(short, long)]
    roster: Option<PathBuf>,

    /// Report output file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Missing-device list file
    #[arg(long)]
    audit: Option<PathBuf>,

    /// Maximum devices collected at once
    #[arg(short = 'j', long)]
    concurrency: Option<usize>,

    /// Replay captured documents from this directory
    #[arg(long)]
    capture_dir: Option<PathBuf>,

    /// Record retrieved documents under this directory
    #[arg(long)]
    record_dir: Option<PathBuf>,

    /// Log level
    #[arg(long)]
    log_level: Option<String>,

    /// Log format
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,

    /// Devices to collect, replacing the configured roster
    devices: Vec<String>,
}

impl Cli {
    /// Apply command-line overrides on top of the file configuration
    fn apply(self, config: &mut Config) {
        if let Some(path) = self.roster {
            config.roster_file = Some(path);
        }
        if !self.devices.is_empty() {
            config.roster_file = None;
            config.devices = self.devices;
        }
        if let Some(output) = self.output {
            config.report.output = output;
        }
        if let Some(audit) = self.audit {
            config.report.audit = audit;
        }
        if let Some(concurrency) = self.concurrency {
            config.collection.concurrency = Some(concurrency);
        }
        if let Some(dir) = self.capture_dir {
            config.source.kind = SourceKind::Capture;
            config.source.capture_dir = dir;
        }
        if let Some(dir) = self.record_dir {
            config.source.record_dir = Some(dir);
        }
        if let Some(level) = self.log_level {
            config.log.level = level;
        }
        if let Some(format) = self.log_format {
            config.log.format = format;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let (mut config, loaded_from) = Config::load_or_default(cli.config.as_deref())?;
    cli.apply(&mut config);

    logging::init(&config.log)?;
    match &loaded_from {
        Some(path) => info!(path = %path.display(), "loaded configuration"),
        None => warn!("no config file found, using defaults"),
    }

    let source = factory::build_source(&config.source)?;
    let credentials = factory::build_credentials(&config.source);
    let roster = roster::build_roster(&config)?;
    let sink = JsonReportSink::new(&config.report.output);
    let mut audit = FileAuditSink::new(&config.report.audit);

    let scheduler = FleetScheduler::new(source, credentials, config.collection.clone());
    let summary = scheduler
        .run(roster.as_ref(), Box::new(sink), &mut audit)
        .await?;

    for missing in &summary.missing {
        warn!(device = %missing.device, reason = %missing.reason, "device missing from report");
    }
    info!(
        devices = summary.devices_total,
        collected = summary.collected.len(),
        missing = summary.missing.len(),
        rows = summary.rows_written,
        report = %config.report.output.display(),
        "capacity report complete"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "fleetcap",
            "--roster",
            "hosts.yaml",
            "-j",
            "4",
            "--log-format",
            "json",
            "edge1",
            "edge2",
        ]);
        let mut config = Config::default();

        cli.apply(&mut config);

        assert_eq!(config.devices, vec!["edge1", "edge2"]);
        assert!(config.roster_file.is_none());
        assert_eq!(config.collection.concurrency, Some(4));
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn test_roster_flag_without_devices() {
        let cli = Cli::parse_from(["fleetcap", "--roster", "hosts.yaml"]);
        let mut config = Config::default();

        cli.apply(&mut config);

        assert_eq!(config.roster_file, Some(PathBuf::from("hosts.yaml")));
    }
}
