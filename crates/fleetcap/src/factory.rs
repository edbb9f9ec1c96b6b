//! Telemetry source and credential construction from configuration

use std::sync::Arc;
use std::time::Duration;

use eyre::Result;
use fleetcap_source::{
    CaptureSource, CommandSource, CredentialProvider, Credentials, EnvCredentials,
    RecordingSource, StaticCredentials, TelemetrySource,
};

use crate::config::{SourceConfig, SourceKind};

/// Create the telemetry source, wrapped in a recorder when a record directory is set
///
/// # Errors
/// Returns error if a `command` source has no program configured
pub fn build_source(config: &SourceConfig) -> Result<Arc<dyn TelemetrySource>> {
    let source: Arc<dyn TelemetrySource> = match config.kind {
        SourceKind::Capture => {
            if !config.capture_dir.is_dir() {
                tracing::warn!(
                    dir = %config.capture_dir.display(),
                    "capture directory does not exist, every device will be reported missing"
                );
            }
            Arc::new(CaptureSource::new(&config.capture_dir))
        }
        SourceKind::Command => {
            let program = config
                .program
                .as_ref()
                .ok_or_else(|| eyre::eyre!("source.program is required for command sources"))?;
            Arc::new(
                CommandSource::new(program)
                    .with_args(config.args.clone())
                    .with_timeout(Duration::from_secs(config.command_timeout_secs)),
            )
        }
    };

    match &config.record_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "recording retrieved documents");
            Ok(Arc::new(RecordingSource::new(source, dir)))
        }
        None => Ok(source),
    }
}

/// Create the credential provider for the configured source
///
/// Captured documents need no device login, so capture sources get empty credentials.
pub fn build_credentials(config: &SourceConfig) -> Arc<dyn CredentialProvider> {
    match config.kind {
        SourceKind::Capture => Arc::new(StaticCredentials::new(Credentials::new("", ""))),
        SourceKind::Command => Arc::new(EnvCredentials::new(
            &config.username_var,
            &config.password_var,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_capture_source() {
        let config = SourceConfig::default();

        let source = build_source(&config).unwrap();

        assert_eq!(source.source_type(), "capture");
    }

    #[test]
    fn test_command_source_requires_program() {
        let config = SourceConfig {
            kind: SourceKind::Command,
            ..SourceConfig::default()
        };

        assert!(build_source(&config).is_err());
    }

    #[test]
    fn test_recording_wraps_source() {
        let config = SourceConfig {
            kind: SourceKind::Command,
            program: Some(PathBuf::from("fetch-doc")),
            record_dir: Some(std::env::temp_dir().join("fleetcap-factory-record")),
            ..SourceConfig::default()
        };

        let source = build_source(&config).unwrap();

        // the recorder reports the source it wraps
        assert_eq!(source.source_type(), "command");
    }

    #[test]
    fn test_capture_credentials_are_static() {
        let provider = build_credentials(&SourceConfig::default());

        let credentials = provider.credentials("edge1").unwrap();

        assert_eq!(credentials.username, "");
    }
}
