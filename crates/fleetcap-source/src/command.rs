//! Telemetry retrieval through an external fetch program using `tokio::process`
//!
//! The program is invoked as `<program> [args..] <device> <document>` and must print the
//! document to stdout: JSON for structured documents, raw `set` text for the interface
//! configuration. Credentials are passed via `FLEETCAP_DEVICE_USER` and
//! `FLEETCAP_DEVICE_PASSWORD`, never on the command line.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, error, instrument};

use crate::credentials::Credentials;
use crate::error::SourceError;
use crate::traits::{DeviceSession, TelemetrySource};
use crate::types::{ChassisInventory, DeviceFacts, Document, InterfaceInformation, LicenseSummary};

/// Environment variable carrying the login user
pub const USER_ENV: &str = "FLEETCAP_DEVICE_USER";
/// Environment variable carrying the login password
pub const PASSWORD_ENV: &str = "FLEETCAP_DEVICE_PASSWORD";

/// Output of one fetch-program run
#[derive(Debug, Clone)]
struct FetchOutput {
    status: i32,
    stdout: String,
    stderr: String,
}

impl FetchOutput {
    fn success(&self) -> bool {
        self.status == 0
    }
}

/// Source backed by an external fetch program
#[derive(Debug, Clone)]
pub struct CommandSource {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandSource {
    /// Create a command source for `program`
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Leading arguments placed before the device and document
    #[must_use]
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Per-request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Internal method to run the program once
    #[instrument(skip(self, credentials), level = "debug")]
    async fn execute(
        &self,
        device: &str,
        document: Document,
        credentials: &Credentials,
    ) -> Result<FetchOutput, SourceError> {
        let start = Instant::now();

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(device)
            .arg(document.name())
            .env(USER_ENV, &credentials.username)
            .env(PASSWORD_ENV, credentials.password())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SourceError::SpawnError(e.to_string()))?;

        let output = child.wait_with_output().await?;

        let status = output.status.code().unwrap_or(-1);

        debug!(
            device = %device,
            document = %document,
            status = status,
            duration = ?start.elapsed(),
            "fetch completed"
        );

        Ok(FetchOutput {
            status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    /// Run the program with the configured timeout
    async fn execute_with_timeout(
        &self,
        device: &str,
        document: Document,
        credentials: &Credentials,
    ) -> Result<FetchOutput, SourceError> {
        match timeout(self.timeout, self.execute(device, document, credentials)).await {
            Ok(result) => result,
            Err(_) => {
                error!(
                    device = %device,
                    document = %document,
                    timeout = ?self.timeout,
                    "fetch timed out"
                );
                Err(SourceError::Timeout {
                    timeout: self.timeout,
                })
            }
        }
    }
}

#[async_trait]
impl TelemetrySource for CommandSource {
    #[instrument(skip(self, credentials), fields(program = %self.program.display()))]
    async fn connect(
        &self,
        device: &str,
        credentials: &Credentials,
    ) -> Result<Box<dyn DeviceSession>, SourceError> {
        // Facts double as the reachability probe
        let probe = self
            .execute_with_timeout(device, Document::Facts, credentials)
            .await?;

        if !probe.success() {
            return Err(SourceError::ConnectionFailed(format!(
                "{device}: {}",
                probe.stderr.trim()
            )));
        }

        let facts = parse_json(Document::Facts, &probe.stdout)?;

        Ok(Box::new(CommandSession {
            source: self.clone(),
            device: device.to_string(),
            credentials: credentials.clone(),
            facts,
        }))
    }

    fn source_type(&self) -> &'static str {
        "command"
    }
}

/// Session that re-runs the fetch program per document
struct CommandSession {
    source: CommandSource,
    device: String,
    credentials: Credentials,
    facts: DeviceFacts,
}

impl CommandSession {
    async fn fetch(&self, document: Document) -> Result<String, SourceError> {
        let output = self
            .source
            .execute_with_timeout(&self.device, document, &self.credentials)
            .await?;

        if !output.success() {
            return Err(SourceError::RequestFailed {
                document: document.name(),
                reason: format!("exit status {}: {}", output.status, output.stderr.trim()),
            });
        }

        Ok(output.stdout)
    }

    async fn fetch_json<T: DeserializeOwned>(&self, document: Document) -> Result<T, SourceError> {
        let text = self.fetch(document).await?;
        parse_json(document, &text)
    }
}

fn parse_json<T: DeserializeOwned>(document: Document, text: &str) -> Result<T, SourceError> {
    serde_json::from_str(text).map_err(|e| SourceError::ParseError {
        document: document.name(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl DeviceSession for CommandSession {
    fn device(&self) -> &str {
        &self.device
    }

    async fn facts(&self) -> Result<DeviceFacts, SourceError> {
        Ok(self.facts.clone())
    }

    async fn chassis_inventory(&self) -> Result<ChassisInventory, SourceError> {
        self.fetch_json(Document::ChassisInventory).await
    }

    async fn interface_information(&self) -> Result<InterfaceInformation, SourceError> {
        self.fetch_json(Document::InterfaceInformation).await
    }

    async fn interface_configuration(&self) -> Result<String, SourceError> {
        self.fetch(Document::InterfaceConfiguration).await
    }

    async fn license_summary(&self) -> Result<LicenseSummary, SourceError> {
        self.fetch_json(Document::LicenseSummary).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell_source(script: &str) -> CommandSource {
        CommandSource::new("sh").with_args(vec![
            "-c".to_string(),
            script.to_string(),
            "fetch".to_string(),
        ])
    }

    fn creds() -> Credentials {
        Credentials::new("netops", "secret")
    }

    #[tokio::test]
    async fn test_connect_probes_facts() {
        let source = shell_source(
            r#"case "$2" in
                facts) echo '{"hostname": "'"$1"'", "version": "22.4R2"}' ;;
                interface-configuration) echo "set interfaces et-0/0/0 description $FLEETCAP_DEVICE_USER" ;;
                *) exit 3 ;;
            esac"#,
        );

        let session = source.connect("edge1", &creds()).await.unwrap();
        let facts = session.facts().await.unwrap();
        assert_eq!(facts.hostname.as_deref(), Some("edge1"));
        assert_eq!(facts.version, "22.4R2");

        let config = session.interface_configuration().await.unwrap();
        assert!(config.contains("description netops"));

        let err = session.license_summary().await.unwrap_err();
        assert!(matches!(err, SourceError::RequestFailed { .. }));
    }

    #[tokio::test]
    async fn test_failed_probe_is_connection_failure() {
        let source = shell_source("echo unreachable >&2; exit 1");

        let err = match source.connect("edge1", &creds()).await {
            Ok(_) => panic!("expected connection failure"),
            Err(e) => e,
        };
        assert!(matches!(err, SourceError::ConnectionFailed(_)));
    }

    #[tokio::test]
    async fn test_probe_timeout() {
        let source = shell_source("sleep 5").with_timeout(Duration::from_millis(100));

        let err = match source.connect("edge1", &creds()).await {
            Ok(_) => panic!("expected timeout"),
            Err(e) => e,
        };
        assert!(matches!(err, SourceError::Timeout { .. }));
        assert!(err.is_connection_failure());
    }
}
