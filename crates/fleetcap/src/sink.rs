//! File-backed report and audit sinks

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fleetcap_core::{AuditSink, Cell, CoreError, MissingDevice, ReportGrid, ReportSink, Row};
use serde::Serialize;
use tracing::info;

/// Persisted report layout
#[derive(Debug, Serialize)]
struct ReportDocument<'a> {
    generated_at: DateTime<Utc>,
    headers: &'a [String],
    rows: Vec<Row>,
}

fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Report sink writing the grid as pretty JSON on finalize
#[derive(Debug)]
pub struct JsonReportSink {
    path: PathBuf,
    grid: ReportGrid,
}

impl JsonReportSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            grid: ReportGrid::default(),
        }
    }
}

impl ReportSink for JsonReportSink {
    fn init(&mut self, headers: &[&str]) -> Result<(), CoreError> {
        // fail before any device is contacted if the report cannot be written; an existing
        // report stays intact until finalize replaces it
        ensure_parent(&self.path)
            .and_then(|()| {
                OpenOptions::new()
                    .append(true)
                    .create(true)
                    .open(&self.path)
                    .map(drop)
            })
            .map_err(|e| {
                CoreError::SinkError(format!("cannot create {}: {e}", self.path.display()))
            })?;
        self.grid.set_headers(headers);
        Ok(())
    }

    fn write(&mut self, row: usize, column: usize, value: Cell) -> Result<(), CoreError> {
        self.grid.set(row, column, value);
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), CoreError> {
        let document = ReportDocument {
            generated_at: Utc::now(),
            headers: self.grid.headers(),
            rows: self.grid.rows(),
        };
        let json = serde_json::to_string_pretty(&document)
            .map_err(|e| CoreError::SinkError(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| {
            CoreError::SinkError(format!("cannot write {}: {e}", self.path.display()))
        })?;

        info!(path = %self.path.display(), rows = document.rows.len(), "report written");
        Ok(())
    }
}

/// Audit sink writing one missing device per line
#[derive(Debug, Clone)]
pub struct FileAuditSink {
    path: PathBuf,
}

impl FileAuditSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AuditSink for FileAuditSink {
    fn record_missing(&mut self, devices: &[MissingDevice]) -> Result<(), CoreError> {
        let mut content = String::new();
        for missing in devices {
            content.push_str(&missing.device);
            content.push('\n');
        }

        ensure_parent(&self.path)
            .and_then(|()| fs::write(&self.path, content))
            .map_err(|e| {
                CoreError::AuditError(format!("cannot write {}: {e}", self.path.display()))
            })?;

        info!(path = %self.path.display(), devices = devices.len(), "missing-device list written");
        Ok(())
    }
}
