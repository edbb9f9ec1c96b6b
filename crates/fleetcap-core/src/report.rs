//! Report layout and the report sink abstraction

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::error::CoreError;
use crate::model::{ChannelId, DeviceRecord, LinecardRecord, PortSpeed};

/// Column headers, written once at row 0
pub const HEADERS: [&str; 13] = [
    "Hostname",
    "Version",
    "Hardware",
    "Model",
    "Serial",
    "Speed",
    "Channelized Ports",
    "Ports In Use",
    "Ports Installed",
    "Calculated Capacity",
    "Used (gbps)",
    "Available (gbps)",
    "Remaining (gbps)",
];

/// Row index of the first record row
pub const FIRST_RECORD_ROW: usize = 1;

/// A single report cell value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Empty,
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Integer(value)
    }
}

impl From<u64> for Cell {
    fn from(value: u64) -> Self {
        Cell::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<usize> for Cell {
    fn from(value: usize) -> Self {
        Cell::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<PortSpeed> for Cell {
    fn from(value: PortSpeed) -> Self {
        match value {
            PortSpeed::Gbps(gbps) => gbps.into(),
            PortSpeed::NotApplicable => Cell::Text(value.to_string()),
        }
    }
}

/// One report row; position is the column index
pub type Row = Vec<Cell>;

/// Destination for report rows
///
/// Writes are addressed by row and column. Only the aggregator writes to a sink.
pub trait ReportSink: Send {
    /// Prepare the artifact with the column headers
    ///
    /// # Errors
    /// Returns `CoreError::SinkError` if the sink cannot be initialized.
    fn init(&mut self, headers: &[&str]) -> Result<(), CoreError>;

    /// Write one cell
    ///
    /// # Errors
    /// Returns `CoreError::SinkError` if the cell cannot be stored.
    fn write(&mut self, row: usize, column: usize, value: Cell) -> Result<(), CoreError>;

    /// Persist the artifact
    ///
    /// # Errors
    /// Returns `CoreError::SinkError` if the artifact cannot be persisted.
    fn finalize(&mut self) -> Result<(), CoreError>;
}

fn chassis_row(record: &DeviceRecord) -> Row {
    vec![
        record.hostname.as_str().into(),
        record.version.as_str().into(),
        "Chassis".into(),
        record.chassis_model.as_str().into(),
        record.chassis_serial.as_str().into(),
        "".into(),
        "".into(),
        record.totals.ports_in_use.into(),
        record.totals.ports_installed.into(),
        record.totals.capacity_gbps.into(),
        record.license.used.into(),
        record.license.available.into(),
        record.license.remaining.into(),
    ]
}

fn linecard_row(hostname: &str, linecard: &LinecardRecord) -> Row {
    vec![
        hostname.into(),
        linecard.version.as_str().into(),
        linecard.name.as_str().into(),
        linecard.model.as_str().into(),
        linecard.serial.as_str().into(),
        "".into(),
        linecard.channelized_ports.into(),
        linecard.ports_in_use.into(),
        linecard.ports_installed.into(),
        linecard.capacity_gbps.into(),
    ]
}

/// Rows for one device: chassis, then each linecard followed by its channel leaves
#[must_use]
pub fn device_rows(record: &DeviceRecord) -> Vec<Row> {
    let mut rows = Vec::with_capacity(record.row_count());
    rows.push(chassis_row(record));

    for linecard in &record.linecards {
        rows.push(linecard_row(&record.hostname, linecard));

        for (pic, xcvr, channel) in linecard.ports.leaves() {
            let label = match channel.channel {
                ChannelId::Default => format!("{} / {}", pic.name, xcvr.name),
                ChannelId::Numbered(n) => format!("{} / {}:{n}", pic.name, xcvr.name),
            };
            rows.push(vec![
                record.hostname.as_str().into(),
                Cell::Empty,
                label.into(),
                channel.model.as_str().into(),
                channel.serial.as_str().into(),
                channel.speed.into(),
            ]);
        }
    }

    rows
}

// ============================================================================
// Grid Storage
// ============================================================================

/// Sparse cell grid shared by the in-memory and file sinks
#[derive(Debug, Clone, Default)]
pub struct ReportGrid {
    headers: Vec<String>,
    cells: BTreeMap<usize, BTreeMap<usize, Cell>>,
}

impl ReportGrid {
    pub fn set_headers(&mut self, headers: &[&str]) {
        self.headers = headers.iter().map(ToString::to_string).collect();
    }

    pub fn set(&mut self, row: usize, column: usize, value: Cell) {
        self.cells.entry(row).or_default().insert(column, value);
    }

    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    #[must_use]
    pub fn get(&self, row: usize, column: usize) -> Option<&Cell> {
        self.cells.get(&row)?.get(&column)
    }

    /// Highest written row index, if any cell was written
    #[must_use]
    pub fn last_row(&self) -> Option<usize> {
        self.cells.keys().next_back().copied()
    }

    /// Dense rows from `FIRST_RECORD_ROW` through the last written row
    ///
    /// Unwritten cells are `Cell::Empty`; each row is as wide as its last written column.
    #[must_use]
    pub fn rows(&self) -> Vec<Row> {
        let Some(last) = self.last_row() else {
            return Vec::new();
        };

        (FIRST_RECORD_ROW..=last)
            .map(|index| {
                let Some(row) = self.cells.get(&index) else {
                    return Vec::new();
                };
                let width = row.keys().next_back().map_or(0, |c| c + 1);
                (0..width)
                    .map(|column| row.get(&column).cloned().unwrap_or(Cell::Empty))
                    .collect()
            })
            .collect()
    }
}

/// Sink that keeps the grid in memory
///
/// Clones share the same grid, so a handle kept before the sink is handed to the aggregator
/// observes every write.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    grid: Arc<Mutex<ReportGrid>>,
    writes: Arc<Mutex<Vec<(usize, usize)>>>,
    finalized: Arc<Mutex<bool>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the grid
    #[must_use]
    pub fn grid(&self) -> ReportGrid {
        self.grid.lock().map(|g| g.clone()).unwrap_or_default()
    }

    /// Every `(row, column)` write in the order it happened
    #[must_use]
    pub fn writes(&self) -> Vec<(usize, usize)> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.finalized.lock().map(|f| *f).unwrap_or(false)
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> CoreError {
    CoreError::SinkError(e.to_string())
}

impl ReportSink for MemorySink {
    fn init(&mut self, headers: &[&str]) -> Result<(), CoreError> {
        self.grid.lock().map_err(poisoned)?.set_headers(headers);
        Ok(())
    }

    fn write(&mut self, row: usize, column: usize, value: Cell) -> Result<(), CoreError> {
        self.grid.lock().map_err(poisoned)?.set(row, column, value);
        self.writes.lock().map_err(poisoned)?.push((row, column));
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), CoreError> {
        *self.finalized.lock().map_err(poisoned)? = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CapacityTotals, LicenseUsage, PortInventory};
    use chrono::Utc;

    fn record() -> DeviceRecord {
        let mut ports = PortInventory::new();
        ports.insert_transceiver("PIC 0", "Xcvr 0", "QSFP28-100G-LR4", "X0");
        ports.insert_transceiver("PIC 0", "Xcvr 1", "QSFP28-100G-DR", "X1");
        ports.set_speed("PIC 0", "Xcvr 0", &ChannelId::Default, PortSpeed::Gbps(100));
        ports.set_speed("PIC 0", "Xcvr 1", &ChannelId::Numbered(2), PortSpeed::Gbps(25));

        let linecard = LinecardRecord {
            name: "FPC 0".to_string(),
            slot: 0,
            model: "LC2103".to_string(),
            serial: "FPC0".to_string(),
            version: "REV 31".to_string(),
            ports_installed: 2,
            channelized_ports: 1,
            ports_in_use: 2,
            capacity_gbps: 125,
            ports,
        };

        DeviceRecord {
            hostname: "edge1".to_string(),
            version: "23.2R1".to_string(),
            chassis_model: "MX10003".to_string(),
            chassis_serial: "CH1".to_string(),
            totals: CapacityTotals::from_linecards(std::slice::from_ref(&linecard)),
            linecards: vec![linecard],
            license: LicenseUsage {
                used: 100,
                available: 400,
                remaining: 300,
            },
            collected_at: Utc::now(),
        }
    }

    #[test]
    fn test_device_rows_layout() {
        let record = record();
        let rows = device_rows(&record);

        assert_eq!(rows.len(), record.row_count());
        assert_eq!(rows.len(), 5);

        let chassis = &rows[0];
        assert_eq!(chassis.len(), HEADERS.len());
        assert_eq!(chassis[2], Cell::from("Chassis"));
        assert_eq!(chassis[5], Cell::from(""));
        assert_eq!(chassis[9], Cell::Integer(125));
        assert_eq!(chassis[12], Cell::Integer(300));

        let linecard = &rows[1];
        assert_eq!(linecard[1], Cell::from("REV 31"));
        assert_eq!(linecard[2], Cell::from("FPC 0"));
        assert_eq!(linecard[6], Cell::Integer(1));

        let labels: Vec<&Cell> = rows[2..].iter().map(|r| &r[2]).collect();
        assert_eq!(
            labels,
            vec![
                &Cell::from("PIC 0 / Xcvr 0"),
                &Cell::from("PIC 0 / Xcvr 1"),
                &Cell::from("PIC 0 / Xcvr 1:2"),
            ]
        );
        assert_eq!(rows[2][5], Cell::Integer(100));
        assert_eq!(rows[3][5], Cell::from("N/A"));
        assert_eq!(rows[4][4], Cell::from("X1"));
        assert_eq!(rows[4][1], Cell::Empty);
    }

    #[test]
    fn test_grid_rows_are_dense() {
        let mut grid = ReportGrid::default();
        grid.set_headers(&HEADERS);
        grid.set(1, 0, "a".into());
        grid.set(1, 2, "c".into());
        grid.set(3, 0, "d".into());

        let rows = grid.rows();

        assert_eq!(grid.headers().len(), 13);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec![Cell::from("a"), Cell::Empty, Cell::from("c")]);
        assert!(rows[1].is_empty());
        assert_eq!(grid.get(3, 0), Some(&Cell::from("d")));
    }

    #[test]
    fn test_memory_sink_shares_grid() {
        let handle = MemorySink::new();
        let mut sink: Box<dyn ReportSink> = Box::new(handle.clone());

        sink.init(&HEADERS).unwrap();
        sink.write(1, 0, "edge1".into()).unwrap();
        sink.finalize().unwrap();

        assert!(handle.is_finalized());
        assert_eq!(handle.writes(), vec![(1, 0)]);
        assert_eq!(handle.grid().get(1, 0), Some(&Cell::from("edge1")));
    }
}
