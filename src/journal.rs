//! Durable measurement log.
//!
//! A plain-text, append-only history of every sampled record, one
//! `"<sequence_id>,<metric>\n"` line per record. The transmitter appends each
//! batch before sending anything and replays the whole file on every pass.
//!
//! ```rust,no_run
//! use rssilink::journal::MeasurementLog;
//! use rssilink::types::TelemetryRecord;
//!
//! fn history() -> rssilink::Result<()> {
//!     let log = MeasurementLog::new("rssi_measurements.txt");
//!     log.append(&[TelemetryRecord::new(0, -52), TelemetryRecord::new(1, -54)])?;
//!
//!     let replay = log.read_all()?;
//!     println!("{} records, {} skipped lines", replay.records.len(), replay.skipped.len());
//!     Ok(())
//! }
//! ```

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::types::TelemetryRecord;
use crate::{Error, LogParseError, Result};

/// Render a record as a log line, terminator included.
pub fn format_line(record: &TelemetryRecord) -> String {
    format!("{},{}\n", record.sequence_id, record.metric)
}

/// Parse one log line (terminator already stripped).
///
/// `line` is the 1-based line number, used for diagnostics only.
pub fn parse_line(
    line: usize,
    content: &str,
) -> std::result::Result<TelemetryRecord, LogParseError> {
    let reject = |reason: String| LogParseError { line, content: content.to_string(), reason };

    let fields: Vec<&str> = content.trim().split(',').collect();
    let [sequence_id, metric] = fields.as_slice() else {
        return Err(reject(format!("expected 2 comma-separated fields, found {}", fields.len())));
    };

    let sequence_id = sequence_id
        .trim()
        .parse::<i32>()
        .map_err(|e| reject(format!("sequence_id {sequence_id:?}: {e}")))?;
    let metric =
        metric.trim().parse::<i32>().map_err(|e| reject(format!("metric {metric:?}: {e}")))?;

    Ok(TelemetryRecord { sequence_id, metric })
}

/// Everything recovered from one read of the log.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LogReplay {
    /// Valid records, in file order
    pub records: Vec<TelemetryRecord>,

    /// Lines that could not be parsed, in file order
    pub skipped: Vec<LogParseError>,
}

/// Append-only measurement log backed by a text file
#[derive(Debug, Clone)]
pub struct MeasurementLog {
    path: PathBuf,
}

impl MeasurementLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append records and flush them to stable storage.
    pub fn append(&self, records: &[TelemetryRecord]) -> Result<()> {
        let text: String = records.iter().map(format_line).collect();

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::storage(self.path.clone(), e))?;

        file.write_all(text.as_bytes()).map_err(|e| Error::storage(self.path.clone(), e))?;
        file.sync_data().map_err(|e| Error::storage(self.path.clone(), e))?;

        debug!("Appended {} records to {}", records.len(), self.path.display());
        Ok(())
    }

    /// Read the whole log.
    ///
    /// A missing file is an empty history. Malformed lines are reported in
    /// [`LogReplay::skipped`] and logged, never fatal; blank lines are ignored.
    pub fn read_all(&self) -> Result<LogReplay> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No measurement log at {} yet", self.path.display());
                return Ok(LogReplay::default());
            }
            Err(e) => return Err(Error::storage(self.path.clone(), e)),
        };

        let mut data = Vec::new();
        file.read_to_end(&mut data).map_err(|e| Error::storage(self.path.clone(), e))?;

        let mut replay = LogReplay::default();
        for (index, content) in String::from_utf8_lossy(&data).lines().enumerate() {
            if content.trim().is_empty() {
                continue;
            }

            match parse_line(index + 1, content) {
                Ok(record) => replay.records.push(record),
                Err(e) => {
                    warn!("Skipping malformed measurement: {}", e);
                    replay.skipped.push(e);
                }
            }
        }

        Ok(replay)
    }

    /// Discard the whole history
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::storage(self.path.clone(), e)),
        }
    }
}
