//! Telemetry record and batch types

use std::fmt;

use super::Statistics;

/// Metric substituted when the signal source has no live value (dBm).
pub const NO_SIGNAL_DBM: i32 = -100;

/// One measurement tagged with its position in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TelemetryRecord {
    /// Index of the draw within its batch (`0..n`).
    pub sequence_id: i32,

    /// Signal metric in dBm, typically within `-100..=0`.
    pub metric: i32,
}

impl TelemetryRecord {
    /// Create a new record
    pub fn new(sequence_id: i32, metric: i32) -> Self {
        Self { sequence_id, metric }
    }
}

impl fmt::Display for TelemetryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} dBm", self.sequence_id, self.metric)
    }
}

/// One trigger event's worth of freshly sampled records.
///
/// The statistics are diagnostics only; they never travel over the link.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    records: Vec<TelemetryRecord>,
    statistics: Statistics,
}

impl Batch {
    pub(crate) fn new(records: Vec<TelemetryRecord>, statistics: Statistics) -> Self {
        Self { records, statistics }
    }

    /// Records in draw order
    pub fn records(&self) -> &[TelemetryRecord] {
        &self.records
    }

    /// Mean and spread of the batch metrics
    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consume the batch, keeping only the records
    pub fn into_records(self) -> Vec<TelemetryRecord> {
        self.records
    }
}
