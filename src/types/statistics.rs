//! Batch statistics

use std::fmt;

/// Mean and population standard deviation of a set of readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    /// Number of readings summarised
    pub count: usize,

    /// Arithmetic mean (dBm)
    pub mean: f64,

    /// Population standard deviation: squared deviations divided by `n`, not `n - 1`
    pub std_dev: f64,
}

impl Statistics {
    /// Summarise a set of readings, or `None` when there are none.
    pub fn from_readings(readings: &[i32]) -> Option<Self> {
        if readings.is_empty() {
            return None;
        }

        let count = readings.len();
        let n = count as f64;
        let mean = readings.iter().map(|&r| f64::from(r)).sum::<f64>() / n;
        let variance =
            readings.iter().map(|&r| (f64::from(r) - mean).powi(2)).sum::<f64>() / n;

        Some(Self { count, mean, std_dev: variance.sqrt() })
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mean {:.2} dBm, std dev {:.2} dBm over {}", self.mean, self.std_dev, self.count)
    }
}
