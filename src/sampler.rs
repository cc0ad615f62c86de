//! Statistics sampler: draws readings from a [`SignalSource`] into a [`Batch`].

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::types::{Batch, NO_SIGNAL_DBM, Statistics, TelemetryRecord};
use crate::{Error, Result};

/// Source of signal-strength readings.
///
/// Returns `None` when no live value exists (e.g. the node is not associated).
pub trait SignalSource: Send {
    fn read(&mut self) -> Option<i32>;
}

/// Network association collaborator
pub trait NetworkStatus: Send {
    fn is_connected(&self) -> bool;

    /// Current signal strength in dBm
    fn signal_strength(&self) -> i32;
}

/// Adapts a [`NetworkStatus`] into a [`SignalSource`] reporting Wi-Fi RSSI.
pub struct WifiSignal<N> {
    network: N,
}

impl<N: NetworkStatus> WifiSignal<N> {
    pub fn new(network: N) -> Self {
        Self { network }
    }

    pub fn network(&self) -> &N {
        &self.network
    }
}

impl<N: NetworkStatus> SignalSource for WifiSignal<N> {
    fn read(&mut self) -> Option<i32> {
        self.network.is_connected().then(|| self.network.signal_strength())
    }
}

/// Wait for the network to associate, checking `attempts` times.
///
/// Never fails: a node without a network still samples, it just reports
/// the no-signal sentinel. Returns whether the association came up.
pub async fn await_association<N: NetworkStatus>(
    network: &N,
    attempts: u32,
    interval: Duration,
) -> bool {
    for attempt in 1..=attempts {
        if network.is_connected() {
            info!(attempt, rssi = network.signal_strength(), "Network associated");
            return true;
        }

        debug!("Waiting for network association ({}/{})", attempt, attempts);
        tokio::time::sleep(interval).await;
    }

    let connected = network.is_connected();
    if !connected {
        warn!(
            "Network not associated after {} attempts; readings will use {} dBm",
            attempts, NO_SIGNAL_DBM
        );
    }
    connected
}

/// Draws a fixed number of readings, paced by a fixed delay.
#[derive(Debug, Clone)]
pub struct Sampler {
    count: usize,
    interval: Duration,
}

impl Default for Sampler {
    fn default() -> Self {
        Self { count: 10, interval: Duration::from_millis(100) }
    }
}

impl Sampler {
    /// Create a sampler drawing `count` readings `interval` apart.
    pub fn new(count: usize, interval: Duration) -> Result<Self> {
        if count == 0 {
            return Err(Error::configuration("sample count must be positive"));
        }
        Ok(Self { count, interval })
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Draw `count` readings into a batch.
    ///
    /// Record `i` carries `sequence_id == i`. Unavailable readings become
    /// [`NO_SIGNAL_DBM`]. The inter-sample delay sits between draws only.
    pub async fn sample<S: SignalSource + ?Sized>(&self, source: &mut S) -> Batch {
        let mut records = Vec::with_capacity(self.count);

        for index in 0..self.count {
            if index > 0 {
                tokio::time::sleep(self.interval).await;
            }

            let metric = source.read().unwrap_or(NO_SIGNAL_DBM);
            debug!("Sample {}/{}: {} dBm", index + 1, self.count, metric);

            let sequence_id = i32::try_from(index).unwrap_or(i32::MAX);
            records.push(TelemetryRecord::new(sequence_id, metric));
        }

        let readings: Vec<i32> = records.iter().map(|r| r.metric).collect();
        let statistics = Statistics::from_readings(&readings)
            .unwrap_or(Statistics { count: 0, mean: 0.0, std_dev: 0.0 });

        info!("Batch sampled: {}", statistics);

        Batch::new(records, statistics)
    }
}
