//! Transmitter controller: debounced trigger → sample → log → replay.
//!
//! Each accepted trigger runs one pass through
//! `Idle → Armed → Sampling → Transmitting → Idle`. The fresh batch is
//! appended to the durable log before anything is sent, then the *entire*
//! log is replayed over the link, one frame per record.

mod debounce;

pub use debounce::Debouncer;

use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::Result;
use crate::codec::encode;
use crate::config::Settings;
use crate::gpio::Trigger;
use crate::journal::MeasurementLog;
use crate::sampler::{Sampler, SignalSource};
use crate::transport::Transport;
use crate::types::Statistics;

/// Transmitter state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    Idle,
    Armed,
    Sampling,
    Transmitting,
}

/// Outcome of one transmission pass
#[derive(Debug, Clone, PartialEq)]
pub struct PassReport {
    /// Records in the fresh batch
    pub sampled: usize,
    /// Diagnostics of the fresh batch
    pub statistics: Statistics,
    /// Valid records found in the log
    pub replayed: usize,
    /// Frames handed to the physical layer
    pub sent: usize,
    /// Frames the physical layer refused
    pub failed: usize,
    /// Malformed log lines skipped
    pub skipped_lines: usize,
    /// Shutdown was requested before the replay finished
    pub interrupted: bool,
}

/// Drives the transmitting node.
pub struct TransmitterController<T, S, B> {
    transport: T,
    source: S,
    trigger: B,
    sampler: Sampler,
    log: MeasurementLog,
    debouncer: Debouncer,
    send_interval: Duration,
    trigger_poll: Duration,
    state: TxState,
    passes: u64,
}

impl<T, S, B> TransmitterController<T, S, B>
where
    T: Transport,
    S: SignalSource,
    B: Trigger,
{
    /// Build a controller around an already opened transport.
    pub fn new(transport: T, source: S, trigger: B, settings: &Settings) -> Result<Self> {
        let tx = &settings.transmitter;
        Ok(Self {
            transport,
            source,
            trigger,
            sampler: settings.sampler.build()?,
            log: MeasurementLog::new(&tx.log_path),
            debouncer: Debouncer::new(tx.rearm()),
            send_interval: tx.send_interval(),
            trigger_poll: tx.trigger_poll(),
            state: TxState::Idle,
            passes: 0,
        })
    }

    pub fn state(&self) -> TxState {
        self.state
    }

    pub fn log(&self) -> &MeasurementLog {
        &self.log
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    /// Number of completed passes
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Check the trigger level once and run a pass if it arms.
    ///
    /// Returns `Ok(None)` when the trigger is released or still cooling down.
    pub async fn poll_trigger(&mut self, cancel: &CancellationToken) -> Result<Option<PassReport>> {
        if self.state != TxState::Idle || !self.trigger.is_pressed() {
            return Ok(None);
        }

        let now = Instant::now();
        if !self.debouncer.try_arm(now) {
            trace!("Trigger ignored, re-arms in {:?}", self.debouncer.remaining(now));
            return Ok(None);
        }

        self.state = TxState::Armed;
        info!("Trigger pressed, measuring");
        self.run_pass(cancel).await.map(Some)
    }

    /// Sample a batch, log it, then replay the whole log.
    ///
    /// Storage failures abandon the pass; send failures are logged and the
    /// replay continues with the next record. The controller is back in
    /// [`TxState::Idle`] when this returns, whatever the outcome, and the
    /// re-arm cool-down restarts from that moment.
    pub async fn run_pass(&mut self, cancel: &CancellationToken) -> Result<PassReport> {
        let outcome = self.sample_and_replay(cancel).await;
        self.state = TxState::Idle;
        self.debouncer.complete(Instant::now());
        if outcome.is_ok() {
            self.passes += 1;
        }
        outcome
    }

    async fn sample_and_replay(&mut self, cancel: &CancellationToken) -> Result<PassReport> {
        self.state = TxState::Sampling;
        let batch = self.sampler.sample(&mut self.source).await;
        self.log.append(batch.records())?;

        self.state = TxState::Transmitting;
        let replay = self.log.read_all()?;
        let mut report = PassReport {
            sampled: batch.len(),
            statistics: *batch.statistics(),
            replayed: replay.records.len(),
            sent: 0,
            failed: 0,
            skipped_lines: replay.skipped.len(),
            interrupted: false,
        };

        debug!(
            "Replaying {} logged records ({} new) from {}",
            report.replayed,
            report.sampled,
            self.log.path().display()
        );

        for (index, record) in replay.records.iter().enumerate() {
            if cancel.is_cancelled() {
                warn!("Shutdown requested, {} records left unsent", report.replayed - index);
                report.interrupted = true;
                break;
            }

            if index > 0 {
                tokio::time::sleep(self.send_interval).await;
            }

            match self.transport.send_one(&encode(record)).await {
                Ok(()) => {
                    report.sent += 1;
                    debug!("Sent {}", record);
                }
                Err(e) => {
                    report.failed += 1;
                    warn!("Send of {} failed: {}", record, e);
                }
            }
        }

        info!(
            sent = report.sent,
            failed = report.failed,
            skipped = report.skipped_lines,
            "Log transmitted"
        );
        Ok(report)
    }

    /// Poll the trigger until `cancel` fires.
    ///
    /// Recoverable errors are logged and the loop goes on; only fatal
    /// errors end it early.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<()> {
        info!("Transmitter ready, waiting for trigger");

        loop {
            if cancel.is_cancelled() {
                break;
            }

            match self.poll_trigger(&cancel).await {
                Ok(Some(report)) => {
                    debug!("Pass {} complete: {:?}", self.passes, report);
                }
                Ok(None) => {}
                Err(e) if e.is_fatal() => {
                    error!("Transmitter stopping: {}", e);
                    return Err(e);
                }
                Err(e) => {
                    warn!("Transmission pass abandoned: {}", e);
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.trigger_poll) => {}
            }
        }

        info!("Transmitter stopped after {} passes", self.passes);
        Ok(())
    }
}
