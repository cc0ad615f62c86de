//! Runs a transmitter and a receiver against each other in one process.
//!
//! The radio is replaced by an in-memory loopback link, the network by a
//! simulated signal that associates after a short delay, and the button by
//! a timer that presses it periodically.
//!
//! ```text
//! rssilink-loopback [settings.yaml] [run-seconds]
//! ```

use anyhow::{Context, Result};
use std::convert::Infallible;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use rssilink::display::Display;
use rssilink::gpio::{ButtonTrigger, DigitalInput, DigitalOutput};
use rssilink::sampler::{NetworkStatus, WifiSignal, await_association};
use rssilink::transport::LoopbackLink;
use rssilink::{ReceiverController, Settings, TransmitterController};

const DEFAULT_RUN_SECONDS: u64 = 7;

/// Network that associates after `join_delay` and then reports a slowly
/// drifting signal strength.
struct SimulatedNetwork {
    started: Instant,
    join_delay: Duration,
    reads: AtomicU32,
}

impl NetworkStatus for SimulatedNetwork {
    fn is_connected(&self) -> bool {
        self.started.elapsed() >= self.join_delay
    }

    fn signal_strength(&self) -> i32 {
        let n = self.reads.fetch_add(1, Ordering::Relaxed);
        // Triangle wave between -48 and -63 dBm
        let phase = (n % 30) as i32;
        let depth = if phase < 15 { phase } else { 30 - phase };
        -48 - depth
    }
}

/// Button input pulled low for the first `hold` of every `period`.
struct TimedButton {
    started: Instant,
    period: Duration,
    hold: Duration,
}

impl DigitalInput for TimedButton {
    fn read(&mut self) -> bool {
        let elapsed = self.started.elapsed().as_millis() % self.period.as_millis();
        elapsed >= self.hold.as_millis()
    }
}

struct ConsoleDisplay {
    lines: Vec<String>,
}

impl Display for ConsoleDisplay {
    type Error = Infallible;

    fn clear(&mut self) -> Result<(), Infallible> {
        self.lines.clear();
        Ok(())
    }

    fn draw_text(&mut self, text: &str, _x: i32, _y: i32) -> Result<(), Infallible> {
        self.lines.push(text.to_string());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Infallible> {
        println!("[display] {}", self.lines.join(" | "));
        Ok(())
    }
}

struct ActivityLed;

impl DigitalOutput for ActivityLed {
    fn write(&mut self, high: bool) {
        debug!(on = high, "Activity LED");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    rssilink::logging::init("rssilink=info");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::load(&path).with_context(|| format!("loading {path}"))?,
        None => Settings::default(),
    };
    let run_for = match args.next() {
        Some(secs) => Duration::from_secs(secs.parse().context("run-seconds must be a number")?),
        None => Duration::from_secs(DEFAULT_RUN_SECONDS),
    };

    info!(
        channel = settings.link.channel,
        rf_setup = settings.link.rf_setup(),
        log = %settings.transmitter.log_path.display(),
        "Starting loopback session"
    );

    let (tx_end, rx_end) = LoopbackLink::pair();

    let network = SimulatedNetwork {
        started: Instant::now(),
        join_delay: Duration::from_millis(1500),
        reads: AtomicU32::new(0),
    };
    await_association(
        &network,
        settings.transmitter.association_attempts,
        settings.transmitter.association_interval(),
    )
    .await;

    let button = ButtonTrigger::active_low(TimedButton {
        started: Instant::now(),
        period: Duration::from_secs(3),
        hold: Duration::from_millis(300),
    });

    let mut transmitter =
        TransmitterController::new(tx_end, WifiSignal::new(network), button, &settings)
            .context("building transmitter")?;

    let mut receiver = ReceiverController::start(
        rx_end,
        ConsoleDisplay { lines: Vec::new() },
        ActivityLed,
        &settings.receiver,
    )
    .await
    .context("starting receiver")?;

    let cancel = CancellationToken::new();
    let stopper = cancel.clone();
    let stop = async move {
        tokio::time::sleep(run_for).await;
        info!("Run time elapsed, shutting down");
        stopper.cancel();
    };

    let (tx_result, (), ()) =
        tokio::join!(transmitter.run(cancel.clone()), receiver.run(cancel.clone()), stop);
    tx_result.context("transmitter stopped")?;

    let stats = receiver.stats();
    info!(
        passes = transmitter.passes(),
        received = stats.decoded,
        rejected = stats.rejected,
        latest = ?receiver.display_state(),
        "Session finished"
    );
    Ok(())
}
