//! Receiver controller: drain → decode → display.
//!
//! The receiver has a single steady state, `Listening`, entered once by
//! [`ReceiverController::start`]. Each loop iteration polls the transport
//! and, when anything is pending, drains it completely before idling again.

use futures::StreamExt;
use futures::stream::BoxStream;
use std::time::Duration;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::codec::decode;
use crate::config::ReceiverSettings;
use crate::display::{Display, MetricPanel};
use crate::gpio::DigitalOutput;
use crate::transport::Transport;
use crate::{Error, Result};

/// Running totals since start-up
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReceiverStats {
    /// Payloads taken from the transport
    pub frames: u64,
    /// Payloads that decoded into a record
    pub decoded: u64,
    /// Payloads rejected by the codec
    pub rejected: u64,
    /// Receive calls the physical layer failed
    pub link_errors: u64,
    /// Display updates that failed
    pub display_errors: u64,
}

/// Outcome of one drain burst
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DrainReport {
    /// Metrics shown, in arrival order
    pub metrics: Vec<i32>,
    /// Payloads rejected by the codec
    pub rejected: usize,
    /// The burst ended early on a receive failure
    pub link_error: bool,
}

impl DrainReport {
    /// Number of payloads consumed
    pub fn frames(&self) -> usize {
        self.metrics.len() + self.rejected
    }

    pub fn is_empty(&self) -> bool {
        self.frames() == 0 && !self.link_error
    }
}

/// Drives the receiving node.
pub struct ReceiverController<T, D, L> {
    transport: T,
    panel: MetricPanel<D>,
    activity: L,
    frame_delay: Duration,
    idle_delay: Duration,
    state: watch::Sender<Option<i32>>,
    stats: ReceiverStats,
}

impl<T, D, L> ReceiverController<T, D, L>
where
    T: Transport,
    D: Display,
    L: DigitalOutput,
{
    /// Put the transport in listen mode and enter the `Listening` state.
    ///
    /// Failing to listen is a configuration error: the node is useless
    /// without it.
    pub async fn start(
        mut transport: T,
        display: D,
        mut activity: L,
        settings: &ReceiverSettings,
    ) -> Result<Self> {
        transport
            .enter_listen_mode()
            .await
            .map_err(|e| Error::configuration_with_source("enter listen mode", Box::new(e)))?;

        activity.write(false);
        let (state, _) = watch::channel(None);
        info!("Listening for transmissions");

        Ok(Self {
            transport,
            panel: MetricPanel::new(display, settings.label.clone()),
            activity,
            frame_delay: settings.frame_delay(),
            idle_delay: settings.idle_delay(),
            state,
            stats: ReceiverStats::default(),
        })
    }

    /// Last metric shown, if any frame has decoded yet
    pub fn display_state(&self) -> Option<i32> {
        *self.state.borrow()
    }

    /// Stream of displayed metrics.
    ///
    /// Yields the current value first (if any), then every later one that a
    /// slow consumer has not already missed: updates are last-write-wins.
    pub fn subscribe(&self) -> BoxStream<'static, i32> {
        metric_updates(self.state.subscribe())
    }

    pub fn stats(&self) -> ReceiverStats {
        self.stats
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn panel(&self) -> &MetricPanel<D> {
        &self.panel
    }

    /// Receive until nothing is pending.
    ///
    /// The activity indicator is on for the whole burst and cleared only
    /// after the last frame. Malformed frames are logged and skipped; a
    /// receive failure ends the burst (the next poll retries).
    pub async fn drain(&mut self) -> DrainReport {
        let mut report = DrainReport::default();
        if !self.transport.poll_pending() {
            return report;
        }

        self.activity.write(true);

        while self.transport.poll_pending() {
            match self.transport.receive_one().await {
                Ok(payload) => self.handle_payload(&payload, &mut report),
                Err(e) => {
                    self.stats.link_errors += 1;
                    report.link_error = true;
                    warn!("Receive failed, ending burst: {}", e);
                    break;
                }
            }

            tokio::time::sleep(self.frame_delay).await;
        }

        self.activity.write(false);
        report
    }

    fn handle_payload(&mut self, payload: &[u8], report: &mut DrainReport) {
        self.stats.frames += 1;

        let record = match decode(payload) {
            Ok(record) => record,
            Err(e) => {
                self.stats.rejected += 1;
                report.rejected += 1;
                warn!("Dropping frame: {}", e);
                return;
            }
        };

        self.stats.decoded += 1;
        debug!("Received {}", record);

        self.state.send_replace(Some(record.metric));
        report.metrics.push(record.metric);

        if let Err(e) = self.panel.show(record.metric) {
            self.stats.display_errors += 1;
            warn!("Display update failed: {}", e);
        }
    }

    /// Poll and drain until `cancel` fires.
    pub async fn run(&mut self, cancel: CancellationToken) {
        loop {
            if cancel.is_cancelled() {
                break;
            }

            let report = self.drain().await;
            if !report.is_empty() {
                debug!(
                    frames = report.frames(),
                    rejected = report.rejected,
                    latest = ?report.metrics.last(),
                    "Burst drained"
                );
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.idle_delay) => {}
            }
        }

        info!(
            frames = self.stats.frames,
            decoded = self.stats.decoded,
            rejected = self.stats.rejected,
            "Receiver stopped"
        );
    }
}

fn metric_updates(state: watch::Receiver<Option<i32>>) -> BoxStream<'static, i32> {
    WatchStream::new(state).filter_map(|metric| async move { metric }).boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LinkError;
    use crate::codec::encode;
    use crate::types::{TelemetryRecord, WireFrame};
    use std::collections::VecDeque;
    use std::convert::Infallible;
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Received(usize),
        Led(bool),
        Shown(i32),
    }

    type Events = Arc<Mutex<Vec<Event>>>;

    struct Queue {
        payloads: VecDeque<std::result::Result<Vec<u8>, ()>>,
        events: Events,
        received: usize,
        polls: usize,
        listen_fails: bool,
    }

    impl Queue {
        fn new(events: &Events, payloads: Vec<Vec<u8>>) -> Self {
            Self {
                payloads: payloads.into_iter().map(Ok).collect(),
                events: Arc::clone(events),
                received: 0,
                polls: 0,
                listen_fails: false,
            }
        }
    }

    #[async_trait::async_trait]
    impl Transport for Queue {
        async fn send_one(&mut self, _frame: &WireFrame) -> std::result::Result<(), LinkError> {
            Ok(())
        }

        fn poll_pending(&mut self) -> bool {
            self.polls += 1;
            !self.payloads.is_empty()
        }

        async fn receive_one(&mut self) -> std::result::Result<Vec<u8>, LinkError> {
            self.received += 1;
            self.events.lock().unwrap().push(Event::Received(self.received));
            match self.payloads.pop_front() {
                Some(Ok(payload)) => Ok(payload),
                _ => Err(LinkError::Receive { reason: "crc".into(), source: None }),
            }
        }

        async fn enter_listen_mode(&mut self) -> std::result::Result<(), LinkError> {
            if self.listen_fails {
                return Err(LinkError::Listen { reason: "no ack".into(), source: None });
            }
            Ok(())
        }
    }

    struct Led(Events);

    impl DigitalOutput for Led {
        fn write(&mut self, high: bool) {
            self.0.lock().unwrap().push(Event::Led(high));
        }
    }

    struct Screen(Events);

    impl Display for Screen {
        type Error = Infallible;

        fn clear(&mut self) -> std::result::Result<(), Infallible> {
            Ok(())
        }

        fn draw_text(
            &mut self,
            text: &str,
            _x: i32,
            _y: i32,
        ) -> std::result::Result<(), Infallible> {
            if let Some(value) = text.strip_prefix("RSSI: ").and_then(|t| t.strip_suffix(" dBm")) {
                self.0.lock().unwrap().push(Event::Shown(value.parse().unwrap()));
            }
            Ok(())
        }

        fn flush(&mut self) -> std::result::Result<(), Infallible> {
            Ok(())
        }
    }

    async fn receiver(
        payloads: Vec<Vec<u8>>,
    ) -> (ReceiverController<Queue, Screen, Led>, Events) {
        let events = Events::default();
        let rx = ReceiverController::start(
            Queue::new(&events, payloads),
            Screen(Arc::clone(&events)),
            Led(Arc::clone(&events)),
            &ReceiverSettings::default(),
        )
        .await
        .unwrap();
        events.lock().unwrap().clear();
        (rx, events)
    }

    fn frame(id: i32, metric: i32) -> Vec<u8> {
        encode(&TelemetryRecord::new(id, metric)).as_bytes().to_vec()
    }

    #[tokio::test(start_paused = true)]
    async fn drain_consumes_everything_then_clears_indicator() {
        let (mut rx, events) = receiver(vec![frame(0, -40), frame(1, -41), frame(2, -42)]).await;

        let report = rx.drain().await;
        assert_eq!(report.metrics, vec![-40, -41, -42]);
        assert_eq!(report.frames(), 3);

        let events = events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                Event::Led(true),
                Event::Received(1),
                Event::Shown(-40),
                Event::Received(2),
                Event::Shown(-41),
                Event::Received(3),
                Event::Shown(-42),
                Event::Led(false),
            ]
        );
        assert!(!rx.drain().await.link_error);
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_pending_leaves_indicator_alone() {
        let (mut rx, events) = receiver(vec![]).await;
        assert!(rx.drain().await.is_empty());
        assert!(events.lock().unwrap().is_empty());
        assert_eq!(rx.display_state(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_frame_is_skipped_without_disturbing_the_next() {
        let (mut rx, _) = receiver(vec![frame(0, -60), vec![1, 2, 3], frame(1, -61)]).await;

        let report = rx.drain().await;
        assert_eq!(report.metrics, vec![-60, -61]);
        assert_eq!(report.rejected, 1);
        assert_eq!(rx.display_state(), Some(-61));
        assert_eq!(
            rx.stats(),
            ReceiverStats { frames: 3, decoded: 2, rejected: 1, link_errors: 0, display_errors: 0 }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn receive_failure_ends_burst_and_clears_indicator() {
        let events = Events::default();
        let mut queue = Queue::new(&events, vec![frame(0, -70)]);
        queue.payloads.push_back(Err(()));
        queue.payloads.push_back(Ok(frame(2, -72)));

        let mut rx = ReceiverController::start(
            queue,
            Screen(Arc::clone(&events)),
            Led(Arc::clone(&events)),
            &ReceiverSettings::default(),
        )
        .await
        .unwrap();

        let first = rx.drain().await;
        assert!(first.link_error);
        assert_eq!(first.metrics, vec![-70]);
        assert_eq!(events.lock().unwrap().last(), Some(&Event::Led(false)));

        let second = rx.drain().await;
        assert_eq!(second.metrics, vec![-72]);
        assert_eq!(rx.stats().link_errors, 1);
    }

    #[tokio::test]
    async fn listen_failure_aborts_start() {
        let events = Events::default();
        let mut queue = Queue::new(&events, vec![]);
        queue.listen_fails = true;

        let result = ReceiverController::start(
            queue,
            Screen(Arc::clone(&events)),
            Led(Arc::clone(&events)),
            &ReceiverSettings::default(),
        )
        .await;
        let err = result.err().expect("start must fail");
        assert!(err.is_fatal());
    }

    #[tokio::test(start_paused = true)]
    async fn display_state_is_last_write_wins() {
        let (mut rx, _) = receiver(vec![frame(0, -50), frame(1, -55)]).await;
        let mut updates = rx.subscribe();

        rx.drain().await;
        assert_eq!(rx.display_state(), Some(-55));
        assert_eq!(updates.next().await, Some(-55));
    }

    #[tokio::test(start_paused = true)]
    async fn run_loop_drains_until_cancelled() {
        let (mut rx, _) = receiver(vec![frame(0, -33)]).await;
        let cancel = CancellationToken::new();

        let stopper = cancel.clone();
        let stop = async move {
            tokio::time::sleep(Duration::from_millis(350)).await;
            stopper.cancel();
        };

        tokio::join!(rx.run(cancel), stop);
        assert_eq!(rx.display_state(), Some(-33));
        assert_eq!(rx.stats().decoded, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn drained_frames_are_spaced_by_frame_delay() {
        let (mut rx, _) = receiver(vec![frame(0, -40), frame(1, -41), frame(2, -42)]).await;

        let start = Instant::now();
        assert_eq!(rx.drain().await.frames(), 3);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(150), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(200), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn empty_polls_wait_the_idle_delay() {
        let (mut rx, _) = receiver(vec![]).await;
        let cancel = CancellationToken::new();

        let stopper = cancel.clone();
        let stop = async move {
            tokio::time::sleep(Duration::from_millis(250)).await;
            stopper.cancel();
        };

        tokio::join!(rx.run(cancel), stop);
        // Polls at 0, 100 and 200 ms
        assert_eq!(rx.transport().polls, 3);
    }
}
