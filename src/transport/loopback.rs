//! In-memory link connecting two transports

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tracing::trace;

use super::Transport;
use crate::LinkError;
use crate::types::WireFrame;

type Queue = Mutex<VecDeque<Vec<u8>>>;

/// Factory for a connected pair of [`LoopbackEnd`]s.
///
/// Frames sent on one end queue, in order, on the other. There is no loss,
/// no reordering and no capacity limit. Once an end is dropped, sends from
/// its peer fail with [`LinkError::Disconnected`].
pub struct LoopbackLink;

impl LoopbackLink {
    pub fn pair() -> (LoopbackEnd, LoopbackEnd) {
        let a = Arc::new(Queue::default());
        let b = Arc::new(Queue::default());

        let end_a =
            LoopbackEnd { inbound: Arc::clone(&a), outbound: Arc::downgrade(&b), listening: false };
        let end_b = LoopbackEnd { inbound: b, outbound: Arc::downgrade(&a), listening: false };
        (end_a, end_b)
    }
}

/// One end of a [`LoopbackLink`]
pub struct LoopbackEnd {
    inbound: Arc<Queue>,
    outbound: Weak<Queue>,
    listening: bool,
}

fn lock(queue: &Queue) -> MutexGuard<'_, VecDeque<Vec<u8>>> {
    queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl LoopbackEnd {
    /// Queue a raw payload on this end as if the peer had sent it.
    ///
    /// Lets callers feed payloads of any length, including ones that are not
    /// valid frames.
    pub fn inject(&self, payload: impl Into<Vec<u8>>) {
        lock(&self.inbound).push_back(payload.into());
    }

    /// Number of payloads waiting on this end
    pub fn pending(&self) -> usize {
        lock(&self.inbound).len()
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }
}

#[async_trait::async_trait]
impl Transport for LoopbackEnd {
    async fn send_one(&mut self, frame: &WireFrame) -> Result<(), LinkError> {
        let peer = self.outbound.upgrade().ok_or(LinkError::Disconnected)?;
        trace!("loopback TX {}", frame);
        lock(&peer).push_back(frame.as_bytes().to_vec());
        Ok(())
    }

    fn poll_pending(&mut self) -> bool {
        !lock(&self.inbound).is_empty()
    }

    async fn receive_one(&mut self) -> Result<Vec<u8>, LinkError> {
        lock(&self.inbound).pop_front().ok_or_else(|| LinkError::Receive {
            reason: "no payload pending".to_string(),
            source: None,
        })
    }

    async fn enter_listen_mode(&mut self) -> Result<(), LinkError> {
        self.listening = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode, encode};
    use crate::types::TelemetryRecord;

    #[tokio::test]
    async fn frames_arrive_in_send_order() {
        let (mut tx, mut rx) = LoopbackLink::pair();
        rx.enter_listen_mode().await.unwrap();
        assert!(rx.is_listening());

        for id in 0..3 {
            tx.send_one(&encode(&TelemetryRecord::new(id, -50 - id))).await.unwrap();
        }
        assert_eq!(rx.pending(), 3);

        let mut ids = Vec::new();
        while rx.poll_pending() {
            let payload = rx.receive_one().await.unwrap();
            ids.push(decode(&payload).unwrap().sequence_id);
        }
        assert_eq!(ids, vec![0, 1, 2]);
        assert!(!tx.poll_pending());
    }

    #[tokio::test]
    async fn dropped_peer_disconnects_sender() {
        let (mut tx, rx) = LoopbackLink::pair();
        drop(rx);

        let err = tx.send_one(&encode(&TelemetryRecord::new(0, -1))).await.unwrap_err();
        assert!(matches!(err, LinkError::Disconnected));
    }

    #[tokio::test]
    async fn receive_without_pending_is_an_error() {
        let (_tx, mut rx) = LoopbackLink::pair();
        assert!(rx.receive_one().await.is_err());

        rx.inject(vec![1, 2, 3]);
        assert_eq!(rx.receive_one().await.unwrap(), vec![1, 2, 3]);
    }
}
