//! Transport channel over the physical link.
//!
//! A [`Transport`] moves whole frames, independent of direction: the
//! transmitter only sends, the receiver only drains, but both see the same
//! capability set. Two implementations ship with the crate:
//!
//! - [`Radio`] drives a [`RadioDriver`] (the transceiver collaborator) after
//!   applying a [`LinkSession`](crate::types::LinkSession)
//! - [`LoopbackLink`] connects two in-memory ends, for tests and simulation

mod loopback;
mod radio;

pub use loopback::{LoopbackEnd, LoopbackLink};
pub use radio::{Radio, RadioDriver, RX_PIPE};

use crate::LinkError;
use crate::types::WireFrame;

/// Send-one / receive-pending capability set over the physical link.
///
/// There are no acknowledgements and no retries: `Ok` from
/// [`send_one`](Transport::send_one) means the frame was handed to the
/// physical layer, not that the peer received it.
#[async_trait::async_trait]
pub trait Transport: Send + 'static {
    /// Hand one frame to the physical layer (fire-and-forget)
    async fn send_one(&mut self, frame: &WireFrame) -> Result<(), LinkError>;

    /// Whether at least one received payload is buffered and ready
    fn poll_pending(&mut self) -> bool;

    /// Take the next buffered payload
    ///
    /// Only call this after [`poll_pending`](Transport::poll_pending) returned
    /// `true`; otherwise the result depends on the physical layer. The payload
    /// is returned raw so the caller can apply the size guard.
    async fn receive_one(&mut self) -> Result<Vec<u8>, LinkError>;

    /// Switch the physical layer into receive mode
    async fn enter_listen_mode(&mut self) -> Result<(), LinkError>;
}
