//! Core types for the telemetry link.
//!
//! - [`TelemetryRecord`] is one `(sequence_id, metric)` measurement
//! - [`Batch`] groups the records of one trigger event with their [`Statistics`]
//! - [`WireFrame`] is the fixed 8-byte radio payload
//! - [`LinkSession`] holds the radio parameters both endpoints must share
//!
//! ```rust
//! use rssilink::types::{LinkSession, Role};
//!
//! let session = LinkSession::default();
//! session.validate().unwrap();
//! assert_eq!(session.rf_setup(), 0x26);
//! assert_eq!(session.local_address(Role::Transmitter), session.peer_address(Role::Receiver));
//! ```

mod frame;
mod record;
mod session;
mod statistics;

pub use frame::{FRAME_SIZE, WireFrame};
pub use record::{Batch, NO_SIGNAL_DBM, TelemetryRecord};
pub use session::{
    ADDRESS_WIDTH, Address, DataRate, LinkSession, MAX_CHANNEL, PowerLevel, RF_SETUP_REGISTER,
    Role,
};
pub use statistics::Statistics;
