//! Point-to-point signal-strength telemetry over a low-power radio link.
//!
//! A transmitting node samples the received signal strength of its network
//! connection whenever a trigger fires, appends the readings to a durable
//! log and replays the whole log to a receiving node as fixed 8-byte frames.
//! The receiver drains every pending frame and shows the latest metric.
//!
//! # Architecture
//!
//! - [`codec`] turns a [`TelemetryRecord`] into a [`WireFrame`] and back
//! - [`sampler`] takes a [`Batch`] of readings from a [`SignalSource`]
//! - [`journal`] is the line-oriented measurement log
//! - [`transport`] abstracts the radio behind the [`Transport`] trait
//! - [`transmitter`] and [`receiver`] hold the two node state machines
//!
//! ## Example (loopback)
//!
//! ```rust,no_run
//! use rssilink::config::Settings;
//! use rssilink::transport::{LoopbackLink, Transport};
//! use rssilink::{TelemetryRecord, codec};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::from_yaml("")?;
//!     settings.validate()?;
//!
//!     let (mut tx, mut rx) = LoopbackLink::pair();
//!     rx.enter_listen_mode().await?;
//!     tx.send_one(&codec::encode(&TelemetryRecord::new(0, -50))).await?;
//!
//!     let payload = rx.receive_one().await?;
//!     assert_eq!(codec::decode(&payload)?.metric, -50);
//!     Ok(())
//! }
//! ```

// Core types and error handling
pub mod codec;
mod error;
pub mod types;

// Node configuration and ambient setup
pub mod config;
pub mod logging;

// Collaborators
pub mod display;
pub mod gpio;
pub mod journal;
pub mod sampler;
pub mod transport;

// Node state machines
pub mod receiver;
pub mod transmitter;

// Core exports
pub use error::*;
pub use types::*;

pub use config::Settings;
pub use journal::{LogReplay, MeasurementLog};
pub use receiver::{DrainReport, ReceiverController, ReceiverStats};
pub use sampler::{Sampler, SignalSource};
pub use transmitter::{PassReport, TransmitterController, TxState};
pub use transport::{LoopbackEnd, LoopbackLink, Radio, RadioDriver, Transport};
