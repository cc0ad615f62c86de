//! Node settings.
//!
//! Every field defaults to the reference deployment, so an empty document is
//! a valid configuration. Durations are given in milliseconds. Pipe
//! addresses are 10 hex digits, optionally prefixed with `0x`, and must be
//! quoted: YAML reads an unquoted `1122334455` as an integer.
//!
//! ```rust
//! use rssilink::config::Settings;
//!
//! let settings = Settings::from_yaml(
//!     r#"
//! link:
//!   channel: 76
//!   tx_address: "e1f0f0f0f0"
//! sampler:
//!   count: 5
//! "#,
//! )
//! .unwrap();
//!
//! assert_eq!(settings.link.channel, 76);
//! assert_eq!(settings.sampler.count, 5);
//! assert_eq!(settings.transmitter.rearm_ms, 2000);
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::sampler::Sampler;
use crate::types::LinkSession;
use crate::{Error, Result};

/// Sampling cadence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SamplerSettings {
    /// Readings per trigger
    pub count: usize,
    /// Delay between readings
    pub interval_ms: u64,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self { count: 10, interval_ms: 100 }
    }
}

impl SamplerSettings {
    pub fn build(&self) -> Result<Sampler> {
        Sampler::new(self.count, Duration::from_millis(self.interval_ms))
    }
}

/// Transmitter pacing and persistence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransmitterSettings {
    /// Durable measurement log
    pub log_path: PathBuf,
    /// Delay between consecutive frames of a pass
    pub send_interval_ms: u64,
    /// Minimum time between two accepted triggers
    pub rearm_ms: u64,
    /// How often the trigger level is checked while idle
    pub trigger_poll_ms: u64,
    /// Network association checks at start-up
    pub association_attempts: u32,
    /// Delay between association checks
    pub association_interval_ms: u64,
}

impl Default for TransmitterSettings {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("rssi_measurements.txt"),
            send_interval_ms: 100,
            rearm_ms: 2000,
            trigger_poll_ms: 20,
            association_attempts: 20,
            association_interval_ms: 1000,
        }
    }
}

impl TransmitterSettings {
    pub fn send_interval(&self) -> Duration {
        Duration::from_millis(self.send_interval_ms)
    }

    pub fn rearm(&self) -> Duration {
        Duration::from_millis(self.rearm_ms)
    }

    pub fn trigger_poll(&self) -> Duration {
        Duration::from_millis(self.trigger_poll_ms)
    }

    pub fn association_interval(&self) -> Duration {
        Duration::from_millis(self.association_interval_ms)
    }
}

/// Receiver polling cadence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReceiverSettings {
    /// Delay between frames of one drain burst
    pub frame_delay_ms: u64,
    /// Delay between polls
    pub idle_delay_ms: u64,
    /// Header line on the display
    pub label: String,
}

impl Default for ReceiverSettings {
    fn default() -> Self {
        Self { frame_delay_ms: 50, idle_delay_ms: 100, label: "Packet received:".to_string() }
    }
}

impl ReceiverSettings {
    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(self.frame_delay_ms)
    }

    pub fn idle_delay(&self) -> Duration {
        Duration::from_millis(self.idle_delay_ms)
    }
}

/// Complete settings for either node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub link: LinkSession,
    pub sampler: SamplerSettings,
    pub transmitter: TransmitterSettings,
    pub receiver: ReceiverSettings,
}

impl Settings {
    /// Parse and validate settings from YAML text
    pub fn from_yaml(text: &str) -> Result<Self> {
        let settings: Settings = if text.trim().is_empty() {
            Settings::default()
        } else {
            serde_yaml_ng::from_str(text)?
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::settings(format!("cannot read {}: {e}", path.display())))?;
        debug!("Loaded settings from {}", path.display());
        Self::from_yaml(&text)
    }

    /// Render as YAML, e.g. to write a template
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Reject settings the nodes cannot run with
    pub fn validate(&self) -> Result<()> {
        self.link.validate()?;

        if self.sampler.count == 0 {
            return Err(Error::settings("sampler.count must be positive"));
        }
        if self.transmitter.trigger_poll_ms == 0 || self.receiver.idle_delay_ms == 0 {
            return Err(Error::settings("poll intervals must be positive"));
        }

        Ok(())
    }
}
