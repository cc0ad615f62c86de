//! Radio session parameters shared by both endpoints

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::FRAME_SIZE;
use crate::{Error, Result};

/// Highest channel the transceiver accepts (2400 + 125 MHz).
pub const MAX_CHANNEL: u8 = 125;

/// Width of a pipe address in bytes.
pub const ADDRESS_WIDTH: usize = 5;

/// RF_SETUP register holding data rate and power bits.
pub const RF_SETUP_REGISTER: u8 = 0x06;

/// 5-byte pipe address
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(pub [u8; ADDRESS_WIDTH]);

impl Address {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|b| write!(f, "{b:02x}"))
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if digits.len() != ADDRESS_WIDTH * 2 || !digits.is_ascii() {
            return Err(Error::configuration(format!(
                "address {s:?} must be {} hex digits",
                ADDRESS_WIDTH * 2
            )));
        }

        let mut bytes = [0u8; ADDRESS_WIDTH];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16).map_err(|e| {
                Error::configuration(format!("address {s:?} is not hexadecimal: {e}"))
            })?;
        }
        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct AddressVisitor;

impl Visitor<'_> for AddressVisitor {
    type Value = Address;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a quoted string of {} hex digits", ADDRESS_WIDTH * 2)
    }

    fn visit_str<E: de::Error>(self, text: &str) -> std::result::Result<Address, E> {
        text.parse().map_err(E::custom)
    }

    // YAML hands over an unquoted all-digit address as a number
    fn visit_u64<E: de::Error>(self, value: u64) -> std::result::Result<Address, E> {
        Err(E::custom(format!("address {value} must be quoted, e.g. \"{value:010}\"")))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> std::result::Result<Address, E> {
        Err(E::custom(format!("address {value} must be a quoted hex string")))
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(AddressVisitor)
    }
}

/// Over-the-air data rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataRate {
    #[serde(rename = "1mbps")]
    Mbps1,
    #[serde(rename = "2mbps")]
    Mbps2,
    #[serde(rename = "250kbps")]
    Kbps250,
}

impl DataRate {
    /// RF_DR_LOW (bit 5) and RF_DR_HIGH (bit 3) pattern
    pub const fn register_bits(self) -> u8 {
        match self {
            DataRate::Mbps1 => 0x00,
            DataRate::Mbps2 => 0x08,
            DataRate::Kbps250 => 0x20,
        }
    }
}

/// Transmit power level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerLevel {
    /// -18 dBm
    Min,
    /// -12 dBm
    Low,
    /// -6 dBm
    High,
    /// 0 dBm
    Max,
}

impl PowerLevel {
    /// RF_PWR pattern (bits 2:1)
    pub const fn register_bits(self) -> u8 {
        match self {
            PowerLevel::Min => 0b000,
            PowerLevel::Low => 0b010,
            PowerLevel::High => 0b100,
            PowerLevel::Max => 0b110,
        }
    }

    pub const fn dbm(self) -> i8 {
        match self {
            PowerLevel::Min => -18,
            PowerLevel::Low => -12,
            PowerLevel::High => -6,
            PowerLevel::Max => 0,
        }
    }
}

/// Which end of the link a node plays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Transmitter,
    Receiver,
}

/// Configured state of one endpoint.
///
/// Both nodes must be built with identical parameters to interoperate.
/// `tx_address` carries telemetry from transmitter to receiver;
/// `reply_address` is opened by the receiver for the reverse direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkSession {
    pub channel: u8,
    pub tx_address: Address,
    pub reply_address: Address,
    pub data_rate: DataRate,
    pub power: PowerLevel,
    pub payload_size: usize,
}

impl Default for LinkSession {
    fn default() -> Self {
        Self {
            channel: 46,
            tx_address: Address([0xe1, 0xf0, 0xf0, 0xf0, 0xf0]),
            reply_address: Address([0xd2, 0xf0, 0xf0, 0xf0, 0xf0]),
            data_rate: DataRate::Kbps250,
            power: PowerLevel::Max,
            payload_size: FRAME_SIZE,
        }
    }
}

impl LinkSession {
    /// Check the parameters against what the transceiver and frame layout accept.
    pub fn validate(&self) -> Result<()> {
        if self.channel > MAX_CHANNEL {
            return Err(Error::configuration(format!(
                "channel {} is outside 0..={MAX_CHANNEL}",
                self.channel
            )));
        }

        if self.payload_size != FRAME_SIZE {
            return Err(Error::configuration(format!(
                "payload size {} does not match the {FRAME_SIZE}-byte frame",
                self.payload_size
            )));
        }

        if self.tx_address == self.reply_address {
            return Err(Error::configuration(format!(
                "transmit and reply pipes share address {}",
                self.tx_address
            )));
        }

        Ok(())
    }

    /// RF_SETUP value combining data rate and power bits
    pub fn rf_setup(&self) -> u8 {
        self.data_rate.register_bits() | self.power.register_bits()
    }

    /// Address this node writes to
    pub fn local_address(&self, role: Role) -> Address {
        match role {
            Role::Transmitter => self.tx_address,
            Role::Receiver => self.reply_address,
        }
    }

    /// Address this node listens on
    pub fn peer_address(&self, role: Role) -> Address {
        match role {
            Role::Transmitter => self.reply_address,
            Role::Receiver => self.tx_address,
        }
    }
}
