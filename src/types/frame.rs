//! Fixed-size wire frame

use std::fmt;

use crate::DecodeError;

/// Size of every frame exchanged over the radio, in bytes.
pub const FRAME_SIZE: usize = 8;

/// Serialized form of one [`TelemetryRecord`](super::TelemetryRecord).
///
/// Layout: `sequence_id` then `metric`, each a little-endian `i32`.
/// Both endpoints must agree on this layout; it is the compatibility
/// contract between transmitter and receiver builds.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct WireFrame([u8; FRAME_SIZE]);

impl WireFrame {
    /// Wrap raw frame bytes
    pub const fn from_array(bytes: [u8; FRAME_SIZE]) -> Self {
        Self(bytes)
    }

    /// Borrow the frame as a byte slice for the physical layer
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Copy out the underlying array
    pub const fn to_array(self) -> [u8; FRAME_SIZE] {
        self.0
    }
}

impl TryFrom<&[u8]> for WireFrame {
    type Error = DecodeError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let array: [u8; FRAME_SIZE] = bytes
            .try_into()
            .map_err(|_| DecodeError::SizeMismatch { expected: FRAME_SIZE, actual: bytes.len() })?;
        Ok(Self(array))
    }
}

impl AsRef<[u8]> for WireFrame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for WireFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WireFrame({self})")
    }
}

impl fmt::Display for WireFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i == 4 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}
