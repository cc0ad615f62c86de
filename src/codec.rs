//! Packet codec: [`TelemetryRecord`] to and from the 8-byte [`WireFrame`].
//!
//! ```rust
//! use rssilink::codec::{decode, encode};
//! use rssilink::types::TelemetryRecord;
//!
//! let record = TelemetryRecord::new(3, -61);
//! let frame = encode(&record);
//! assert_eq!(decode(frame.as_bytes()).unwrap(), record);
//! ```

use crate::DecodeError;
use crate::types::{FRAME_SIZE, TelemetryRecord, WireFrame};

const SEQUENCE_ID: std::ops::Range<usize> = 0..4;
const METRIC: std::ops::Range<usize> = 4..8;

/// Serialize a record. Always succeeds.
pub fn encode(record: &TelemetryRecord) -> WireFrame {
    let mut bytes = [0u8; FRAME_SIZE];
    bytes[SEQUENCE_ID].copy_from_slice(&record.sequence_id.to_le_bytes());
    bytes[METRIC].copy_from_slice(&record.metric.to_le_bytes());
    WireFrame::from_array(bytes)
}

/// Deserialize a received payload.
///
/// The length is checked before any byte is interpreted, so a short or long
/// payload always yields [`DecodeError::SizeMismatch`].
pub fn decode(bytes: &[u8]) -> Result<TelemetryRecord, DecodeError> {
    if bytes.len() != FRAME_SIZE {
        return Err(DecodeError::SizeMismatch { expected: FRAME_SIZE, actual: bytes.len() });
    }

    let sequence_id = read_i32(bytes, SEQUENCE_ID, "sequence_id")?;
    let metric = read_i32(bytes, METRIC, "metric")?;

    Ok(TelemetryRecord { sequence_id, metric })
}

/// Deserialize a frame already known to be the right size.
pub fn decode_frame(frame: &WireFrame) -> Result<TelemetryRecord, DecodeError> {
    decode(frame.as_bytes())
}

fn read_i32(
    bytes: &[u8],
    range: std::ops::Range<usize>,
    field: &'static str,
) -> Result<i32, DecodeError> {
    let raw: [u8; 4] = bytes
        .get(range.clone())
        .and_then(|slice| slice.try_into().ok())
        .ok_or_else(|| DecodeError::Malformed {
            field,
            details: format!("bytes {}..{} unavailable", range.start, range.end),
        })?;
    Ok(i32::from_le_bytes(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn decode_inverts_encode(sequence_id in any::<i32>(), metric in any::<i32>()) {
            let record = TelemetryRecord::new(sequence_id, metric);
            prop_assert_eq!(decode(encode(&record).as_bytes()), Ok(record));
        }

        #[test]
        fn decode_rejects_every_other_length(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
            prop_assume!(bytes.len() != FRAME_SIZE);
            prop_assert_eq!(
                decode(&bytes),
                Err(DecodeError::SizeMismatch { expected: FRAME_SIZE, actual: bytes.len() })
            );
        }
    }

    #[test]
    fn size_guard_covers_reference_lengths() {
        for len in [0usize, 1, 7, 9, 16] {
            let bytes = vec![0xffu8; len];
            assert_eq!(
                decode(&bytes),
                Err(DecodeError::SizeMismatch { expected: FRAME_SIZE, actual: len }),
                "length {len} must be rejected"
            );
        }
    }

    #[test]
    fn layout_is_sequence_then_metric_little_endian() {
        let frame = encode(&TelemetryRecord::new(1, -50));
        assert_eq!(frame.to_array(), [0x01, 0x00, 0x00, 0x00, 0xce, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn codec_imposes_no_metric_range() {
        for metric in [i32::MIN, -101, 1, 250, i32::MAX] {
            let record = TelemetryRecord::new(0, metric);
            assert_eq!(decode_frame(&encode(&record)), Ok(record));
        }
    }
}
