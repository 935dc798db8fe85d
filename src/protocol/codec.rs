//! Hipee frame codec (encode/decode)
//!
//! Encoding and decoding are pure functions of their input: the registry is
//! a static table and no state is kept between calls, so both may be used
//! from any number of threads at once.

use std::fmt;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::{debug, info, trace, warn};

use super::metrics::{FrameDirection, FrameFault, Metrics};
use super::schema::{self, MessageSchema};
use super::{
    CHECKSUM_SIZE, DecodedMessage, Error, FieldWidth, FrameHeader, HEADER_SIZE, MIN_FRAME_SIZE,
    Message, Result,
};

/// Wrapping sum of every byte
#[must_use]
pub fn frame_sum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, byte| sum.wrapping_add(*byte))
}

/// Checksum byte for `bytes`: the value that brings the total sum to zero
/// modulo 256
#[must_use]
pub fn checksum(bytes: &[u8]) -> u8 {
    frame_sum(bytes).wrapping_neg()
}

/// Encode one frame from a schema and one value per field
///
/// # Format
///
/// ```text
/// [0x09] [LENGTH] [COMMAND ID] [FIELDS (big-endian)] [CHECKSUM]
/// ```
///
/// # Errors
///
/// Returns an error if:
/// - `values` does not hold exactly one value per field ([`Error::ValueCountMismatch`])
/// - A value does not fit its field width
pub fn encode_frame(schema: &MessageSchema, values: &[u32]) -> Result<Bytes> {
    let result = write_frame(schema, values);
    match &result {
        Ok(frame) => {
            Metrics::record_frame(FrameDirection::Encoded, schema.command_id());
            debug!(
                command = schema.name(),
                frame = %HexDump(frame),
                "encoded frame"
            );
        }
        Err(err) => {
            Metrics::record_fault(FrameFault::Encode);
            debug!(command = schema.name(), error = %err, "encode failed");
        }
    }
    result
}

/// Encode a message, resolving defaults for fields the caller left unset
pub fn encode(message: &Message) -> Result<Bytes> {
    encode_frame(message.schema(), &message.values())
}

fn write_frame(schema: &MessageSchema, values: &[u32]) -> Result<Bytes> {
    let fields = schema.fields();
    let payload_len = schema.payload_len();

    if values.len() != fields.len() {
        return Err(Error::ValueCountMismatch {
            command_id: schema.command_id(),
            expected: fields.len(),
            got: values.len(),
        });
    }

    let header = FrameHeader::new(schema.command_id(), payload_len).ok_or(
        Error::FieldCountMismatch {
            command_id: schema.command_id(),
            expected: payload_len,
            declared: usize::from(u8::MAX) - CHECKSUM_SIZE,
            actual: payload_len,
        },
    )?;

    let mut frame = BytesMut::with_capacity(schema.frame_len());
    frame.put_slice(&header.to_bytes());

    for (field, &value) in fields.iter().zip(values) {
        if !field.width().fits(value) {
            return Err(Error::FieldOverflow {
                field: field.name(),
                width: field.width().bytes(),
                value,
            });
        }
        // `fits` bounds the casts below
        match field.width() {
            FieldWidth::One => frame.put_u8(value as u8),
            FieldWidth::Two => frame.put_u16(value as u16),
            FieldWidth::Four => frame.put_u32(value),
        }
    }

    let check = checksum(&frame);
    frame.put_u8(check);

    Ok(frame.freeze())
}

/// What to do with a frame whose bytes do not sum to zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChecksumPolicy {
    /// Fail with [`Error::ChecksumMismatch`]
    #[default]
    Reject,
    /// Log a warning and parse the frame anyway
    Warn,
}

/// Decoder configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeConfig {
    /// Handling of checksum failures (default: reject).
    pub checksum_policy: ChecksumPolicy,
    /// Refuse frames whose first byte is not the magic (default: true).
    pub require_magic: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            checksum_policy: ChecksumPolicy::Reject,
            require_magic: true,
        }
    }
}

impl DecodeConfig {
    /// Configuration that tolerates checksum failures, as the vendor app does
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            checksum_policy: ChecksumPolicy::Warn,
            ..Self::default()
        }
    }
}

/// Stateless frame decoder
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    config: DecodeConfig,
}

impl Decoder {
    /// Create a decoder
    #[must_use]
    pub const fn new(config: DecodeConfig) -> Self {
        Self { config }
    }

    /// Get config
    #[must_use]
    pub const fn config(&self) -> &DecodeConfig {
        &self.config
    }

    /// Decode exactly one frame
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Frame is shorter than 4 bytes
    /// - Checksum doesn't match (under [`ChecksumPolicy::Reject`])
    /// - Magic byte is wrong (when `require_magic` is set)
    /// - Command id is unknown
    /// - Length byte or payload size disagree with the schema
    pub fn decode(&self, bytes: &[u8]) -> Result<DecodedMessage> {
        let result = self.decode_frame(bytes);
        match &result {
            Ok(message) => {
                Metrics::record_frame(FrameDirection::Decoded, message.command_id());
                trace!(
                    command = message.schema().name(),
                    frame = %HexDump(bytes),
                    "decoded frame"
                );
            }
            Err(Error::UnknownCommand { .. }) => Metrics::record_fault(FrameFault::UnknownCommand),
            // counted where the mismatch is detected so tolerated failures count too
            Err(Error::ChecksumMismatch { .. }) => {}
            Err(_) => Metrics::record_fault(FrameFault::Malformed),
        }
        result
    }

    /// Decode a notification, logging and discarding anything undecodable
    pub fn decode_lossy(&self, bytes: &[u8]) -> Option<DecodedMessage> {
        match self.decode(bytes) {
            Ok(message) => {
                info!("{message}");
                Some(message)
            }
            Err(err) => {
                warn!(error = %err, frame = %HexDump(bytes), "discarding notification");
                None
            }
        }
    }

    fn decode_frame(&self, bytes: &[u8]) -> Result<DecodedMessage> {
        let total_available = bytes.len();

        // Check minimum size
        if total_available < MIN_FRAME_SIZE {
            return Err(Error::FrameTooShort {
                needed: MIN_FRAME_SIZE,
                got: total_available,
            });
        }

        let checksum_offset = total_available - CHECKSUM_SIZE;

        // Verify checksum over the whole frame
        if frame_sum(bytes) != 0 {
            Metrics::record_fault(FrameFault::Checksum);
            let expected = checksum(&bytes[..checksum_offset]);
            let found = bytes[checksum_offset];
            match self.config.checksum_policy {
                ChecksumPolicy::Reject => {
                    return Err(Error::ChecksumMismatch { expected, found });
                }
                ChecksumPolicy::Warn => {
                    warn!(expected, found, frame = %HexDump(bytes), "checksum validation failed");
                }
            }
        }

        let header = FrameHeader::from_bytes(bytes)?;
        if self.config.require_magic {
            header.validate()?;
        }

        let schema = schema::lookup(header.command_id()).ok_or(Error::UnknownCommand {
            command_id: header.command_id(),
        })?;

        let payload = &bytes[HEADER_SIZE..checksum_offset];
        let expected = schema.payload_len();
        let declared = header.declared_payload_len();
        if payload.len() != expected || declared != expected {
            return Err(Error::FieldCountMismatch {
                command_id: header.command_id(),
                expected,
                declared,
                actual: payload.len(),
            });
        }

        Ok(DecodedMessage::from_parts(schema, unpack(schema, payload)))
    }
}

/// Decode a frame with the default (strict) configuration
pub fn decode(bytes: &[u8]) -> Result<DecodedMessage> {
    Decoder::default().decode(bytes)
}

// Caller guarantees `payload.len() == schema.payload_len()`.
fn unpack(schema: &MessageSchema, mut payload: &[u8]) -> Vec<u32> {
    schema
        .fields()
        .iter()
        .map(|field| match field.width() {
            FieldWidth::One => u32::from(payload.get_u8()),
            FieldWidth::Two => u32::from(payload.get_u16()),
            FieldWidth::Four => payload.get_u32(),
        })
        .collect()
}

/// Lazily formatted lowercase hex, rendered only if the log line is emitted
struct HexDump<'a>(&'a [u8]);

impl fmt::Display for HexDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CommandId;

    const BATTERY_77_DISCHARGING: [u8; 6] = [0x09, 0x03, 0x45, 77, 2, 0x60];

    #[test]
    fn test_hello_request_fixture() {
        let encoded = Message::new(CommandId::HelloRequest).encode().unwrap();
        assert_eq!(encoded.as_ref(), &[0x09, 0x01, 0x01, 0xF5]);
    }

    #[test]
    fn test_checksum_examples() {
        assert_eq!(checksum(&[0x09, 0x01, 0x01]), 0xF5);
        assert_eq!(checksum(&[0x09, 0x03, 0x45, 77, 2]), 0x60);
        // sum already a multiple of 256
        assert_eq!(checksum(&[0x80, 0x80]), 0x00);
        assert_eq!(frame_sum(&BATTERY_77_DISCHARGING), 0);
    }

    #[test]
    fn test_decode_battery_state() {
        let decoded = decode(&BATTERY_77_DISCHARGING).unwrap();

        assert_eq!(decoded.command_id(), 0x45);
        assert_eq!(decoded.get("battery_percent"), Some(77));
        assert_eq!(decoded.get("charge_state"), Some(2));
    }

    #[test]
    fn test_encode_big_endian_fields() {
        let msg = Message::new(CommandId::InitialDataResponse)
            .with("battery_percent", 0x64)
            .and_then(|m| m.with("version", 0x0102))
            .and_then(|m| m.with("space_remaining", 0x0A0B_0C0D))
            .unwrap();
        let encoded = msg.encode().unwrap();

        assert_eq!(
            &encoded[..10],
            &[0x09, 0x08, 0x04, 0x64, 0x01, 0x02, 0x0A, 0x0B, 0x0C, 0x0D]
        );
        assert_eq!(frame_sum(&encoded), 0);
    }

    #[test]
    fn test_set_config_default_frame() {
        let encoded = Message::new(CommandId::SetConfigRequest).encode().unwrap();
        let mut expected = vec![
            0x09, 0x10, 0x30, 1, 50, 5, 0, 1, 244, 7, 208, 0x00, 0x00, 0, 2, 0, 30, 0,
        ];
        expected.push(checksum(&expected));
        assert_eq!(encoded.as_ref(), expected.as_slice());
    }

    #[test]
    fn test_encode_overflow_rejected() {
        let msg = Message::new(CommandId::SetConfigRequest)
            .with("shake_power", 256)
            .unwrap();
        assert!(matches!(
            msg.encode(),
            Err(Error::FieldOverflow {
                field: "shake_power",
                width: 1,
                value: 256
            })
        ));

        let schema = schema::schema(CommandId::LiveUpdateRequest);
        assert!(matches!(
            encode_frame(schema, &[65_536, 1]),
            Err(Error::FieldOverflow { width: 2, .. })
        ));
    }

    #[test]
    fn test_encode_wrong_value_count() {
        let schema = schema::schema(CommandId::BatteryStateResponse);
        assert_eq!(
            encode_frame(schema, &[1]).unwrap_err(),
            Error::ValueCountMismatch {
                command_id: 0x45,
                expected: 2,
                got: 1
            }
        );
        assert!(matches!(
            encode_frame(schema, &[1, 2, 3]),
            Err(Error::ValueCountMismatch { got: 3, .. })
        ));
    }

    #[test]
    fn test_corrupting_last_byte_detected() {
        let mut encoded = Message::new(CommandId::SetConfigRequest)
            .encode()
            .unwrap()
            .to_vec();
        let offset = encoded.len() * 2;
        let last = encoded.len() - 1;
        encoded[offset.min(last)] ^= 0x01;

        assert!(matches!(
            decode(&encoded),
            Err(Error::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_decode_checksum_mismatch() {
        let mut frame = BATTERY_77_DISCHARGING;
        frame[5] ^= 0xFF;

        let result = decode(&frame);
        assert!(matches!(
            result,
            Err(Error::ChecksumMismatch {
                expected: 0x60,
                found: 0x9F
            })
        ));
    }

    #[test]
    fn test_decode_checksum_warn_policy() {
        let mut frame = BATTERY_77_DISCHARGING;
        frame[3] = 78;

        let decoder = Decoder::new(DecodeConfig::lenient());
        let decoded = decoder.decode(&frame).unwrap();
        assert_eq!(decoded.get("battery_percent"), Some(78));
    }

    #[test]
    fn test_decode_frame_too_short() {
        for len in 0..MIN_FRAME_SIZE {
            let bytes = vec![0x09; len];
            assert!(matches!(
                decode(&bytes),
                Err(Error::FrameTooShort { needed: 4, got }) if got == len
            ));
        }
    }

    #[test]
    fn test_decode_unknown_command() {
        let mut frame = vec![0x09, 0x01, 0x7A];
        frame.push(checksum(&frame));
        assert!(matches!(
            decode(&frame),
            Err(Error::UnknownCommand { command_id: 0x7A })
        ));
    }

    #[test]
    fn test_decode_length_byte_inconsistent() {
        // battery response payload with a length byte claiming 3 payload bytes
        let mut frame = vec![0x09, 0x04, 0x45, 77, 2];
        frame.push(checksum(&frame));
        assert!(matches!(
            decode(&frame),
            Err(Error::FieldCountMismatch {
                command_id: 0x45,
                expected: 2,
                declared: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_decode_truncated_payload() {
        let mut frame = vec![0x09, 0x03, 0x45, 77];
        frame.push(checksum(&frame));
        assert!(matches!(
            decode(&frame),
            Err(Error::FieldCountMismatch {
                expected: 2,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_decode_invalid_magic() {
        let mut frame = vec![0x0A, 0x01, 0x01];
        frame.push(checksum(&frame));
        assert!(matches!(
            decode(&frame),
            Err(Error::InvalidMagic { found: 0x0A })
        ));

        let relaxed = Decoder::new(DecodeConfig {
            require_magic: false,
            ..DecodeConfig::default()
        });
        assert_eq!(
            relaxed.decode(&frame).unwrap().command(),
            CommandId::HelloRequest
        );
    }

    #[test]
    fn test_decode_lossy_discards_errors() {
        let decoder = Decoder::default();
        assert!(decoder.decode_lossy(&[0x09, 0x01]).is_none());
        assert!(decoder.decode_lossy(&BATTERY_77_DISCHARGING).is_some());
    }

    #[test]
    fn test_one_byte_fields_decode_unsigned() {
        let msg = Message::new(CommandId::GetConfigResponse)
            .with("unknown_hc_244", 244)
            .unwrap();
        let decoded = decode(&msg.encode().unwrap()).unwrap();
        assert_eq!(decoded.get("unknown_hc_244"), Some(244));
    }

    #[test]
    fn test_hex_dump() {
        assert_eq!(HexDump(&[0x09, 0x01, 0xF5]).to_string(), "0901f5");
    }

    // Property-based tests
    #[cfg(test)]
    mod proptests {
        use super::*;
        use crate::{MAGIC, MessageRegistry};
        use proptest::prelude::*;

        // Strategy to pick any registered schema
        fn schema_strategy() -> impl Strategy<Value = &'static MessageSchema> {
            (0..CommandId::ALL.len()).prop_map(|index| schema::schema(CommandId::ALL[index]))
        }

        // Strategy to pick a schema together with in-range values for it
        fn schema_and_values() -> impl Strategy<Value = (&'static MessageSchema, Vec<u32>)> {
            schema_strategy().prop_flat_map(|schema| {
                let values: Vec<_> = schema
                    .fields()
                    .iter()
                    .map(|field| 0..=field.width().max_value())
                    .collect();
                (Just(schema), values)
            })
        }

        proptest! {
            /// Property: Any in-range assignment should roundtrip correctly
            #[test]
            fn prop_roundtrip_preserves_values((schema, values) in schema_and_values()) {
                let encoded = encode_frame(schema, &values).unwrap();
                let decoded = decode(&encoded).unwrap();

                prop_assert_eq!(decoded.command_id(), schema.command_id());
                prop_assert_eq!(decoded.values(), values.as_slice());
            }

            /// Property: Every encoded frame sums to zero and has the schema's size
            #[test]
            fn prop_encoded_frames_sum_to_zero((schema, values) in schema_and_values()) {
                let encoded = encode_frame(schema, &values).unwrap();

                prop_assert_eq!(frame_sum(&encoded), 0);
                prop_assert_eq!(encoded.len(), schema.frame_len());
                prop_assert_eq!(usize::from(encoded[1]), schema.length_byte());
            }

            /// Property: Changing any single byte should be detected
            #[test]
            fn prop_single_byte_corruption_detected(
                (schema, values) in schema_and_values(),
                offset_ratio in 0.0f64..1.0,
                corrupt_value in 1u8..=255,
            ) {
                let mut encoded = encode_frame(schema, &values).unwrap().to_vec();
                let offset = ((encoded.len() as f64) * offset_ratio) as usize;
                // XOR with a non-zero value always changes the byte and the sum
                let last = encoded.len() - 1;
                encoded[offset.min(last)] ^= corrupt_value;

                let result = decode(&encoded);
                prop_assert!(
                    matches!(result, Err(Error::ChecksumMismatch { .. })),
                    "corruption should fail the checksum"
                );
            }

            /// Property: Values wider than the field are rejected, never truncated
            #[test]
            fn prop_overflow_rejected(
                schema in schema_strategy().prop_filter("has a narrow field", |schema| {
                    schema.fields().iter().any(|f| f.width() != FieldWidth::Four)
                }),
                excess in 0u32..1_000_000,
            ) {
                let index = schema
                    .fields()
                    .iter()
                    .position(|f| f.width() != FieldWidth::Four)
                    .unwrap();
                let mut values = vec![0u32; schema.fields().len()];
                values[index] = schema.fields()[index].width().max_value() + 1 + excess;

                let result = encode_frame(schema, &values);
                let is_overflow = matches!(result, Err(Error::FieldOverflow { .. }));
                prop_assert!(is_overflow);
            }

            /// Property: Unregistered command ids never panic the decoder
            #[test]
            fn prop_unknown_commands_rejected(
                command_id in any::<u8>().prop_filter("unregistered", |id| {
                    MessageRegistry::global().lookup(*id).is_none()
                }),
                payload in prop::collection::vec(any::<u8>(), 0..32),
            ) {
                let mut frame = vec![MAGIC, (payload.len() + 1) as u8, command_id];
                frame.extend_from_slice(&payload);
                frame.push(checksum(&frame));

                let result = decode(&frame);
                let is_unknown = matches!(result, Err(Error::UnknownCommand { command_id: id }) if id == command_id);
                prop_assert!(is_unknown);
            }

            /// Property: Arbitrary input never panics under either policy
            #[test]
            fn prop_arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
                let _ = decode(&bytes);
                let _ = Decoder::new(DecodeConfig::lenient()).decode(&bytes);
            }
        }
    }
}
