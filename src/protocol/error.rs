//! Hipee protocol error types

use thiserror::Error;

/// Hipee frame codec errors
///
/// Every variant is the local outcome of a single encode or decode call.
/// None of them is transient, so retrying the same input is pointless.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Sum of all frame bytes is not zero modulo 256
    #[error("checksum mismatch: expected {expected:#04x}, got {found:#04x}")]
    ChecksumMismatch {
        /// Checksum computed over the received frame
        expected: u8,
        /// Checksum byte carried by the frame
        found: u8,
    },

    /// Command id has no registered schema
    #[error("unknown command id: {command_id:#04x}")]
    UnknownCommand {
        /// Command id byte
        command_id: u8,
    },

    /// Frame shorter than magic + length + command id + checksum
    #[error("frame too short: need {needed} bytes, got {got}")]
    FrameTooShort {
        /// Minimum size
        needed: usize,
        /// Actual size
        got: usize,
    },

    /// Payload length disagrees with the schema of the command
    #[error(
        "field count mismatch for command {command_id:#04x}: schema expects {expected} payload bytes, \
         length byte declares {declared}, frame carries {actual}"
    )]
    FieldCountMismatch {
        /// Command id byte
        command_id: u8,
        /// Payload size required by the schema
        expected: usize,
        /// Payload size declared by the length byte
        declared: usize,
        /// Payload size actually present
        actual: usize,
    },

    /// Encode was given a different number of values than the schema has fields
    #[error("command {command_id:#04x} has {expected} fields, got {got} values")]
    ValueCountMismatch {
        /// Command id byte
        command_id: u8,
        /// Number of fields in the schema
        expected: usize,
        /// Number of values supplied
        got: usize,
    },

    /// Value does not fit the declared field width
    #[error("value {value} does not fit {width}-byte field `{field}`")]
    FieldOverflow {
        /// Field name
        field: &'static str,
        /// Field width in bytes
        width: usize,
        /// Offending value
        value: u32,
    },

    /// First frame byte is not the protocol magic
    #[error("invalid magic byte: expected 0x09, got {found:#04x}")]
    InvalidMagic {
        /// Found magic byte
        found: u8,
    },

    /// Field name not declared by the schema
    #[error("command {command} has no field `{field}`")]
    UnknownField {
        /// Command name
        command: &'static str,
        /// Requested field name
        field: String,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_render_hex_ids() {
        let err = Error::UnknownCommand { command_id: 0x7A };
        assert_eq!(err.to_string(), "unknown command id: 0x7a");

        let err = Error::ChecksumMismatch {
            expected: 0xF5,
            found: 0x00,
        };
        assert_eq!(err.to_string(), "checksum mismatch: expected 0xf5, got 0x00");

        let err = Error::ValueCountMismatch {
            command_id: 0x45,
            expected: 2,
            got: 1,
        };
        assert_eq!(err.to_string(), "command 0x45 has 2 fields, got 1 values");
    }
}
