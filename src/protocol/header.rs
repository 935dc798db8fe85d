//! Hipee frame header
//!
//! The header is the three bytes in front of the payload. It is enough to
//! find the schema and the expected frame size of anything on the wire.

use super::{CHECKSUM_SIZE, CommandId, Error, HEADER_SIZE, MAGIC, MIN_FRAME_SIZE, Result};

/// Hipee frame header (3 bytes)
///
/// # Wire Format
///
/// ```text
/// +--------+--------+------------+-------------------+----------+
/// | magic  | length | command id | payload (len - 1) | checksum |
/// | 0x09   | 1 byte | 1 byte     | big-endian fields | 1 byte   |
/// +--------+--------+------------+-------------------+----------+
/// ```
///
/// `length` counts the payload bytes plus the checksum byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    magic: u8,
    length: u8,
    command_id: u8,
}

impl FrameHeader {
    /// Create a header for `payload_len` bytes of fields
    ///
    /// Returns `None` when the payload cannot be described by the one-byte
    /// length field.
    #[must_use]
    pub fn new(command_id: u8, payload_len: usize) -> Option<Self> {
        let length = u8::try_from(payload_len + CHECKSUM_SIZE).ok()?;
        Some(Self {
            magic: MAGIC,
            length,
            command_id,
        })
    }

    /// Get magic byte
    #[must_use]
    pub const fn magic(&self) -> u8 {
        self.magic
    }

    /// Get the raw length byte
    #[must_use]
    pub const fn length(&self) -> u8 {
        self.length
    }

    /// Payload size announced by the length byte
    #[must_use]
    pub const fn declared_payload_len(&self) -> usize {
        (self.length as usize).saturating_sub(CHECKSUM_SIZE)
    }

    /// Get command id byte
    #[must_use]
    pub const fn command_id(&self) -> u8 {
        self.command_id
    }

    /// Get the command, if known
    #[must_use]
    pub const fn command(&self) -> Option<CommandId> {
        CommandId::from_u8(self.command_id)
    }

    /// Check the magic byte
    pub fn validate(&self) -> Result<()> {
        if self.magic != MAGIC {
            return Err(Error::InvalidMagic { found: self.magic });
        }
        Ok(())
    }

    /// Convert to bytes
    #[must_use]
    pub const fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        [self.magic, self.length, self.command_id]
    }

    /// Parse the leading bytes of a frame
    ///
    /// Does not validate the magic byte; the decoder checks it only after the
    /// checksum so that corruption anywhere reports as a checksum failure.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        match bytes {
            [magic, length, command_id, ..] => Ok(Self {
                magic: *magic,
                length: *length,
                command_id: *command_id,
            }),
            _ => Err(Error::FrameTooShort {
                needed: MIN_FRAME_SIZE,
                got: bytes.len(),
            }),
        }
    }
}
