//! Hipee protocol core implementation
//!
//! This module provides the wire format, message schemas, and codec for the
//! Hipee command protocol.

mod codec;
mod error;
pub mod format;
mod header;
mod message;
mod metrics;
pub mod schema;
mod types;

pub use codec::{
    ChecksumPolicy, DecodeConfig, Decoder, checksum, decode, encode, encode_frame, frame_sum,
};
pub use error::{Error, Result};
pub use header::FrameHeader;
pub use message::{DecodedMessage, Message};
pub use metrics::{MetricsSnapshot, command_count, metrics};
pub use schema::{Field, FieldDefault, MessageRegistry, MessageSchema};
pub use types::{ChargeState, CommandId, FieldWidth};

/// Hipee magic byte, first byte of every frame
pub const MAGIC: u8 = 0x09;

/// Header size in bytes (magic, length, command id)
pub const HEADER_SIZE: usize = 3;

/// Checksum size in bytes
pub const CHECKSUM_SIZE: usize = 1;

/// Minimum frame size (header + checksum)
pub const MIN_FRAME_SIZE: usize = HEADER_SIZE + CHECKSUM_SIZE;
