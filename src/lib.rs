//! Hipee - command protocol of the Hipee BLE posture tracker
//!
//! The host writes fixed-framed commands to the device's write
//! characteristic and the device answers with frames of the same shape on its
//! notify characteristic. This crate is the codec for those frames: the
//! registry of known message shapes, frame construction, checksums and
//! dispatch by command id. The BLE transport is left to the caller.
//!
//! # Quick Start
//!
//! ```rust
//! use hipee::{CommandId, Message};
//!
//! // Build a request; unset fields take their documented defaults
//! let request = Message::new(CommandId::LiveUpdateRequest).with("delay_milliseconds", 100)?;
//!
//! // Encode to bytes for the write characteristic
//! let frame = request.encode()?;
//! assert_eq!(frame.as_ref(), &[0x09, 0x04, 0x34, 0x00, 0x64, 0x01, 0x5A]);
//!
//! // Decode a notification payload
//! let decoded = Message::decode(&[0x09, 0x03, 0x45, 77, 2, 0x60])?;
//! assert_eq!(decoded.get("battery_percent"), Some(77));
//! # Ok::<(), hipee::Error>(())
//! ```
//!
//! # Frame Layout
//!
//! ```text
//! [0x09] [LENGTH = payload + 1] [COMMAND ID] [FIELDS, big-endian] [CHECKSUM]
//! ```
//!
//! The checksum makes the sum of every frame byte zero modulo 256.
//!
//! # Features
//!
//! - **Static registry** - every command shape lives in a read-only table
//! - **Strict by default** - bad checksums and oversized values are errors
//! - **Lenient decoding** - opt into warn-and-continue checksum handling
//! - **serde** - optional `Serialize` for decoded messages

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod protocol;

pub use protocol::{
    ChargeState, ChecksumPolicy, CommandId, DecodeConfig, DecodedMessage, Decoder, Error, Field,
    FieldWidth, MAGIC, Message, MessageRegistry, MessageSchema, Result, decode, encode,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
