//! Walk through the startup handshake the vendor app performs
//!
//! No radio is involved: request frames are printed as they would be written
//! to the write characteristic, and canned notifications are decoded the way
//! a notify handler would.
//!
//! Logging is fixed at debug so the codec's own
//! tracing output is visible.

use hipee::{CommandId, DecodeConfig, Decoder, Message};
use tracing::Level;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(Level::DEBUG)
        .with_target(false)
        .init();

    println!("Hipee handshake");
    println!("===============\n");

    // Order matters to the device; the transport paces the writes.
    let startup = [
        Message::new(CommandId::HelloRequest),
        Message::new(CommandId::InitialDataRequest),
        Message::new(CommandId::SetTimeRequest),
        Message::new(CommandId::SetConfigRequest),
        Message::new(CommandId::BatteryStateRequest),
        Message::new(CommandId::GetConfigRequest),
        Message::new(CommandId::CalibrateRequest),
        Message::new(CommandId::LiveUpdateRequest),
    ];

    for request in &startup {
        let frame = request.encode()?;
        println!("write {:<20} {:02x?}", request.command().name(), frame.as_ref());
    }

    println!();

    let notifications: [&[u8]; 4] = [
        &[0x09, 0x02, 0x02, 0x01, 0xF2],
        &[0x09, 0x03, 0x45, 77, 2, 0x60],
        // one flipped bit in the battery percent
        &[0x09, 0x03, 0x45, 79, 2, 0x60],
        &[0x09, 0x01, 0x99, 0x5D],
    ];

    let strict = Decoder::default();
    let lenient = Decoder::new(DecodeConfig::lenient());
    for notification in notifications {
        match strict.decode_lossy(notification) {
            Some(message) => println!("notify {message}"),
            None => {
                if let Some(message) = lenient.decode_lossy(notification) {
                    println!("notify (checksum ignored) {message}");
                }
            }
        }
    }

    Ok(())
}
