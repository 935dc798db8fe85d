//! Value formatters attached to schema fields
//!
//! A field that carries a formatter is rendered through it by
//! [`DecodedMessage`](super::DecodedMessage)'s `Display`; all other fields
//! print their raw integer.

use chrono::DateTime;

use super::ChargeState;

/// Signature of a field formatter
pub type Formatter = fn(u32) -> String;

/// `77` -> `"77%"`
#[must_use]
pub fn percent(value: u32) -> String {
    format!("{value}%")
}

/// Firmware versions are reported as the minor number of a `0.x` release.
#[must_use]
pub fn firmware_version(value: u32) -> String {
    format!("V0.{value}")
}

/// Unix seconds rendered the way `ctime(3)` does, in UTC.
#[must_use]
pub fn timestamp(value: u32) -> String {
    match DateTime::from_timestamp(i64::from(value), 0) {
        Some(time) => time.format("%a %b %e %H:%M:%S %Y").to_string(),
        None => value.to_string(),
    }
}

/// Charge state name, or `Unknown(n)` for values the device never documented
#[must_use]
pub fn charge_state(value: u32) -> String {
    match ChargeState::from_value(value) {
        Some(state) => state.to_string(),
        None => format!("Unknown({value})"),
    }
}
