//! Hipee command ids, field widths and enumerated field values

use std::fmt;

/// Hipee command ids
///
/// Requests are written by the host, responses arrive as notifications.
/// Requests and their responses are adjacent ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum CommandId {
    /// Open a session
    HelloRequest = 0x01,
    /// Session accepted (or not)
    HelloResponse = 0x02,
    /// Ask for battery, firmware version and free space
    InitialDataRequest = 0x03,
    /// Battery, firmware version and free space
    InitialDataResponse = 0x04,
    /// Set the device clock
    SetTimeRequest = 0x05,
    /// Device clock after the update
    SetTimeResponse = 0x06,

    /// Write the tuning configuration
    SetConfigRequest = 0x30,
    /// Configuration accepted
    SetConfigResponse = 0x31,
    /// Take the current posture as the upright reference
    CalibrateRequest = 0x32,
    /// Reference angles captured by calibration
    CalibrateResponse = 0x33,
    /// Start or stop the live posture stream
    LiveUpdateRequest = 0x34,
    /// One live posture sample
    LiveUpdate = 0x35,

    /// Ask for battery state
    BatteryStateRequest = 0x44,
    /// Battery percent and charge state
    BatteryStateResponse = 0x45,
    /// Read back the tuning configuration
    GetConfigRequest = 0x46,
    /// Current tuning configuration
    GetConfigResponse = 0x47,

    /// Write the extended configuration
    SetExtConfigRequest = 0x50,
    /// Extended configuration accepted
    SetExtConfigResponse = 0x51,

    /// Generic error reported by the device
    ErrorResponse = 0xFF,
}

impl CommandId {
    /// Every known command, in id order
    pub const ALL: [Self; 19] = [
        Self::HelloRequest,
        Self::HelloResponse,
        Self::InitialDataRequest,
        Self::InitialDataResponse,
        Self::SetTimeRequest,
        Self::SetTimeResponse,
        Self::SetConfigRequest,
        Self::SetConfigResponse,
        Self::CalibrateRequest,
        Self::CalibrateResponse,
        Self::LiveUpdateRequest,
        Self::LiveUpdate,
        Self::BatteryStateRequest,
        Self::BatteryStateResponse,
        Self::GetConfigRequest,
        Self::GetConfigResponse,
        Self::SetExtConfigRequest,
        Self::SetExtConfigResponse,
        Self::ErrorResponse,
    ];

    /// Convert from byte
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::HelloRequest),
            0x02 => Some(Self::HelloResponse),
            0x03 => Some(Self::InitialDataRequest),
            0x04 => Some(Self::InitialDataResponse),
            0x05 => Some(Self::SetTimeRequest),
            0x06 => Some(Self::SetTimeResponse),
            0x30 => Some(Self::SetConfigRequest),
            0x31 => Some(Self::SetConfigResponse),
            0x32 => Some(Self::CalibrateRequest),
            0x33 => Some(Self::CalibrateResponse),
            0x34 => Some(Self::LiveUpdateRequest),
            0x35 => Some(Self::LiveUpdate),
            0x44 => Some(Self::BatteryStateRequest),
            0x45 => Some(Self::BatteryStateResponse),
            0x46 => Some(Self::GetConfigRequest),
            0x47 => Some(Self::GetConfigResponse),
            0x50 => Some(Self::SetExtConfigRequest),
            0x51 => Some(Self::SetExtConfigResponse),
            0xFF => Some(Self::ErrorResponse),
            _ => None,
        }
    }

    /// Convert to byte
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Human readable command name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::HelloRequest => "HelloRequest",
            Self::HelloResponse => "HelloResponse",
            Self::InitialDataRequest => "InitialDataRequest",
            Self::InitialDataResponse => "InitialDataResponse",
            Self::SetTimeRequest => "SetTimeRequest",
            Self::SetTimeResponse => "SetTimeResponse",
            Self::SetConfigRequest => "SetConfigRequest",
            Self::SetConfigResponse => "SetConfigResponse",
            Self::CalibrateRequest => "CalibrateRequest",
            Self::CalibrateResponse => "CalibrateResponse",
            Self::LiveUpdateRequest => "LiveUpdateRequest",
            Self::LiveUpdate => "LiveUpdate",
            Self::BatteryStateRequest => "BatteryStateRequest",
            Self::BatteryStateResponse => "BatteryStateResponse",
            Self::GetConfigRequest => "GetConfigRequest",
            Self::GetConfigResponse => "GetConfigResponse",
            Self::SetExtConfigRequest => "SetExtConfigRequest",
            Self::SetExtConfigResponse => "SetExtConfigResponse",
            Self::ErrorResponse => "ErrorResponse",
        }
    }

    /// Check if this command is written by the host
    #[must_use]
    pub const fn is_request(self) -> bool {
        matches!(
            self,
            Self::HelloRequest
                | Self::InitialDataRequest
                | Self::SetTimeRequest
                | Self::SetConfigRequest
                | Self::CalibrateRequest
                | Self::LiveUpdateRequest
                | Self::BatteryStateRequest
                | Self::GetConfigRequest
                | Self::SetExtConfigRequest
        )
    }

    /// Check if this command is notified by the device
    #[must_use]
    pub const fn is_response(self) -> bool {
        !self.is_request()
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl TryFrom<u8> for CommandId {
    type Error = super::Error;

    fn try_from(value: u8) -> super::Result<Self> {
        Self::from_u8(value).ok_or(super::Error::UnknownCommand { command_id: value })
    }
}

/// Number of bytes a field occupies on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FieldWidth {
    /// u8
    One = 1,
    /// u16, big-endian
    Two = 2,
    /// u32, big-endian
    Four = 4,
}

impl FieldWidth {
    /// Width in bytes
    #[must_use]
    pub const fn bytes(self) -> usize {
        self as usize
    }

    /// Largest value representable in this width
    #[must_use]
    pub const fn max_value(self) -> u32 {
        match self {
            Self::One => u8::MAX as u32,
            Self::Two => u16::MAX as u32,
            Self::Four => u32::MAX,
        }
    }

    /// Check whether `value` can be encoded without truncation
    #[must_use]
    pub const fn fits(self, value: u32) -> bool {
        value <= self.max_value()
    }
}

/// Charging state reported by [`CommandId::BatteryStateResponse`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ChargeState {
    /// On the charger, not yet full
    Charging = 0,
    /// On the charger and full
    Full = 1,
    /// Running from battery
    Discharging = 2,
}

impl ChargeState {
    /// Convert from the raw field value
    #[must_use]
    pub const fn from_value(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Charging),
            1 => Some(Self::Full),
            2 => Some(Self::Discharging),
            _ => None,
        }
    }

    /// Raw field value
    #[must_use]
    pub const fn as_value(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for ChargeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Charging => "Charging",
            Self::Full => "Full",
            Self::Discharging => "Discharging",
        };
        write!(f, "{name}")
    }
}
