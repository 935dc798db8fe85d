//! Static message schemas and the command registry
//!
//! Every command the device understands (or emits) is described by a
//! [`MessageSchema`]: its id and an ordered list of fixed-width fields.
//! Field order defines both the encode order and the unpack order.

use chrono::Utc;

use super::format::{self, Formatter};
use super::{CHECKSUM_SIZE, CommandId, FieldWidth, HEADER_SIZE};
use super::FieldWidth::{Four, One, Two};

/// Value a field takes when the caller does not supply one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    /// Literal value
    Value(u32),
    /// Wall-clock Unix seconds, read whenever the default is resolved
    Now,
}

impl FieldDefault {
    /// Resolve the default to a concrete value
    #[must_use]
    pub fn resolve(self) -> u32 {
        match self {
            Self::Value(value) => value,
            Self::Now => unix_now(),
        }
    }
}

/// One named, fixed-width schema field
#[derive(Debug, Clone, Copy)]
pub struct Field {
    name: &'static str,
    width: FieldWidth,
    default: FieldDefault,
    formatter: Option<Formatter>,
}

impl Field {
    /// Field defaulting to zero
    #[must_use]
    pub const fn new(name: &'static str, width: FieldWidth) -> Self {
        Self {
            name,
            width,
            default: FieldDefault::Value(0),
            formatter: None,
        }
    }

    /// Replace the default with a literal value
    #[must_use]
    pub const fn with_default(mut self, value: u32) -> Self {
        self.default = FieldDefault::Value(value);
        self
    }

    /// Default to the wall-clock time at resolve time
    #[must_use]
    pub const fn defaulting_to_now(mut self) -> Self {
        self.default = FieldDefault::Now;
        self
    }

    /// Attach a display formatter
    #[must_use]
    pub const fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// Field name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Wire width
    #[must_use]
    pub const fn width(&self) -> FieldWidth {
        self.width
    }

    /// Declared default
    #[must_use]
    pub const fn default(&self) -> FieldDefault {
        self.default
    }

    /// Display formatter, if any
    #[must_use]
    pub const fn formatter(&self) -> Option<Formatter> {
        self.formatter
    }

    /// Render `value` through the formatter, falling back to the integer
    #[must_use]
    pub fn display(&self, value: u32) -> String {
        match self.formatter {
            Some(formatter) => formatter(value),
            None => value.to_string(),
        }
    }
}

/// Shape of one command or response
#[derive(Debug)]
pub struct MessageSchema {
    command: CommandId,
    fields: &'static [Field],
}

impl MessageSchema {
    const fn new(command: CommandId, fields: &'static [Field]) -> Self {
        Self { command, fields }
    }

    /// Command this schema describes
    #[must_use]
    pub const fn command(&self) -> CommandId {
        self.command
    }

    /// Command id byte
    #[must_use]
    pub const fn command_id(&self) -> u8 {
        self.command.as_u8()
    }

    /// Command name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.command.name()
    }

    /// Ordered field list (may be empty)
    #[must_use]
    pub const fn fields(&self) -> &'static [Field] {
        self.fields
    }

    /// Sum of field widths
    #[must_use]
    pub fn payload_len(&self) -> usize {
        self.fields.iter().map(|field| field.width().bytes()).sum()
    }

    /// Value of the in-band length byte: payload plus the checksum byte
    #[must_use]
    pub fn length_byte(&self) -> usize {
        self.payload_len() + CHECKSUM_SIZE
    }

    /// Complete frame size on the wire
    #[must_use]
    pub fn frame_len(&self) -> usize {
        HEADER_SIZE + self.payload_len() + CHECKSUM_SIZE
    }

    /// Index of the named field
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name() == name)
    }

    /// Look up a field by name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static Field> {
        self.fields.iter().find(|field| field.name() == name)
    }
}

/// Read-only registry of every known command schema
///
/// The table is a `static`, so lookups need no synchronisation and the
/// registry lives for the whole process.
#[derive(Debug, Clone, Copy)]
pub struct MessageRegistry {
    schemas: &'static [MessageSchema],
}

impl MessageRegistry {
    /// The process-wide registry
    #[must_use]
    pub const fn global() -> Self {
        Self { schemas: &SCHEMAS }
    }

    /// Schema for a command id byte
    #[must_use]
    pub fn lookup(&self, command_id: u8) -> Option<&'static MessageSchema> {
        self.schemas
            .binary_search_by_key(&command_id, MessageSchema::command_id)
            .ok()
            .map(|index| &self.schemas[index])
    }

    /// Schema for a known command
    #[must_use]
    pub fn get(&self, command: CommandId) -> &'static MessageSchema {
        schema(command)
    }

    /// All schemas, in command id order
    pub fn iter(&self) -> impl Iterator<Item = &'static MessageSchema> + use<> {
        self.schemas.iter()
    }

    /// Number of registered schemas
    #[must_use]
    pub const fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether the registry has no schemas
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl Default for MessageRegistry {
    fn default() -> Self {
        Self::global()
    }
}

/// Schema for a known command
#[must_use]
pub fn schema(command: CommandId) -> &'static MessageSchema {
    &SCHEMAS[table_index(command)]
}

const fn table_index(command: CommandId) -> usize {
    match command {
        CommandId::HelloRequest => 0,
        CommandId::HelloResponse => 1,
        CommandId::InitialDataRequest => 2,
        CommandId::InitialDataResponse => 3,
        CommandId::SetTimeRequest => 4,
        CommandId::SetTimeResponse => 5,
        CommandId::SetConfigRequest => 6,
        CommandId::SetConfigResponse => 7,
        CommandId::CalibrateRequest => 8,
        CommandId::CalibrateResponse => 9,
        CommandId::LiveUpdateRequest => 10,
        CommandId::LiveUpdate => 11,
        CommandId::BatteryStateRequest => 12,
        CommandId::BatteryStateResponse => 13,
        CommandId::GetConfigRequest => 14,
        CommandId::GetConfigResponse => 15,
        CommandId::SetExtConfigRequest => 16,
        CommandId::SetExtConfigResponse => 17,
        CommandId::ErrorResponse => 18,
    }
}

/// Schema for a command id byte, or `None` if the id is unknown
#[must_use]
pub fn lookup(command_id: u8) -> Option<&'static MessageSchema> {
    MessageRegistry::global().lookup(command_id)
}

fn unix_now() -> u32 {
    let seconds = Utc::now().timestamp().max(0);
    u32::try_from(seconds).unwrap_or(u32::MAX)
}

const NO_FIELDS: &[Field] = &[];

const HELLO_RESPONSE: &[Field] = &[Field::new("accepted", One)];

const INITIAL_DATA_RESPONSE: &[Field] = &[
    Field::new("battery_percent", One).with_formatter(format::percent),
    Field::new("version", Two).with_formatter(format::firmware_version),
    Field::new("space_remaining", Four),
];

const SET_TIME_REQUEST: &[Field] = &[Field::new("current_time", Four)
    .defaulting_to_now()
    .with_formatter(format::timestamp)];

const DEVICE_TIME: &[Field] = &[Field::new("device_time", Four).with_formatter(format::timestamp)];

// The unknown_hc_* fields are opaque to us; the defaults are the values the
// vendor app sends. shake_power above 100 reboots the device.
const SET_CONFIG_REQUEST: &[Field] = &[
    Field::new("shake_mode", One).with_default(1),
    Field::new("shake_power", One).with_default(50),
    Field::new("back_forward_angle_reminder", One).with_default(5),
    Field::new("back_sideways_angle_reminder", One),
    Field::new("unknown_hc_1", One).with_default(1),
    Field::new("unknown_hc_244", One).with_default(244),
    Field::new("unknown_hc_7", One).with_default(7),
    Field::new("unknown_hc_208", One).with_default(208),
    Field::new("sitting_time_seconds", Two),
    Field::new("special_num", One),
    Field::new("shake_delay_reminder", One).with_default(2),
    Field::new("do_not_disturb", One),
    Field::new("exercise_angle_reminder", One).with_default(30),
    Field::new("unknown_hc_15", One),
];

const GET_CONFIG_RESPONSE: &[Field] = &[
    Field::new("shake_mode", One),
    Field::new("shake_power", One),
    Field::new("back_forward_angle_reminder", One),
    Field::new("back_sideways_angle_reminder", One),
    Field::new("unknown_hc_1", One),
    Field::new("unknown_hc_244", One),
    Field::new("unknown_hc_7", One),
    Field::new("unknown_hc_208", One),
    Field::new("sitting_time_seconds", Two),
    Field::new("special_num", One),
    Field::new("shake_delay_reminder", One),
    Field::new("do_not_disturb", One),
    Field::new("exercise_angle_reminder", One),
    Field::new("unknown_hc_15", One),
];

const CALIBRATE_RESPONSE: &[Field] = &[
    Field::new("left_right_angle", One),
    Field::new("front_back_angle_90_deg_offset", One),
    Field::new("from_back_angle", One),
];

const LIVE_UPDATE_REQUEST: &[Field] = &[
    Field::new("delay_milliseconds", Two).with_default(20),
    Field::new("enable_stream", One).with_default(1),
];

const LIVE_UPDATE: &[Field] = &[
    Field::new("current_time", Four).with_formatter(format::timestamp),
    Field::new("back_forward_angle", One),
    Field::new("back_left_right_angle", One),
    Field::new("error_num", Two),
    Field::new("long_sit_ready", Two),
    Field::new("mode", One),
    Field::new("do_not_disturb", One),
    Field::new("challenge_progress", Four),
];

const BATTERY_STATE_RESPONSE: &[Field] = &[
    Field::new("battery_percent", One).with_formatter(format::percent),
    Field::new("charge_state", One).with_formatter(format::charge_state),
];

const SET_EXT_CONFIG_REQUEST: &[Field] = &[
    Field::new("allow_double_tap", One).with_default(1),
    Field::new("unknown_hc_0", One),
    Field::new("auto_restore_double_tap_time_minutes", Two).with_default(30),
    Field::new("unknown_hc_1", One).with_default(1),
];

const SET_EXT_CONFIG_RESPONSE: &[Field] = &[
    Field::new("unknown1", One).with_default(1),
    Field::new("unknown2", One),
    Field::new("unknown3", One),
    Field::new("unknown4", One),
    Field::new("unknown5", One),
];

const ERROR_RESPONSE: &[Field] = &[Field::new("unknown", One)];

// Sorted by command id: `lookup` binary searches and `schema` indexes
// through `table_index`.
const SCHEMA_TABLE: [MessageSchema; CommandId::ALL.len()] = [
    MessageSchema::new(CommandId::HelloRequest, NO_FIELDS),
    MessageSchema::new(CommandId::HelloResponse, HELLO_RESPONSE),
    MessageSchema::new(CommandId::InitialDataRequest, NO_FIELDS),
    MessageSchema::new(CommandId::InitialDataResponse, INITIAL_DATA_RESPONSE),
    MessageSchema::new(CommandId::SetTimeRequest, SET_TIME_REQUEST),
    MessageSchema::new(CommandId::SetTimeResponse, DEVICE_TIME),
    MessageSchema::new(CommandId::SetConfigRequest, SET_CONFIG_REQUEST),
    MessageSchema::new(CommandId::SetConfigResponse, DEVICE_TIME),
    MessageSchema::new(CommandId::CalibrateRequest, NO_FIELDS),
    MessageSchema::new(CommandId::CalibrateResponse, CALIBRATE_RESPONSE),
    MessageSchema::new(CommandId::LiveUpdateRequest, LIVE_UPDATE_REQUEST),
    MessageSchema::new(CommandId::LiveUpdate, LIVE_UPDATE),
    MessageSchema::new(CommandId::BatteryStateRequest, NO_FIELDS),
    MessageSchema::new(CommandId::BatteryStateResponse, BATTERY_STATE_RESPONSE),
    MessageSchema::new(CommandId::GetConfigRequest, NO_FIELDS),
    MessageSchema::new(CommandId::GetConfigResponse, GET_CONFIG_RESPONSE),
    MessageSchema::new(CommandId::SetExtConfigRequest, SET_EXT_CONFIG_REQUEST),
    MessageSchema::new(CommandId::SetExtConfigResponse, SET_EXT_CONFIG_RESPONSE),
    MessageSchema::new(CommandId::ErrorResponse, ERROR_RESPONSE),
];

// Table rows, CommandId::ALL and table_index must agree, or the build fails.
const _: () = {
    let mut index = 0;
    while index < SCHEMA_TABLE.len() {
        let command = CommandId::ALL[index];
        assert!(SCHEMA_TABLE[index].command_id() == command.as_u8());
        assert!(table_index(command) == index);
        if index > 0 {
            assert!(SCHEMA_TABLE[index - 1].command_id() < SCHEMA_TABLE[index].command_id());
        }
        index += 1;
    }
};

static SCHEMAS: [MessageSchema; CommandId::ALL.len()] = SCHEMA_TABLE;
