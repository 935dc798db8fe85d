//! Hipee message implementation

use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;

use super::schema::{self, MessageSchema};
use super::{CommandId, Error, Result};

/// Outbound Hipee message
///
/// Holds the caller's field overrides. Fields that were never set take the
/// schema default when the message is encoded, so a `Now` default reads the
/// clock at encode time rather than at construction.
#[derive(Debug, Clone)]
pub struct Message {
    schema: &'static MessageSchema,
    overrides: Vec<Option<u32>>,
}

impl Message {
    /// Create a message with every field at its default
    #[must_use]
    pub fn new(command: CommandId) -> Self {
        Self::from_schema(schema::schema(command))
    }

    /// Create a message for an explicit schema
    #[must_use]
    pub fn from_schema(schema: &'static MessageSchema) -> Self {
        Self {
            schema,
            overrides: vec![None; schema.fields().len()],
        }
    }

    /// Set a field, returning the updated message
    pub fn with(mut self, name: &str, value: u32) -> Result<Self> {
        self.set(name, value)?;
        Ok(self)
    }

    /// Set a field
    ///
    /// The value is not range checked here; an oversized value fails with
    /// [`Error::FieldOverflow`] when the message is encoded.
    pub fn set(&mut self, name: &str, value: u32) -> Result<()> {
        let index = self.index_of(name)?;
        self.overrides[index] = Some(value);
        Ok(())
    }

    /// Drop an override so the field falls back to its default
    pub fn reset(&mut self, name: &str) -> Result<()> {
        let index = self.index_of(name)?;
        self.overrides[index] = None;
        Ok(())
    }

    /// Current value of a field: the override if set, the default otherwise
    #[must_use]
    pub fn get(&self, name: &str) -> Option<u32> {
        let index = self.schema.position(name)?;
        Some(self.value_at(index))
    }

    /// Resolve every field in schema order
    #[must_use]
    pub fn values(&self) -> Vec<u32> {
        (0..self.overrides.len())
            .map(|index| self.value_at(index))
            .collect()
    }

    /// Get command
    #[must_use]
    pub const fn command(&self) -> CommandId {
        self.schema.command()
    }

    /// Get command id byte
    #[must_use]
    pub const fn command_id(&self) -> u8 {
        self.schema.command_id()
    }

    /// Get schema
    #[must_use]
    pub const fn schema(&self) -> &'static MessageSchema {
        self.schema
    }

    /// Encode message to a wire frame
    pub fn encode(&self) -> Result<Bytes> {
        super::encode(self)
    }

    /// Decode a wire frame, rejecting bad checksums
    pub fn decode(bytes: &[u8]) -> Result<DecodedMessage> {
        super::decode(bytes)
    }

    fn value_at(&self, index: usize) -> u32 {
        self.overrides[index].unwrap_or_else(|| self.schema.fields()[index].default().resolve())
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        self.schema.position(name).ok_or_else(|| Error::UnknownField {
            command: self.schema.name(),
            field: name.to_owned(),
        })
    }
}

impl From<CommandId> for Message {
    fn from(command: CommandId) -> Self {
        Self::new(command)
    }
}

/// Inbound Hipee message
///
/// Owns its values; the codec keeps nothing after returning one.
#[derive(Debug, Clone)]
pub struct DecodedMessage {
    schema: &'static MessageSchema,
    values: Vec<u32>,
}

impl DecodedMessage {
    pub(crate) fn from_parts(schema: &'static MessageSchema, values: Vec<u32>) -> Self {
        debug_assert_eq!(schema.fields().len(), values.len());
        Self { schema, values }
    }

    /// Get command id byte
    #[must_use]
    pub const fn command_id(&self) -> u8 {
        self.schema.command_id()
    }

    /// Get command
    #[must_use]
    pub const fn command(&self) -> CommandId {
        self.schema.command()
    }

    /// Get schema
    #[must_use]
    pub const fn schema(&self) -> &'static MessageSchema {
        self.schema
    }

    /// Value of a field by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<u32> {
        self.schema.position(name).map(|index| self.values[index])
    }

    /// Values in schema order
    #[must_use]
    pub fn values(&self) -> &[u32] {
        &self.values
    }

    /// `(name, value)` pairs in schema order
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, u32)> + '_ {
        self.schema
            .fields()
            .iter()
            .zip(&self.values)
            .map(|(field, value)| (field.name(), *value))
    }

    /// Name to value mapping
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<&'static str, u32> {
        self.fields().collect()
    }

    /// Turn the decoded values back into an encodable message
    #[must_use]
    pub fn into_message(self) -> Message {
        Message {
            schema: self.schema,
            overrides: self.values.into_iter().map(Some).collect(),
        }
    }
}

impl PartialEq for DecodedMessage {
    fn eq(&self, other: &Self) -> bool {
        self.command_id() == other.command_id() && self.values == other.values
    }
}

impl Eq for DecodedMessage {}

impl fmt::Display for DecodedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Command: {} {:#04x}", self.schema.name(), self.command_id())?;
        for (field, value) in self.schema.fields().iter().zip(&self.values) {
            write!(f, ", {}: {}", field.name(), field.display(*value))?;
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for DecodedMessage {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("DecodedMessage", 3)?;
        state.serialize_field("command_id", &self.command_id())?;
        state.serialize_field("command", self.schema.name())?;
        state.serialize_field("fields", &self.to_map())?;
        state.end()
    }
}
