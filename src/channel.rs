//! Channel definitions: one publishable quantity bound to one topic.

use crate::error::RegistryError;

/// Maximum length for a single topic string.
pub const MAX_TOPIC_LEN: usize = 128;

/// The quantity a channel carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelKind {
    Temperature,
    Humidity,
    Pressure,
    Battery,
    FanSpeed,
    StartupEvent,
}

impl ChannelKind {
    /// The topic segment used for this quantity, e.g. `papr/<segment>/1/`.
    pub const fn segment(self) -> &'static str {
        match self {
            ChannelKind::Temperature => "temperature",
            ChannelKind::Humidity => "humidity",
            ChannelKind::Pressure => "pressure",
            ChannelKind::Battery => "battery",
            ChannelKind::FanSpeed => "fanspeed",
            ChannelKind::StartupEvent => "startup",
        }
    }
}

/// A registered channel.
///
/// Channels borrow their id and topic; the built-in tables use `'static`
/// strings, but anything that outlives the registry works.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Channel<'a> {
    id: &'a str,
    topic: &'a str,
    kind: ChannelKind,
}

impl<'a> Channel<'a> {
    pub(crate) const fn new(id: &'a str, topic: &'a str, kind: ChannelKind) -> Self {
        Self { id, topic, kind }
    }

    /// The stable symbolic key, e.g. `temperature_1`.
    pub fn id(&self) -> &'a str {
        self.id
    }

    /// The MQTT topic, e.g. `papr/temperature/1/`.
    pub fn topic(&self) -> &'a str {
        self.topic
    }

    /// The quantity carried on this channel.
    pub fn kind(&self) -> ChannelKind {
        self.kind
    }
}

/// One row of a static channel table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSpec {
    /// Symbolic key the firmware looks the channel up by.
    pub id: &'static str,
    /// Topic readings are published on.
    pub topic: &'static str,
    /// Quantity carried on the topic.
    pub kind: ChannelKind,
}

impl ChannelSpec {
    pub const fn new(id: &'static str, topic: &'static str, kind: ChannelKind) -> Self {
        Self { id, topic, kind }
    }
}

/// Checks that `topic` is usable as a publish topic.
///
/// Wildcards are only meaningful in subscriptions, and brokers drop
/// connections that publish to them.
pub(crate) fn validate_topic(topic: &str) -> Result<(), RegistryError> {
    if topic.is_empty() || topic.len() > MAX_TOPIC_LEN {
        return Err(RegistryError::InvalidTopic);
    }
    if topic.bytes().any(|b| matches!(b, b'+' | b'#' | 0)) {
        return Err(RegistryError::InvalidTopic);
    }
    Ok(())
}
