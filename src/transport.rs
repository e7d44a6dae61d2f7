//! # Publish Transport Abstraction
//!
//! This module defines the `MqttPublisher` trait, the only thing the registry
//! needs from the MQTT client. Connection handling, keep-alive and reconnects
//! stay with whatever implements it.

/// Represents the Quality of Service (QoS) levels for MQTT messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum QoS {
    /// Fire and forget.
    #[default]
    AtMostOnce = 0,
    /// Acknowledged delivery, duplicates possible.
    AtLeastOnce = 1,
    /// Assured single delivery.
    ExactlyOnce = 2,
}

/// A sink for MQTT publishes.
///
/// `publish` takes `&self` so a single client can be shared by every channel
/// binding. Implementors are responsible for serializing concurrent calls,
/// since one MQTT session cannot carry overlapping in-flight publishes.
pub trait MqttPublisher {
    /// The error type returned by the publisher.
    type Error: core::fmt::Debug;

    /// Publishes `payload` on `topic`.
    ///
    /// Assumes the underlying session is already connected. Must not retry;
    /// a failure is returned as-is.
    fn publish(&self, topic: &str, payload: &[u8], qos: QoS) -> Result<(), Self::Error>;
}

impl<P: MqttPublisher + ?Sized> MqttPublisher for &P {
    type Error = P::Error;

    fn publish(&self, topic: &str, payload: &[u8], qos: QoS) -> Result<(), Self::Error> {
        (**self).publish(topic, payload, qos)
    }
}
