//! # PAPR Feed Registry
//!
//! `papr-feeds` is a `no_std`, allocation-free registry of the MQTT topics the
//! PAPR air-filtration monitor publishes on: temperature, humidity, pressure,
//! battery, fan speed and startup sequencing.
//!
//! ## Core Features
//!
//! - **One table, many builds:** every firmware build is a data-driven
//!   [`DeviceVariant`] table instead of a file of hardcoded declarations.
//! - **No globals:** a [`Registry`] is an explicit value built at startup and
//!   passed to whatever needs to publish.
//! - **Deterministic payloads:** readings go out as fixed-point text, two
//!   fractional digits by default (`21.5` is sent as `21.50`).
//! - **Transport Agnostic:** the registry only needs an [`MqttPublisher`].
//!   [`PublisherHandle`] implements it over an `embassy-sync` channel so the
//!   task owning the MQTT client can drain publishes at its own pace.
//!
//! ## Usage
//!
//! ```ignore
//! use papr_feeds::{DeviceVariant, Registry, RegistryOptions};
//! use papr_feeds::publisher::{PublishRequestChannel, PublisherHandle};
//! use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
//!
//! static OUTBOX: PublishRequestChannel<CriticalSectionRawMutex, 64, 32, 8> =
//!     PublishRequestChannel::new();
//!
//! let handle = PublisherHandle::from_channel(&OUTBOX);
//! let registry = Registry::<_, 32>::for_variant(&handle, DeviceVariant::Data, RegistryOptions::new())?;
//!
//! registry.publish("temperature_1", 21.5)?;
//! registry.publish("fan_speed_1", fan_rpm)?;
//! ```
//!
//! Connecting, keep-alive and reconnects stay with the MQTT client; the
//! registry never retries a failed publish.

#![cfg_attr(not(test), no_std)]

// This must go first so the logging macros are visible to the other modules.
mod fmt;

pub mod channel;
pub mod error;
pub mod payload;
pub mod publisher;
pub mod registry;
pub mod transport;
pub mod variant;

// Re-export key types for easier access at the crate root.
pub use channel::{Channel, ChannelKind, ChannelSpec};
pub use error::{PayloadError, PublishError, RegistryError};
pub use publisher::PublisherHandle;
pub use registry::{Binding, Registry, RegistryOptions, SweepReport};
pub use transport::{MqttPublisher, QoS};
pub use variant::DeviceVariant;
