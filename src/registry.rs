//! The topic registry: the single source of truth for publish topics.
//!
//! A registry is populated once during startup, closed, and then only read.
//! Channels keep their registration order for diagnostic sweeps, while two
//! hash indexes keep id and topic lookups constant time.

use heapless::Vec;
use heapless::index_map::FnvIndexMap;

use crate::channel::{Channel, ChannelKind, ChannelSpec, validate_topic};
use crate::error::{PublishError, RegistryError};
use crate::payload::format_reading;
use crate::transport::{MqttPublisher, QoS};
use crate::variant::DeviceVariant;

/// Publish settings shared by every channel of a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegistryOptions {
    qos: QoS,
    precision: u8,
}

impl RegistryOptions {
    /// QoS 0 with two fractional digits.
    pub const fn new() -> Self {
        Self {
            qos: QoS::AtMostOnce,
            precision: 2,
        }
    }

    /// QoS used for every publish.
    pub const fn with_qos(mut self, qos: QoS) -> Self {
        self.qos = qos;
        self
    }

    /// Number of fractional digits written for numeric readings.
    pub const fn with_precision(mut self, precision: u8) -> Self {
        self.precision = precision;
        self
    }

    /// The configured QoS.
    pub const fn qos(&self) -> QoS {
        self.qos
    }

    /// The configured number of fractional digits.
    pub const fn precision(&self) -> u8 {
        self.precision
    }
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps channel ids to topics and to the shared publisher.
///
/// `N` bounds the number of channels and must be a power of two greater than
/// one, as required by the underlying index maps.
///
/// # Example
///
/// ```ignore
/// let mut registry = Registry::<_, 32>::new(&client, RegistryOptions::new());
/// registry.register("temperature_1", "papr/temperature/1/", ChannelKind::Temperature)?;
/// registry.close();
///
/// registry.publish("temperature_1", 21.5)?; // sends "21.50"
/// ```
pub struct Registry<'a, P, const N: usize> {
    publisher: &'a P,
    options: RegistryOptions,
    channels: Vec<Channel<'a>, N>,
    by_id: FnvIndexMap<&'a str, usize, N>,
    by_topic: FnvIndexMap<&'a str, usize, N>,
    closed: bool,
}

impl<'a, P: MqttPublisher, const N: usize> Registry<'a, P, N> {
    /// Create an empty, open registry bound to `publisher`.
    pub fn new(publisher: &'a P, options: RegistryOptions) -> Self {
        Self {
            publisher,
            options,
            channels: Vec::new(),
            by_id: FnvIndexMap::new(),
            by_topic: FnvIndexMap::new(),
            closed: false,
        }
    }

    /// Register every row of `specs` in order, then close the registry.
    pub fn from_specs(
        publisher: &'a P,
        specs: &[ChannelSpec],
        options: RegistryOptions,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new(publisher, options);
        for spec in specs {
            registry.register(spec.id, spec.topic, spec.kind)?;
        }
        registry.close();
        Ok(registry)
    }

    /// Build and close a registry holding the built-in table for `variant`.
    pub fn for_variant(
        publisher: &'a P,
        variant: DeviceVariant,
        options: RegistryOptions,
    ) -> Result<Self, RegistryError> {
        debug!("building registry for {}", variant.name());
        Self::from_specs(publisher, variant.channels(), options)
    }

    /// Add a channel during the initialization phase.
    ///
    /// A failed registration leaves the registry untouched.
    pub fn register(
        &mut self,
        id: &'a str,
        topic: &'a str,
        kind: ChannelKind,
    ) -> Result<Channel<'a>, RegistryError> {
        if self.closed {
            return Err(RegistryError::Closed);
        }
        if id.is_empty() {
            return Err(RegistryError::InvalidId);
        }
        validate_topic(topic)?;
        if self.by_id.contains_key(id) {
            return Err(RegistryError::DuplicateId);
        }
        if self.by_topic.contains_key(topic) {
            return Err(RegistryError::DuplicateTopic);
        }
        if self.channels.is_full() {
            return Err(RegistryError::Full);
        }

        let index = self.channels.len();
        let channel = Channel::new(id, topic, kind);
        // All three collections share capacity `N` and length, so after the
        // `is_full` check none of these can overflow.
        self.channels
            .push(channel)
            .map_err(|_| RegistryError::Full)?;
        self.by_id
            .insert(id, index)
            .map_err(|_| RegistryError::Full)?;
        self.by_topic
            .insert(topic, index)
            .map_err(|_| RegistryError::Full)?;

        trace!("registered channel {} -> {}", id, topic);
        Ok(channel)
    }

    /// End the initialization phase. Further registrations fail with
    /// [`RegistryError::Closed`].
    pub fn close(&mut self) {
        if !self.closed {
            debug!("registry closed with {} channels", self.channels.len());
        }
        self.closed = true;
    }

    /// Whether the initialization phase has ended.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Look up a channel by id.
    pub fn get(&self, id: &str) -> Result<Channel<'a>, RegistryError> {
        self.by_id
            .get(id)
            .and_then(|&index| self.channels.get(index))
            .copied()
            .ok_or(RegistryError::UnknownChannel)
    }

    /// Resolve the publish binding of a channel, for repeated publishing.
    pub fn binding(&self, id: &str) -> Result<Binding<'_, 'a, P>, RegistryError> {
        Ok(self.bind(self.get(id)?))
    }

    /// Publish a numeric reading on the channel registered as `id`.
    ///
    /// The reading is written with the configured precision, so `21.5` goes
    /// out as `21.50` by default. Failures are returned without retrying.
    pub fn publish(&self, id: &str, value: f32) -> Result<(), PublishError<P::Error>> {
        self.binding(id)?.publish(value)
    }

    /// Publish an already encoded payload on the channel registered as `id`.
    pub fn publish_bytes(&self, id: &str, payload: &[u8]) -> Result<(), PublishError<P::Error>> {
        self.binding(id)?.publish_bytes(payload)
    }

    /// Iterate over all channels in registration order.
    pub fn all(&self) -> core::slice::Iter<'_, Channel<'a>> {
        self.channels.iter()
    }

    /// Number of registered channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Check if no channel has been registered.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Publish settings applied to every channel.
    pub fn options(&self) -> &RegistryOptions {
        &self.options
    }

    /// Publish the last known value of every channel, in registration order.
    ///
    /// `read` returns `None` for channels with nothing to report. A failure on
    /// one channel does not stop the sweep; the first one is kept in the
    /// report.
    pub fn sweep<F>(&self, mut read: F) -> SweepReport<P::Error>
    where
        F: FnMut(&Channel<'a>) -> Option<f32>,
    {
        let mut report = SweepReport::default();
        for channel in self.all() {
            let Some(value) = read(channel) else {
                report.skipped += 1;
                continue;
            };
            match self.bind(*channel).publish(value) {
                Ok(()) => report.published += 1,
                Err(err) => {
                    report.failed += 1;
                    if report.first_error.is_none() {
                        report.first_error = Some(err);
                    }
                }
            }
        }
        report
    }

    fn bind(&self, channel: Channel<'a>) -> Binding<'_, 'a, P> {
        Binding {
            channel,
            publisher: self.publisher,
            options: &self.options,
        }
    }
}

/// A channel paired with the publisher it is emitted through.
pub struct Binding<'r, 'a, P> {
    channel: Channel<'a>,
    publisher: &'a P,
    options: &'r RegistryOptions,
}

impl<'a, P: MqttPublisher> Binding<'_, 'a, P> {
    /// The bound channel.
    pub fn channel(&self) -> Channel<'a> {
        self.channel
    }

    /// Format `value` and publish it on this channel's topic.
    pub fn publish(&self, value: f32) -> Result<(), PublishError<P::Error>> {
        let payload = format_reading(value, self.options.precision())?;
        self.publish_bytes(payload.as_bytes())
    }

    /// Publish `payload` as-is on this channel's topic.
    pub fn publish_bytes(&self, payload: &[u8]) -> Result<(), PublishError<P::Error>> {
        let topic = self.channel.topic();
        self.publisher
            .publish(topic, payload, self.options.qos())
            .map_err(|err| {
                warn!("publish to {} failed", topic);
                PublishError::Transport(err)
            })
    }
}

/// Outcome of [`Registry::sweep`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepReport<E> {
    /// Channels whose value reached the publisher.
    pub published: usize,
    /// Channels with no value to report.
    pub skipped: usize,
    /// Channels whose publish failed.
    pub failed: usize,
    /// The earliest failure of the sweep.
    pub first_error: Option<PublishError<E>>,
}

impl<E> Default for SweepReport<E> {
    fn default() -> Self {
        Self {
            published: 0,
            skipped: 0,
            failed: 0,
            first_error: None,
        }
    }
}

impl<E> SweepReport<E> {
    /// True when no channel failed.
    pub fn is_ok(&self) -> bool {
        self.failed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PayloadError;
    use core::cell::{Cell, RefCell};
    use std::string::{String, ToString};
    use std::vec::Vec as StdVec;

    #[derive(Default)]
    struct Recorder {
        sent: RefCell<StdVec<(String, String, QoS)>>,
        reject: Cell<bool>,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Rejected;

    impl MqttPublisher for Recorder {
        type Error = Rejected;

        fn publish(&self, topic: &str, payload: &[u8], qos: QoS) -> Result<(), Self::Error> {
            if self.reject.get() {
                return Err(Rejected);
            }
            let payload = core::str::from_utf8(payload).unwrap().to_string();
            self.sent.borrow_mut().push((topic.to_string(), payload, qos));
            Ok(())
        }
    }

    impl Recorder {
        fn sent(&self) -> StdVec<(String, String)> {
            self.sent
                .borrow()
                .iter()
                .map(|(t, p, _)| (t.clone(), p.clone()))
                .collect()
        }
    }

    fn pair(topic: &str, payload: &str) -> (String, String) {
        (topic.to_string(), payload.to_string())
    }

    #[test]
    fn register_then_get_round_trips() {
        let client = Recorder::default();
        let mut registry = Registry::<_, 8>::new(&client, RegistryOptions::new());

        let channel = registry
            .register("temperature_1", "papr/temperature/1/", ChannelKind::Temperature)
            .unwrap();
        registry
            .register("humidity_1", "papr/humidity/1/", ChannelKind::Humidity)
            .unwrap();

        assert_eq!(registry.get("temperature_1"), Ok(channel));
        let humidity = registry.get("humidity_1").unwrap();
        assert_eq!(humidity.topic(), "papr/humidity/1/");
        assert_eq!(humidity.kind(), ChannelKind::Humidity);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn duplicates_are_rejected_atomically() {
        let client = Recorder::default();
        let mut registry = Registry::<_, 8>::new(&client, RegistryOptions::new());
        registry
            .register("temperature_1", "papr/temperature/1/", ChannelKind::Temperature)
            .unwrap();

        assert_eq!(
            registry.register("temperature_1", "papr/temperature/9/", ChannelKind::Temperature),
            Err(RegistryError::DuplicateId)
        );
        assert_eq!(
            registry.register("temp_alias", "papr/temperature/1/", ChannelKind::Temperature),
            Err(RegistryError::DuplicateTopic)
        );

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("temp_alias"), Err(RegistryError::UnknownChannel));
        // The rejected topic must still be free for a fresh id.
        assert!(
            registry
                .register("temperature_9", "papr/temperature/9/", ChannelKind::Temperature)
                .is_ok()
        );
    }

    #[test]
    fn closed_registry_refuses_registration() {
        let client = Recorder::default();
        let mut registry = Registry::<_, 8>::new(&client, RegistryOptions::new());
        registry
            .register("battery_1", "papr/battery/1/", ChannelKind::Battery)
            .unwrap();
        registry.close();
        registry.close();

        assert!(registry.is_closed());
        assert_eq!(
            registry.register("fan_speed_1", "papr/fanspeed/1/", ChannelKind::FanSpeed),
            Err(RegistryError::Closed)
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("battery_1").unwrap().topic(), "papr/battery/1/");
    }

    #[test]
    fn invalid_input_is_rejected() {
        let client = Recorder::default();
        let mut registry = Registry::<_, 8>::new(&client, RegistryOptions::new());

        assert_eq!(
            registry.register("", "papr/battery/1/", ChannelKind::Battery),
            Err(RegistryError::InvalidId)
        );
        assert_eq!(
            registry.register("battery_1", "papr/+/1/", ChannelKind::Battery),
            Err(RegistryError::InvalidTopic)
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn capacity_is_enforced() {
        let client = Recorder::default();
        let mut registry = Registry::<_, 2>::new(&client, RegistryOptions::new());
        registry
            .register("pressure_1", "papr/pressure/1/", ChannelKind::Pressure)
            .unwrap();
        registry
            .register("pressure_2", "papr/pressure/2/", ChannelKind::Pressure)
            .unwrap();

        assert_eq!(
            registry.register("pressure_3", "papr/pressure/3/", ChannelKind::Pressure),
            Err(RegistryError::Full)
        );
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn all_preserves_registration_order() {
        let client = Recorder::default();
        let registry =
            Registry::<_, 32>::for_variant(&client, DeviceVariant::Data, RegistryOptions::new())
                .unwrap();

        let _ = registry.get("startup_p2");
        let _ = registry.get("humidity_1");

        let ids: StdVec<&str> = registry.all().map(|c| c.id()).collect();
        let expected: StdVec<&str> = DeviceVariant::Data.channels().iter().map(|s| s.id).collect();
        assert_eq!(ids, expected);
        // Restartable: a second pass sees the same sequence.
        assert_eq!(registry.all().count(), expected.len());
        assert!(registry.is_closed());
    }

    #[test]
    fn from_specs_stops_at_first_bad_row() {
        const SPECS: [ChannelSpec; 2] = [
            ChannelSpec::new("temperature_1", "papr/temperature/1/", ChannelKind::Temperature),
            ChannelSpec::new("temperature_1", "papr/temperature/2/", ChannelKind::Temperature),
        ];
        let client = Recorder::default();
        let result = Registry::<_, 4>::from_specs(&client, &SPECS, RegistryOptions::new());
        assert_eq!(result.err(), Some(RegistryError::DuplicateId));
    }

    #[test]
    fn publish_formats_and_forwards() {
        let client = Recorder::default();
        let registry = Registry::<_, 16>::for_variant(
            &client,
            DeviceVariant::Mqtt,
            RegistryOptions::new().with_qos(QoS::AtLeastOnce),
        )
        .unwrap();

        registry.publish("temperature_1", 21.5).unwrap();
        registry.publish("pressure_3", 1013.25).unwrap();

        assert_eq!(
            client.sent(),
            [
                pair("papr/temperature/1/", "21.50"),
                pair("papr/pressure/3/", "1013.25"),
            ]
        );
        assert!(
            client
                .sent
                .borrow()
                .iter()
                .all(|(_, _, qos)| *qos == QoS::AtLeastOnce)
        );
    }

    #[test]
    fn publish_honours_precision() {
        let client = Recorder::default();
        let registry = Registry::<_, 16>::for_variant(
            &client,
            DeviceVariant::Mqtt,
            RegistryOptions::new().with_precision(1),
        )
        .unwrap();

        registry.publish("humidity_2", 45.27).unwrap();
        assert_eq!(client.sent(), [pair("papr/humidity/2/", "45.3")]);
    }

    #[test]
    fn publish_reports_failures_without_retrying() {
        let client = Recorder::default();
        let registry =
            Registry::<_, 32>::for_variant(&client, DeviceVariant::Data, RegistryOptions::new())
                .unwrap();

        assert_eq!(
            registry.publish("temperature_9", 20.0),
            Err(PublishError::Registry(RegistryError::UnknownChannel))
        );
        assert_eq!(
            registry.publish("battery_1", f32::NAN),
            Err(PublishError::Payload(PayloadError::NonFinite))
        );

        client.reject.set(true);
        let err = registry.publish("fan_speed_1", 1200.0).unwrap_err();
        assert_eq!(err.transport(), Some(&Rejected));
        assert!(client.sent().is_empty());
    }

    #[test]
    fn binding_publishes_raw_and_numeric_payloads() {
        let client = Recorder::default();
        let registry =
            Registry::<_, 32>::for_variant(&client, DeviceVariant::Data, RegistryOptions::new())
                .unwrap();

        let startup = registry.binding("startup_p1").unwrap();
        assert_eq!(startup.channel().kind(), ChannelKind::StartupEvent);
        startup.publish_bytes(b"ok").unwrap();
        startup.publish(3.0).unwrap();
        registry.publish_bytes("startup_p2", b"ok").unwrap();

        assert_eq!(
            client.sent(),
            [
                pair("papr/startup/p1/", "ok"),
                pair("papr/startup/p1/", "3.00"),
                pair("papr/startup/p2/", "ok"),
            ]
        );
        assert!(registry.binding("startup_p9").is_err());
    }

    #[test]
    fn sweep_visits_every_channel() {
        let client = Recorder::default();
        let registry =
            Registry::<_, 16>::for_variant(&client, DeviceVariant::Mqtt, RegistryOptions::new())
                .unwrap();

        let report = registry.sweep(|channel| match channel.kind() {
            ChannelKind::Temperature => Some(20.0),
            ChannelKind::Humidity => Some(f32::INFINITY),
            _ => None,
        });

        assert_eq!(report.published, 5);
        assert_eq!(report.failed, 5);
        assert_eq!(report.skipped, 3);
        assert_eq!(
            report.first_error,
            Some(PublishError::Payload(PayloadError::NonFinite))
        );
        assert!(!report.is_ok());
        assert_eq!(client.sent()[0], pair("papr/temperature/1/", "20.00"));
        assert_eq!(client.sent()[4], pair("papr/temperature/5/", "20.00"));
    }
}
