//! Channel-backed publish outbox.
//!
//! Sensor code rarely owns the MQTT client. A `PublisherHandle` copies each
//! publish into an owned request and queues it on an `embassy-sync` channel;
//! the task that owns the client drains the receiver and does the actual I/O.
//! The channel is also what serializes publishes coming from several tasks.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use heapless::{String, Vec};

use crate::transport::{MqttPublisher, QoS};

/// A queued publish that no longer borrows from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedPublishRequest<const TOPIC_SIZE: usize, const PAYLOAD_SIZE: usize> {
    /// Destination topic, copied out of the caller's borrow.
    pub topic: String<TOPIC_SIZE>,
    /// Encoded reading bytes.
    pub payload: Vec<u8, PAYLOAD_SIZE>,
    /// Delivery level requested by the registry.
    pub qos: QoS,
}

impl<const TOPIC_SIZE: usize, const PAYLOAD_SIZE: usize>
    OwnedPublishRequest<TOPIC_SIZE, PAYLOAD_SIZE>
{
    /// Copies `topic` and `payload` into a new request.
    pub fn new(topic: &str, payload: &[u8], qos: QoS) -> Result<Self, OutboxError> {
        let mut owned_topic = String::new();
        owned_topic
            .push_str(topic)
            .map_err(|_| OutboxError::TopicTooLong)?;

        let mut owned_payload = Vec::new();
        owned_payload
            .extend_from_slice(payload)
            .map_err(|_| OutboxError::PayloadTooLarge)?;

        Ok(Self {
            topic: owned_topic,
            payload: owned_payload,
            qos,
        })
    }
}

/// Reasons a handle could not queue a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutboxError {
    /// The topic does not fit in `TOPIC_SIZE`.
    TopicTooLong,
    /// The payload does not fit in `PAYLOAD_SIZE`.
    PayloadTooLarge,
    /// The channel is full; the consumer is not keeping up.
    Full,
}

/// Queue between publishing code and the task owning the MQTT client.
pub type PublishRequestChannel<
    M,
    const TOPIC_SIZE: usize,
    const PAYLOAD_SIZE: usize,
    const OUTBOX_DEPTH: usize,
> = Channel<M, OwnedPublishRequest<TOPIC_SIZE, PAYLOAD_SIZE>, OUTBOX_DEPTH>;

/// Producer side of a [`PublishRequestChannel`].
pub type PublishRequestSender<
    'a,
    M,
    const TOPIC_SIZE: usize,
    const PAYLOAD_SIZE: usize,
    const OUTBOX_DEPTH: usize,
> = Sender<'a, M, OwnedPublishRequest<TOPIC_SIZE, PAYLOAD_SIZE>, OUTBOX_DEPTH>;

/// Consumer side of a [`PublishRequestChannel`], drained by the client task.
pub type PublishRequestReceiver<
    'a,
    M,
    const TOPIC_SIZE: usize,
    const PAYLOAD_SIZE: usize,
    const OUTBOX_DEPTH: usize,
> = Receiver<'a, M, OwnedPublishRequest<TOPIC_SIZE, PAYLOAD_SIZE>, OUTBOX_DEPTH>;

/// Feeds publishes into an outbox channel.
///
/// Copy it into every task that reports readings.
/// It never waits: when the channel is full the publish fails with
/// [`OutboxError::Full`] and the reading is dropped for that cycle.
pub struct PublisherHandle<
    'a,
    M: RawMutex,
    const TOPIC_SIZE: usize,
    const PAYLOAD_SIZE: usize,
    const OUTBOX_DEPTH: usize,
> {
    tx: PublishRequestSender<'a, M, TOPIC_SIZE, PAYLOAD_SIZE, OUTBOX_DEPTH>,
}

impl<'a, M: RawMutex, const TOPIC_SIZE: usize, const PAYLOAD_SIZE: usize, const OUTBOX_DEPTH: usize>
    Clone for PublisherHandle<'a, M, TOPIC_SIZE, PAYLOAD_SIZE, OUTBOX_DEPTH>
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, M: RawMutex, const TOPIC_SIZE: usize, const PAYLOAD_SIZE: usize, const OUTBOX_DEPTH: usize>
    Copy for PublisherHandle<'a, M, TOPIC_SIZE, PAYLOAD_SIZE, OUTBOX_DEPTH>
{
}

impl<'a, M: RawMutex, const TOPIC_SIZE: usize, const PAYLOAD_SIZE: usize, const OUTBOX_DEPTH: usize>
    PublisherHandle<'a, M, TOPIC_SIZE, PAYLOAD_SIZE, OUTBOX_DEPTH>
{
    /// Wrap an existing sender.
    pub fn new(tx: PublishRequestSender<'a, M, TOPIC_SIZE, PAYLOAD_SIZE, OUTBOX_DEPTH>) -> Self {
        Self { tx }
    }

    /// Create a handle feeding `channel`.
    pub fn from_channel(
        channel: &'a PublishRequestChannel<M, TOPIC_SIZE, PAYLOAD_SIZE, OUTBOX_DEPTH>,
    ) -> Self {
        Self::new(channel.sender())
    }

    /// Queue a publish, failing instead of waiting when the outbox is full.
    pub fn try_publish(&self, topic: &str, payload: &[u8], qos: QoS) -> Result<(), OutboxError> {
        let req = OwnedPublishRequest::new(topic, payload, qos)?;
        self.tx.try_send(req).map_err(|_| OutboxError::Full)
    }
}

impl<M: RawMutex, const TOPIC_SIZE: usize, const PAYLOAD_SIZE: usize, const OUTBOX_DEPTH: usize>
    MqttPublisher for PublisherHandle<'_, M, TOPIC_SIZE, PAYLOAD_SIZE, OUTBOX_DEPTH>
{
    type Error = OutboxError;

    fn publish(&self, topic: &str, payload: &[u8], qos: QoS) -> Result<(), Self::Error> {
        self.try_publish(topic, payload, qos)
    }
}
