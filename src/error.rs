//! # Error Types
//!
//! Every failure in this crate is local and reported synchronously. Nothing is
//! retried and nothing panics; the caller decides whether an error should halt
//! startup or be logged and skipped for the current cycle.

/// Errors raised while building or querying the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// A channel with the same id is already registered.
    DuplicateId,
    /// A channel with the same topic is already registered.
    DuplicateTopic,
    /// Registration was attempted after the initialization phase ended.
    Closed,
    /// No channel is registered under the requested id.
    UnknownChannel,
    /// The registry has no room left for another channel.
    Full,
    /// The topic is empty, too long, or contains a wildcard or NUL.
    InvalidTopic,
    /// The channel id is empty.
    InvalidId,
}

/// Errors raised while turning a reading into a wire payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PayloadError {
    /// The reading is NaN or infinite and has no decimal representation.
    NonFinite,
    /// The formatted reading does not fit in the payload buffer.
    TooLarge,
}

/// Errors raised by a publish through the registry.
///
/// It is generic over the publisher error `T`, so whatever the transport
/// collaborator reports reaches the caller untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PublishError<T> {
    /// The channel could not be resolved.
    Registry(RegistryError),
    /// The value could not be encoded.
    Payload(PayloadError),
    /// The publisher refused or failed the publish.
    Transport(T),
}

impl<T> From<RegistryError> for PublishError<T> {
    fn from(err: RegistryError) -> Self {
        PublishError::Registry(err)
    }
}

impl<T> From<PayloadError> for PublishError<T> {
    fn from(err: PayloadError) -> Self {
        PublishError::Payload(err)
    }
}

impl<T> PublishError<T> {
    /// Returns the transport error, if the failure came from the publisher.
    pub fn transport(&self) -> Option<&T> {
        match self {
            PublishError::Transport(err) => Some(err),
            _ => None,
        }
    }
}
