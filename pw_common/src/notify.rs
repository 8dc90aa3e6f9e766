use serde::{Deserialize, Serialize};
use thiserror::Error;

//--------------------------------------  NotificationEvent  ---------------------------------------------------------

/// A single notification to be delivered to a user. Never persisted and never retried; delivery is
/// at-most-once per event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl NotificationEvent {
    pub fn new<S1: Into<String>, S2: Into<String>, S3: Into<String>>(to: S1, subject: S2, body: S3) -> Self {
        Self { to: to.into(), subject: subject.into(), body: body.into() }
    }
}

#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    #[error("Failed to serialize notification payload for {to}: {message}")]
    Serialization { to: String, message: String },
    #[error("Failed to hand notification for {to} to the queue: {message}")]
    Publish { to: String, message: String },
}

//-------------------------------------- NotificationProducer --------------------------------------------------------

/// Fire-and-forget publisher of [`NotificationEvent`]s.
///
/// `send_email_notification` returns once the event has been handed to the transport.
/// Serialization and submission failures are raised to the caller; whatever happens to the message
/// after submission is observed asynchronously by the producer itself, for logging and counters
/// only. Callers must not rely on delivery ordering relative to their own subsequent work.
#[allow(async_fn_in_trait)]
pub trait NotificationProducer {
    async fn send_email_notification(&self, event: &NotificationEvent) -> Result<(), NotificationError>;
}
