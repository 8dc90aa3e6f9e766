//! Queue-backed notification producers.
//!
//! Two interchangeable backends publish [`NotificationEvent`]s as JSON `{to, subject, body}`
//! payloads: RabbitMQ (AMQP via `lapin`) and AWS SQS. The backend is chosen by deployment
//! configuration when the producer is constructed; callers only ever see the
//! [`NotificationProducer`] contract.
//!
//! Both backends are fire-and-forget: serialization and submission failures are raised to the
//! caller, while everything after submission is watched by a background task that only logs and
//! bumps counters. There is no retry and no delivery guarantee beyond at-most-once.

mod rabbitmq;
mod sqs;

use log::*;
use pw_common::{Metrics, NotificationError, NotificationEvent, NotificationProducer, Secret};
use thiserror::Error;

pub use aws_config;
pub use aws_sdk_sqs;
pub use lapin;
pub use rabbitmq::RabbitMqProducer;
pub use sqs::SqsProducer;

const DEFAULT_TOPIC: &str = "price-notifications";
const DEFAULT_AMQP_URI: &str = "amqp://127.0.0.1:5672/%2f";

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Could not initialize the notification queue: {0}")]
    Initialization(String),
    #[error("Unknown notification backend '{0}'. Expected 'rabbitmq' or 'sqs'")]
    UnknownBackend(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueueBackendKind {
    #[default]
    RabbitMq,
    Sqs,
}

impl QueueBackendKind {
    pub fn parse(s: &str) -> Result<Self, QueueError> {
        match s.to_ascii_lowercase().as_str() {
            "rabbitmq" | "amqp" => Ok(Self::RabbitMq),
            "sqs" => Ok(Self::Sqs),
            other => Err(QueueError::UnknownBackend(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueueConfig {
    pub backend: QueueBackendKind,
    /// Queue (RabbitMQ) the notification payloads are published to.
    pub topic: String,
    /// AMQP connection URI. May carry credentials, hence the [`Secret`].
    pub amqp_uri: Secret<String>,
    /// Full queue URL for the SQS backend.
    pub sqs_queue_url: String,
}

impl QueueConfig {
    pub fn new_from_env_or_default() -> Self {
        let backend = std::env::var("PW_NOTIFY_BACKEND")
            .map(|s| {
                QueueBackendKind::parse(&s).unwrap_or_else(|e| {
                    warn!("📬️ {e}. Using the default, rabbitmq, instead.");
                    QueueBackendKind::RabbitMq
                })
            })
            .unwrap_or_default();
        let topic = std::env::var("PW_NOTIFY_TOPIC").unwrap_or_else(|_| {
            warn!("📬️ PW_NOTIFY_TOPIC not set, using {DEFAULT_TOPIC} as default");
            DEFAULT_TOPIC.to_string()
        });
        let amqp_uri = Secret::new(std::env::var("PW_AMQP_URI").unwrap_or_else(|_| DEFAULT_AMQP_URI.to_string()));
        let sqs_queue_url = std::env::var("PW_SQS_QUEUE_URL").unwrap_or_default();
        Self { backend, topic, amqp_uri, sqs_queue_url }
    }
}

//--------------------------------------  NotificationQueue  ---------------------------------------------------------

/// The deployment-selected notification backend. Business code holds one of these and stays
/// backend-agnostic.
#[derive(Clone)]
pub enum NotificationQueue {
    RabbitMq(RabbitMqProducer),
    Sqs(SqsProducer),
}

impl NotificationQueue {
    pub async fn connect(config: &QueueConfig, metrics: Metrics) -> Result<Self, QueueError> {
        match config.backend {
            QueueBackendKind::RabbitMq => {
                let producer = RabbitMqProducer::connect(config.amqp_uri.reveal(), &config.topic, metrics).await?;
                Ok(Self::RabbitMq(producer))
            },
            QueueBackendKind::Sqs => {
                if config.sqs_queue_url.is_empty() {
                    return Err(QueueError::Initialization("PW_SQS_QUEUE_URL is not set".to_string()));
                }
                let producer = SqsProducer::from_env(&config.sqs_queue_url, metrics).await;
                Ok(Self::Sqs(producer))
            },
        }
    }
}

impl NotificationProducer for NotificationQueue {
    async fn send_email_notification(&self, event: &NotificationEvent) -> Result<(), NotificationError> {
        match self {
            NotificationQueue::RabbitMq(producer) => producer.send_email_notification(event).await,
            NotificationQueue::Sqs(producer) => producer.send_email_notification(event).await,
        }
    }
}
