use lapin::{
    options::{BasicPublishOptions, QueueDeclareOptions},
    types::FieldTable,
    BasicProperties,
    Channel,
    Connection,
    ConnectionProperties,
};
use log::*;
use pw_common::{Metrics, NotificationError, NotificationEvent, NotificationProducer};

use crate::QueueError;

/// AMQP-backed notification producer.
///
/// `basic_publish` hands the payload to the broker connection; that await is the submission step
/// and its failure is raised to the caller. The publisher confirm that comes back is watched by a
/// detached task, so the caller never waits on broker acknowledgement.
#[derive(Clone)]
pub struct RabbitMqProducer {
    channel: Channel,
    queue: String,
    metrics: Metrics,
}

impl RabbitMqProducer {
    pub async fn connect(uri: &str, queue: &str, metrics: Metrics) -> Result<Self, QueueError> {
        let connection = Connection::connect(uri, ConnectionProperties::default())
            .await
            .map_err(|e| QueueError::Initialization(format!("amqp connect: {e}")))?;
        let channel = connection
            .create_channel()
            .await
            .map_err(|e| QueueError::Initialization(format!("amqp channel: {e}")))?;
        let options = QueueDeclareOptions { durable: true, ..Default::default() };
        channel
            .queue_declare(queue, options, FieldTable::default())
            .await
            .map_err(|e| QueueError::Initialization(format!("amqp declare: {e}")))?;
        info!("📬️ Connected to AMQP queue '{queue}'");
        Ok(Self::new(channel, queue, metrics))
    }

    /// Wrap an already-established channel. The queue must exist.
    pub fn new(channel: Channel, queue: &str, metrics: Metrics) -> Self {
        Self { channel, queue: queue.to_string(), metrics }
    }
}

impl NotificationProducer for RabbitMqProducer {
    async fn send_email_notification(&self, event: &NotificationEvent) -> Result<(), NotificationError> {
        let payload = serde_json::to_vec(event).map_err(|e| {
            self.metrics.increment_mail_queue_failure("Serialization");
            NotificationError::Serialization { to: event.to.clone(), message: e.to_string() }
        })?;
        let confirm = self
            .channel
            .basic_publish("", &self.queue, BasicPublishOptions::default(), &payload, BasicProperties::default())
            .await
            .map_err(|e| {
                self.metrics.increment_mail_queue_failure("Publish");
                NotificationError::Publish { to: event.to.clone(), message: e.to_string() }
            })?;
        let to = event.to.clone();
        let queue = self.queue.clone();
        let metrics = self.metrics.clone();
        tokio::spawn(async move {
            match confirm.await {
                Ok(_) => debug!("📬️ Notification for {to} confirmed by queue '{queue}'"),
                Err(e) => {
                    error!("📬️ Async error publishing notification for {to}: {e}");
                    metrics.increment_mail_queue_failure("AsyncPublish");
                },
            }
        });
        info!("📬️ Email notification queued for: {}", event.to);
        self.metrics.increment_mail_queue_success();
        Ok(())
    }
}
