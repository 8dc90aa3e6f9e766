use aws_sdk_sqs::Client;
use log::*;
use pw_common::{Metrics, NotificationError, NotificationEvent, NotificationProducer};

/// SQS-backed notification producer.
///
/// The SDK call is dispatched on a detached task; the message id (or SDK error) is only logged
/// and counted, matching the at-most-once, no-wait contract of the dispatcher.
#[derive(Clone)]
pub struct SqsProducer {
    client: Client,
    queue_url: String,
    metrics: Metrics,
}

impl SqsProducer {
    pub fn new(client: Client, queue_url: &str, metrics: Metrics) -> Self {
        Self { client, queue_url: queue_url.to_string(), metrics }
    }

    /// Build a producer from the ambient AWS environment (credentials chain, region).
    pub async fn from_env(queue_url: &str, metrics: Metrics) -> Self {
        let config = aws_config::load_from_env().await;
        Self::new(Client::new(&config), queue_url, metrics)
    }
}

impl NotificationProducer for SqsProducer {
    async fn send_email_notification(&self, event: &NotificationEvent) -> Result<(), NotificationError> {
        let payload = serde_json::to_string(event).map_err(|e| {
            self.metrics.increment_mail_queue_failure("Serialization");
            NotificationError::Serialization { to: event.to.clone(), message: e.to_string() }
        })?;
        let request = self.client.send_message().queue_url(&self.queue_url).message_body(payload);
        let to = event.to.clone();
        let metrics = self.metrics.clone();
        tokio::spawn(async move {
            match request.send().await {
                Ok(response) => {
                    debug!("📬️ Message published to SQS with ID: {}", response.message_id().unwrap_or("<none>"));
                },
                Err(e) => {
                    error!("📬️ Async error publishing to SQS for user {to}: {e}");
                    metrics.increment_mail_queue_failure("AsyncPublish");
                },
            }
        });
        info!("📬️ Email notification queued for: {}", event.to);
        self.metrics.increment_mail_queue_success();
        Ok(())
    }
}
