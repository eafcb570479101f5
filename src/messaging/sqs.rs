use async_trait::async_trait;
use aws_sdk_sqs::Client as SqsClient;
use aws_sdk_sqs::types::{Message, MessageSystemAttributeName};
use std::collections::HashMap;
use tracing::debug;

use super::QueueTransport;
use super::message::{QueueMessage, ReceivedMessage};
use crate::core::config::{AppConfig, HeaderNames};
use crate::errors::SyncError;

/// Amazon SQS transport. Group and deduplication ids map onto the native
/// `MessageGroupId` and `MessageDeduplicationId` request fields.
#[derive(Debug, Clone)]
pub struct SqsTransport {
    client: SqsClient,
}

impl SqsTransport {
    #[must_use]
    pub fn new(client: SqsClient) -> Self {
        Self { client }
    }

    /// Build a client from the default AWS provider chain, honouring the
    /// configured endpoint override.
    pub async fn from_config(config: &AppConfig) -> Self {
        let shared_config = aws_config::from_env().load().await;
        let mut builder = aws_sdk_sqs::config::Builder::from(&shared_config);
        if let Some(endpoint) = &config.sqs_endpoint {
            builder = builder.endpoint_url(endpoint);
        }
        Self::new(SqsClient::from_conf(builder.build()))
    }

    #[must_use]
    pub fn client(&self) -> &SqsClient {
        &self.client
    }

    /// Receive up to `max` messages, exposing their FIFO ids under `headers`.
    ///
    /// # Errors
    ///
    /// Returns an error if the receive call fails.
    pub async fn receive(
        &self,
        queue_url: &str,
        max: i32,
        headers: &HeaderNames,
    ) -> Result<Vec<ReceivedMessage>, SyncError> {
        let output = self
            .client
            .receive_message()
            .queue_url(queue_url)
            .max_number_of_messages(max)
            .wait_time_seconds(1)
            .message_system_attribute_names(MessageSystemAttributeName::MessageGroupId)
            .message_system_attribute_names(MessageSystemAttributeName::MessageDeduplicationId)
            .send()
            .await?;

        Ok(output
            .messages()
            .iter()
            .map(|message| to_received(message, headers))
            .collect())
    }
}

/// Expose the FIFO system attributes of an SQS message under the configured
/// header names.
fn to_received(message: &Message, headers: &HeaderNames) -> ReceivedMessage {
    let mut received = HashMap::new();
    if let Some(attributes) = message.attributes() {
        if let Some(group) = attributes.get(&MessageSystemAttributeName::MessageGroupId) {
            received.insert(headers.message_group_id.clone(), group.clone());
        }
        if let Some(dedup) = attributes.get(&MessageSystemAttributeName::MessageDeduplicationId) {
            received.insert(headers.message_deduplication_id.clone(), dedup.clone());
        }
    }
    ReceivedMessage {
        body: message.body().unwrap_or_default().to_string(),
        headers: received,
    }
}

#[async_trait]
impl QueueTransport for SqsTransport {
    async fn send(&self, queue_url: &str, message: &QueueMessage) -> Result<(), SyncError> {
        let output = self
            .client
            .send_message()
            .queue_url(queue_url)
            .message_body(&message.body)
            .message_group_id(&message.group_id)
            .set_message_deduplication_id(message.deduplication_id.clone())
            .send()
            .await?;

        debug!(
            message_id = output.message_id().unwrap_or_default(),
            sequence_number = output.sequence_number().unwrap_or_default(),
            "SQS accepted message"
        );
        Ok(())
    }
}
