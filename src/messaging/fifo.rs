//! Publisher for FIFO queues.
//!
//! # Ordering
//!
//! [`FifoMessagingService::publish`] and
//! [`FifoMessagingService::publish_with_deduplication`] mint a new message
//! group for every call, so messages sent through them are **unordered**
//! relative to each other. Callers that need ordering must share a group id,
//! either through [`FifoMessagingService::publish_to_group`] or
//! [`FifoMessagingService::publish_record`], which derives the group from the
//! record's parent entity.
//!
//! Publishing never retries. An `Err` means the broker did not confirm the
//! message; retry policy belongs to the caller.

use tracing::{error, info};
use uuid::Uuid;

use super::QueueTransport;
use super::group::message_group_id;
use super::message::QueueMessage;
use crate::core::models::Record;
use crate::errors::SyncError;

/// Upper bound SQS places on group and deduplication ids.
pub const MAX_FIFO_ID_LEN: usize = 128;

#[derive(Debug, Clone)]
pub struct FifoMessagingService<T> {
    transport: T,
}

impl<T: QueueTransport> FifoMessagingService<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Publish with a fresh message group and no deduplication id; the
    /// queue's own deduplication policy, if any, applies.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::DeliveryError`] if the broker does not accept the message.
    pub async fn publish(&self, queue_url: &str, payload: impl Into<String>) -> Result<(), SyncError> {
        let message = QueueMessage::new(payload, new_group_id());
        self.dispatch(queue_url, message).await
    }

    /// Publish with a fresh message group and an explicit deduplication id,
    /// overriding any content-based deduplication on the queue.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::DeliveryError`] if the id is invalid or the broker
    /// does not accept the message.
    pub async fn publish_with_deduplication(
        &self,
        queue_url: &str,
        payload: impl Into<String>,
        deduplication_id: &str,
    ) -> Result<(), SyncError> {
        let message =
            QueueMessage::new(payload, new_group_id()).with_deduplication_id(deduplication_id);
        self.dispatch(queue_url, message).await
    }

    /// Publish into a caller-chosen group. Messages sharing `group_id` are
    /// delivered in the order they were accepted.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::DeliveryError`] if an id is invalid or the broker
    /// does not accept the message.
    pub async fn publish_to_group(
        &self,
        queue_url: &str,
        payload: impl Into<String>,
        group_id: &str,
        deduplication_id: Option<&str>,
    ) -> Result<(), SyncError> {
        let mut message = QueueMessage::new(payload, group_id);
        message.deduplication_id = deduplication_id.map(str::to_string);
        self.dispatch(queue_url, message).await
    }

    /// Publish a record in its wire form, grouped under its parent entity.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::SerializationError`] if the record cannot be
    /// serialized, otherwise as for [`FifoMessagingService::publish_to_group`].
    pub async fn publish_record(
        &self,
        queue_url: &str,
        record: &Record,
        deduplication_id: Option<&str>,
    ) -> Result<(), SyncError> {
        let payload = serde_json::to_string(record)?;
        let group_id = message_group_id(record);
        self.publish_to_group(queue_url, payload, &group_id, deduplication_id)
            .await
    }

    async fn dispatch(&self, queue_url: &str, message: QueueMessage) -> Result<(), SyncError> {
        validate_fifo_id("message group id", &message.group_id)?;
        if let Some(id) = &message.deduplication_id {
            validate_fifo_id("message deduplication id", id)?;
        }

        #[cfg(feature = "debug-logs")]
        info!("Publishing message body:\n{}", message.body);

        match self.transport.send(queue_url, &message).await {
            Ok(()) => {
                info!(
                    queue_url = %queue_url,
                    group_id = %message.group_id,
                    deduplication_id = message.deduplication_id.as_deref().unwrap_or(""),
                    "Message published to FIFO queue"
                );
                Ok(())
            }
            Err(e) => {
                error!(
                    queue_url = %queue_url,
                    group_id = %message.group_id,
                    "Failed to publish message: {}",
                    e
                );
                Err(e)
            }
        }
    }
}

fn new_group_id() -> String {
    Uuid::new_v4().to_string()
}

fn validate_fifo_id(kind: &str, id: &str) -> Result<(), SyncError> {
    if id.is_empty() {
        return Err(SyncError::DeliveryError(format!("{kind} must not be empty")));
    }
    if id.chars().count() > MAX_FIFO_ID_LEN {
        return Err(SyncError::DeliveryError(format!(
            "{kind} exceeds {MAX_FIFO_ID_LEN} characters"
        )));
    }
    Ok(())
}
