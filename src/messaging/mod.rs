//! Ordered, deduplicated publishing to FIFO queues.

pub mod fifo;
pub mod group;
pub mod memory;
pub mod message;
pub mod sqs;

use async_trait::async_trait;

use crate::errors::SyncError;

pub use fifo::FifoMessagingService;
pub use group::{message_group_id, unique_deduplication_id};
pub use memory::MemoryFifoQueue;
pub use message::{QueueMessage, ReceivedMessage};
pub use sqs::SqsTransport;

/// Broker connection able to hand one message to a queue.
///
/// `Ok` means the broker durably accepted the message. Implementations do not retry.
#[async_trait]
pub trait QueueTransport: Send + Sync {
    async fn send(&self, queue_url: &str, message: &QueueMessage) -> Result<(), SyncError>;
}

#[async_trait]
impl<T: QueueTransport + ?Sized> QueueTransport for std::sync::Arc<T> {
    async fn send(&self, queue_url: &str, message: &QueueMessage) -> Result<(), SyncError> {
        (**self).send(queue_url, message).await
    }
}
