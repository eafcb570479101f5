//! In-process stand-in for a FIFO queue broker.
//!
//! Behaves like an SQS FIFO queue for the parts publishers rely on: messages
//! keep publish order, duplicates inside the deduplication window are accepted
//! but not delivered again, and received messages expose their ids as headers.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::debug;

use super::QueueTransport;
use super::message::{QueueMessage, ReceivedMessage};
use crate::core::config::HeaderNames;
use crate::errors::SyncError;

#[derive(Debug, Default)]
struct QueueState {
    content_based_deduplication: bool,
    pending: VecDeque<ReceivedMessage>,
    seen: HashMap<String, Instant>,
    accepted: usize,
}

#[derive(Debug, Default)]
struct BrokerState {
    queues: HashMap<String, QueueState>,
    unavailable: bool,
    send_attempts: usize,
}

#[derive(Debug)]
pub struct MemoryFifoQueue {
    headers: HeaderNames,
    window: Duration,
    state: Mutex<BrokerState>,
}

impl MemoryFifoQueue {
    #[must_use]
    pub fn new(headers: HeaderNames, window: Duration) -> Self {
        Self {
            headers,
            window,
            state: Mutex::new(BrokerState::default()),
        }
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderNames {
        &self.headers
    }

    pub async fn create_queue(&self, queue_url: &str, content_based_deduplication: bool) {
        let mut state = self.state.lock().await;
        state.queues.insert(
            queue_url.to_string(),
            QueueState {
                content_based_deduplication,
                ..QueueState::default()
            },
        );
    }

    /// Make every send fail as if the broker could not be reached.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().await.unavailable = unavailable;
    }

    /// Pop up to `max` messages in delivery order.
    pub async fn receive(&self, queue_url: &str, max: usize) -> Vec<ReceivedMessage> {
        let mut state = self.state.lock().await;
        let Some(queue) = state.queues.get_mut(queue_url) else {
            return Vec::new();
        };
        let take = max.min(queue.pending.len());
        queue.pending.drain(..take).collect()
    }

    /// Messages accepted and not collapsed as duplicates.
    pub async fn accepted(&self, queue_url: &str) -> usize {
        self.state
            .lock()
            .await
            .queues
            .get(queue_url)
            .map_or(0, |q| q.accepted)
    }

    /// Every call to `send`, successful or not.
    pub async fn send_attempts(&self) -> usize {
        self.state.lock().await.send_attempts
    }
}

/// SHA-256 of the body, hex encoded, as SQS derives it for content-based
/// deduplication.
fn content_hash(body: &str) -> String {
    hex::encode(Sha256::digest(body.as_bytes()))
}

#[async_trait]
impl QueueTransport for MemoryFifoQueue {
    async fn send(&self, queue_url: &str, message: &QueueMessage) -> Result<(), SyncError> {
        let mut state = self.state.lock().await;
        state.send_attempts += 1;

        if state.unavailable {
            return Err(SyncError::DeliveryError("broker unreachable".to_string()));
        }

        let Some(queue) = state.queues.get_mut(queue_url) else {
            return Err(SyncError::DeliveryError(format!(
                "queue does not exist: {queue_url}"
            )));
        };

        let deduplication_id = match &message.deduplication_id {
            Some(id) => Some(id.clone()),
            None if queue.content_based_deduplication => Some(content_hash(&message.body)),
            None => None,
        };

        let now = Instant::now();
        let window = self.window;
        queue.seen.retain(|_, at| now.duration_since(*at) < window);

        if let Some(id) = &deduplication_id {
            if queue.seen.contains_key(id) {
                debug!(deduplication_id = %id, "Duplicate message collapsed");
                return Ok(());
            }
            queue.seen.insert(id.clone(), now);
        }

        let mut headers = HashMap::new();
        headers.insert(
            self.headers.message_group_id.clone(),
            message.group_id.clone(),
        );
        if let Some(id) = deduplication_id {
            headers.insert(self.headers.message_deduplication_id.clone(), id);
        }

        queue.pending.push_back(ReceivedMessage {
            body: message.body.clone(),
            headers,
        });
        queue.accepted += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUEUE: &str = "memory://test.fifo";

    #[tokio::test]
    async fn test_unknown_queue_rejected() {
        let broker = MemoryFifoQueue::new(HeaderNames::default(), Duration::from_secs(300));
        let err = broker
            .send("memory://missing.fifo", &QueueMessage::new("x", "g"))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::DeliveryError(_)));
    }

    #[tokio::test]
    async fn test_content_based_deduplication() {
        let broker = MemoryFifoQueue::new(HeaderNames::default(), Duration::from_secs(300));
        broker.create_queue(QUEUE, true).await;

        broker.send(QUEUE, &QueueMessage::new("same", "g1")).await.unwrap();
        broker.send(QUEUE, &QueueMessage::new("same", "g2")).await.unwrap();
        broker.send(QUEUE, &QueueMessage::new("other", "g3")).await.unwrap();

        assert_eq!(broker.accepted(QUEUE).await, 2);
        let received = broker.receive(QUEUE, 10).await;
        assert_eq!(received.len(), 2);
        assert!(received[0].header("MessageDeduplicationId").is_some());
    }

    #[tokio::test]
    async fn test_content_deduplication_id_is_body_sha256() {
        let broker = MemoryFifoQueue::new(HeaderNames::default(), Duration::from_secs(300));
        broker.create_queue(QUEUE, true).await;

        broker.send(QUEUE, &QueueMessage::new("hello", "g")).await.unwrap();

        let received = broker.receive(QUEUE, 1).await;
        let id = received[0]
            .header("MessageDeduplicationId")
            .expect("content hash header");
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(
            id,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[tokio::test]
    async fn test_no_deduplication_without_id_or_content_policy() {
        let broker = MemoryFifoQueue::new(HeaderNames::default(), Duration::from_secs(300));
        broker.create_queue(QUEUE, false).await;

        broker.send(QUEUE, &QueueMessage::new("same", "g")).await.unwrap();
        broker.send(QUEUE, &QueueMessage::new("same", "g")).await.unwrap();

        let received = broker.receive(QUEUE, 10).await;
        assert_eq!(received.len(), 2);
        assert!(received[0].header("MessageDeduplicationId").is_none());
        assert_eq!(received[0].header("MessageGroupId"), Some("g"));
    }

    #[tokio::test]
    async fn test_window_expiry_allows_redelivery() {
        let broker = MemoryFifoQueue::new(HeaderNames::default(), Duration::ZERO);
        broker.create_queue(QUEUE, false).await;

        let message = QueueMessage::new("body", "g").with_deduplication_id("d");
        broker.send(QUEUE, &message).await.unwrap();
        broker.send(QUEUE, &message).await.unwrap();

        assert_eq!(broker.accepted(QUEUE).await, 2);
    }
}
