use std::collections::HashMap;

use crate::core::config::HeaderNames;

/// One publish request: an opaque body plus its FIFO ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    pub body: String,
    pub group_id: String,
    pub deduplication_id: Option<String>,
}

impl QueueMessage {
    #[must_use]
    pub fn new(body: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            group_id: group_id.into(),
            deduplication_id: None,
        }
    }

    #[must_use]
    pub fn with_deduplication_id(mut self, deduplication_id: impl Into<String>) -> Self {
        self.deduplication_id = Some(deduplication_id.into());
        self
    }
}

/// A message as a consumer sees it, FIFO ids surfaced as headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    pub body: String,
    pub headers: HashMap<String, String>,
}

impl ReceivedMessage {
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn group_id(&self, names: &HeaderNames) -> Option<&str> {
        self.header(&names.message_group_id)
    }

    #[must_use]
    pub fn deduplication_id(&self, names: &HeaderNames) -> Option<&str> {
        self.header(&names.message_deduplication_id)
    }
}
