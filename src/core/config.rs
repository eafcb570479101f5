use std::env;
use std::time::Duration;

use crate::errors::SyncError;

pub const DEFAULT_MESSAGE_GROUP_ID_HEADER: &str = "MessageGroupId";
pub const DEFAULT_MESSAGE_DEDUPLICATION_ID_HEADER: &str = "MessageDeduplicationId";
/// SQS FIFO queues collapse duplicates seen within five minutes.
pub const DEFAULT_DEDUPLICATION_WINDOW_SECS: u64 = 300;

/// Names under which a received message exposes its FIFO ids.
///
/// These are broker specific and cannot be read back from the client library,
/// so they are carried as configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderNames {
    pub message_group_id: String,
    pub message_deduplication_id: String,
}

impl Default for HeaderNames {
    fn default() -> Self {
        Self {
            message_group_id: DEFAULT_MESSAGE_GROUP_ID_HEADER.to_string(),
            message_deduplication_id: DEFAULT_MESSAGE_DEDUPLICATION_ID_HEADER.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub event_queue_url: String,
    pub sqs_endpoint: Option<String>,
    pub headers: HeaderNames,
    pub deduplication_window: Duration,
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value cannot be parsed.
    pub fn from_env() -> Result<Self, SyncError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a required key is missing or a value cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SyncError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let event_queue_url = lookup("EVENT_QUEUE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| SyncError::ConfigError("EVENT_QUEUE_URL: not set".to_string()))?;

        let window_secs = match lookup("DEDUPLICATION_WINDOW_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                SyncError::ConfigError(format!("DEDUPLICATION_WINDOW_SECS: {e}"))
            })?,
            None => DEFAULT_DEDUPLICATION_WINDOW_SECS,
        };

        let defaults = HeaderNames::default();
        Ok(Self {
            event_queue_url,
            sqs_endpoint: lookup("AWS_SQS_ENDPOINT").filter(|e| !e.trim().is_empty()),
            headers: HeaderNames {
                message_group_id: lookup("MESSAGE_GROUP_ID_HEADER")
                    .unwrap_or(defaults.message_group_id),
                message_deduplication_id: lookup("MESSAGE_DEDUPLICATION_ID_HEADER")
                    .unwrap_or(defaults.message_deduplication_id),
            },
            deduplication_window: Duration::from_secs(window_secs),
        })
    }
}
