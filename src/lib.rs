//! Trainee sync - converts change records between typed entities and stored
//! documents, and publishes record events to FIFO queues.
//!
//! # Architecture
//!
//! - [`registry::EntityRegistry`] maps entity types to fresh-instance factories,
//!   populated once at start-up.
//! - [`convert`] reads documents into entities and writes entities back to
//!   documents tagged with their concrete type.
//! - [`messaging::FifoMessagingService`] publishes to SQS FIFO queues with
//!   per-group ordering and optional explicit deduplication.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use trainee_sync::convert::{RecordReadConverter, RecordWriteConverter};
//! use trainee_sync::core::config::AppConfig;
//! use trainee_sync::entity::{Entity, Placement};
//! use trainee_sync::messaging::{FifoMessagingService, SqsTransport};
//! use trainee_sync::registry::EntityRegistry;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     trainee_sync::setup_logging();
//!     let config = AppConfig::from_env()?;
//!
//!     let registry = Arc::new(EntityRegistry::with_default_entities());
//!     let reader = RecordReadConverter::new(Arc::clone(&registry));
//!
//!     let mut placement = Placement::new();
//!     placement.identifier = "40".into();
//!     placement.attributes.insert("postId".into(), "12".into());
//!
//!     let document = RecordWriteConverter::new().write(&placement)?;
//!     let restored: Placement = reader.read_as(&document)?;
//!
//!     let publisher = FifoMessagingService::new(SqsTransport::from_config(&config).await);
//!     publisher
//!         .publish_record(&config.event_queue_url, restored.record(), None)
//!         .await?;
//!     Ok(())
//! }
//! ```
pub mod convert;
pub mod core;
pub mod entity;
pub mod errors;
pub mod messaging;
pub mod registry;
pub mod store;

/// Configure structured logging with JSON format for `CloudWatch` Logs.
///
/// The level comes from `RUST_LOG`, defaulting to `info`. Safe to call more
/// than once; later calls leave the first subscriber in place.
///
/// # Example
///
/// ```
/// trainee_sync::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    if tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("Logging already initialised");
    }
}
