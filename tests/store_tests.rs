use std::sync::Arc;
use std::time::Duration;

use trainee_sync::core::config::HeaderNames;
use trainee_sync::entity::{Entity, EntityType, Grade, Post};
use trainee_sync::errors::SyncError;
use trainee_sync::messaging::{FifoMessagingService, MemoryFifoQueue};
use trainee_sync::registry::EntityRegistry;
use trainee_sync::store::{MemoryDocumentStore, RecordStore, collection_name};

fn record_store() -> RecordStore<MemoryDocumentStore> {
    RecordStore::new(
        MemoryDocumentStore::new(),
        Arc::new(EntityRegistry::with_default_entities()),
    )
}

#[tokio::test]
async fn test_save_then_find() {
    let store = record_store();
    let mut grade = Grade::new();
    grade.identifier = "279".into();
    grade.attributes.insert("name".into(), "ST3".into());

    store.save(&grade).await.expect("saved");

    let found: Grade = store
        .find_as("279")
        .await
        .expect("readable")
        .expect("present");
    assert_eq!(found.identifier, "279");
    assert_eq!(found.attribute("name"), Some("ST3"));
    assert_eq!(store.inner().count(&collection_name("reference", "Grade")).await, 1);

    let dynamic = store
        .find(EntityType::of::<Grade>(), "279")
        .await
        .expect("readable")
        .expect("present");
    assert!(dynamic.is::<Grade>());
}

#[tokio::test]
async fn test_find_missing_and_delete() {
    let store = record_store();
    assert!(store.find_as::<Post>("1").await.unwrap().is_none());

    let mut post = Post::new();
    post.identifier = "1".into();
    store.save(&post).await.unwrap();

    assert!(store.delete(EntityType::of::<Post>(), "1").await.unwrap());
    assert!(!store.delete(EntityType::of::<Post>(), "1").await.unwrap());
    assert!(store.find_as::<Post>("1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_save_replaces_previous_version() {
    let store = record_store();
    let mut post = Post::new();
    post.identifier = "1".into();
    post.attributes.insert("status".into(), "CURRENT".into());
    store.save(&post).await.unwrap();

    post.attributes.clear();
    post.attributes.insert("status".into(), "INACTIVE".into());
    store.save(&post).await.unwrap();

    let found: Post = store.find_as("1").await.unwrap().unwrap();
    assert_eq!(found.attributes.len(), 1);
    assert_eq!(found.attribute("status"), Some("INACTIVE"));
}

#[tokio::test]
async fn test_publish_failure_leaves_saved_record() {
    let store = record_store();
    let broker = Arc::new(MemoryFifoQueue::new(
        HeaderNames::default(),
        Duration::from_secs(300),
    ));
    broker.create_queue("memory://events.fifo", false).await;
    broker.set_unavailable(true).await;
    let publisher = FifoMessagingService::new(Arc::clone(&broker));

    let mut grade = Grade::new();
    grade.identifier = "5".into();
    store.save(&grade).await.unwrap();

    let err = publisher
        .publish_record("memory://events.fifo", grade.record(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::DeliveryError(_)));
    assert!(store.find_as::<Grade>("5").await.unwrap().is_some());
}

#[tokio::test]
async fn test_blank_identifier_is_never_saved() {
    let store = record_store();
    let mut grade = Grade::new();
    grade.identifier = "   ".into();

    let err = store.save(&grade).await.unwrap_err();
    assert!(matches!(err, SyncError::MissingIdentifierError(_)));
    assert_eq!(store.inner().count(&collection_name("reference", "Grade")).await, 0);
    assert!(store.find_as::<Grade>("   ").await.unwrap().is_none());
}
