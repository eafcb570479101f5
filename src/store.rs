//! Document-store boundary and the record store that converts across it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::info;

use crate::convert::{Document, ID_FIELD, RecordReadConverter, RecordWriteConverter};
use crate::entity::{Entity, EntityKind, EntityType};
use crate::errors::SyncError;
use crate::registry::EntityRegistry;

/// Minimal surface of a document database, one collection per logical table.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert or replace the document with the same `_id`.
    async fn put(&self, collection: &str, document: Document) -> Result<(), SyncError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, SyncError>;

    /// Returns whether a document was removed.
    async fn remove(&self, collection: &str, id: &str) -> Result<bool, SyncError>;
}

/// Process-local store, used in tests and local runs.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, HashMap<String, Document>>>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, HashMap::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn put(&self, collection: &str, document: Document) -> Result<(), SyncError> {
        let id = document
            .get(ID_FIELD)
            .and_then(Value::as_str)
            .ok_or_else(|| SyncError::MissingIdentifierError(format!("{ID_FIELD} is absent")))?
            .to_string();
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id, document);
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, SyncError> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn remove(&self, collection: &str, id: &str) -> Result<bool, SyncError> {
        Ok(self
            .collections
            .write()
            .await
            .get_mut(collection)
            .is_some_and(|docs| docs.remove(id).is_some()))
    }
}

#[must_use]
pub fn collection_name(schema: &str, table: &str) -> String {
    format!("{schema}.{table}")
}

/// Persists entities through the write converter and loads them through the read converter.
pub struct RecordStore<S> {
    store: S,
    reader: RecordReadConverter,
    writer: RecordWriteConverter,
}

impl<S: DocumentStore> RecordStore<S> {
    #[must_use]
    pub fn new(store: S, registry: Arc<EntityRegistry>) -> Self {
        Self {
            store,
            reader: RecordReadConverter::new(registry),
            writer: RecordWriteConverter::new(),
        }
    }

    #[must_use]
    pub fn inner(&self) -> &S {
        &self.store
    }

    /// # Errors
    ///
    /// Returns conversion errors from the write converter or storage errors.
    pub async fn save(&self, entity: &dyn Entity) -> Result<(), SyncError> {
        let record = entity.record();
        let collection = collection_name(record.schema(), record.table());
        let document = self.writer.write(entity)?;
        self.store.put(&collection, document).await?;
        info!(collection = %collection, id = %record.identifier, "Saved record");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns conversion errors from the read converter or storage errors.
    pub async fn find(
        &self,
        target: EntityType,
        id: &str,
    ) -> Result<Option<Box<dyn Entity>>, SyncError> {
        let collection = collection_name(target.schema(), target.table());
        match self.store.get(&collection, id).await? {
            Some(document) => self.reader.read(&document, target).map(Some),
            None => Ok(None),
        }
    }

    /// # Errors
    ///
    /// As for [`RecordStore::find`].
    pub async fn find_as<T: EntityKind>(&self, id: &str) -> Result<Option<T>, SyncError> {
        let collection = collection_name(T::SCHEMA_NAME, T::TABLE_NAME);
        match self.store.get(&collection, id).await? {
            Some(document) => self.reader.read_as::<T>(&document).map(Some),
            None => Ok(None),
        }
    }

    /// # Errors
    ///
    /// Returns storage errors.
    pub async fn delete(&self, target: EntityType, id: &str) -> Result<bool, SyncError> {
        let collection = collection_name(target.schema(), target.table());
        let removed = self.store.remove(&collection, id).await?;
        if removed {
            info!(collection = %collection, id = %id, "Deleted record");
        }
        Ok(removed)
    }
}
