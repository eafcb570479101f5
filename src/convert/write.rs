use serde_json::Value;
use tracing::debug;

use super::document::{self, CLASS_FIELD, Document, ID_FIELD};
use crate::entity::Entity;
use crate::errors::SyncError;

/// Writes entities to documents tagged with their concrete type.
///
/// Metadata is runtime-only and never reaches the document.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordWriteConverter;

impl RecordWriteConverter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// # Errors
    ///
    /// Returns [`SyncError::MissingIdentifierError`] if the identifier is blank,
    /// since the document could never be read back.
    ///
    /// Returns [`SyncError::SerializationError`] if an attribute key uses the
    /// reserved prefix and would collide with a store-internal field.
    pub fn write(&self, source: &dyn Entity) -> Result<Document, SyncError> {
        let record = source.record();
        if record.identifier.trim().is_empty() {
            return Err(SyncError::MissingIdentifierError(format!(
                "{} has a blank identifier",
                source.entity_name()
            )));
        }

        let mut target = Document::new();
        target.insert(ID_FIELD.to_string(), Value::String(record.identifier.clone()));

        for (key, value) in &record.attributes {
            if document::is_reserved(key) {
                return Err(SyncError::SerializationError {
                    field: key.clone(),
                    reason: "attribute uses the reserved key prefix".to_string(),
                });
            }
            target.insert(key.clone(), Value::String(value.clone()));
        }

        target.insert(
            CLASS_FIELD.to_string(),
            Value::String(source.type_name().to_string()),
        );

        debug!(
            entity = source.entity_name(),
            id = %record.identifier,
            "Wrote entity to document"
        );
        Ok(target)
    }
}
