use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::document::{self, CLASS_FIELD, Document, ID_FIELD};
use crate::core::models::Record;
use crate::entity::{Entity, EntityKind, EntityType};
use crate::errors::SyncError;
use crate::registry::EntityRegistry;

/// The single source/target pair a converter handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertiblePair {
    pub source: &'static str,
    pub target: &'static str,
}

/// Reads stored documents into freshly resolved entity instances.
#[derive(Debug, Clone)]
pub struct RecordReadConverter {
    registry: Arc<EntityRegistry>,
}

impl RecordReadConverter {
    #[must_use]
    pub fn new(registry: Arc<EntityRegistry>) -> Self {
        Self { registry }
    }

    /// Documents in, anything in the record family out; the registry picks the
    /// concrete type per call.
    #[must_use]
    pub fn convertible_pair(&self) -> ConvertiblePair {
        ConvertiblePair {
            source: std::any::type_name::<Document>(),
            target: std::any::type_name::<Record>(),
        }
    }

    /// Convert `source` into a new instance of `target`.
    ///
    /// # Errors
    ///
    /// - [`SyncError::ResolutionError`] if `target` is not registered.
    /// - [`SyncError::MissingIdentifierError`] if `_id` is absent or unusable.
    /// - [`SyncError::SerializationError`] if an attribute cannot be coerced to a string.
    pub fn read(&self, source: &Document, target: EntityType) -> Result<Box<dyn Entity>, SyncError> {
        let entity = self.registry.resolve(target)?;
        Self::populate(entity, source)
    }

    /// Typed form of [`RecordReadConverter::read`].
    ///
    /// # Errors
    ///
    /// As for [`RecordReadConverter::read`].
    pub fn read_as<T: EntityKind>(&self, source: &Document) -> Result<T, SyncError> {
        let target = EntityType::of::<T>();
        let entity = self.read(source, target)?;
        entity
            .into_any()
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| SyncError::ResolutionError(target.type_name().to_string()))
    }

    /// Convert using the document's own `_class` discriminator to pick the type.
    ///
    /// # Errors
    ///
    /// [`SyncError::ResolutionError`] if the discriminator is missing or unknown,
    /// otherwise as for [`RecordReadConverter::read`].
    pub fn read_discriminated(&self, source: &Document) -> Result<Box<dyn Entity>, SyncError> {
        let type_name = source
            .get(CLASS_FIELD)
            .and_then(Value::as_str)
            .ok_or_else(|| SyncError::ResolutionError(format!("document without {CLASS_FIELD}")))?;
        let entity = self.registry.resolve_by_type_name(type_name)?;
        Self::populate(entity, source)
    }

    fn populate(
        mut entity: Box<dyn Entity>,
        source: &Document,
    ) -> Result<Box<dyn Entity>, SyncError> {
        let identifier = read_identifier(source)?;

        // Collected before touching the entity so a failure leaves nothing half-filled.
        let attributes = source
            .iter()
            .filter(|(key, _)| !document::is_reserved(key))
            .map(|(key, value)| Ok((key.clone(), document::value_to_string(key, value)?)))
            .collect::<Result<HashMap<_, _>, SyncError>>()?;

        debug!(
            entity = entity.entity_name(),
            id = %identifier,
            attributes = attributes.len(),
            "Read document into entity"
        );

        let record = entity.record_mut();
        record.identifier = identifier;
        record.attributes = attributes;
        Ok(entity)
    }
}

fn read_identifier(source: &Document) -> Result<String, SyncError> {
    match source.get(ID_FIELD) {
        Some(Value::String(id)) if !id.trim().is_empty() => Ok(id.clone()),
        Some(Value::Number(id)) => Ok(id.to_string()),
        Some(other) => Err(SyncError::MissingIdentifierError(format!(
            "{ID_FIELD} is not a usable identifier: {other}"
        ))),
        None => Err(SyncError::MissingIdentifierError(format!("{ID_FIELD} is absent"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Placement, Specialty};
    use serde_json::json;

    fn document(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("test documents must be objects"),
        }
    }

    fn converter() -> RecordReadConverter {
        RecordReadConverter::new(Arc::new(EntityRegistry::with_default_entities()))
    }

    #[test]
    fn test_single_document_to_record_pair() {
        let pair = converter().convertible_pair();
        assert_eq!(pair.source, std::any::type_name::<Document>());
        assert_eq!(pair.target, std::any::type_name::<Record>());
    }

    #[test]
    fn test_numeric_identifier_coerced() {
        let placement: Placement = converter()
            .read_as(&document(json!({"_id": 40, "siteId": 7})))
            .expect("converts");
        assert_eq!(placement.identifier, "40");
        assert_eq!(placement.attribute("siteId"), Some("7"));
    }

    #[test]
    fn test_missing_or_blank_identifier() {
        for doc in [json!({"a": "b"}), json!({"_id": ""}), json!({"_id": null})] {
            let err = converter()
                .read(&document(doc), EntityType::of::<Specialty>())
                .unwrap_err();
            assert!(matches!(err, SyncError::MissingIdentifierError(_)));
        }
    }

    #[test]
    fn test_resolution_checked_before_identifier() {
        let registry = Arc::new(EntityRegistry::builder().register::<Specialty>().build());
        let err = RecordReadConverter::new(registry)
            .read(&document(json!({})), EntityType::of::<Placement>())
            .unwrap_err();
        assert!(matches!(err, SyncError::ResolutionError(_)));
    }

    #[test]
    fn test_nested_value_fails_whole_conversion() {
        let err = converter()
            .read(
                &document(json!({"_id": "1", "ok": "v", "bad": {"x": 1}})),
                EntityType::of::<Placement>(),
            )
            .unwrap_err();
        assert!(matches!(err, SyncError::SerializationError { field, .. } if field == "bad"));
    }

    #[test]
    fn test_read_discriminated_requires_known_class() {
        let err = converter()
            .read_discriminated(&document(json!({"_id": "1"})))
            .unwrap_err();
        assert!(matches!(err, SyncError::ResolutionError(_)));

        let err = converter()
            .read_discriminated(&document(json!({"_id": "1", "_class": "nope::Nope"})))
            .unwrap_err();
        assert!(matches!(err, SyncError::ResolutionError(_)));
    }
}
