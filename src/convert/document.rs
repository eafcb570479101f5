use serde_json::{Map, Value};

use crate::errors::SyncError;

/// Schema-less stored form of a record.
pub type Document = Map<String, Value>;

/// Identity field holding the record identifier.
pub const ID_FIELD: &str = "_id";
/// Discriminator naming the concrete entity type a document was written from.
pub const CLASS_FIELD: &str = "_class";
/// Keys starting with this character belong to the store, not the business data.
pub const RESERVED_PREFIX: char = '_';

#[must_use]
pub fn is_reserved(key: &str) -> bool {
    key.starts_with(RESERVED_PREFIX)
}

/// Coerce a document value to the string form records hold.
///
/// Strings pass through; numbers and booleans use their JSON text. Nulls,
/// arrays and objects have no faithful string form and are rejected.
///
/// # Errors
///
/// Returns [`SyncError::SerializationError`] naming `field` for unsupported values.
pub fn value_to_string(field: &str, value: &Value) -> Result<String, SyncError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Err(unsupported(field, "null")),
        Value::Array(_) => Err(unsupported(field, "array")),
        Value::Object(_) => Err(unsupported(field, "object")),
    }
}

fn unsupported(field: &str, kind: &str) -> SyncError {
    SyncError::SerializationError {
        field: field.to_string(),
        reason: format!("{kind} value is not representable as a string"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reserved_keys() {
        assert!(is_reserved(ID_FIELD));
        assert!(is_reserved(CLASS_FIELD));
        assert!(is_reserved("_anything"));
        assert!(!is_reserved("data_1"));
    }

    #[test]
    fn test_scalar_coercion() {
        assert_eq!(value_to_string("a", &json!("x")).unwrap(), "x");
        assert_eq!(value_to_string("a", &json!(42)).unwrap(), "42");
        assert_eq!(value_to_string("a", &json!(1.5)).unwrap(), "1.5");
        assert_eq!(value_to_string("a", &json!(true)).unwrap(), "true");
    }

    #[test]
    fn test_structured_values_rejected() {
        for value in [json!(null), json!([1, 2]), json!({"k": "v"})] {
            let err = value_to_string("nested", &value).unwrap_err();
            assert!(
                matches!(err, SyncError::SerializationError { ref field, .. } if field == "nested")
            );
        }
    }
}
