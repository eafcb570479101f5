use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Change operation attached to a record.
///
/// Carried through to consumers as-is; nothing in this crate branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Update,
    Insert,
    Delete,
    Load,
    Lookup,
    DropTable,
    CreateTable,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::Update,
        Operation::Insert,
        Operation::Delete,
        Operation::Load,
        Operation::Lookup,
        Operation::DropTable,
        Operation::CreateTable,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Update => "update",
            Operation::Insert => "insert",
            Operation::Delete => "delete",
            Operation::Load => "load",
            Operation::Lookup => "lookup",
            Operation::DropTable => "drop-table",
            Operation::CreateTable => "create-table",
        }
    }

    /// Case-insensitive match against the wire keys, `None` when nothing matches.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(key.trim()))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| format!("{s} is not a valid operation"))
    }
}

impl Serialize for Operation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// Unknown keys deserialize to `None` on the record rather than failing the whole message.
fn lenient_operation<'de, D>(deserializer: D) -> Result<Option<Operation>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Operation::from_key))
}

/// Generic key/value entity used at the storage and messaging boundaries.
///
/// `schema` and `table` locate the record's logical partition. Concrete entity
/// types fix them at construction; they are only writable through
/// [`Record::located`] so nothing can move a typed record afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(rename = "tisId", default)]
    pub identifier: String,
    #[serde(rename = "data", default)]
    pub attributes: HashMap<String, String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default, deserialize_with = "lenient_operation")]
    pub operation: Option<Operation>,
    #[serde(default)]
    schema: String,
    #[serde(default)]
    table: String,
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty record bound to the given logical schema and table.
    #[must_use]
    pub fn located(schema: &str, table: &str) -> Self {
        Self {
            schema: schema.to_string(),
            table: table.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn schema(&self) -> &str {
        &self.schema
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Copy identifier, attributes, metadata and operation from `other`, keeping
    /// this record's own schema and table.
    pub fn copy_contents_from(&mut self, other: &Record) {
        self.identifier.clone_from(&other.identifier);
        self.attributes.clone_from(&other.attributes);
        self.metadata.clone_from(&other.metadata);
        self.operation = other.operation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_parsing_is_case_insensitive() {
        assert_eq!(Operation::from_key("INSERT"), Some(Operation::Insert));
        assert_eq!(Operation::from_key("Drop-Table"), Some(Operation::DropTable));
        assert_eq!(Operation::from_key("create-table"), Some(Operation::CreateTable));
        assert_eq!(Operation::from_key("truncate"), None);
        assert!("upsert".parse::<Operation>().is_err());
    }

    #[test]
    fn test_record_wire_shape() {
        let mut record = Record::located("tcs", "Placement");
        record.identifier = "40".into();
        record.attributes.insert("postId".into(), "12".into());
        record.operation = Some(Operation::Update);

        let value = serde_json::to_value(&record).expect("record serializes");
        assert_eq!(value["tisId"], json!("40"));
        assert_eq!(value["data"]["postId"], json!("12"));
        assert_eq!(value["operation"], json!("update"));
        assert_eq!(value["schema"], json!("tcs"));
        assert_eq!(value["table"], json!("Placement"));
    }

    #[test]
    fn test_unknown_operation_deserializes_to_none() {
        let record: Record = serde_json::from_value(json!({
            "tisId": "1",
            "data": {"a": "b"},
            "operation": "merge",
            "schema": "tcs",
            "table": "Post"
        }))
        .expect("record deserializes");

        assert_eq!(record.operation, None);
        assert_eq!(record.table(), "Post");
        assert_eq!(record.attribute("a"), Some("b"));
        assert!(record.metadata.is_empty());
    }

    #[test]
    fn test_copy_contents_keeps_location() {
        let mut source = Record::located("x", "y");
        source.identifier = "7".into();
        source.metadata.insert("timestamp".into(), "now".into());

        let mut target = Record::located("reference", "Grade");
        target.copy_contents_from(&source);

        assert_eq!(target.identifier, "7");
        assert_eq!(target.metadata.get("timestamp").map(String::as_str), Some("now"));
        assert_eq!(target.schema(), "reference");
        assert_eq!(target.table(), "Grade");
    }
}
