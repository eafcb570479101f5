//! Group and deduplication ids for record messages.
//!
//! Child tables share their parent's message group so every change touching one
//! parent entity is consumed in publish order.

use chrono::Utc;

use crate::core::models::Record;

/// `(group table, attribute holding the group id)` for tables grouped under a parent.
fn parent_group(table: &str) -> Option<(&'static str, &'static str)> {
    match table {
        "ConditionsOfJoining" | "CurriculumMembership" => {
            Some(("ProgrammeMembership", "programmeMembershipUuid"))
        }
        "PlacementSite" | "PlacementSpecialty" => Some(("Placement", "placementId")),
        "PostSpecialty" => Some(("Post", "postId")),
        "ProgrammeMembership" => Some(("ProgrammeMembership", "uuid")),
        "Qualification" => Some(("Person", "personId")),
        _ => None,
    }
}

/// Message group id for a record, formatted as `schema_table_id`.
///
/// A record whose parent key is missing gets an empty id segment.
#[must_use]
pub fn message_group_id(record: &Record) -> String {
    let (table, id) = match parent_group(record.table()) {
        Some((parent_table, key)) => (parent_table, record.attribute(key).unwrap_or_default()),
        None => (record.table(), record.identifier.as_str()),
    };
    format!("{}_{}_{}", record.schema(), table, id)
}

/// Deduplication id unique to this call, so repeated publishes about the same
/// entity are all delivered.
#[must_use]
pub fn unique_deduplication_id(table: &str, id: &str) -> String {
    let now = Utc::now();
    let nanos = now
        .timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros().saturating_mul(1_000));
    format!("{table}_{id}_{nanos}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(table: &str, data: &[(&str, &str)]) -> Record {
        let mut record = Record::located("tcs", table);
        record.identifier = "tis-id".into();
        for (k, v) in data {
            record.attributes.insert((*k).to_string(), (*v).to_string());
        }
        record
    }

    #[test]
    fn test_programme_membership_children() {
        for table in ["ConditionsOfJoining", "CurriculumMembership"] {
            let r = record(table, &[("programmeMembershipUuid", "UUID")]);
            assert_eq!(message_group_id(&r), "tcs_ProgrammeMembership_UUID");
        }
        let pm = record("ProgrammeMembership", &[("uuid", "UUID")]);
        assert_eq!(message_group_id(&pm), "tcs_ProgrammeMembership_UUID");
    }

    #[test]
    fn test_placement_and_post_children() {
        for table in ["PlacementSite", "PlacementSpecialty"] {
            let r = record(table, &[("placementId", "ID")]);
            assert_eq!(message_group_id(&r), "tcs_Placement_ID");
        }
        let r = record("PostSpecialty", &[("postId", "ID")]);
        assert_eq!(message_group_id(&r), "tcs_Post_ID");
    }

    #[test]
    fn test_qualification_groups_by_person() {
        let r = record("Qualification", &[("personId", "ID")]);
        assert_eq!(message_group_id(&r), "tcs_Person_ID");
    }

    #[test]
    fn test_other_tables_use_own_identifier() {
        let r = record("someTable", &[]);
        assert_eq!(message_group_id(&r), "tcs_someTable_tis-id");
    }

    #[test]
    fn test_missing_parent_key_leaves_empty_segment() {
        let r = record("PlacementSite", &[]);
        assert_eq!(message_group_id(&r), "tcs_Placement_");
    }

    #[test]
    fn test_unique_deduplication_ids_differ() {
        let first = unique_deduplication_id("x", "y");
        std::thread::sleep(std::time::Duration::from_micros(1));
        let second = unique_deduplication_id("x", "y");
        assert!(first.starts_with("x_y_"));
        assert_ne!(first, second);
    }
}
