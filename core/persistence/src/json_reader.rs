//! FILENAME: core/persistence/src/json_reader.rs
//! Reads a JSON array of flat objects, one object per issue.

use std::io::Read;

use dataset::Dataset;
use serde_json::Value;

use crate::{CleaningRules, PersistenceError, RawTable};

/// Reads the records into a raw table. Headers are the union of all keys in
/// first-seen order; `null` and absent keys are missing values, other
/// scalars are stringified.
pub fn read_json_table<R: Read>(reader: R) -> Result<RawTable, PersistenceError> {
    let value: Value = serde_json::from_reader(reader)?;
    let Value::Array(records) = value else {
        return Err(PersistenceError::InvalidFormat(
            "expected a JSON array of records".to_string(),
        ));
    };

    let mut table = RawTable::default();
    for (index, record) in records.iter().enumerate() {
        let Value::Object(fields) = record else {
            return Err(PersistenceError::InvalidFormat(format!(
                "record {} is not a JSON object",
                index
            )));
        };
        for key in fields.keys() {
            if !table.headers.iter().any(|h| h == key) {
                table.headers.push(key.clone());
            }
        }
    }

    for record in &records {
        let Value::Object(fields) = record else {
            continue;
        };
        let row = table
            .headers
            .iter()
            .map(|header| fields.get(header).and_then(scalar_text))
            .collect();
        table.push_row(row);
    }

    log::debug!(
        target: "LOAD",
        "read JSON records: rows={} columns={}",
        table.len(),
        table.headers.len()
    );
    Ok(table)
}

/// Reads and cleans JSON records into a dataset.
pub fn load_json_records<R: Read>(reader: R, rules: &CleaningRules) -> Result<Dataset, PersistenceError> {
    rules.apply(read_json_table(reader)?)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        // Nested values are not categorical; keep their JSON text
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_are_union_in_first_seen_order() {
        let json = r#"[
            {"Test Type": "Smoke", "Labels": "ui"},
            {"Labels": null, "Creator": "ana", "Priority": 2}
        ]"#;
        let table = read_json_table(json.as_bytes()).unwrap();

        assert_eq!(table.headers, vec!["Test Type", "Labels", "Creator", "Priority"]);
        assert_eq!(
            table.rows[1],
            vec![None, None, Some("ana".to_string()), Some("2".to_string())]
        );
    }

    #[test]
    fn test_rejects_non_array_and_non_object() {
        assert!(matches!(
            read_json_table(r#"{"a": 1}"#.as_bytes()),
            Err(PersistenceError::InvalidFormat(_))
        ));
        assert!(matches!(
            read_json_table(r#"[1, 2]"#.as_bytes()),
            Err(PersistenceError::InvalidFormat(_))
        ));
        assert!(matches!(
            read_json_table("not json".as_bytes()),
            Err(PersistenceError::Json(_))
        ));
    }

    #[test]
    fn test_load_with_issue_tracker_rules() {
        let json = r#"[
            {"Defect Type": "UI", "Feature Type": "Login", "Test Type": "Smoke",
             "Summary": "Q3 broken", "Labels": "ui", "Creator": "ana"}
        ]"#;
        let dataset = load_json_records(json.as_bytes(), &CleaningRules::issue_tracker()).unwrap();
        assert_eq!(
            dataset.row(0),
            Some(vec!["UI", "Login", "Smoke", "Q3", "ui", "ana"])
        );
    }
}
