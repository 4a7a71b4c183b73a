//! FILENAME: core/persistence/src/cleaning.rs
//! PURPOSE: Turns a raw export into a dataset with the canonical schema.
//! CONTEXT: Applied once at load time, in this order:
//! 1. Rename headers (e.g. "Test Type" -> "TestType")
//! 2. Derive columns by regex extraction from a text column
//! 3. Project onto the configured columns, failing on any that are missing
//! 4. Replace missing values with the fill value ("TBD")

use dataset::{Dataset, DatasetBuilder, FieldName, Schema, SchemaError, MISSING_VALUE};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::RawTable;

/// Renames one source header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRename {
    pub from: String,
    pub to: String,
}

/// Derives `target` from the first regex match in `source`.
/// Capture group 1 is used when the pattern has one, otherwise the whole
/// match. No match leaves the value missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenExtraction {
    pub source: String,
    pub target: String,
    pub pattern: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningRules {
    #[serde(default)]
    pub renames: Vec<ColumnRename>,

    #[serde(default)]
    pub extractions: Vec<TokenExtraction>,

    /// Substitute for missing or blank values.
    #[serde(default = "default_fill_value")]
    pub fill_value: String,

    /// Output columns, in order. `None` keeps every column.
    #[serde(default)]
    pub columns: Option<Vec<String>>,
}

fn default_fill_value() -> String {
    MISSING_VALUE.to_string()
}

impl Default for CleaningRules {
    fn default() -> Self {
        CleaningRules {
            renames: Vec::new(),
            extractions: Vec::new(),
            fill_value: default_fill_value(),
            columns: None,
        }
    }
}

impl CleaningRules {
    /// Rules for a typical issue-tracker export: spaced headers are renamed,
    /// the quest number is pulled out of the summary text, and the table is
    /// projected onto the six canonical fields.
    pub fn issue_tracker() -> Self {
        let rename = |from: &str, to: &str| ColumnRename {
            from: from.to_string(),
            to: to.to_string(),
        };

        CleaningRules {
            renames: vec![
                rename("Defect Type", dataset::DEFECT_TYPE),
                rename("Feature Type", dataset::FEATURE_TYPE),
                rename("Test Type", dataset::TEST_TYPE),
                rename("Modified Summary", dataset::MODIFIED_SUMMARY),
                rename("Labels", dataset::LABEL),
            ],
            extractions: vec![TokenExtraction {
                source: "Summary".to_string(),
                target: dataset::MODIFIED_SUMMARY.to_string(),
                pattern: r"\b(Q\d+)\b".to_string(),
            }],
            fill_value: default_fill_value(),
            columns: Some(
                dataset::issue_tracker_fields()
                    .into_iter()
                    .map(|f| f.to_string())
                    .collect(),
            ),
        }
    }

    /// Cleans a raw table into a dataset.
    pub fn apply(&self, raw: RawTable) -> Result<Dataset, PersistenceError> {
        let RawTable { mut headers, rows } = raw;
        let width = headers.len();

        for header in headers.iter_mut() {
            let trimmed = header.trim().to_string();
            *header = match self.renames.iter().find(|r| r.from == trimmed) {
                Some(rename) => rename.to.clone(),
                None => trimmed,
            };
        }

        let mut rows: Vec<Vec<Option<String>>> = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row.into_iter().map(normalize).collect()
            })
            .collect();

        for extraction in &self.extractions {
            if headers.contains(&extraction.target) {
                // The source already carries the derived column
                log::debug!(
                    target: "LOAD",
                    "column {} present in source, skipping extraction",
                    extraction.target
                );
                continue;
            }

            let source = position(&headers, &extraction.source)?;
            let pattern = Regex::new(&extraction.pattern)?;
            for row in rows.iter_mut() {
                let derived = row[source].as_deref().and_then(|text| extract_token(&pattern, text));
                row.push(derived);
            }
            headers.push(extraction.target.clone());
        }

        let projection: Vec<usize> = match &self.columns {
            Some(columns) => columns
                .iter()
                .map(|c| position(&headers, c))
                .collect::<Result<_, _>>()?,
            None => (0..headers.len()).collect(),
        };

        let schema = Schema::new(
            projection
                .iter()
                .map(|&i| FieldName::from(headers[i].as_str()))
                .collect(),
        )?;

        let mut builder = DatasetBuilder::new(schema);
        builder.reserve(rows.len());
        let mut filled = 0usize;
        for row in &rows {
            let values: Vec<&str> = projection
                .iter()
                .map(|&i| match row[i].as_deref() {
                    Some(value) => value,
                    None => {
                        filled += 1;
                        self.fill_value.as_str()
                    }
                })
                .collect();
            builder.push_row(&values)?;
        }

        log::info!(
            target: "LOAD",
            "cleaned table: rows={} fields={} filled_missing={}",
            builder.len(),
            projection.len(),
            filled
        );
        Ok(builder.finish())
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn position(headers: &[String], column: &str) -> Result<usize, SchemaError> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| SchemaError::UnknownField(column.to_string()))
}

fn extract_token(pattern: &Regex, text: &str) -> Option<String> {
    let captures = pattern.captures(text)?;
    captures
        .get(1)
        .or_else(|| captures.get(0))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(value: &str) -> Option<String> {
        Some(value.to_string())
    }

    fn raw_export() -> RawTable {
        let mut raw = RawTable::new(
            ["Defect Type", "Feature Type", "Test Type", "Summary", "Labels", "Creator"]
                .iter()
                .map(|h| h.to_string())
                .collect(),
        );
        raw.push_row(vec![
            cell("UI"),
            cell("Login"),
            cell("Smoke"),
            cell("Q101 login button misaligned"),
            cell("frontend"),
            cell("ana"),
        ]);
        raw.push_row(vec![
            None,
            cell("  "),
            cell("Regression"),
            cell("search slow, see Q7"),
            None,
            cell("ben"),
        ]);
        raw.push_row(vec![cell("Crash"), cell("Export"), cell("Smoke"), cell("no token here")]);
        raw
    }

    #[test]
    fn test_issue_tracker_rules() {
        let dataset = CleaningRules::issue_tracker().apply(raw_export()).unwrap();

        let names: Vec<&str> = dataset.schema().fields().iter().map(|f| f.as_str()).collect();
        assert_eq!(
            names,
            vec!["DefectType", "FeatureType", "TestType", "ModifiedSummary", "Label", "Creator"]
        );
        assert_eq!(
            dataset.row(0),
            Some(vec!["UI", "Login", "Smoke", "Q101", "frontend", "ana"])
        );
        assert_eq!(
            dataset.row(1),
            Some(vec!["TBD", "TBD", "Regression", "Q7", "TBD", "ben"])
        );
        // Short rows are padded, unmatched summaries become TBD
        assert_eq!(
            dataset.row(2),
            Some(vec!["Crash", "Export", "Smoke", "TBD", "TBD", "TBD"])
        );
    }

    #[test]
    fn test_existing_derived_column_is_kept() {
        let mut raw = RawTable::new(vec!["Modified Summary".to_string(), "Summary".to_string()]);
        raw.push_row(vec![cell("Q9"), cell("Q1 text")]);

        let rules = CleaningRules {
            columns: Some(vec!["ModifiedSummary".to_string()]),
            ..CleaningRules::issue_tracker()
        };
        let dataset = rules.apply(raw).unwrap();
        assert_eq!(dataset.row(0), Some(vec!["Q9"]));
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let raw = RawTable::new(vec!["Defect Type".to_string()]);
        let err = CleaningRules::issue_tracker().apply(raw).unwrap_err();
        assert!(matches!(
            err,
            PersistenceError::Schema(SchemaError::UnknownField(ref f)) if f == "Summary"
        ));
    }

    #[test]
    fn test_bad_pattern_is_reported() {
        let rules = CleaningRules {
            extractions: vec![TokenExtraction {
                source: "A".to_string(),
                target: "B".to_string(),
                pattern: "(unclosed".to_string(),
            }],
            ..CleaningRules::default()
        };
        let err = rules.apply(RawTable::new(vec!["A".to_string()])).unwrap_err();
        assert!(matches!(err, PersistenceError::Pattern(_)));
    }

    #[test]
    fn test_whole_match_without_capture_group() {
        let pattern = Regex::new(r"Q\d+").unwrap();
        assert_eq!(extract_token(&pattern, "fix Q12 now"), Some("Q12".to_string()));
        assert_eq!(extract_token(&pattern, "nothing"), None);
    }

    #[test]
    fn test_rules_deserialize_with_defaults() {
        let rules: CleaningRules = serde_json::from_str(r#"{ "renames": [] }"#).unwrap();
        assert_eq!(rules, CleaningRules::default());
    }
}
