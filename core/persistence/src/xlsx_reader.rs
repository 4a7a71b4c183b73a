// FILENAME: core/persistence/src/xlsx_reader.rs

use crate::{CleaningRules, PersistenceError, RawTable};
use calamine::{open_workbook, Data, Reader, Xlsx};
use dataset::Dataset;
use std::path::Path;

/// Reads one worksheet (the first, unless named) into a raw table.
/// The first row holds the headers; empty cells are missing values.
pub fn read_xlsx_table(path: &Path, sheet: Option<&str>) -> Result<RawTable, PersistenceError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let sheet_names = workbook.sheet_names().to_vec();

    let sheet_name = match sheet {
        Some(name) => sheet_names
            .iter()
            .find(|n| n.as_str() == name)
            .cloned()
            .ok_or_else(|| PersistenceError::SheetNotFound(name.to_string()))?,
        None => sheet_names.first().cloned().ok_or_else(|| {
            PersistenceError::InvalidFormat("Workbook contains no sheets".to_string())
        })?,
    };

    let range = workbook.worksheet_range(&sheet_name)?;
    let mut rows = range.rows();

    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| cell_text(cell).unwrap_or_default())
            .collect(),
        None => {
            return Err(PersistenceError::InvalidFormat(format!(
                "Sheet {} has no header row",
                sheet_name
            )))
        }
    };

    let mut table = RawTable::new(headers);
    for row in rows {
        let values: Vec<Option<String>> = row.iter().map(cell_text).collect();
        if values.iter().all(Option::is_none) {
            continue;
        }
        table.push_row(values);
    }

    log::debug!(
        target: "LOAD",
        "read sheet {}: rows={} columns={}",
        sheet_name,
        table.len(),
        table.headers.len()
    );
    Ok(table)
}

/// Reads and cleans a worksheet into a dataset.
pub fn load_xlsx(path: &Path, sheet: Option<&str>, rules: &CleaningRules) -> Result<Dataset, PersistenceError> {
    rules.apply(read_xlsx_table(path, sheet)?)
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) => Some(format_number(*f)),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::Error(e) => Some(format!("{:?}", e)),
        Data::DateTime(dt) => Some(format_number(dt.as_f64())),
        Data::DateTimeIso(s) => Some(s.clone()),
        Data::DurationIso(s) => Some(s.clone()),
    }
}

/// Whole numbers print without a fractional part ("101", not "101.0").
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
