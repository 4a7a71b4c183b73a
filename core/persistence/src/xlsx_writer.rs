//! FILENAME: core/persistence/src/xlsx_writer.rs

use crate::PersistenceError;
use crossfilter::DistributionUpdate;
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;

/// Excel's limit on worksheet name length.
const MAX_SHEET_NAME: usize = 31;

/// Writes the given chart updates to a workbook, one worksheet per chart.
/// Each sheet holds the applied filters above a `Value` / `Count` table.
pub fn export_distributions_xlsx(path: &Path, updates: &[DistributionUpdate]) -> Result<(), PersistenceError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    for update in updates {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name(&update.node_id))?;

        let mut row: u32 = 0;
        worksheet.write_string_with_format(row, 0, &update.label, &bold)?;
        row += 1;

        for constraint in &update.title_context.applied {
            worksheet.write_string(row, 0, constraint.field.as_str())?;
            worksheet.write_string(row, 1, &constraint.value)?;
            row += 1;
        }
        if let Some(diagnostic) = &update.diagnostic {
            worksheet.write_string(row, 0, diagnostic)?;
            row += 1;
        }

        row += 1;
        worksheet.write_string_with_format(row, 0, "Value", &bold)?;
        worksheet.write_string_with_format(row, 1, "Count", &bold)?;
        for entry in update.distribution.iter() {
            row += 1;
            worksheet.write_string(row, 0, &entry.value)?;
            worksheet.write_number(row, 1, entry.count as f64)?;
        }
    }

    if updates.is_empty() {
        workbook.add_worksheet();
    }

    workbook.save(path)?;
    log::info!(target: "LOAD", "exported {} charts to {:?}", updates.len(), path);
    Ok(())
}

/// Worksheet names cannot contain `[]:*?/\` and are limited to 31 characters.
fn sheet_name(node_id: &str) -> String {
    node_id
        .chars()
        .map(|c| if "[]:*?/\\".contains(c) { '_' } else { c })
        .take(MAX_SHEET_NAME)
        .collect()
}
