use std::path::Path;

use log::{info, warn};
use serde_json::Value;

use crate::curator::CuratedMetadata;
use crate::workbook::{CellValue, Workbook};

use super::{TemplateError, WriteOutcome, WriteReport, METADATA_COLUMN, VALUE_COLUMN};

/// Overwrite the value next to `label` in the two-column Metadata/Value layout.
///
/// Rows 2..N are scanned and the first exact match wins. Missing sheets and
/// labels are reported, never raised.
pub fn write_field(
    workbook: &mut Workbook,
    sheet_name: &str,
    label: &str,
    value: &Value,
) -> WriteOutcome {
    let Some(sheet) = workbook.sheet_mut(sheet_name) else {
        warn!("Sheet '{}' not found in the workbook", sheet_name);
        return WriteOutcome::SheetMissing;
    };

    for row in 2..=sheet.max_row() {
        if sheet.cell(row, METADATA_COLUMN).as_str() == Some(label) {
            sheet.set_cell(row, VALUE_COLUMN, CellValue::from_json(value));
            info!("Updated metadata '{}' with value '{}'", label, value);
            return WriteOutcome::Updated;
        }
    }

    warn!("Metadata '{}' not found in sheet '{}'", label, sheet_name);
    WriteOutcome::LabelMissing
}

/// Write every curated field into `sheet_name`
pub fn write_fields(
    workbook: &mut Workbook,
    sheet_name: &str,
    metadata: &CuratedMetadata,
) -> WriteReport {
    let mut report = WriteReport::new(sheet_name);
    for (label, value) in metadata.iter() {
        let outcome = write_field(workbook, sheet_name, label, value);
        report.add(label, outcome);
    }
    report
}

/// Copy `template` to `output`, filling the `Schema` sheet from `metadata`.
///
/// The workbook is persisted once, after the whole batch.
pub fn fill_template(
    template: &Path,
    output: &Path,
    metadata: &CuratedMetadata,
) -> Result<WriteReport, TemplateError> {
    let mut workbook = Workbook::open(template)?;
    let report = write_fields(&mut workbook, super::SCHEMA_SHEET, metadata);
    workbook.save(output)?;
    info!(
        "Wrote {} of {} fields to {}",
        report.updated_count(),
        report.writes.len(),
        output.display()
    );
    Ok(report)
}
