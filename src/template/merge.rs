use std::collections::HashMap;

use log::{debug, warn};
use serde::Deserialize;

use crate::workbook::{Sheet, Workbook};

use super::{TemplateError, METADATA_HEADER, SCHEMA_SHEET, VALUE_HEADER};

/// How rows of the custom sheet are matched to rows of the generated sheet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeStrategy {
    /// Row N overrides row N
    #[default]
    Positional,
    /// Rows are matched on the `Metadata` label
    ByLabel,
}

fn require_column(sheet: &Sheet, header: &str) -> Result<usize, TemplateError> {
    sheet
        .find_column(header)
        .ok_or_else(|| TemplateError::MissingColumn {
            sheet: sheet.name().to_string(),
            column: header.to_string(),
        })
}

/// Overlay every non-empty `Value` of `custom` onto a copy of `generated`, by row position
pub fn merge(generated: &Sheet, custom: &Sheet) -> Result<Sheet, TemplateError> {
    merge_with(generated, custom, MergeStrategy::Positional)
}

/// Overlay `custom` onto a copy of `generated` using `strategy`
pub fn merge_with(
    generated: &Sheet,
    custom: &Sheet,
    strategy: MergeStrategy,
) -> Result<Sheet, TemplateError> {
    let target_col = require_column(generated, VALUE_HEADER)?;
    let source_col = require_column(custom, VALUE_HEADER)?;
    let mut merged = generated.clone();

    match strategy {
        MergeStrategy::Positional => {
            for row in 2..=custom.max_row() {
                let value = custom.cell(row, source_col);
                if !value.is_empty() {
                    debug!(
                        "Row {}: custom value '{}' overrides '{}'",
                        row,
                        value,
                        generated.cell(row, target_col)
                    );
                    merged.set_cell(row, target_col, value.clone());
                }
            }
        }
        MergeStrategy::ByLabel => {
            let target_label_col = require_column(generated, METADATA_HEADER)?;
            let source_label_col = require_column(custom, METADATA_HEADER)?;

            let mut rows_by_label: HashMap<String, usize> = HashMap::new();
            for row in 2..=generated.max_row() {
                if let Some(label) = generated.cell(row, target_label_col).as_str() {
                    rows_by_label.entry(label.trim().to_string()).or_insert(row);
                }
            }

            for row in 2..=custom.max_row() {
                let value = custom.cell(row, source_col);
                if value.is_empty() {
                    continue;
                }
                let Some(label) = custom.cell(row, source_label_col).as_str() else {
                    warn!("Custom row {} has a value but no label, ignored", row);
                    continue;
                };
                match rows_by_label.get(label.trim()) {
                    Some(&target_row) => {
                        debug!("'{}': custom value '{}' applied", label, value);
                        merged.set_cell(target_row, target_col, value.clone());
                    }
                    None => warn!(
                        "Custom label '{}' not present in generated sheet, ignored",
                        label
                    ),
                }
            }
        }
    }

    Ok(merged)
}

/// Merge the `Schema` sheets of two workbooks; all other sheets come from `generated`
pub fn merge_workbooks(
    generated: &Workbook,
    custom: &Workbook,
    strategy: MergeStrategy,
) -> Result<Workbook, TemplateError> {
    let generated_schema = generated
        .sheet(SCHEMA_SHEET)
        .ok_or_else(|| TemplateError::MissingSheet(SCHEMA_SHEET.to_string()))?;
    let custom_schema = custom
        .sheet(SCHEMA_SHEET)
        .ok_or_else(|| TemplateError::MissingSheet(SCHEMA_SHEET.to_string()))?;

    let mut merged = generated.clone();
    merged.add_sheet(merge_with(generated_schema, custom_schema, strategy)?);
    Ok(merged)
}
