use serde_json::json;
use tempfile::tempdir;

use super::*;
use crate::curator::CuratedMetadata;
use crate::workbook::{CellValue, Sheet, Workbook};

fn schema_with_values(values: &[CellValue]) -> Sheet {
    let mut sheet = Sheet::new(SCHEMA_SHEET);
    sheet.set_cell(1, 1, METADATA_HEADER);
    sheet.set_cell(1, 2, VALUE_HEADER);
    sheet.set_cell(1, 3, UNIT_HEADER);
    sheet.set_cell(1, 4, ONTOLOGY_LINK_HEADER);
    for (i, value) in values.iter().enumerate() {
        sheet.set_cell(i + 2, 1, format!("Field {}", i + 1));
        sheet.set_cell(i + 2, 2, value.clone());
    }
    sheet
}

fn template() -> Workbook {
    let mut workbook = Workbook::new();
    let mut schema = schema_with_values(&[]);
    schema.set_cell(2, 1, "Cell ID");
    schema.set_cell(3, 1, "Cell case");
    schema.set_cell(4, 1, "Cell ID");
    workbook.add_sheet(schema);
    workbook
}

fn values(sheet: &Sheet) -> Vec<CellValue> {
    sheet.column_values(VALUE_COLUMN).into_iter().cloned().collect()
}

#[test]
fn test_write_field_first_match_wins() {
    let mut workbook = template();
    let outcome = write_field(
        &mut workbook,
        SCHEMA_SHEET,
        "Cell ID",
        &json!("240906_KIGR_GEN4_01"),
    );

    assert_eq!(outcome, WriteOutcome::Updated);
    let sheet = workbook.sheet(SCHEMA_SHEET).unwrap();
    assert_eq!(sheet.cell(2, 2).as_str(), Some("240906_KIGR_GEN4_01"));
    assert_eq!(sheet.cell(4, 2), &CellValue::Empty);
}

#[test]
fn test_write_field_reports_missing() {
    let mut workbook = template();
    assert_eq!(
        write_field(&mut workbook, SCHEMA_SHEET, "Spacer", &json!(1.0)),
        WriteOutcome::LabelMissing
    );
    assert_eq!(
        write_field(&mut workbook, "Nope", "Cell ID", &json!("x")),
        WriteOutcome::SheetMissing
    );
}

#[test]
fn test_write_fields_report_and_idempotence() {
    let mut metadata = CuratedMetadata::new();
    metadata.insert("Cell ID", json!("240906_KIGR_GEN4_01"));
    metadata.insert("Cell case", json!("CR2032"));
    metadata.insert("Spacer", json!(null));

    let mut once = template();
    let report = write_fields(&mut once, SCHEMA_SHEET, &metadata);
    assert_eq!(report.updated_count(), 2);
    assert!(!report.is_complete());
    assert_eq!(report.skipped().map(|w| w.label.as_str()).collect::<Vec<_>>(), vec!["Spacer"]);
    assert!(report.to_string().contains("2 written, 1 skipped"));

    let mut twice = template();
    write_fields(&mut twice, SCHEMA_SHEET, &metadata);
    write_fields(&mut twice, SCHEMA_SHEET, &metadata);

    assert_eq!(
        values(once.sheet(SCHEMA_SHEET).unwrap()),
        values(twice.sheet(SCHEMA_SHEET).unwrap())
    );
}

#[test]
fn test_fill_template_persists() {
    let dir = tempdir().unwrap();
    let template_path = dir.path().join("template.xlsx");
    let output_path = dir.path().join("filled.xlsx");
    template().save(&template_path).unwrap();

    let mut metadata = CuratedMetadata::new();
    metadata.insert("Cell case", json!("CR2032"));
    let report = fill_template(&template_path, &output_path, &metadata).unwrap();

    assert!(report.is_complete());
    let filled = Workbook::open(&output_path).unwrap();
    assert_eq!(filled.sheet(SCHEMA_SHEET).unwrap().cell(3, 2).as_str(), Some("CR2032"));
    let untouched = Workbook::open(&template_path).unwrap();
    assert_eq!(untouched.sheet(SCHEMA_SHEET).unwrap().cell(3, 2), &CellValue::Empty);
}

#[test]
fn test_positional_merge_precedence() {
    let generated = schema_with_values(&[10.0.into(), 20.0.into(), 30.0.into()]);
    let custom = schema_with_values(&[CellValue::Empty, 25.0.into(), CellValue::Empty]);

    let merged = merge(&generated, &custom).unwrap();
    let expected: Vec<CellValue> = vec![10.0.into(), 25.0.into(), 30.0.into()];
    assert_eq!(values(&merged), expected);
    assert_eq!(values(&generated)[1], CellValue::Number(20.0));
}

#[test]
fn test_merge_locates_value_column_by_header() {
    let generated = schema_with_values(&["a".into(), "b".into()]);
    let mut custom = Sheet::new(SCHEMA_SHEET);
    custom.set_cell(1, 1, "Notes");
    custom.set_cell(1, 2, METADATA_HEADER);
    custom.set_cell(1, 3, VALUE_HEADER);
    custom.set_cell(3, 3, "override");

    let merged = merge(&generated, &custom).unwrap();
    let expected: Vec<CellValue> = vec!["a".into(), "override".into()];
    assert_eq!(values(&merged), expected);
}

#[test]
fn test_merge_requires_value_header() {
    let generated = schema_with_values(&[1.0.into()]);
    let mut custom = Sheet::new("Custom");
    custom.set_cell(1, 1, METADATA_HEADER);

    match merge(&generated, &custom) {
        Err(TemplateError::MissingColumn { sheet, column }) => {
            assert_eq!(sheet, "Custom");
            assert_eq!(column, VALUE_HEADER);
        }
        other => panic!("expected missing column, got {:?}", other),
    }
}

#[test]
fn test_merge_by_label_survives_reordering() {
    let generated = schema_with_values(&[10.0.into(), 20.0.into(), 30.0.into()]);
    let mut custom = Sheet::new(SCHEMA_SHEET);
    custom.set_cell(1, 1, METADATA_HEADER);
    custom.set_cell(1, 2, VALUE_HEADER);
    custom.set_cell(2, 1, "Field 3");
    custom.set_cell(2, 2, 33.0);
    custom.set_cell(3, 1, "Unknown field");
    custom.set_cell(3, 2, 99.0);

    let merged = merge_with(&generated, &custom, MergeStrategy::ByLabel).unwrap();
    let expected: Vec<CellValue> = vec![10.0.into(), 20.0.into(), 33.0.into()];
    assert_eq!(values(&merged), expected);
}

#[test]
fn test_merge_workbooks_keeps_other_sheets() {
    let mut generated = Workbook::new();
    generated.add_sheet(schema_with_values(&["a".into()]));
    generated.add_sheet(Sheet::new("Ontology - Unit"));
    let mut custom = Workbook::new();
    custom.add_sheet(schema_with_values(&["b".into()]));

    let merged = merge_workbooks(&generated, &custom, MergeStrategy::Positional).unwrap();
    assert_eq!(merged.sheet_names().count(), 2);
    assert_eq!(merged.sheet(SCHEMA_SHEET).unwrap().cell(2, 2).as_str(), Some("b"));

    assert!(matches!(
        merge_workbooks(&generated, &Workbook::new(), MergeStrategy::Positional),
        Err(TemplateError::MissingSheet(_))
    ));
}
