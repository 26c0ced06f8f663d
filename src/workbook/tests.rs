use std::io::{Cursor, Write};

use serde_json::json;
use tempfile::tempdir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use super::*;

fn schema_sheet() -> Sheet {
    let mut sheet = Sheet::new("Schema");
    for (col, header) in ["Metadata", "Value", "Unit", "Ontology link"].iter().enumerate() {
        sheet.set_cell(1, col + 1, *header);
    }
    sheet.set_cell(2, 1, "Cell ID");
    sheet.set_cell(2, 2, "240906_KIGR_GEN4_01");
    sheet.set_cell(3, 1, "Negative electrode diameter");
    sheet.set_cell(3, 2, 15.0);
    sheet.set_cell(3, 3, "mm");
    sheet.set_cell(4, 1, "Comment <with> & markup");
    sheet.set_cell(4, 4, "Comment");
    sheet
}

#[test]
fn test_cell_references() {
    assert_eq!(parse_cell_ref("A1"), Some((1, 1)));
    assert_eq!(parse_cell_ref("D17"), Some((17, 4)));
    assert_eq!(parse_cell_ref("AA3"), Some((3, 27)));
    assert_eq!(parse_cell_ref("12"), None);
    assert_eq!(parse_cell_ref("B0"), None);
    assert_eq!(column_letters(1), "A");
    assert_eq!(column_letters(26), "Z");
    assert_eq!(column_letters(28), "AB");
}

#[test]
fn test_cell_reference_limits() {
    assert_eq!(parse_cell_ref("XFD1048576"), Some((MAX_ROWS, MAX_COLS)));
    assert_eq!(parse_cell_ref("XFE1"), None);
    assert_eq!(parse_cell_ref("A1048577"), None);
    assert_eq!(parse_cell_ref("ZZZZZZZZZZZZZZZ1"), None);
    assert_eq!(parse_cell_ref("A99999999999999999999999"), None);
}

#[test]
fn test_sheet_grid() {
    let sheet = schema_sheet();
    assert_eq!(sheet.max_row(), 4);
    assert_eq!(sheet.max_col(), 4);
    assert_eq!(sheet.find_column("Value"), Some(2));
    assert_eq!(sheet.find_column(" Ontology link "), Some(4));
    assert_eq!(sheet.find_column("Missing"), None);
    assert_eq!(sheet.cell(3, 2), &CellValue::Number(15.0));
    assert_eq!(sheet.cell(99, 99), &CellValue::Empty);
    assert_eq!(sheet.column_values(1).len(), 3);
}

#[test]
fn test_cell_json_conversion() {
    assert_eq!(CellValue::Number(15.0).to_json(), json!(15));
    assert_eq!(CellValue::Number(0.95).to_json(), json!(0.95));
    assert_eq!(CellValue::from("x").to_json(), json!("x"));
    assert_eq!(CellValue::from_json(&json!(null)), CellValue::Empty);
    assert_eq!(CellValue::from_json(&json!("")), CellValue::Empty);
    assert_eq!(CellValue::from_json(&json!(3)), CellValue::Number(3.0));
    assert!(CellValue::Text("  ".to_string()).is_empty());
    assert!(CellValue::Number(f64::NAN).is_empty());
}

#[test]
fn test_xlsx_write_then_read() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("schema.xlsx");

    let mut workbook = Workbook::new();
    workbook.add_sheet(schema_sheet());
    let mut units = Sheet::new("Ontology - Unit");
    units.set_cell(1, 1, "Item");
    units.set_cell(1, 2, "Key");
    units.set_cell(2, 1, "mm");
    units.set_cell(2, 2, "emmo:MilliMetre");
    workbook.add_sheet(units);
    workbook.save(&path).unwrap();

    let restored = Workbook::open(&path).unwrap();
    assert_eq!(restored.sheet_names().collect::<Vec<_>>(), vec!["Schema", "Ontology - Unit"]);
    assert_eq!(restored, workbook);
    assert_eq!(
        restored.sheet("Schema").unwrap().cell(4, 1).as_str(),
        Some("Comment <with> & markup")
    );
}

/// Workbook in the shape spreadsheet applications emit: shared strings,
/// prefixed relationship ids, absolute targets and rich text runs.
fn foreign_xlsx() -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    zip.start_file("xl/workbook.xml", options).unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"
          xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets><sheet name="Unique ID" sheetId="7" r:id="rId3"/></sheets>
</workbook>"#,
    )
    .unwrap();

    zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId3" Type="worksheet" Target="/xl/worksheets/sheet7.xml"/>
</Relationships>"#,
    )
    .unwrap();

    zip.start_file("xl/sharedStrings.xml", options).unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="4" uniqueCount="4">
  <si><t>Item</t></si>
  <si><t>ID</t></si>
  <si><r><t>Empa</t></r><r><t xml:space="preserve"> Lab</t></r></si>
  <si><t>https://ror.org/02x681a42</t></si>
</sst>"#,
    )
    .unwrap();

    zip.start_file("xl/worksheets/sheet7.xml", options).unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetData>
    <row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row>
    <row r="2"><c r="A2" t="s" s="3"><v>2</v></c><c r="B2" t="s"><v>3</v></c><c r="C2"><v>2.5</v></c></row>
    <row r="4"><c r="A4" t="b"><v>1</v></c><c r="B4" t="str"><f>A1</f><v>Item</v></c><c r="C4" s="1"/></row>
  </sheetData>
</worksheet>"#,
    )
    .unwrap();

    zip.finish().unwrap().into_inner()
}

#[test]
fn test_read_foreign_layout() {
    let workbook = xlsx::read_from(Cursor::new(foreign_xlsx())).unwrap();
    let sheet = workbook.require_sheet("Unique ID").unwrap();

    assert_eq!(sheet.cell(1, 1).as_str(), Some("Item"));
    assert_eq!(sheet.cell(2, 1).as_str(), Some("Empa Lab"));
    assert_eq!(sheet.cell(2, 2).as_str(), Some("https://ror.org/02x681a42"));
    assert_eq!(sheet.cell(2, 3), &CellValue::Number(2.5));
    assert_eq!(sheet.cell(3, 1), &CellValue::Empty);
    assert_eq!(sheet.cell(4, 1), &CellValue::Bool(true));
    assert_eq!(sheet.cell(4, 2).as_str(), Some("Item"));
    assert_eq!(sheet.cell(4, 3), &CellValue::Empty);
}

#[test]
fn test_missing_workbook_part() {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("unrelated.txt", SimpleFileOptions::default()).unwrap();
    zip.write_all(b"hello").unwrap();
    let bytes = zip.finish().unwrap().into_inner();

    assert!(matches!(
        xlsx::read_from(Cursor::new(bytes)),
        Err(WorkbookError::MissingPart(_))
    ));
}

fn zip_parts(parts: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in parts {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn part_text(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut text = String::new();
    std::io::Read::read_to_string(&mut archive.by_name(name).unwrap(), &mut text).unwrap();
    text
}

fn single_sheet_xlsx(sheet_data: &str) -> Vec<u8> {
    let sheet = format!(
        r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
        sheet_data
    );
    zip_parts(&[
        (
            "xl/workbook.xml",
            r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Schema" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        ),
        (
            "xl/_rels/workbook.xml.rels",
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#,
        ),
        ("xl/worksheets/sheet1.xml", sheet.as_str()),
    ])
}

#[test]
fn test_cells_beyond_sheet_limits_are_rejected() {
    for sheet_data in [
        r#"<row r="4000000000"><c><v>1</v></c></row>"#,
        r#"<row r="1"><c r="ZZZZZZZZZZZZZZZ1"><v>1</v></c></row>"#,
        r#"<row><c r="XFE1"><v>1</v></c></row>"#,
        r#"<row r="0"/>"#,
    ] {
        let result = xlsx::read_from(Cursor::new(single_sheet_xlsx(sheet_data)));
        assert!(
            matches!(result, Err(WorkbookError::InvalidCell(_))),
            "accepted {}",
            sheet_data
        );
    }

    let last_cell = single_sheet_xlsx(r#"<row r="1048576"><c r="XFD1048576"><v>1</v></c></row>"#);
    let workbook = xlsx::read_from(Cursor::new(last_cell)).unwrap();
    assert_eq!(
        workbook.sheet("Schema").unwrap().cell(MAX_ROWS, MAX_COLS),
        &CellValue::Number(1.0)
    );
}

const TEMPLATE_STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><cellXfs count="3"><xf/><xf fontId="1"/><xf fillId="2"/></cellXfs></styleSheet>"#;

const TEMPLATE_UNITS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>Item</t></is></c></row><row r="2"><c r="A2" t="inlineStr"><is><t>mm</t></is></c></row></sheetData></worksheet>"#;

/// Template package the way a spreadsheet application saves it: a styles
/// part, column widths, merged cells, a validation list and a defined name.
fn template_xlsx() -> Vec<u8> {
    zip_parts(&[
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/worksheets/sheet2.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#,
        ),
        (
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#,
        ),
        (
            "xl/workbook.xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Schema" sheetId="1" r:id="rId1"/><sheet name="Units &amp; Keys" sheetId="2" r:id="rId2"/></sheets><definedNames><definedName name="Units">'Units &amp; Keys'!$A$2:$A$9</definedName></definedNames></workbook>"#,
        ),
        (
            "xl/_rels/workbook.xml.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet2.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#,
        ),
        ("xl/styles.xml", TEMPLATE_STYLES),
        (
            "xl/worksheets/sheet1.xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><dimension ref="A1:D3"/><cols><col min="1" max="1" width="42" customWidth="1"/></cols><sheetData><row r="1" spans="1:4" ht="24" customHeight="1"><c r="A1" s="1" t="inlineStr"><is><t>Metadata</t></is></c><c r="B1" s="1" t="inlineStr"><is><t>Value</t></is></c></row><row r="2"><c r="A2" t="inlineStr"><is><t>Cell ID</t></is></c><c r="B2" s="2"/></row><row r="3"><c r="A3" t="inlineStr"><is><t>Mass &amp; loading</t></is></c><c r="B3"><f>SUM(C3:D3)</f><v>7</v></c><c r="C3"><v>3</v></c><c r="D3"><v>4</v></c></row></sheetData><mergeCells count="1"><mergeCell ref="C1:D1"/></mergeCells><dataValidations count="1"><dataValidation type="list" sqref="B2"><formula1>Units</formula1></dataValidation></dataValidations></worksheet>"#,
        ),
        ("xl/worksheets/sheet2.xml", TEMPLATE_UNITS),
    ])
}

#[test]
fn test_read_decodes_escaped_names() {
    let workbook = xlsx::read_from(Cursor::new(template_xlsx())).unwrap();
    assert_eq!(
        workbook.sheet_names().collect::<Vec<_>>(),
        vec!["Schema", "Units & Keys"]
    );
    let schema = workbook.sheet("Schema").unwrap();
    assert_eq!(schema.cell(3, 1).as_str(), Some("Mass & loading"));
    assert_eq!(schema.cell(3, 2), &CellValue::Number(7.0));
    assert_eq!(schema.style(1, 1), Some("1"));
    assert_eq!(schema.style(2, 2), Some("2"));
    assert_eq!(schema.cell(2, 2), &CellValue::Empty);
}

#[test]
fn test_unchanged_workbook_copies_every_part() {
    let original = template_xlsx();
    let workbook = xlsx::read_from(Cursor::new(original.clone())).unwrap();
    let written = xlsx::write_to(&workbook, Cursor::new(Vec::new()))
        .unwrap()
        .into_inner();

    let archive = zip::ZipArchive::new(Cursor::new(original.as_slice())).unwrap();
    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    assert_eq!(names.len(), 7);
    for name in names {
        assert_eq!(part_text(&written, &name), part_text(&original, &name), "{}", name);
    }
}

#[test]
fn test_save_keeps_template_package() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("filled.xlsx");

    let mut workbook = xlsx::read_from(Cursor::new(template_xlsx())).unwrap();
    assert!(workbook.has_source_package());
    workbook
        .sheet_mut("Schema")
        .unwrap()
        .set_cell(2, 2, "240906_KIGR_GEN4_01");
    let mut notes = Sheet::new("Notes");
    notes.set_cell(1, 1, "reassembled");
    workbook.add_sheet(notes);
    workbook.save(&path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(part_text(&bytes, "xl/styles.xml"), TEMPLATE_STYLES);
    assert_eq!(part_text(&bytes, "xl/worksheets/sheet2.xml"), TEMPLATE_UNITS);

    let schema = part_text(&bytes, "xl/worksheets/sheet1.xml");
    assert!(schema.contains(
        r#"<dimension ref="A1:D3"/><cols><col min="1" max="1" width="42" customWidth="1"/></cols><sheetData>"#
    ));
    assert!(schema.contains(
        r#"</sheetData><mergeCells count="1"><mergeCell ref="C1:D1"/></mergeCells>"#
    ));
    assert!(schema.contains(r#"<dataValidation type="list" sqref="B2">"#));
    assert!(schema.contains(
        r#"<row r="1" ht="24" customHeight="1"><c r="A1" s="1" t="inlineStr">"#
    ));
    assert!(schema.contains(
        r#"<c r="B2" s="2" t="inlineStr"><is><t xml:space="preserve">240906_KIGR_GEN4_01</t></is></c>"#
    ));
    assert!(schema.contains(r#"<c r="B3"><f>SUM(C3:D3)</f><v>7</v></c>"#));

    let workbook_part = part_text(&bytes, "xl/workbook.xml");
    assert!(workbook_part.contains(r#"<definedName name="Units">"#));
    assert!(workbook_part.contains(r#"name="Notes" sheetId="3" r:id="rId4"/></sheets>"#));
    assert!(part_text(&bytes, "xl/_rels/workbook.xml.rels").contains(r#"Id="rId4""#));
    assert!(part_text(&bytes, "[Content_Types].xml")
        .contains(r#"PartName="/xl/worksheets/sheet3.xml""#));

    let restored = Workbook::open(&path).unwrap();
    assert_eq!(
        restored.sheet_names().collect::<Vec<_>>(),
        vec!["Schema", "Units & Keys", "Notes"]
    );
    let schema = restored.sheet("Schema").unwrap();
    assert_eq!(schema.cell(2, 2).as_str(), Some("240906_KIGR_GEN4_01"));
    assert_eq!(schema.cell(3, 2), &CellValue::Number(7.0));
    assert_eq!(schema.style(2, 2), Some("2"));
    assert_eq!(restored.sheet("Notes").unwrap().cell(1, 1).as_str(), Some("reassembled"));
}

#[test]
fn test_overwritten_formula_cell_drops_formula() {
    let mut workbook = xlsx::read_from(Cursor::new(template_xlsx())).unwrap();
    workbook.sheet_mut("Schema").unwrap().set_cell(3, 2, 9.5);
    let bytes = xlsx::write_to(&workbook, Cursor::new(Vec::new()))
        .unwrap()
        .into_inner();

    let schema = part_text(&bytes, "xl/worksheets/sheet1.xml");
    assert!(schema.contains(r#"<c r="B3"><v>9.5</v></c>"#));
    assert!(!schema.contains("SUM(C3:D3)"));
}
