//! Office Open XML (`.xlsx`) codec.
//!
//! Reading understands shared strings, inline strings, numbers and booleans,
//! and keeps cached formula results. The package bytes are remembered so that
//! [`write_to`] can copy every untouched part and rewrite only the
//! `<sheetData>` of sheets whose cells changed: styles, column widths,
//! validations, merged cells and defined names survive a round trip. A
//! workbook built in memory is written as a minimal package with inline
//! strings and no styles part.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt::{self, Write as _};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;

use log::debug;
use quick_xml::encoding::Decoder;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::sheet::{Formula, SheetLayout};
use super::{
    column_letters, parse_cell_ref, CellValue, Sheet, Workbook, WorkbookError, MAX_COLS,
    MAX_ROWS,
};

const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const WORKSHEET_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// The `.xlsx` package a workbook was read from
pub(crate) struct Package {
    bytes: Vec<u8>,
    /// Sheet name to worksheet part name
    sheet_parts: HashMap<String, String>,
    /// Sheets as read, to tell which ones were edited
    originals: HashMap<String, Sheet>,
    /// Relationship ids already used by the workbook part
    rel_ids: HashSet<String>,
    max_sheet_id: u32,
}

impl fmt::Debug for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Package")
            .field("bytes", &self.bytes.len())
            .field("sheet_parts", &self.sheet_parts)
            .finish_non_exhaustive()
    }
}

/// Entry of the workbook's `<sheets>` list
struct SheetRef {
    name: String,
    rel_id: String,
    sheet_id: u32,
}

/// Read a workbook from an `.xlsx` file
pub fn read<P: AsRef<Path>>(path: P) -> Result<Workbook, WorkbookError> {
    let file = File::open(path)?;
    read_from(BufReader::new(file))
}

/// Read a workbook from any `.xlsx` byte source
pub fn read_from<R: Read>(mut reader: R) -> Result<Workbook, WorkbookError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice()))?;

    let shared_strings = match archive.by_name(SHARED_STRINGS_PART) {
        Ok(part) => parse_shared_strings(BufReader::new(part))?,
        Err(ZipError::FileNotFound) => Vec::new(),
        Err(e) => return Err(e.into()),
    };

    let sheet_refs = match archive.by_name(WORKBOOK_PART) {
        Ok(part) => parse_workbook(BufReader::new(part))?,
        Err(ZipError::FileNotFound) => {
            return Err(WorkbookError::MissingPart(WORKBOOK_PART.to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    let targets = match archive.by_name(WORKBOOK_RELS_PART) {
        Ok(part) => parse_relationships(BufReader::new(part))?,
        Err(ZipError::FileNotFound) => {
            return Err(WorkbookError::MissingPart(WORKBOOK_RELS_PART.to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    let mut workbook = Workbook::new();
    let mut sheet_parts = HashMap::new();
    let mut originals = HashMap::new();
    for sheet_ref in &sheet_refs {
        let target = targets.get(&sheet_ref.rel_id).ok_or_else(|| {
            WorkbookError::MissingPart(format!("relationship {}", sheet_ref.rel_id))
        })?;
        let part_name = resolve_target(target);

        let part = archive
            .by_name(&part_name)
            .map_err(|_| WorkbookError::MissingPart(part_name.clone()))?;
        let sheet = parse_sheet(&sheet_ref.name, BufReader::new(part), &shared_strings)?;
        debug!("Read sheet '{}' ({} rows)", sheet_ref.name, sheet.max_row());

        sheet_parts.insert(sheet_ref.name.clone(), part_name);
        originals.insert(sheet_ref.name.clone(), sheet.clone());
        workbook.add_sheet(sheet);
    }
    drop(archive);

    workbook.set_package(Package {
        bytes,
        sheet_parts,
        originals,
        rel_ids: targets.into_keys().collect(),
        max_sheet_id: sheet_refs.iter().map(|s| s.sheet_id).max().unwrap_or(0),
    });
    Ok(workbook)
}

/// Write a workbook to an `.xlsx` file
pub fn write<P: AsRef<Path>>(workbook: &Workbook, path: P) -> Result<(), WorkbookError> {
    let file = File::create(path)?;
    let writer = write_to(workbook, BufWriter::new(file))?;
    writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
    Ok(())
}

/// Write a workbook into any seekable sink, returning the sink.
///
/// A workbook read from a package is written back into a copy of that package.
pub fn write_to<W: Write + Seek>(workbook: &Workbook, sink: W) -> Result<W, WorkbookError> {
    match workbook.package() {
        Some(package) => write_into_package(workbook, package, sink),
        None => write_new(workbook, sink),
    }
}

fn deflated() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

fn write_new<W: Write + Seek>(workbook: &Workbook, sink: W) -> Result<W, WorkbookError> {
    let mut zip = ZipWriter::new(sink);
    let options = deflated();

    let sheet_count = workbook.sheets().len();

    zip.start_file(CONTENT_TYPES_PART, options)?;
    zip.write_all(content_types(sheet_count).as_bytes())?;

    zip.start_file("_rels/.rels", options)?;
    zip.write_all(root_relationships().as_bytes())?;

    zip.start_file(WORKBOOK_PART, options)?;
    zip.write_all(workbook_xml(workbook).as_bytes())?;

    zip.start_file(WORKBOOK_RELS_PART, options)?;
    zip.write_all(workbook_relationships(sheet_count).as_bytes())?;

    for (i, sheet) in workbook.sheets().iter().enumerate() {
        zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)?;
        zip.write_all(sheet_xml(sheet).as_bytes())?;
    }

    Ok(zip.finish()?)
}

/// Sheet that has no part in the source package yet
struct AddedSheet<'a> {
    part: String,
    rel_id: String,
    sheet_id: u32,
    sheet: &'a Sheet,
}

fn write_into_package<W: Write + Seek>(
    workbook: &Workbook,
    package: &Package,
    sink: W,
) -> Result<W, WorkbookError> {
    let mut archive = ZipArchive::new(Cursor::new(package.bytes.as_slice()))?;
    let mut rewritten: HashMap<String, String> = HashMap::new();
    let mut added = Vec::new();
    let mut part_number = 1usize;
    let mut rel_number = 1usize;
    let mut sheet_id = package.max_sheet_id;

    for sheet in workbook.sheets() {
        match package.sheet_parts.get(sheet.name()) {
            Some(part) => {
                if package.originals.get(sheet.name()) == Some(sheet) {
                    continue;
                }
                let original = read_part(&mut archive, part)?;
                rewritten.insert(part.clone(), splice_sheet_data(&original, sheet)?);
                debug!("Rewriting cells of sheet '{}' in {}", sheet.name(), part);
            }
            None => {
                let part = loop {
                    let candidate = format!("xl/worksheets/sheet{}.xml", part_number);
                    part_number += 1;
                    if archive.index_for_name(&candidate).is_none() {
                        break candidate;
                    }
                };
                let rel_id = loop {
                    let candidate = format!("rId{}", rel_number);
                    rel_number += 1;
                    if !package.rel_ids.contains(&candidate) {
                        break candidate;
                    }
                };
                sheet_id += 1;
                debug!("Adding sheet '{}' as {}", sheet.name(), part);
                added.push(AddedSheet {
                    part,
                    rel_id,
                    sheet_id,
                    sheet,
                });
            }
        }
    }

    if !added.is_empty() {
        let workbook_xml = read_part(&mut archive, WORKBOOK_PART)?;
        let workbook_xml = insert_before_close(&workbook_xml, "sheets", |prefix| {
            let mut xml = String::new();
            for entry in &added {
                let _ = write!(
                    xml,
                    r#"<{p}sheet xmlns:r="{}" name="{}" sheetId="{}" r:id="{}"/>"#,
                    NS_REL,
                    escape(entry.sheet.name()),
                    entry.sheet_id,
                    entry.rel_id,
                    p = prefix
                );
            }
            xml
        })?;
        rewritten.insert(WORKBOOK_PART.to_string(), workbook_xml);

        let rels = read_part(&mut archive, WORKBOOK_RELS_PART)?;
        let rels = insert_before_close(&rels, "Relationships", |prefix| {
            let mut xml = String::new();
            for entry in &added {
                let target = entry.part.strip_prefix("xl/").unwrap_or(&entry.part);
                let _ = write!(
                    xml,
                    r#"<{p}Relationship Id="{}" Type="{}/worksheet" Target="{}"/>"#,
                    entry.rel_id,
                    NS_REL,
                    target,
                    p = prefix
                );
            }
            xml
        })?;
        rewritten.insert(WORKBOOK_RELS_PART.to_string(), rels);

        let types = read_part(&mut archive, CONTENT_TYPES_PART)?;
        let types = insert_before_close(&types, "Types", |prefix| {
            let mut xml = String::new();
            for entry in &added {
                let _ = write!(
                    xml,
                    r#"<{p}Override PartName="/{}" ContentType="{}"/>"#,
                    entry.part,
                    WORKSHEET_CONTENT_TYPE,
                    p = prefix
                );
            }
            xml
        })?;
        rewritten.insert(CONTENT_TYPES_PART.to_string(), types);
    }

    let options = deflated();
    let mut zip = ZipWriter::new(sink);
    for i in 0..archive.len() {
        let name = archive.by_index_raw(i)?.name().to_string();
        match rewritten.remove(&name) {
            Some(xml) => {
                zip.start_file(name, options)?;
                zip.write_all(xml.as_bytes())?;
            }
            None => zip.raw_copy_file(archive.by_index_raw(i)?)?,
        }
    }
    for entry in &added {
        zip.start_file(entry.part.as_str(), options)?;
        zip.write_all(sheet_xml(entry.sheet).as_bytes())?;
    }

    Ok(zip.finish()?)
}

fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<String, WorkbookError> {
    let mut part = match archive.by_name(name) {
        Ok(part) => part,
        Err(ZipError::FileNotFound) => return Err(WorkbookError::MissingPart(name.to_string())),
        Err(e) => return Err(e.into()),
    };
    let mut xml = String::new();
    part.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Byte range of one element inside a part
struct ElementSpan {
    start: usize,
    end: usize,
    /// Start of the closing tag; `None` for an empty element
    close_start: Option<usize>,
    /// Namespace prefix of the element name, with its colon
    prefix: String,
}

fn name_prefix(e: &BytesStart) -> String {
    let qualified = e.name();
    let local_len = e.local_name().as_ref().len();
    let qualified = qualified.as_ref();
    String::from_utf8_lossy(&qualified[..qualified.len() - local_len]).into_owned()
}

/// First element with local name `local`
fn find_element(xml: &str, local: &str) -> Result<Option<ElementSpan>, WorkbookError> {
    let mut reader = Reader::from_str(xml);
    let mut open: Option<(usize, String)> = None;
    let mut depth = 0usize;

    loop {
        let before = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == local.as_bytes() => {
                if open.is_none() {
                    open = Some((before, name_prefix(&e)));
                }
                depth += 1;
            }
            Event::End(e) if e.local_name().as_ref() == local.as_bytes() && open.is_some() => {
                depth -= 1;
                if depth == 0 {
                    if let Some((start, prefix)) = open.take() {
                        return Ok(Some(ElementSpan {
                            start,
                            end: reader.buffer_position() as usize,
                            close_start: Some(before),
                            prefix,
                        }));
                    }
                }
            }
            Event::Empty(e) if e.local_name().as_ref() == local.as_bytes() && open.is_none() => {
                return Ok(Some(ElementSpan {
                    start: before,
                    end: reader.buffer_position() as usize,
                    close_start: None,
                    prefix: name_prefix(&e),
                }));
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

/// Insert the fragment built for the element's prefix right before `</local>`
fn insert_before_close<F>(xml: &str, local: &str, fragment: F) -> Result<String, WorkbookError>
where
    F: FnOnce(&str) -> String,
{
    let span = find_element(xml, local)?
        .ok_or_else(|| WorkbookError::MissingPart(format!("<{}> element", local)))?;
    let fragment = fragment(&span.prefix);

    let mut out = String::with_capacity(xml.len() + fragment.len());
    match span.close_start {
        Some(close) => {
            out.push_str(&xml[..close]);
            out.push_str(&fragment);
            out.push_str(&xml[close..]);
        }
        None => {
            let tag = &xml[span.start..span.end];
            let open_tag = tag.strip_suffix("/>").unwrap_or(tag);
            out.push_str(&xml[..span.start]);
            out.push_str(open_tag.trim_end());
            out.push('>');
            out.push_str(&fragment);
            let _ = write!(out, "</{}{}>", span.prefix, local);
            out.push_str(&xml[span.end..]);
        }
    }
    Ok(out)
}

/// Replace the `<sheetData>` of a worksheet part, leaving the rest of the part as is
fn splice_sheet_data(original: &str, sheet: &Sheet) -> Result<String, WorkbookError> {
    let span = find_element(original, "sheetData")?.ok_or_else(|| {
        WorkbookError::MissingPart(format!("sheetData of sheet '{}'", sheet.name()))
    })?;

    let mut xml = String::with_capacity(original.len());
    xml.push_str(&original[..span.start]);
    xml.push_str(&sheet_data_xml(sheet, &span.prefix, Some(sheet.layout())));
    xml.push_str(&original[span.end..]);
    Ok(xml)
}

fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

fn attribute(
    e: &BytesStart,
    name: &[u8],
    decoder: Decoder,
) -> Result<Option<String>, WorkbookError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| WorkbookError::XmlError(quick_xml::Error::from(e)))?;
        if attr.key.local_name().as_ref() == name {
            return Ok(Some(attr.decode_and_unescape_value(decoder)?.into_owned()));
        }
    }
    Ok(None)
}

/// All attributes as (qualified name, value), minus the ones in `skip`
fn attributes(
    e: &BytesStart,
    skip: &[&[u8]],
    decoder: Decoder,
) -> Result<Vec<(String, String)>, WorkbookError> {
    let mut all = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| WorkbookError::XmlError(quick_xml::Error::from(e)))?;
        if skip.iter().any(|name| *name == attr.key.as_ref()) {
            continue;
        }
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        all.push((key, attr.decode_and_unescape_value(decoder)?.into_owned()));
    }
    Ok(all)
}

fn parse_workbook<R: BufRead>(reader: R) -> Result<Vec<SheetRef>, WorkbookError> {
    let mut xml = Reader::from_reader(reader);
    let decoder = xml.decoder();
    let mut buf = Vec::new();
    let mut sheets = Vec::new();

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                let name = attribute(&e, b"name", decoder)?
                    .ok_or_else(|| WorkbookError::InvalidCell("sheet without name".to_string()))?;
                let rel_id = attribute(&e, b"id", decoder)?.ok_or_else(|| {
                    WorkbookError::InvalidCell(format!("sheet '{}' without id", name))
                })?;
                let sheet_id = attribute(&e, b"sheetId", decoder)?
                    .and_then(|id| id.trim().parse().ok())
                    .unwrap_or(0);
                sheets.push(SheetRef {
                    name,
                    rel_id,
                    sheet_id,
                });
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(sheets)
}

fn parse_relationships<R: BufRead>(reader: R) -> Result<HashMap<String, String>, WorkbookError> {
    let mut xml = Reader::from_reader(reader);
    let decoder = xml.decoder();
    let mut buf = Vec::new();
    let mut targets = HashMap::new();

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (
                    attribute(&e, b"Id", decoder)?,
                    attribute(&e, b"Target", decoder)?,
                ) {
                    targets.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(targets)
}

fn parse_shared_strings<R: BufRead>(reader: R) -> Result<Vec<String>, WorkbookError> {
    let mut xml = Reader::from_reader(reader);
    let mut buf = Vec::new();
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_text = false;
    let mut in_phonetic = false;

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => current.clear(),
                b"t" if !in_phonetic => in_text = true,
                b"rPh" => in_phonetic = true,
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Event::Text(e) if in_text => current.push_str(&e.unescape()?),
            Event::End(e) => match e.local_name().as_ref() {
                b"si" => strings.push(std::mem::take(&mut current)),
                b"t" => in_text = false,
                b"rPh" => in_phonetic = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(strings)
}

/// Cell being assembled while its children are read
#[derive(Default)]
struct PendingCell {
    row: usize,
    col: usize,
    kind: Option<String>,
    text: String,
    formula: Option<Formula>,
}

impl PendingCell {
    fn value(self, shared_strings: &[String]) -> Result<CellValue, WorkbookError> {
        let value = match self.kind.as_deref() {
            Some("s") => {
                let index: usize = self.text.trim().parse().map_err(|_| {
                    WorkbookError::InvalidCell(format!("shared string index '{}'", self.text))
                })?;
                let text = shared_strings.get(index).ok_or_else(|| {
                    WorkbookError::InvalidCell(format!("shared string {} out of range", index))
                })?;
                CellValue::from(text.as_str())
            }
            Some("str") | Some("inlineStr") => CellValue::from(self.text),
            Some("b") => CellValue::Bool(self.text.trim() == "1"),
            Some("e") => CellValue::Empty,
            _ if self.text.trim().is_empty() => CellValue::Empty,
            _ => self
                .text
                .trim()
                .parse::<f64>()
                .map(CellValue::Number)
                .unwrap_or(CellValue::Text(self.text)),
        };
        Ok(value)
    }
}

fn parse_sheet<R: BufRead>(
    name: &str,
    reader: R,
    shared_strings: &[String],
) -> Result<Sheet, WorkbookError> {
    let mut xml = Reader::from_reader(reader);
    let decoder = xml.decoder();
    let mut buf = Vec::new();
    let mut sheet = Sheet::new(name);

    let mut row = 0usize;
    let mut next_col = 1usize;
    let mut pending: Option<PendingCell> = None;
    let mut in_text = false;
    let mut in_formula = false;

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"row" => {
                    row = start_row(&mut sheet, &e, row, decoder)?;
                    next_col = 1;
                }
                b"c" => pending = Some(start_cell(&mut sheet, &e, row, &mut next_col, decoder)?),
                b"v" | b"t" => in_text = true,
                b"f" => {
                    if let Some(cell) = pending.as_mut() {
                        cell.formula = Some(Formula {
                            attributes: attributes(&e, &[], decoder)?,
                            text: String::new(),
                        });
                        in_formula = true;
                    }
                }
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"row" => {
                    row = start_row(&mut sheet, &e, row, decoder)?;
                    next_col = 1;
                }
                b"c" => {
                    start_cell(&mut sheet, &e, row, &mut next_col, decoder)?;
                }
                b"f" => {
                    if let Some(cell) = pending.as_mut() {
                        cell.formula = Some(Formula {
                            attributes: attributes(&e, &[], decoder)?,
                            text: String::new(),
                        });
                    }
                }
                _ => {}
            },
            Event::Text(e) if in_formula => {
                if let Some(formula) = pending.as_mut().and_then(|c| c.formula.as_mut()) {
                    formula.text.push_str(&e.unescape()?);
                }
            }
            Event::Text(e) if in_text => {
                if let Some(cell) = pending.as_mut() {
                    cell.text.push_str(&e.unescape()?);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"v" | b"t" => in_text = false,
                b"f" => in_formula = false,
                b"c" => {
                    if let Some(mut cell) = pending.take() {
                        let (r, c) = (cell.row, cell.col);
                        let formula = cell.formula.take();
                        let value = cell.value(shared_strings)?;
                        if value != CellValue::Empty {
                            sheet.set_cell(r, c, value);
                        }
                        if let Some(formula) = formula {
                            sheet.layout_mut().formulas.insert((r, c), formula);
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(sheet)
}

/// Row number of a `<row>` element; its other attributes are kept for write-back
fn start_row(
    sheet: &mut Sheet,
    e: &BytesStart,
    previous: usize,
    decoder: Decoder,
) -> Result<usize, WorkbookError> {
    let row = match attribute(e, b"r", decoder)? {
        Some(r) => r
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|row| (1..=MAX_ROWS).contains(row))
            .ok_or_else(|| WorkbookError::InvalidCell(format!("row number '{}'", r)))?,
        None => previous + 1,
    };
    if row > MAX_ROWS {
        return Err(WorkbookError::InvalidCell(format!(
            "row {} is beyond the last sheet row {}",
            row, MAX_ROWS
        )));
    }

    let extra = attributes(e, &[b"r".as_slice(), b"spans".as_slice()], decoder)?;
    if !extra.is_empty() {
        sheet.layout_mut().row_attributes.insert(row, extra);
    }
    Ok(row)
}

fn start_cell(
    sheet: &mut Sheet,
    e: &BytesStart,
    row: usize,
    next_col: &mut usize,
    decoder: Decoder,
) -> Result<PendingCell, WorkbookError> {
    let (row, col) = match attribute(e, b"r", decoder)? {
        Some(reference) => parse_cell_ref(&reference)
            .ok_or_else(|| WorkbookError::InvalidCell(format!("cell reference '{}'", reference)))?,
        None => (row.max(1), *next_col),
    };
    if col > MAX_COLS {
        return Err(WorkbookError::InvalidCell(format!(
            "column {} of row {} is beyond the last sheet column {}",
            col, row, MAX_COLS
        )));
    }
    *next_col = col + 1;

    if let Some(style) = attribute(e, b"s", decoder)? {
        sheet.layout_mut().styles.insert((row, col), style);
    }
    Ok(PendingCell {
        row,
        col,
        kind: attribute(e, b"t", decoder)?,
        ..PendingCell::default()
    })
}

fn content_types(sheet_count: usize) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    );
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    xml.push_str(r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#);
    for i in 1..=sheet_count {
        let _ = write!(
            xml,
            r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="{}"/>"#,
            i, WORKSHEET_CONTENT_TYPE
        );
    }
    xml.push_str("</Types>");
    xml
}

fn root_relationships() -> String {
    format!(
        r#"{}<Relationships xmlns="{}"><Relationship Id="rId1" Type="{}/officeDocument" Target="xl/workbook.xml"/></Relationships>"#,
        XML_DECL, NS_PKG_REL, NS_REL
    )
}

fn workbook_xml(workbook: &Workbook) -> String {
    let mut xml = format!(
        r#"{}<workbook xmlns="{}" xmlns:r="{}"><sheets>"#,
        XML_DECL, NS_MAIN, NS_REL
    );
    for (i, name) in workbook.sheet_names().enumerate() {
        let _ = write!(
            xml,
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            escape(name),
            i + 1,
            i + 1
        );
    }
    xml.push_str("</sheets></workbook>");
    xml
}

fn workbook_relationships(sheet_count: usize) -> String {
    let mut xml = format!(r#"{}<Relationships xmlns="{}">"#, XML_DECL, NS_PKG_REL);
    for i in 1..=sheet_count {
        let _ = write!(
            xml,
            r#"<Relationship Id="rId{}" Type="{}/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            i, NS_REL, i
        );
    }
    xml.push_str("</Relationships>");
    xml
}

/// Standalone worksheet part; styles are dropped since no styles part goes with it
fn sheet_xml(sheet: &Sheet) -> String {
    format!(
        r#"{}<worksheet xmlns="{}">{}</worksheet>"#,
        XML_DECL,
        NS_MAIN,
        sheet_data_xml(sheet, "", None)
    )
}

fn is_written(cell: &CellValue) -> bool {
    match cell {
        CellValue::Empty => false,
        CellValue::Number(n) => n.is_finite(),
        _ => true,
    }
}

fn write_attributes(xml: &mut String, attributes: &[(String, String)]) {
    for (key, value) in attributes {
        let _ = write!(xml, r#" {}="{}""#, key, escape(value.as_str()));
    }
}

/// `<sheetData>` with every element name carrying `p` as its prefix
fn sheet_data_xml(sheet: &Sheet, p: &str, layout: Option<&SheetLayout>) -> String {
    let mut rows: BTreeSet<usize> = (1..=sheet.max_row())
        .filter(|row| sheet.row(*row).iter().any(is_written))
        .collect();
    if let Some(layout) = layout {
        rows.extend(layout.row_attributes.keys().copied());
        rows.extend(layout.styles.keys().map(|(row, _)| *row));
        rows.extend(layout.formulas.keys().map(|(row, _)| *row));
    }

    let mut xml = format!("<{}sheetData>", p);
    for row in rows {
        let mut cols: BTreeSet<usize> = sheet
            .row(row)
            .iter()
            .enumerate()
            .filter(|(_, cell)| is_written(cell))
            .map(|(i, _)| i + 1)
            .collect();
        let _ = write!(xml, r#"<{}row r="{}""#, p, row);
        if let Some(layout) = layout {
            let in_row = (row, 0)..=(row, usize::MAX);
            cols.extend(layout.styles.range(in_row.clone()).map(|((_, col), _)| *col));
            cols.extend(layout.formulas.range(in_row).map(|((_, col), _)| *col));
            if let Some(attributes) = layout.row_attributes.get(&row) {
                write_attributes(&mut xml, attributes);
            }
        }
        xml.push('>');

        for col in cols {
            let style = layout.and_then(|l| l.styles.get(&(row, col))).map(String::as_str);
            let formula = layout.and_then(|l| l.formulas.get(&(row, col)));
            write_cell(&mut xml, p, row, col, sheet.cell(row, col), style, formula);
        }
        let _ = write!(xml, "</{}row>", p);
    }
    let _ = write!(xml, "</{}sheetData>", p);
    xml
}

fn write_cell(
    xml: &mut String,
    p: &str,
    row: usize,
    col: usize,
    value: &CellValue,
    style: Option<&str>,
    formula: Option<&Formula>,
) {
    let _ = write!(xml, r#"<{}c r="{}{}""#, p, column_letters(col), row);
    if let Some(style) = style {
        let _ = write!(xml, r#" s="{}""#, escape(style));
    }

    let mut formula_xml = String::new();
    if let Some(formula) = formula {
        let _ = write!(formula_xml, "<{}f", p);
        write_attributes(&mut formula_xml, &formula.attributes);
        if formula.text.is_empty() {
            formula_xml.push_str("/>");
        } else {
            let _ = write!(formula_xml, ">{}</{}f>", escape(formula.text.as_str()), p);
        }
    }

    match value {
        CellValue::Text(s) if formula.is_none() => {
            let _ = write!(
                xml,
                r#" t="inlineStr"><{p}is><{p}t xml:space="preserve">{}</{p}t></{p}is></{p}c>"#,
                escape(s.as_str()),
                p = p
            );
        }
        CellValue::Text(s) => {
            let _ = write!(
                xml,
                r#" t="str">{}<{p}v>{}</{p}v></{p}c>"#,
                formula_xml,
                escape(s.as_str()),
                p = p
            );
        }
        CellValue::Number(n) if n.is_finite() => {
            let _ = write!(xml, r#">{}<{p}v>{}</{p}v></{p}c>"#, formula_xml, n, p = p);
        }
        CellValue::Bool(b) => {
            let _ = write!(
                xml,
                r#" t="b">{}<{p}v>{}</{p}v></{p}c>"#,
                formula_xml,
                if *b { 1 } else { 0 },
                p = p
            );
        }
        _ if formula_xml.is_empty() => xml.push_str("/>"),
        _ => {
            let _ = write!(xml, ">{}</{}c>", formula_xml, p);
        }
    }
}
