use std::collections::HashMap;
use std::path::Path;

use serde_json::{Map, Value};

use crate::template::{
    METADATA_HEADER, ONTOLOGY_LINK_HEADER, SCHEMA_SHEET, UNIT_HEADER, VALUE_HEADER,
};
use crate::workbook::{CellValue, Sheet, Workbook};

use super::OntologyError;

/// Sheet mapping unit labels to ontology unit keys
pub const UNIT_SHEET: &str = "Ontology - Unit";
/// Sheet listing the top-level `@context` entries
pub const CONTEXT_TOPLEVEL_SHEET: &str = "@context-TopLevel";
/// Sheet listing connectors and their `@type`
pub const CONTEXT_CONNECTOR_SHEET: &str = "@context-Connector";
/// Sheet listing identified entities
pub const UNIQUE_ID_SHEET: &str = "Unique ID";

/// Unit cell value meaning "this row is not a measured quantity"
pub const NO_UNIT: &str = "No Unit";

/// Unit cell of a schema row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit {
    /// Empty cell
    Missing,
    /// The literal `No Unit`
    NoUnit,
    /// A unit label to look up in the unit map
    Label(String),
}

impl Unit {
    fn from_cell(cell: &CellValue) -> Self {
        if cell.is_empty() {
            return Unit::Missing;
        }
        let text = cell.to_string();
        match text.trim() {
            NO_UNIT => Unit::NoUnit,
            label => Unit::Label(label.to_string()),
        }
    }

    /// Whether this is the `No Unit` marker
    pub fn is_no_unit(&self) -> bool {
        matches!(self, Unit::NoUnit)
    }
}

/// One data row of the `Schema` sheet
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaRow {
    /// Label in the `Metadata` column
    pub metadata: String,
    /// Cell in the `Value` column
    pub value: CellValue,
    /// Cell in the `Unit` column
    pub unit: Unit,
    /// Text of the `Ontology link` column, if any
    pub link: Option<String>,
}

/// Everything the JSON-LD builder reads from the ontology workbook
#[derive(Debug, Clone, Default)]
pub struct OntologyTables {
    /// Schema rows in sheet order
    pub schema: Vec<SchemaRow>,
    /// Unit label → ontology unit key
    pub units: HashMap<String, String>,
    /// Top-level `@context` entries in sheet order
    pub context: Vec<(String, Value)>,
    /// Connector name → `@type` to inject (if any)
    pub connectors: HashMap<String, Option<String>>,
    /// Identified entity name → its ID (if any)
    pub unique_ids: HashMap<String, Option<String>>,
}

fn require_sheet<'a>(workbook: &'a Workbook, name: &str) -> Result<&'a Sheet, OntologyError> {
    workbook
        .sheet(name)
        .ok_or_else(|| OntologyError::MissingSheet(name.to_string()))
}

fn require_column(sheet: &Sheet, header: &str) -> Result<usize, OntologyError> {
    sheet
        .find_column(header)
        .ok_or_else(|| OntologyError::MissingColumn {
            sheet: sheet.name().to_string(),
            column: header.to_string(),
        })
}

fn text(cell: &CellValue) -> Option<String> {
    if cell.is_empty() {
        None
    } else {
        Some(cell.to_string().trim().to_string())
    }
}

/// `(key, value)` rows of a two-column lookup sheet, skipping rows without a key
fn pairs<'a>(
    sheet: &'a Sheet,
    key_header: &str,
    value_header: &str,
) -> Result<Vec<(String, &'a CellValue)>, OntologyError> {
    let key_col = require_column(sheet, key_header)?;
    let value_col = require_column(sheet, value_header)?;
    Ok((2..=sheet.max_row())
        .filter_map(|row| text(sheet.cell(row, key_col)).map(|k| (k, sheet.cell(row, value_col))))
        .collect())
}

impl OntologyTables {
    /// Read the tables from an ontology workbook on disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, OntologyError> {
        Self::from_workbook(&Workbook::open(path)?)
    }

    /// Read the tables from an in-memory workbook
    pub fn from_workbook(workbook: &Workbook) -> Result<Self, OntologyError> {
        let schema = read_schema(require_sheet(workbook, SCHEMA_SHEET)?)?;

        let units = pairs(require_sheet(workbook, UNIT_SHEET)?, "Item", "Key")?
            .into_iter()
            .filter_map(|(item, key)| text(key).map(|k| (item, k)))
            .collect();

        let context = pairs(require_sheet(workbook, CONTEXT_TOPLEVEL_SHEET)?, "Item", "Key")?
            .into_iter()
            .map(|(item, key)| (item, key.to_json()))
            .collect();

        let connectors = pairs(require_sheet(workbook, CONTEXT_CONNECTOR_SHEET)?, "Item", "Key")?
            .into_iter()
            .map(|(item, key)| (item, text(key)))
            .collect();

        let unique_ids = pairs(require_sheet(workbook, UNIQUE_ID_SHEET)?, "Item", "ID")?
            .into_iter()
            .map(|(item, id)| (item, text(id)))
            .collect();

        Ok(Self {
            schema,
            units,
            context,
            connectors,
            unique_ids,
        })
    }

    /// Value of the first schema row labelled `label` (trailing spaces of `label` ignored)
    pub fn schema_value(&self, label: &str) -> Option<&CellValue> {
        let label = label.trim_end_matches(' ');
        self.schema
            .iter()
            .find(|row| row.metadata == label)
            .map(|row| &row.value)
    }

    /// Ontology key of a unit label
    pub fn unit_key(&self, unit: &Unit, value: &Value) -> Result<&str, OntologyError> {
        match unit {
            Unit::Label(label) => self
                .units
                .get(label)
                .map(String::as_str)
                .ok_or_else(|| OntologyError::UnknownUnit(label.clone())),
            Unit::Missing | Unit::NoUnit => Err(OntologyError::MissingUnit(render_value(value))),
        }
    }

    /// Whether `name` is a connector
    pub fn is_connector(&self, name: &str) -> bool {
        self.connectors.contains_key(name)
    }

    /// `@type` injected for a connector, if it has one
    pub fn connector_type(&self, name: &str) -> Option<&str> {
        self.connectors.get(name).and_then(|t| t.as_deref())
    }

    /// Lookup result for an identified entity: `None` when `name` is a literal,
    /// `Some(None)` when it is identified but has no ID
    pub fn unique_id(&self, name: &str) -> Option<Option<&str>> {
        self.unique_ids.get(name).map(|id| id.as_deref())
    }

    /// Fresh node for `name`, seeded with its connector `@type` when it has one
    pub(crate) fn seed_node(&self, name: &str) -> Value {
        let mut node = Map::new();
        if let Some(ty) = self.connector_type(name) {
            node.insert("@type".to_string(), Value::String(ty.to_string()));
        }
        Value::Object(node)
    }
}

fn read_schema(sheet: &Sheet) -> Result<Vec<SchemaRow>, OntologyError> {
    let metadata_col = require_column(sheet, METADATA_HEADER)?;
    let value_col = require_column(sheet, VALUE_HEADER)?;
    let unit_col = require_column(sheet, UNIT_HEADER)?;
    let link_col = require_column(sheet, ONTOLOGY_LINK_HEADER)?;

    let mut rows = Vec::new();
    for row in 2..=sheet.max_row() {
        let metadata = text(sheet.cell(row, metadata_col)).unwrap_or_default();
        let value = sheet.cell(row, value_col).clone();
        let link = text(sheet.cell(row, link_col));
        if metadata.is_empty() && value.is_empty() && link.is_none() {
            continue;
        }
        rows.push(SchemaRow {
            metadata,
            value,
            unit: Unit::from_cell(sheet.cell(row, unit_col)),
            link,
        });
    }
    Ok(rows)
}

/// Text form of a JSON value for error messages (strings unquoted)
pub(crate) fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
