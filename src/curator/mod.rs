//! # Metadata Curator
//!
//! Builds the flat label → value dictionary that is written into the
//! `Schema` sheet of the ontology template.
//!
//! Every mapped field is resolved against the instrument record; fields the
//! record does not carry are kept as explicit `null`s. Two fields are then
//! derived and are load-bearing: the operator's full name (from the short code
//! embedded in the cell identifier) and the assembly date.

mod error;

#[cfg(test)]
mod tests;

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDateTime;
use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;

use crate::mapping::{
    OntologyField, LABEL_ASSEMBLY_DATE, LABEL_CELL_ID, LABEL_OPERATOR, ONTOLOGY_FIELDS,
};
use crate::record::InstrumentRecord;

pub use error::CurateError;

/// Default instrument path of the assembly timestamp
pub const DEFAULT_ASSEMBLY_TIMESTAMP_PATH: &str = "metadata||sample_data||Assembly timestamp";

/// Format of the instrument's timestamps
pub const INSTRUMENT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format of the assembly date written to the ontology spreadsheet
pub const ASSEMBLY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Curated label → value dictionary.
///
/// Absent fields are stored as `Value::Null` so that "not found" can be told
/// apart from "not mapped".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CuratedMetadata {
    fields: BTreeMap<String, Value>,
}

impl CuratedMetadata {
    /// Create an empty dictionary
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a field
    pub fn insert(&mut self, label: impl Into<String>, value: Value) {
        self.fields.insert(label.into(), value);
    }

    /// Value for a label; `Some(Value::Null)` means the field was not found
    pub fn get(&self, label: &str) -> Option<&Value> {
        self.fields.get(label)
    }

    /// Value for a label as text, if present and a string
    pub fn get_str(&self, label: &str) -> Option<&str> {
        self.get(label).and_then(Value::as_str)
    }

    /// Labels whose value could not be resolved
    pub fn missing(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|(_, v)| v.is_null())
            .map(|(k, _)| k.as_str())
    }

    /// Iterate over all (label, value) pairs in label order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the dictionary is empty
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Resolves ontology fields from an instrument record
#[derive(Debug, Clone)]
pub struct Curator<'a> {
    fields: &'a [OntologyField],
    user_names: Option<&'a HashMap<String, String>>,
    assembly_timestamp_path: String,
}

impl Default for Curator<'_> {
    fn default() -> Self {
        Self::new(ONTOLOGY_FIELDS)
    }
}

impl<'a> Curator<'a> {
    /// Create a curator over the given mapping table
    pub fn new(fields: &'a [OntologyField]) -> Self {
        Self {
            fields,
            user_names: None,
            assembly_timestamp_path: DEFAULT_ASSEMBLY_TIMESTAMP_PATH.to_string(),
        }
    }

    /// Short code → full name lookup used for the operator field
    pub fn with_user_names(mut self, user_names: &'a HashMap<String, String>) -> Self {
        self.user_names = Some(user_names);
        self
    }

    /// Override the instrument path of the assembly timestamp
    pub fn with_assembly_timestamp_path(mut self, path: impl Into<String>) -> Self {
        self.assembly_timestamp_path = path.into();
        self
    }

    /// Build the curated dictionary
    pub fn curate(&self, record: &InstrumentRecord) -> Result<CuratedMetadata, CurateError> {
        let mut metadata = CuratedMetadata::new();

        for field in self.fields {
            match record.get(field.instrument_path) {
                Ok(value) => {
                    debug!("Resolved '{}' = {}", field.label, value);
                    metadata.insert(field.label, value.clone());
                }
                Err(e) => {
                    warn!("Field '{}' not found, storing null: {}", field.label, e);
                    metadata.insert(field.label, Value::Null);
                }
            }
        }

        let operator = self.operator_name(&metadata)?;
        metadata.insert(LABEL_OPERATOR, Value::String(operator));

        let date = assembly_date(record, &self.assembly_timestamp_path)?;
        metadata.insert(LABEL_ASSEMBLY_DATE, Value::String(date));

        Ok(metadata)
    }

    fn operator_name(&self, metadata: &CuratedMetadata) -> Result<String, CurateError> {
        let cell_id = match metadata.get(LABEL_CELL_ID) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => {
                return Err(CurateError::MissingField(LABEL_CELL_ID.to_string()))
            }
            Some(other) => other.to_string(),
        };

        let code = cell_id
            .split('_')
            .nth(1)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| CurateError::MalformedCellId(cell_id.clone()))?;

        let name = self
            .user_names
            .and_then(|names| names.get(code))
            .cloned()
            .unwrap_or_else(|| {
                debug!("No full name for operator code '{}', keeping the code", code);
                code.to_string()
            });
        Ok(name)
    }
}

/// Read the assembly timestamp at `path` and reformat it as `DD/MM/YYYY`
pub fn assembly_date(record: &InstrumentRecord, path: &str) -> Result<String, CurateError> {
    let fail = |reason: String| CurateError::DateExtraction {
        path: path.to_string(),
        reason,
    };

    let raw = record
        .get(path)
        .map_err(|e| fail(e.to_string()))?
        .as_str()
        .ok_or_else(|| fail("timestamp is not a string".to_string()))?;

    let parsed = NaiveDateTime::parse_from_str(raw.trim(), INSTRUMENT_TIMESTAMP_FORMAT)
        .map_err(|e| fail(format!("'{}' ({})", raw, e)))?;

    Ok(parsed.format(ASSEMBLY_DATE_FORMAT).to_string())
}
