use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::{debug, error, info};
use serde_json::{json, Map, Value};
use tempfile::NamedTempFile;

use crate::mapping::{LABEL_ASSEMBLY_DATE, LABEL_CELL_ID, LABEL_OPERATOR};

use super::builder::add_to_structure;
use super::link::{LinkPath, COMMENT, NOT_ONTOLOGIZE};
use super::tables::{render_value, OntologyTables, Unit};
use super::OntologyError;

/// Base context of the battery domain ontology
pub const BATTERY_CONTEXT: &str = "https://w3id.org/emmo/domain/battery/context";

/// Schema label holding the cell's ontology class
pub const LABEL_CELL_TYPE: &str = "Cell type";
/// Schema label holding the manufacturing institution
pub const LABEL_INSTITUTION: &str = "Institution/company";
/// Schema label holding the schema version
pub const LABEL_SCHEMA_VERSION: &str = "BattINFO CoinCellSchema version";

const REQUIRED_FIELDS: [&str; 5] = [
    LABEL_CELL_TYPE,
    LABEL_CELL_ID,
    LABEL_ASSEMBLY_DATE,
    LABEL_INSTITUTION,
    LABEL_OPERATOR,
];

/// Build the JSON-LD document described by `tables`.
///
/// A single row that cannot be placed aborts the whole build.
pub fn build_document(tables: &OntologyTables) -> Result<Value, OntologyError> {
    let mut harvested = Map::new();
    for label in REQUIRED_FIELDS {
        match tables.schema_value(label) {
            Some(cell) if !cell.is_empty() => {
                harvested.insert(label.to_string(), cell.to_json());
            }
            _ => return Err(OntologyError::MissingField(label.to_string())),
        }
    }

    let operator_id = identified(tables, &harvested, LABEL_OPERATOR)?;
    let institution_id = identified(tables, &harvested, LABEL_INSTITUTION)?;

    let mut context = Map::new();
    for (item, key) in &tables.context {
        context.insert(item.clone(), key.clone());
    }

    let version = tables
        .schema_value(LABEL_SCHEMA_VERSION)
        .map(|c| c.to_json())
        .unwrap_or(Value::Null);

    let mut doc = json!({
        "@context": [BATTERY_CONTEXT, Value::Object(context)],
        "@type": harvested[LABEL_CELL_TYPE],
        "schema:version": version,
        "schema:productID": harvested[LABEL_CELL_ID],
        "schema:dateCreated": harvested[LABEL_ASSEMBLY_DATE],
        "schema:creator": {
            "@type": "schema:Person",
            "@id": operator_id,
            "schema:name": harvested[LABEL_OPERATOR],
        },
        "schema:manufacturer": {
            "@type": "schema:Organization",
            "@id": institution_id,
            "schema:name": harvested[LABEL_INSTITUTION],
        },
        "rdfs:comment": {},
    });

    let mut comments = Map::new();

    for row in &tables.schema {
        if row.value.is_empty() || row.link.as_deref() == Some(NOT_ONTOLOGIZE) {
            continue;
        }
        let value = row.value.to_json();
        let wrap = |source: OntologyError| {
            error!(
                "Row '{}': value {} with link '{}' failed: {}",
                row.metadata,
                value,
                row.link.as_deref().unwrap_or_default(),
                source
            );
            OntologyError::Build {
                value: render_value(&value),
                path: row.link.clone().unwrap_or_default(),
                source: Box::new(source),
            }
        };

        let link = match row.link.as_deref() {
            Some(COMMENT) => {
                comments.insert(row.metadata.clone(), value.clone());
                continue;
            }
            Some(link) => link,
            None => return Err(wrap(OntologyError::MissingLink(row.metadata.clone()))),
        };
        if row.unit == Unit::Missing {
            return Err(wrap(OntologyError::MissingUnit(render_value(&value))));
        }

        let path = LinkPath::parse(link).map_err(wrap)?;
        debug!("Placing '{}' = {} at {}", row.metadata, value, path);
        add_to_structure(&mut doc, &path, &value, &row.unit, tables)?;
    }

    comments.insert(
        "Converter version".to_string(),
        Value::String(env!("CARGO_PKG_VERSION").to_string()),
    );
    comments.insert(
        "Software credit".to_string(),
        Value::String(format!(
            "This JSON-LD was created using {} version {} and the schema version: {}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            render_value(&doc["schema:version"])
        )),
    );
    doc["rdfs:comment"] = Value::Object(comments);

    Ok(doc)
}

fn identified(
    tables: &OntologyTables,
    harvested: &Map<String, Value>,
    label: &str,
) -> Result<String, OntologyError> {
    harvested
        .get(label)
        .and_then(Value::as_str)
        .and_then(|name| tables.unique_id(name))
        .flatten()
        .map(str::to_string)
        .ok_or_else(|| OntologyError::MissingUniqueId(label.to_string()))
}

/// Read an ontology workbook and build its JSON-LD document
pub fn convert_workbook<P: AsRef<Path>>(path: P) -> Result<Value, OntologyError> {
    let path = path.as_ref();
    info!(
        "New conversion of {} started at {}",
        path.display(),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    let tables = OntologyTables::open(path)?;
    build_document(&tables)
}

/// Persist a document as pretty-printed UTF-8 JSON.
///
/// The file is written next to `path` and moved into place, so a failed write
/// never leaves a partial document behind.
pub fn write_jsonld<P: AsRef<Path>>(doc: &Value, path: P) -> Result<(), OntologyError> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir()?,
    };
    fs::create_dir_all(&dir)?;

    let temp = NamedTempFile::new_in(&dir)?;
    {
        let mut writer = BufWriter::new(temp.as_file());
        serde_json::to_writer_pretty(&mut writer, doc)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
    temp.persist(path).map_err(|e| e.error)?;
    info!("Wrote JSON-LD to {}", path.display());
    Ok(())
}
