//! Ontology path interpreter.

use log::{error, trace};
use serde_json::{Map, Value};

use super::link::{LinkPath, Step};
use super::tables::{render_value, OntologyTables, Unit};
use super::OntologyError;

const TYPE_KEY: &str = "@type";
const ID_KEY: &str = "@id";
const REVERSE_KEY: &str = "@reverse";
const COMMENT_KEY: &str = "rdfs:comment";

/// Place one schema row into `doc`.
///
/// Path depth is overloaded by the template: the same link grammar encodes a
/// literal leaf, a measured quantity, or an intermediate typed node. Which one
/// a row means is decided by the position of each segment and by the row's
/// unit:
///
/// | position                      | unit      | effect                                  |
/// |-------------------------------|-----------|-----------------------------------------|
/// | only segment                  | `No Unit` | literal on the child node               |
/// | second-to-last                | a unit    | quantity node under the segment key     |
/// | second-to-last                | `No Unit` | literal on the final segment's node     |
/// | last                          | `No Unit` | literal on the current node             |
/// | anything else                 |           | descend, reconciling connector `@type`  |
///
/// A literal is either an identified entity (`@type`, plus `@id` where known)
/// or an `rdfs:comment`. A `rev|` final segment puts it under `@reverse`.
///
/// Any failure is wrapped in [`OntologyError::Build`] naming the row's value
/// and link.
pub fn add_to_structure(
    doc: &mut Value,
    path: &LinkPath,
    value: &Value,
    unit: &Unit,
    tables: &OntologyTables,
) -> Result<(), OntologyError> {
    walk(doc, path, value, unit, tables).map_err(|source| {
        error!("Failed to place value {} at '{}': {}", value, path, source);
        OntologyError::Build {
            value: render_value(value),
            path: path.to_string(),
            source: Box::new(source),
        }
    })
}

fn object_mut<'a>(
    node: &'a mut Value,
    segment: &str,
) -> Result<&'a mut Map<String, Value>, OntologyError> {
    let kind = json_kind(node);
    node.as_object_mut().ok_or_else(|| OntologyError::UnexpectedNode {
        segment: segment.to_string(),
        reason: format!("parent is {}, not an object", kind),
    })
}

fn json_kind(node: &Value) -> &'static str {
    match node {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

fn walk(
    doc: &mut Value,
    path: &LinkPath,
    value: &Value,
    unit: &Unit,
    tables: &OntologyTables,
) -> Result<(), OntologyError> {
    let steps = path.steps();
    let len = steps.len();
    let mut current = doc;

    for (idx, step) in steps.iter().enumerate() {
        let part = match step {
            Step::Plain(name) => name.as_str(),
            Step::Reverse(name) => {
                trace!("{}: entering @reverse before '{}'", path, name);
                current = object_mut(current, name)?
                    .entry(REVERSE_KEY)
                    .or_insert_with(|| Value::Object(Map::new()));
                name.as_str()
            }
            Step::Type(name) => {
                trace!("{}: setting @type '{}'", path, name);
                object_mut(current, name)?
                    .insert(TYPE_KEY.to_string(), Value::String(name.clone()));
                return Ok(());
            }
        };

        let is_last = idx + 1 == len;
        let is_second_last = idx + 2 == len;
        trace!(
            "{}: segment '{}' (last: {}, second-last: {}), value {}",
            path,
            part,
            is_last,
            is_second_last,
            value
        );

        let node = object_mut(current, part)?;
        if !node.contains_key(part) {
            node.insert(part.to_string(), tables.seed_node(part));
        }

        if len == 1 && unit.is_no_unit() {
            let child = node.get_mut(part).map(|c| object_mut(c, part)).transpose()?;
            if let Some(child) = child {
                apply_literal(child, value, tables, false);
            }
            return Ok(());
        }

        if is_second_last && !unit.is_no_unit() {
            let unit_key = tables.unit_key(unit, value)?;
            let quantity_type = path.last_name().unwrap_or(part);
            attach_quantity(node, part, quantity(quantity_type, value, unit_key));
            return Ok(());
        }

        if is_last && unit.is_no_unit() {
            apply_literal(node, value, tables, false);
            return Ok(());
        }

        if is_last {
            return Err(OntologyError::UnexpectedNode {
                segment: part.to_string(),
                reason: "a measured value needs a quantity type after its key".to_string(),
            });
        }

        current = match node.get_mut(part) {
            Some(child) => child,
            None => {
                return Err(OntologyError::UnexpectedNode {
                    segment: part.to_string(),
                    reason: "node vanished while descending".to_string(),
                })
            }
        };

        if let (Some(ty), Some(obj)) = (tables.connector_type(part), current.as_object_mut()) {
            add_type(obj, Value::String(ty.to_string()));
        }

        if is_second_last && unit.is_no_unit() && !matches!(steps[idx + 1], Step::Type(_)) {
            let next_step = &steps[idx + 1];
            let next = next_step.name();
            let holder = match current {
                Value::Object(map) => map,
                Value::Array(list) => {
                    list.push(Value::Object(Map::new()));
                    list.last_mut()
                        .and_then(Value::as_object_mut)
                        .ok_or_else(|| OntologyError::UnexpectedNode {
                            segment: next.to_string(),
                            reason: "list entry could not be created".to_string(),
                        })?
                }
                other => {
                    return Err(OntologyError::UnexpectedNode {
                        segment: next.to_string(),
                        reason: format!("parent is {}", json_kind(other)),
                    })
                }
            };
            let holder = match next_step {
                Step::Reverse(_) => {
                    trace!("{}: entering @reverse before '{}'", path, next);
                    let reverse = holder
                        .entry(REVERSE_KEY)
                        .or_insert_with(|| Value::Object(Map::new()));
                    object_mut(reverse, next)?
                }
                _ => holder,
            };
            let target = holder
                .entry(next.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            apply_literal(object_mut(target, next)?, value, tables, true);
            return Ok(());
        }
    }

    Ok(())
}

/// Identified entity → `@type` (and `@id` when `with_id`), otherwise `rdfs:comment`
fn apply_literal(
    node: &mut Map<String, Value>,
    value: &Value,
    tables: &OntologyTables,
    with_id: bool,
) {
    match value.as_str().and_then(|v| tables.unique_id(v)) {
        Some(id) => {
            if with_id {
                if let Some(id) = id {
                    node.insert(ID_KEY.to_string(), Value::String(id.to_string()));
                }
            }
            add_type(node, value.clone());
        }
        None => {
            node.insert(COMMENT_KEY.to_string(), value.clone());
        }
    }
}

/// Add `ty` to the node's `@type`, promoting to a list when a different type is present
fn add_type(node: &mut Map<String, Value>, ty: Value) {
    match node.get_mut(TYPE_KEY) {
        None => {
            node.insert(TYPE_KEY.to_string(), ty);
        }
        Some(Value::Array(types)) => {
            if !types.contains(&ty) {
                types.push(ty);
            }
        }
        Some(existing) => {
            if *existing != ty {
                let previous = existing.take();
                *existing = Value::Array(vec![previous, ty]);
            }
        }
    }
}

fn quantity(quantity_type: &str, value: &Value, unit_key: &str) -> Value {
    let mut numerical = Map::new();
    numerical.insert(TYPE_KEY.to_string(), Value::String("emmo:Real".to_string()));
    numerical.insert("hasNumericalValue".to_string(), value.clone());

    let mut node = Map::new();
    node.insert(TYPE_KEY.to_string(), Value::String(quantity_type.to_string()));
    node.insert("hasNumericalPart".to_string(), Value::Object(numerical));
    node.insert(
        "hasMeasurementUnit".to_string(),
        Value::String(unit_key.to_string()),
    );
    Value::Object(node)
}

fn is_empty_object(node: &Value) -> bool {
    node.as_object().is_some_and(Map::is_empty)
}

/// Attach a quantity under `key`: an empty placeholder is replaced, a single
/// entry is promoted to a list, a list is appended to
fn attach_quantity(node: &mut Map<String, Value>, key: &str, entry: Value) {
    match node.get_mut(key) {
        Some(Value::Array(entries)) => {
            entries.retain(|e| !is_empty_object(e));
            entries.push(entry);
        }
        Some(existing) if is_empty_object(existing) => *existing = entry,
        Some(existing) => {
            let previous = existing.take();
            *existing = Value::Array(vec![previous, entry]);
        }
        None => {
            node.insert(key.to_string(), entry);
        }
    }
}
