//! # Instrument Record
//!
//! Read-only view over the JSON export produced by the cycling instrument.
//! Values are addressed by delimited paths such as
//! `metadata||sample_data||Sample ID`.

mod error;

#[cfg(test)]
mod tests;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde_json::Value;

pub use error::ResolveError;

/// Delimiter used by the mapping tables to address instrument fields
pub const PATH_DELIMITER: &str = "||";

/// Resolve `path` against `tree`, descending one `delimiter`-separated segment at a time.
///
/// Every segment must name a key of an object; the addressed value may be of
/// any JSON type.
pub fn resolve<'a>(
    tree: &'a Value,
    path: &str,
    delimiter: &str,
) -> Result<&'a Value, ResolveError> {
    let mut current = tree;
    for segment in path.split(delimiter) {
        current = current
            .as_object()
            .and_then(|map| map.get(segment))
            .ok_or_else(|| ResolveError::KeyLookup {
                path: path.to_string(),
                segment: segment.to_string(),
            })?;
    }
    Ok(current)
}

/// Nested instrument export, immutable once loaded
#[derive(Debug, Clone)]
pub struct InstrumentRecord {
    root: Value,
}

impl InstrumentRecord {
    /// Wrap an already parsed JSON tree. The root must be an object.
    pub fn new(root: Value) -> Result<Self, ResolveError> {
        if !root.is_object() {
            return Err(ResolveError::NotAnObject);
        }
        Ok(Self { root })
    }

    /// Load an instrument record from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ResolveError> {
        let reader = BufReader::new(File::open(path)?);
        Self::new(serde_json::from_reader(reader)?)
    }

    /// Parse an instrument record from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ResolveError> {
        Self::new(serde_json::from_str(json)?)
    }

    /// Resolve a `||`-delimited path
    pub fn get(&self, path: &str) -> Result<&Value, ResolveError> {
        resolve(&self.root, path, PATH_DELIMITER)
    }

    /// Resolve a path, mapping lookup failures to `None`.
    ///
    /// JSON `null` leaves are also reported as `None`.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        self.get(path).ok().filter(|v| !v.is_null())
    }

    /// The underlying JSON tree
    pub fn as_value(&self) -> &Value {
        &self.root
    }
}
