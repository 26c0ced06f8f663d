#![no_main]

use libfuzzer_sys::fuzz_target;
use ontocell::jsonld::{add_to_structure, LinkPath, OntologyTables, Unit};
use serde_json::{json, Value};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // First line is the link, second the unit, the rest the value
    let mut parts = text.splitn(3, '\n');
    let link = parts.next().unwrap_or_default();
    let unit = match parts.next() {
        None | Some("") => Unit::NoUnit,
        Some(label) => Unit::Label(label.to_string()),
    };
    let value = Value::String(parts.next().unwrap_or_default().to_string());

    let Ok(path) = LinkPath::parse(link) else {
        return;
    };

    let mut tables = OntologyTables::default();
    tables.units.insert("mg".to_string(), "emmo:Milligram".to_string());
    tables.connectors.insert("hasCase".to_string(), Some("CoinCase".to_string()));

    // Placing the same row twice exercises list promotion; errors are fine,
    // panics are not
    let mut doc = json!({ "rdfs:comment": {} });
    let _ = add_to_structure(&mut doc, &path, &value, &unit, &tables);
    let _ = add_to_structure(&mut doc, &path, &value, &unit, &tables);
});
