use std::collections::HashMap;

use serde_json::{json, Value};

use super::*;

fn record(sample_id: Value, timestamp: Value) -> InstrumentRecord {
    InstrumentRecord::new(json!({
        "metadata": {
            "sample_data": {
                "Sample ID": sample_id,
                "Assembly timestamp": timestamp,
                "Separator": "Whatman GF/D",
                "Anode diameter (mm)": 15.0,
                "Casing type": "CR2032"
            }
        }
    }))
    .unwrap()
}

#[test]
fn test_operator_and_date_with_empty_lookup() {
    let record = record(json!("240906_KIGR_GEN4_01"), json!("2024-09-06 10:00:00"));
    let names = HashMap::new();

    let metadata = Curator::default().with_user_names(&names).curate(&record).unwrap();

    assert_eq!(metadata.get_str("Scientist/technician/operator"), Some("KIGR"));
    assert_eq!(metadata.get_str("Date of cell assembly"), Some("06/09/2024"));
    assert_eq!(metadata.get_str("Cell ID"), Some("240906_KIGR_GEN4_01"));
}

#[test]
fn test_operator_full_name_lookup() {
    let record = record(json!("240906_KIGR_GEN4_01"), json!("2024-09-06 10:00:00"));
    let mut names = HashMap::new();
    names.insert("KIGR".to_string(), "Kira Grimm".to_string());

    let metadata = Curator::default().with_user_names(&names).curate(&record).unwrap();
    assert_eq!(metadata.get_str(LABEL_OPERATOR), Some("Kira Grimm"));
}

#[test]
fn test_missing_fields_are_explicit_nulls() {
    let record = record(json!("240906_KIGR_GEN4_01"), json!("2024-09-06 10:00:00"));
    let metadata = Curator::default().curate(&record).unwrap();

    assert_eq!(metadata.get("Positive electrode diameter"), Some(&Value::Null));
    assert_eq!(metadata.get("Negative electrode diameter"), Some(&json!(15.0)));
    assert!(metadata.missing().any(|l| l == "Positive electrode coating active material"));
    assert!(metadata.get("Not a mapped label").is_none());
    assert_eq!(metadata.len(), ONTOLOGY_FIELDS.len() + 2);
}

#[test]
fn test_unparsable_date_is_fatal() {
    let record = record(json!("240906_KIGR_GEN4_01"), json!("not-a-date"));
    match Curator::default().curate(&record) {
        Err(CurateError::DateExtraction { path, .. }) => {
            assert_eq!(path, DEFAULT_ASSEMBLY_TIMESTAMP_PATH)
        }
        other => panic!("expected date extraction error, got {:?}", other),
    }
}

#[test]
fn test_absent_date_is_fatal() {
    let record = InstrumentRecord::new(json!({
        "metadata": {"sample_data": {"Sample ID": "240906_KIGR_GEN4_01"}}
    }))
    .unwrap();
    assert!(matches!(
        Curator::default().curate(&record),
        Err(CurateError::DateExtraction { .. })
    ));
}

#[test]
fn test_missing_cell_id_is_fatal() {
    let record = InstrumentRecord::new(json!({
        "metadata": {"sample_data": {"Assembly timestamp": "2024-09-06 10:00:00"}}
    }))
    .unwrap();
    assert!(matches!(
        Curator::default().curate(&record),
        Err(CurateError::MissingField(_))
    ));
}

#[test]
fn test_cell_id_without_operator_code() {
    let record = record(json!("240906"), json!("2024-09-06 10:00:00"));
    assert!(matches!(
        Curator::default().curate(&record),
        Err(CurateError::MalformedCellId(_))
    ));
}

#[test]
fn test_custom_timestamp_path() {
    let record = InstrumentRecord::new(json!({
        "metadata": {"sample_data": {
            "Sample ID": "241001_ABCD_X",
            "Last changed timestamp": "2024-10-01 23:59:59"
        }}
    }))
    .unwrap();

    let metadata = Curator::default()
        .with_assembly_timestamp_path("metadata||sample_data||Last changed timestamp")
        .curate(&record)
        .unwrap();
    assert_eq!(metadata.get_str(LABEL_ASSEMBLY_DATE), Some("01/10/2024"));
}
