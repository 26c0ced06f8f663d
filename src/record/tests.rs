use proptest::prelude::*;
use serde_json::{json, Value};

use super::*;

const SAMPLE_RECORD: &str = r#"{
    "metadata": {
        "sample_data": {
            "Sample ID": "240906_KIGR_GEN4_01",
            "Anode mass (mg)": 14.2,
            "Rack position": 3
        },
        "job_data": []
    }
}"#;

#[test]
fn test_resolve_nested_leaf() {
    let record = InstrumentRecord::from_json(SAMPLE_RECORD).unwrap();

    assert_eq!(
        record.get("metadata||sample_data||Sample ID").unwrap(),
        &json!("240906_KIGR_GEN4_01")
    );
    assert_eq!(
        record.get("metadata||sample_data||Anode mass (mg)").unwrap(),
        &json!(14.2)
    );
}

#[test]
fn test_resolve_custom_delimiter() {
    let tree = json!({"a": {"b": {"c": 1}}});
    assert_eq!(resolve(&tree, "a/b/c", "/").unwrap(), &json!(1));
}

#[test]
fn test_missing_segment_reports_segment() {
    let record = InstrumentRecord::from_json(SAMPLE_RECORD).unwrap();

    match record.get("metadata||sample_data||Cathode type") {
        Err(ResolveError::KeyLookup { segment, .. }) => assert_eq!(segment, "Cathode type"),
        other => panic!("expected key lookup error, got {:?}", other),
    }
    assert!(record.lookup("metadata||sample_data||Cathode type").is_none());
}

#[test]
fn test_descending_through_non_container_fails() {
    let record = InstrumentRecord::from_json(SAMPLE_RECORD).unwrap();

    assert!(record.get("metadata||sample_data||Sample ID||deeper").is_err());
    assert!(record.get("metadata||job_data||0").is_err());
}

#[test]
fn test_null_leaf_is_absent() {
    let record = InstrumentRecord::new(json!({"a": {"b": null}})).unwrap();
    assert!(record.get("a||b").is_ok());
    assert!(record.lookup("a||b").is_none());
}

#[test]
fn test_non_object_root_rejected() {
    assert!(matches!(
        InstrumentRecord::new(json!([1, 2, 3])),
        Err(ResolveError::NotAnObject)
    ));
}

fn insert_path(tree: &mut Value, segments: &[String], leaf: Value) {
    let mut current = tree;
    for segment in &segments[..segments.len() - 1] {
        current = current
            .as_object_mut()
            .unwrap()
            .entry(segment.clone())
            .or_insert_with(|| json!({}));
    }
    current
        .as_object_mut()
        .unwrap()
        .insert(segments[segments.len() - 1].clone(), leaf);
}

proptest! {
    #[test]
    fn prop_declared_paths_resolve(
        prefix in prop::collection::vec("[a-z_]{1,8}", 0..3),
        leaves in prop::collection::btree_map("[A-Z][a-z ()]{0,12}", any::<i32>(), 1..8),
    ) {
        let mut tree = json!({});
        let mut declared = Vec::new();
        for (label, value) in &leaves {
            let mut segments = vec!["root".to_string()];
            segments.extend(prefix.iter().cloned());
            segments.push(label.clone());
            insert_path(&mut tree, &segments, json!(value));
            declared.push((segments.join(PATH_DELIMITER), json!(value)));
        }

        let record = InstrumentRecord::new(tree).unwrap();
        for (path, expected) in &declared {
            prop_assert_eq!(record.get(path).unwrap(), expected);
        }
        let missing = format!("root{}__absent__", PATH_DELIMITER);
        prop_assert!(record.lookup(&missing).is_none());
    }
}
