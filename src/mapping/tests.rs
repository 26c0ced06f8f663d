use std::collections::HashSet;

use super::*;
use crate::record::PATH_DELIMITER;

#[test]
fn test_lims_codes_and_labels_unique() {
    let codes: HashSet<_> = LIMS_PROPERTIES.iter().map(|m| m.lims_code).collect();
    let labels: HashSet<_> = LIMS_PROPERTIES.iter().map(|m| m.label).collect();
    assert_eq!(codes.len(), LIMS_PROPERTIES.len());
    assert_eq!(labels.len(), LIMS_PROPERTIES.len());
}

#[test]
fn test_ontology_labels_unique() {
    let labels: HashSet<_> = ONTOLOGY_FIELDS.iter().map(|f| f.label).collect();
    assert_eq!(labels.len(), ONTOLOGY_FIELDS.len());
}

#[test]
fn test_paths_address_sample_data() {
    for path in LIMS_PROPERTIES
        .iter()
        .map(|m| m.instrument_path)
        .chain(ONTOLOGY_FIELDS.iter().map(|f| f.instrument_path))
    {
        let segments: Vec<_> = path.split(PATH_DELIMITER).collect();
        assert_eq!(segments.len(), 3, "{}", path);
        assert_eq!(&segments[..2], &["metadata", "sample_data"]);
    }
}

#[test]
fn test_lookups() {
    assert_eq!(
        lims_property("anode_mass_mg").map(|m| m.instrument_path),
        Some("metadata||sample_data||Anode mass (mg)")
    );
    assert_eq!(
        ontology_field(LABEL_CELL_ID).map(|f| f.instrument_path),
        Some("metadata||sample_data||Sample ID")
    );
    assert!(lims_property("does_not_exist").is_none());
}
