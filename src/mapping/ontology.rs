use super::OntologyField;

/// Schema label holding the cell identifier
pub const LABEL_CELL_ID: &str = "Cell ID";

/// Schema label holding the operator's full name
pub const LABEL_OPERATOR: &str = "Scientist/technician/operator";

/// Schema label holding the assembly date (`DD/MM/YYYY`)
pub const LABEL_ASSEMBLY_DATE: &str = "Date of cell assembly";

macro_rules! sample_field {
    ($label:expr, $key:literal) => {
        OntologyField {
            label: $label,
            instrument_path: concat!("metadata||sample_data||", $key),
        }
    };
}

/// Instrument fields copied into the `Schema` sheet of the ontology template
pub static ONTOLOGY_FIELDS: &[OntologyField] = &[
    sample_field!(LABEL_CELL_ID, "Sample ID"),
    sample_field!("Separator manufacturer", "Separator"),
    sample_field!("Electrolyte manufacturer", "Electrolyte name"),
    sample_field!("Negative electrode coating active material", "Anode type"),
    sample_field!("Negative electrode diameter", "Anode diameter (mm)"),
    sample_field!(
        "Negative electrode coating active material mass fraction",
        "Anode active material mass fraction"
    ),
    sample_field!("Positive electrode coating active material", "Cathode type"),
    sample_field!("Positive electrode diameter", "Cathode diameter (mm)"),
    sample_field!(
        "Positive electrode coating active material mass fraction",
        "Cathode active material mass fraction"
    ),
    sample_field!("Cell case", "Casing type"),
    sample_field!("Separator diameter", "Separator diameter (mm)"),
];
