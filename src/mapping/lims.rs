use super::FieldMapping;

macro_rules! sample_field {
    ($label:literal, $key:literal, $code:literal) => {
        FieldMapping {
            label: $label,
            instrument_path: concat!("metadata||sample_data||", $key),
            lims_code: $code,
        }
    };
}

/// Instrument fields written as properties on the LIMS experiment
pub static LIMS_PROPERTIES: &[FieldMapping] = &[
    sample_field!("Sample ID", "Sample ID", "sample_id"),
    sample_field!("Run ID", "Run ID", "run_id"),
    sample_field!("Actual N:P Ratio", "Actual N:P ratio", "actual_np_ratio"),
    sample_field!("Rack Position", "Rack position", "rack_position"),
    sample_field!("Separator", "Separator", "separator"),
    sample_field!("Electrolyte Name", "Electrolyte name", "electrolyte_name"),
    sample_field!("Electrolyte Description", "Electrolyte description", "electrolyte_description"),
    sample_field!("Electrolyte Position", "Electrolyte position", "electrolyte_position"),
    sample_field!("Electrolyte Amount (uL)", "Electrolyte amount (uL)", "electrolyte_amount_ul"),
    sample_field!(
        "Electrolyte Dispense Order",
        "Electrolyte dispense order",
        "electrolyte_dispense_order"
    ),
    sample_field!(
        "Electrolyte Before Separator (uL)",
        "Electrolyte amount before separator (uL)",
        "electrolyte_amount_before_separator"
    ),
    sample_field!(
        "Electrolyte After Separator (uL)",
        "Electrolyte amount after separator (uL)",
        "electrolyte_amount_after_separator"
    ),
    sample_field!("Anode Type", "Anode type", "anode_type"),
    sample_field!("Anode Description", "Anode description", "anode_description"),
    sample_field!("Anode Diameter (mm)", "Anode diameter (mm)", "anode_diameter_mm"),
    sample_field!("Anode Mass (mg)", "Anode mass (mg)", "anode_mass_mg"),
    sample_field!(
        "Anode Current Collector Mass (mg)",
        "Anode current collector mass (mg)",
        "anode_current_collector_mass_mg"
    ),
    sample_field!(
        "Anode Active Material Fraction",
        "Anode active material mass fraction",
        "anode_active_material_mass_fraction"
    ),
    sample_field!(
        "Anode Active Material Mass (mg)",
        "Anode active material mass (mg)",
        "anode_active_material_mass_mg"
    ),
    sample_field!(
        "Anode C-Rate Areal Capacity (mAh/cm²)",
        "Anode C-rate definition areal capacity (mAh/cm²)",
        "anode_crate_definition_areal_capacity"
    ),
    sample_field!(
        "Anode Balancing Specific Capacity (mAh/g)",
        "Anode balancing specific capacity (mAh/g)",
        "anode_balancing_specific_capacity"
    ),
    sample_field!("Cathode Type", "Cathode type", "cathode_type"),
    sample_field!("Cathode Description", "Cathode description", "cathode_description"),
    sample_field!("Cathode Diameter (mm)", "Cathode diameter (mm)", "cathode_diameter_mm"),
    sample_field!("Cathode Mass (mg)", "Cathode mass (mg)", "cathode_mass_mg"),
    sample_field!(
        "Cathode Active Material Mass (mg)",
        "Cathode active material mass (mg)",
        "cathode_active_material_mass_mg"
    ),
    sample_field!(
        "Cathode C-Rate Areal Capacity (mAh/cm²)",
        "Cathode C-rate definition areal capacity (mAh/cm²)",
        "cathode_crate_definition_areal_capacity"
    ),
    sample_field!(
        "Cathode Balancing Specific Capacity (mAh/g)",
        "Cathode balancing specific capacity (mAh/g)",
        "cathode_balancing_specific_capacity"
    ),
    sample_field!("Casing Type", "Casing type", "casing_type"),
    sample_field!("Separator Diameter (mm)", "Separator diameter (mm)", "separator_diameter_mm"),
    sample_field!("Spacer (mm)", "Spacer (mm)", "spacer_mm"),
];
