//! The flat per-specimen output row.

use serde::Serialize;

/// One extracted row per specimen page.
///
/// All size and height bounds are centimeters; elevation bounds are meters.
/// Text traits default to empty strings, numeric bounds to `None`; the
/// record is handed to an external CSV/JSON serializer as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Record {
    pub taxon: String,

    pub plant_height_min_cm: Option<f64>,
    pub plant_height_low_cm: Option<f64>,
    pub plant_height_high_cm: Option<f64>,
    pub plant_height_max_cm: Option<f64>,
    pub deciduousness: String,

    pub leaf_shape: String,
    pub leaf_length_min_cm: Option<f64>,
    pub leaf_length_low_cm: Option<f64>,
    pub leaf_length_high_cm: Option<f64>,
    pub leaf_length_max_cm: Option<f64>,
    pub leaf_width_min_cm: Option<f64>,
    pub leaf_width_low_cm: Option<f64>,
    pub leaf_width_high_cm: Option<f64>,
    pub leaf_width_max_cm: Option<f64>,
    pub leaf_thickness_min_cm: Option<f64>,
    pub leaf_thickness_low_cm: Option<f64>,
    pub leaf_thickness_high_cm: Option<f64>,
    pub leaf_thickness_max_cm: Option<f64>,

    pub fruit_type: String,
    pub fruit_length_min_cm: Option<f64>,
    pub fruit_length_low_cm: Option<f64>,
    pub fruit_length_high_cm: Option<f64>,
    pub fruit_length_max_cm: Option<f64>,
    pub fruit_width_min_cm: Option<f64>,
    pub fruit_width_low_cm: Option<f64>,
    pub fruit_width_high_cm: Option<f64>,
    pub fruit_width_max_cm: Option<f64>,
    pub fruit_diameter_min_cm: Option<f64>,
    pub fruit_diameter_low_cm: Option<f64>,
    pub fruit_diameter_high_cm: Option<f64>,
    pub fruit_diameter_max_cm: Option<f64>,

    pub seed_length_min_cm: Option<f64>,
    pub seed_length_low_cm: Option<f64>,
    pub seed_length_high_cm: Option<f64>,
    pub seed_length_max_cm: Option<f64>,
    pub seed_width_min_cm: Option<f64>,
    pub seed_width_low_cm: Option<f64>,
    pub seed_width_high_cm: Option<f64>,
    pub seed_width_max_cm: Option<f64>,
    pub seed_diameter_min_cm: Option<f64>,
    pub seed_diameter_low_cm: Option<f64>,
    pub seed_diameter_high_cm: Option<f64>,
    pub seed_diameter_max_cm: Option<f64>,

    pub flowering_time: String,
    pub habitat: String,
    pub elevation_min_m: Option<f64>,
    pub elevation_max_m: Option<f64>,
}

impl Record {
    pub fn new(taxon: impl Into<String>) -> Self {
        Record {
            taxon: taxon.into(),
            ..Record::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_carries_only_the_taxon() {
        let rec = Record::new("Carex aurea");
        assert_eq!(rec.taxon, "Carex aurea");
        assert_eq!(rec.plant_height_low_cm, None);
        assert_eq!(rec.deciduousness, "");
    }

    #[test]
    fn record_serializes_with_flat_field_names() {
        let rec = Record {
            taxon: "Carex aurea".into(),
            leaf_length_low_cm: Some(1.5),
            ..Record::default()
        };
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["taxon"], "Carex aurea");
        assert_eq!(json["leaf_length_low_cm"], 1.5);
        assert!(json["leaf_length_high_cm"].is_null());
    }
}
