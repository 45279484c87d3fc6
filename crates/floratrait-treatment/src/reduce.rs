//! Per-page reduction: treatment fragments → one flat record.
//!
//! Each fragment is dispatched to the trait operations registered for its
//! leading term. An operation runs at most once per page: it is marked
//! used when it reports a usable value, so a later fragment with the same
//! operation can still fill fields an earlier barren fragment left empty.
//! The metadata panel is parsed after dispatch and overwrites its fields
//! without gating.

use crate::dispatch::{self, TraitOp};
use crate::treatment::{InfoPanel, Treatment};
use ahash::AHashSet;
use floratrait_common::{Axis, Dimension, Record, Result};
use floratrait_grammar::{Grammar, TermLabel};
use tracing::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Batches larger than this fan out to parallel workers.
#[cfg(feature = "parallel")]
const PARALLEL_THRESHOLD: usize = 10;

/// One page's pre-extracted inputs.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub taxon: String,
    pub treatment: Treatment,
    pub info: Option<InfoPanel>,
}

/// The per-run extractor: a compiled grammar shared read-only across
/// pages. Pages are independent, so batches may run on parallel workers.
pub struct Extractor {
    grammar: Grammar,
}

impl Extractor {
    pub fn new(grammar: Grammar) -> Self {
        Extractor { grammar }
    }

    /// Extractor over the built-in term tables.
    pub fn builtin() -> Result<Self> {
        Ok(Extractor::new(Grammar::builtin()?))
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Process one page into a record. A page with an empty treatment or
    /// a missing panel yields a partial record, never an error.
    pub fn extract_page(&self, page: &Page) -> Record {
        let mut record = Record::new(&page.taxon);
        self.parse_treatment(&page.treatment, &mut record);
        if let Some(info) = &page.info {
            self.parse_info(info, &mut record);
        }
        record
    }

    /// Process many pages; parallel when the batch is large enough.
    pub fn extract_batch(&self, pages: &[Page]) -> Vec<Record> {
        #[cfg(feature = "parallel")]
        {
            if pages.len() > PARALLEL_THRESHOLD {
                let records: Vec<Record> =
                    pages.par_iter().map(|page| self.extract_page(page)).collect();
                info!(pages = pages.len(), "batch extraction finished");
                return records;
            }
        }
        let records = pages.iter().map(|page| self.extract_page(page)).collect();
        info!(pages = pages.len(), "batch extraction finished");
        records
    }

    /// Dispatch every fragment to its registered operations.
    pub fn parse_treatment(&self, treatment: &Treatment, record: &mut Record) {
        let mut used: AHashSet<TraitOp> = AHashSet::new();

        for (key, text) in treatment.iter() {
            let Some(ops) = dispatch::ops_for(key) else {
                if !dispatch::is_noise(key) {
                    debug!(key, "unregistered treatment key");
                }
                continue;
            };
            for op in ops {
                if used.contains(op) {
                    continue;
                }
                if self.apply(*op, key, text, record) {
                    used.insert(*op);
                }
            }
        }
    }

    fn apply(&self, op: TraitOp, key: &str, text: &str, record: &mut Record) -> bool {
        match op {
            TraitOp::PlantHeight => self.plant_height(key, text, record),
            TraitOp::Deciduousness => self.plant_deciduousness(key, text, record),
            TraitOp::LeafSize => self.leaf_size(key, text, record),
            TraitOp::LeafShape => self.leaf_shape(key, text, record),
            TraitOp::FruitSize => self.fruit_size(key, text, record),
            TraitOp::FruitType => self.fruit_type(key, text, record),
            TraitOp::SeedSize => self.seed_size(key, text, record),
        }
    }

    fn plant_height(&self, _key: &str, text: &str, record: &mut Record) -> bool {
        let parse = self.grammar.parse(text);
        let size = parse
            .first_size()
            .and_then(|s| s.convert_to_cm(self.grammar.vocab()));

        let empty = Dimension::default();
        let length = size
            .as_ref()
            .and_then(|s| s.dim(&[Axis::Length, Axis::Height]))
            .unwrap_or(&empty);

        record.plant_height_min_cm = length.min;
        record.plant_height_low_cm = length.low;
        record.plant_height_high_cm = length.high;
        record.plant_height_max_cm = length.max;

        length.has_value()
    }

    fn plant_deciduousness(&self, key: &str, text: &str, record: &mut Record) -> bool {
        record.deciduousness = self
            .grammar
            .vocab_hits(TermLabel::LeafDuration, Some(key), text);
        !record.deciduousness.is_empty()
    }

    fn leaf_size(&self, _key: &str, text: &str, record: &mut Record) -> bool {
        let parse = self.grammar.parse(text);
        let size = parse
            .size_for("leaf")
            .and_then(|s| s.convert_to_cm(self.grammar.vocab()));

        let empty = Dimension::default();
        let length = size
            .as_ref()
            .and_then(|s| s.dim(&[Axis::Length]))
            .unwrap_or(&empty);
        let width = size
            .as_ref()
            .and_then(|s| s.dim(&[Axis::Width]))
            .unwrap_or(&empty);
        let thickness = size
            .as_ref()
            .and_then(|s| s.dim(&[Axis::Thickness]))
            .unwrap_or(&empty);

        record.leaf_length_min_cm = length.min;
        record.leaf_length_low_cm = length.low;
        record.leaf_length_high_cm = length.high;
        record.leaf_length_max_cm = length.max;

        record.leaf_width_min_cm = width.min;
        record.leaf_width_low_cm = width.low;
        record.leaf_width_high_cm = width.high;
        record.leaf_width_max_cm = width.max;

        record.leaf_thickness_min_cm = thickness.min;
        record.leaf_thickness_low_cm = thickness.low;
        record.leaf_thickness_high_cm = thickness.high;
        record.leaf_thickness_max_cm = thickness.max;

        length.has_value() || width.has_value() || thickness.has_value()
    }

    fn leaf_shape(&self, _key: &str, text: &str, record: &mut Record) -> bool {
        record.leaf_shape = self.grammar.vocab_hits(TermLabel::Shape, None, text);
        !record.leaf_shape.is_empty()
    }

    fn fruit_size(&self, _key: &str, text: &str, record: &mut Record) -> bool {
        let parse = self.grammar.parse(text);
        let size = parse
            .size_for("fruit")
            .and_then(|s| s.convert_to_cm(self.grammar.vocab()));

        let empty = Dimension::default();
        let length = size
            .as_ref()
            .and_then(|s| s.dim(&[Axis::Length, Axis::Height]))
            .unwrap_or(&empty);
        let width = size
            .as_ref()
            .and_then(|s| s.dim(&[Axis::Width]))
            .unwrap_or(&empty);
        let diameter = size
            .as_ref()
            .and_then(|s| s.dim(&[Axis::Diameter]))
            .unwrap_or(&empty);

        record.fruit_length_min_cm = length.min;
        record.fruit_length_low_cm = length.low;
        record.fruit_length_high_cm = length.high;
        record.fruit_length_max_cm = length.max;

        record.fruit_width_min_cm = width.min;
        record.fruit_width_low_cm = width.low;
        record.fruit_width_high_cm = width.high;
        record.fruit_width_max_cm = width.max;

        record.fruit_diameter_min_cm = diameter.min;
        record.fruit_diameter_low_cm = diameter.low;
        record.fruit_diameter_high_cm = diameter.high;
        record.fruit_diameter_max_cm = diameter.max;

        length.has_value() || width.has_value()
    }

    fn fruit_type(&self, key: &str, text: &str, record: &mut Record) -> bool {
        record.fruit_type = self
            .grammar
            .vocab_hits(TermLabel::FruitType, Some(key), text);
        !record.fruit_type.is_empty()
    }

    fn seed_size(&self, _key: &str, text: &str, record: &mut Record) -> bool {
        let parse = self.grammar.parse(text);
        let size = parse
            .size_for("seed")
            .and_then(|s| s.convert_to_cm(self.grammar.vocab()));

        let empty = Dimension::default();
        let length = size
            .as_ref()
            .and_then(|s| s.dim(&[Axis::Length]))
            .unwrap_or(&empty);
        let width = size
            .as_ref()
            .and_then(|s| s.dim(&[Axis::Width]))
            .unwrap_or(&empty);
        let diameter = size
            .as_ref()
            .and_then(|s| s.dim(&[Axis::Diameter]))
            .unwrap_or(&empty);

        record.seed_length_min_cm = length.min;
        record.seed_length_low_cm = length.low;
        record.seed_length_high_cm = length.high;
        record.seed_length_max_cm = length.max;

        record.seed_width_min_cm = width.min;
        record.seed_width_low_cm = width.low;
        record.seed_width_high_cm = width.high;
        record.seed_width_max_cm = width.max;

        record.seed_diameter_min_cm = diameter.min;
        record.seed_diameter_low_cm = diameter.low;
        record.seed_diameter_high_cm = diameter.high;
        record.seed_diameter_max_cm = diameter.max;

        length.has_value() || width.has_value()
    }

    /// Metadata-panel fields overwrite their record fields unconditionally.
    pub fn parse_info(&self, info: &InfoPanel, record: &mut Record) {
        record.flowering_time = info.get("Phenology").unwrap_or_default().to_string();
        record.habitat = info.get("Habitat").unwrap_or_default().to_string();

        // Elevation stays in meters: the size grammar reads the bounds,
        // but no cm conversion applies.
        let text = info.get("Elevation").unwrap_or_default();
        let parse = self.grammar.parse(text);
        let empty = Dimension::default();
        let elevation = parse
            .first_size()
            .and_then(|s| s.dim(&[Axis::Length]))
            .unwrap_or(&empty);
        record.elevation_min_m = elevation.low;
        record.elevation_max_m = elevation.high;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> Extractor {
        Extractor::builtin().unwrap()
    }

    fn treatment(pairs: &[(&str, &str)]) -> Treatment {
        pairs
            .iter()
            .map(|(k, t)| (k.to_string(), t.to_string()))
            .collect()
    }

    #[test]
    fn culm_and_annual_fragments_fill_height_then_deciduousness() {
        let ex = extractor();
        let mut record = Record::new("Test taxon");
        ex.parse_treatment(
            &treatment(&[("Culm", "10mm"), ("Annual", "evergreen 4mm")]),
            &mut record,
        );

        assert_eq!(record.deciduousness, "evergreen");
        assert_eq!(record.plant_height_low_cm, Some(1.0));
        assert_eq!(record.plant_height_min_cm, None);
        assert_eq!(record.plant_height_high_cm, None);
        assert_eq!(record.plant_height_max_cm, None);
    }

    #[test]
    fn a_found_operation_never_runs_twice() {
        let ex = extractor();
        let mut record = Record::new("Test taxon");
        ex.parse_treatment(
            &treatment(&[("Culm", "10mm"), ("Annual", "4mm")]),
            &mut record,
        );
        // The second fragment's 4mm is skipped regardless of content.
        assert_eq!(record.plant_height_low_cm, Some(1.0));
    }

    #[test]
    fn a_barren_fragment_leaves_the_operation_available() {
        let ex = extractor();
        let mut record = Record::new("Test taxon");
        ex.parse_treatment(
            &treatment(&[("Plants", "deciduous shrubs"), ("Culms", "30-60 cm")]),
            &mut record,
        );
        assert_eq!(record.deciduousness, "deciduous");
        assert_eq!(record.plant_height_low_cm, Some(30.0));
        assert_eq!(record.plant_height_high_cm, Some(60.0));
    }

    #[test]
    fn fruit_fragment_converts_to_cm() {
        let ex = extractor();
        let mut record = Record::new("Test taxon");
        ex.parse_treatment(&treatment(&[("Fruits", "2-3(-4) mm,")]), &mut record);

        assert_eq!(record.fruit_length_low_cm, Some(0.2));
        assert_eq!(record.fruit_length_high_cm, Some(0.3));
        assert_eq!(record.fruit_length_max_cm, Some(0.4));
        assert_eq!(record.fruit_width_low_cm, None);
    }

    #[test]
    fn fruit_type_includes_the_dispatch_key() {
        let ex = extractor();
        let mut record = Record::new("Test taxon");
        ex.parse_treatment(
            &treatment(&[("Cypselae", "usually tan to brown, 4-5 mm")]),
            &mut record,
        );
        assert_eq!(record.fruit_type, "cypsela");
        assert_eq!(record.fruit_length_low_cm, Some(0.4));
    }

    #[test]
    fn leaf_fragment_skips_the_petiole_measurement() {
        let ex = extractor();
        let mut record = Record::new("Test taxon");
        ex.parse_treatment(
            &treatment(&[("Leaves", "petioles (5-)10-30(-50) mm; 4-11(-13) x 2.5-8(-9) cm")]),
            &mut record,
        );
        assert_eq!(record.leaf_length_low_cm, Some(4.0));
        assert_eq!(record.leaf_length_high_cm, Some(11.0));
        assert_eq!(record.leaf_length_max_cm, Some(13.0));
        assert_eq!(record.leaf_width_low_cm, Some(2.5));
        assert_eq!(record.leaf_width_high_cm, Some(8.0));
        assert_eq!(record.leaf_thickness_low_cm, None);
    }

    #[test]
    fn seed_fragment_with_hilum_uses_the_seed_size() {
        let ex = extractor();
        let mut record = Record::new("Test taxon");
        ex.parse_treatment(
            &treatment(&[("Seeds", "ovoid, hilum 1 mm, 3-5 mm long")]),
            &mut record,
        );
        assert_eq!(record.seed_length_low_cm, Some(0.3));
        assert_eq!(record.seed_length_high_cm, Some(0.5));
    }

    #[test]
    fn unregistered_keys_are_ignored() {
        let ex = extractor();
        let mut record = Record::new("Test taxon");
        ex.parse_treatment(
            &treatment(&[("Phyllaries", "22-25 in 3-4 series"), ("Culms", "30-60 cm")]),
            &mut record,
        );
        assert_eq!(record.plant_height_low_cm, Some(30.0));
    }

    #[test]
    fn elevation_stays_in_meters() {
        let ex = extractor();
        let mut record = Record::new("Test taxon");
        let mut info = InfoPanel::new();
        info.push("Elevation", "0-800 m");
        ex.parse_info(&info, &mut record);

        assert_eq!(record.elevation_min_m, Some(0.0));
        assert_eq!(record.elevation_max_m, Some(800.0));
    }

    #[test]
    fn panel_fields_overwrite_unconditionally() {
        let ex = extractor();
        let mut record = Record::new("Test taxon");
        record.flowering_time = "stale".to_string();
        record.habitat = "stale".to_string();

        let mut info = InfoPanel::new();
        info.push("Phenology", "Flowering Jul-Sep.");
        ex.parse_info(&info, &mut record);

        assert_eq!(record.flowering_time, "Flowering Jul-Sep.");
        assert_eq!(record.habitat, "");
    }

    #[test]
    fn empty_page_yields_an_empty_record() {
        let ex = extractor();
        let record = ex.extract_page(&Page {
            taxon: "Carex aurea".to_string(),
            treatment: Treatment::new(),
            info: None,
        });
        assert_eq!(record.taxon, "Carex aurea");
        assert_eq!(record.plant_height_low_cm, None);
        assert_eq!(record.habitat, "");
    }
}
