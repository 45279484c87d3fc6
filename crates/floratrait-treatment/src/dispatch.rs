//! The dispatch table: leading treatment terms → trait operations.
//!
//! Keys are matched exactly as they appear in page prose, trailing
//! punctuation included ("Annuals," and "Annuals" are distinct keys in the
//! corpus). Terms of no interest live in the noise list so that a truly
//! unknown key can be surfaced at debug level.

/// The closed set of trait operations a fragment can be dispatched to.
/// The per-page "used" bookkeeping is keyed on these tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraitOp {
    PlantHeight,
    Deciduousness,
    LeafSize,
    LeafShape,
    FruitSize,
    FruitType,
    SeedSize,
}

const PLANT_OPS: &[TraitOp] = &[TraitOp::PlantHeight, TraitOp::Deciduousness];
const LEAF_OPS: &[TraitOp] = &[TraitOp::LeafSize, TraitOp::LeafShape];
const FRUIT_OPS: &[TraitOp] = &[TraitOp::FruitSize, TraitOp::FruitType];
const SEED_OPS: &[TraitOp] = &[TraitOp::SeedSize];

/// Leading term → registered trait operations.
const DISPATCH: &[(&str, &[TraitOp])] = &[
    // Plants
    ("Annual", PLANT_OPS),
    ("Annual,", PLANT_OPS),
    ("Annuals", PLANT_OPS),
    ("Annuals,", PLANT_OPS),
    ("Annuals.", PLANT_OPS),
    ("Biennial", PLANT_OPS),
    ("Biennials", PLANT_OPS),
    ("Biennials,", PLANT_OPS),
    ("Culm", PLANT_OPS),
    ("Culms", PLANT_OPS),
    ("Herb", PLANT_OPS),
    ("Herb,", PLANT_OPS),
    ("Herbage", PLANT_OPS),
    ("Herbs", PLANT_OPS),
    ("Herbs,", PLANT_OPS),
    ("Herbs.", PLANT_OPS),
    ("Herbs:", PLANT_OPS),
    ("Perennial", PLANT_OPS),
    ("Perennials", PLANT_OPS),
    ("Perennials,", PLANT_OPS),
    ("Perennials.", PLANT_OPS),
    ("Plant", PLANT_OPS),
    ("Plants", PLANT_OPS),
    ("Shrubs", PLANT_OPS),
    ("Shrubs,", PLANT_OPS),
    ("Subshrubs", PLANT_OPS),
    ("Subshrubs,", PLANT_OPS),
    ("Subshrubs.", PLANT_OPS),
    ("Trees", PLANT_OPS),
    ("Trees,", PLANT_OPS),
    ("Vines", PLANT_OPS),
    ("Vines,", PLANT_OPS),
    ("Winter", PLANT_OPS),
    // Leaves
    ("Blades", LEAF_OPS),
    ("Cauline", LEAF_OPS),
    ("Foliage", LEAF_OPS),
    ("Fronds", LEAF_OPS),
    ("Leaf", LEAF_OPS),
    ("Leaf-", LEAF_OPS),
    ("Leaf-blade", LEAF_OPS),
    ("Leaves", LEAF_OPS),
    ("Leaves:", LEAF_OPS),
    ("Sheaths", LEAF_OPS),
    // Fruits
    ("Achene", FRUIT_OPS),
    ("Achenes", FRUIT_OPS),
    ("Acorns", FRUIT_OPS),
    ("Berries", FRUIT_OPS),
    ("Capsules", FRUIT_OPS),
    ("Caryopses", FRUIT_OPS),
    ("Cypselae", FRUIT_OPS),
    ("Drupes", FRUIT_OPS),
    ("Follicles", FRUIT_OPS),
    ("Fruiting", FRUIT_OPS),
    ("Fruits", FRUIT_OPS),
    ("Legumes", FRUIT_OPS),
    ("Loments", FRUIT_OPS),
    ("Mericarps", FRUIT_OPS),
    ("Pomes", FRUIT_OPS),
    ("Schizocarps", FRUIT_OPS),
    ("Utricles", FRUIT_OPS),
    // Seeds
    ("Seed", SEED_OPS),
    ("Seeds", SEED_OPS),
];

/// Leading terms seen in the corpus but deliberately not parsed.
pub const NOISE_KEYS: &[&str] = &[
    "2n",
    "Aerial",
    "Anthers",
    "Arrays",
    "Basal",
    "Bisexual",
    "Bracts",
    "Burs",
    "Calyculi",
    "Corms",
    "Corollas",
    "Disc",
    "Discs",
    "Florets",
    "Flowers",
    "Heads",
    "Inflorescences",
    "Inner",
    "Innermost",
    "Internodes",
    "Involucres",
    "Outer",
    "Ovaries",
    "Paleae",
    "Pappi",
    "Pedicels",
    "Peduncles",
    "Perigynia",
    "Petioles",
    "Phyllaries",
    "Pistillate",
    "Racemes",
    "Ray",
    "Rays",
    "Receptacles",
    "Rhizomes",
    "Roots",
    "Scales",
    "Scapes",
    "Spikelets",
    "Staminate",
    "Stems",
    "Stolons",
    "Style",
    "Taproots",
];

/// The operations registered for a leading term, if any.
pub fn ops_for(key: &str) -> Option<&'static [TraitOp]> {
    DISPATCH
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, ops)| *ops)
}

/// True when the key is a known body-part term of no interest.
pub fn is_noise(key: &str) -> bool {
    NOISE_KEYS.contains(&key)
}
