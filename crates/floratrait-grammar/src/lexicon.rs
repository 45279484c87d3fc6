//! Vocabulary lexicon: dictionary span tagging over treatment text.
//!
//! Term tables are CSV files with `pattern,label,replace,factor_cm`
//! columns. All tables are compiled into one Aho-Corasick automaton
//! (leftmost-longest, ASCII case-insensitive) for linear-time matching;
//! hits are checked against word boundaries so "in" never fires inside
//! "margin".
//!
//! The built-in tables ship with the crate; external tables can be loaded
//! for vocabulary experiments. A missing required column is fatal — the
//! run cannot proceed without valid term tables.

use aho_corasick::{AhoCorasick, MatchKind};
use ahash::AHashMap;
use anyhow::Context;
use floratrait_common::{FloratraitError, Result};
use tracing::{debug, info};

/// Closed set of term categories used by the grammar stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermLabel {
    /// Length unit carrying a cm conversion factor.
    Unit,
    /// Axis qualifier ("long", "wide", "diam.").
    Dim,
    Leaf,
    LeafPart,
    LeafDuration,
    Fruit,
    FruitType,
    FruitPart,
    Seed,
    SeedPart,
    OtherPart,
    Shape,
}

impl TermLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TermLabel::Unit => "unit_length",
            TermLabel::Dim => "dim",
            TermLabel::Leaf => "leaf",
            TermLabel::LeafPart => "leaf_part",
            TermLabel::LeafDuration => "leaf_duration",
            TermLabel::Fruit => "fruit",
            TermLabel::FruitType => "fruit_type",
            TermLabel::FruitPart => "fruit_part",
            TermLabel::Seed => "seed",
            TermLabel::SeedPart => "seed_part",
            TermLabel::OtherPart => "other_part",
            TermLabel::Shape => "shape",
        }
    }

    fn from_table_label(label: &str) -> Option<TermLabel> {
        match label {
            "unit_length" => Some(TermLabel::Unit),
            "dim" => Some(TermLabel::Dim),
            "leaf" => Some(TermLabel::Leaf),
            "leaf_part" => Some(TermLabel::LeafPart),
            "leaf_duration" => Some(TermLabel::LeafDuration),
            "fruit" => Some(TermLabel::Fruit),
            "fruit_type" => Some(TermLabel::FruitType),
            "fruit_part" => Some(TermLabel::FruitPart),
            "seed" => Some(TermLabel::Seed),
            "seed_part" => Some(TermLabel::SeedPart),
            "other_part" => Some(TermLabel::OtherPart),
            "shape" => Some(TermLabel::Shape),
            _ => None,
        }
    }

    /// True for labels that can name the plant part of a measurement.
    pub fn is_part(&self) -> bool {
        matches!(
            self,
            TermLabel::Leaf
                | TermLabel::LeafPart
                | TermLabel::Fruit
                | TermLabel::FruitType
                | TermLabel::FruitPart
                | TermLabel::Seed
                | TermLabel::SeedPart
                | TermLabel::OtherPart
        )
    }
}

/// One vocabulary row after parsing.
#[derive(Debug, Clone)]
struct TermEntry {
    label: TermLabel,
    canonical: String,
    factor_cm: Option<f64>,
}

/// A vocabulary hit in the text.
#[derive(Debug, Clone, PartialEq)]
pub struct TermSpan {
    pub start: usize,
    pub end: usize,
    pub label: TermLabel,
    /// Canonical form from the table's `replace` column.
    pub canonical: String,
    /// Conversion factor to centimeters (unit terms only).
    pub factor_cm: Option<f64>,
}

/// Compiled term tables. Build once at startup, share read-only.
pub struct Vocabulary {
    automaton: AhoCorasick,
    entries: Vec<TermEntry>,
    /// Canonical unit name → multiplicative factor to cm.
    factors_cm: AHashMap<String, f64>,
}

/// The tables shipped with the crate.
const BUILTIN_TABLES: &[(&str, &str)] = &[
    ("unit_terms.csv", include_str!("../terms/unit_terms.csv")),
    ("dim_terms.csv", include_str!("../terms/dim_terms.csv")),
    ("leaf_terms.csv", include_str!("../terms/leaf_terms.csv")),
    ("fruit_terms.csv", include_str!("../terms/fruit_terms.csv")),
    ("seed_terms.csv", include_str!("../terms/seed_terms.csv")),
    ("other_terms.csv", include_str!("../terms/other_terms.csv")),
    ("shape_terms.csv", include_str!("../terms/shape_terms.csv")),
];

impl Vocabulary {
    /// Build from the embedded term tables.
    pub fn builtin() -> Result<Self> {
        let mut patterns = Vec::new();
        let mut entries = Vec::new();
        for (name, content) in BUILTIN_TABLES {
            parse_table(name, content, &mut patterns, &mut entries)?;
        }
        Self::build(patterns, entries)
    }

    /// Build from external term tables on disk.
    pub fn from_term_files(paths: &[std::path::PathBuf]) -> Result<Self> {
        let mut patterns = Vec::new();
        let mut entries = Vec::new();
        for path in paths {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading term table {}", path.display()))?;
            let name = path.to_string_lossy();
            parse_table(&name, &content, &mut patterns, &mut entries)?;
        }
        Self::build(patterns, entries)
    }

    fn build(patterns: Vec<String>, entries: Vec<TermEntry>) -> Result<Self> {
        let automaton = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .ascii_case_insensitive(true)
            .build(&patterns)
            .map_err(|e| FloratraitError::Vocabulary(format!("automaton build failed: {e}")))?;

        let mut factors_cm = AHashMap::new();
        for entry in &entries {
            if let (TermLabel::Unit, Some(factor)) = (entry.label, entry.factor_cm) {
                factors_cm.insert(entry.canonical.clone(), factor);
            }
        }

        info!(
            terms = entries.len(),
            units = factors_cm.len(),
            "vocabulary compiled"
        );

        Ok(Vocabulary {
            automaton,
            entries,
            factors_cm,
        })
    }

    /// Tag all vocabulary hits in `text`. Matches are leftmost-longest,
    /// non-overlapping, and bounded by non-word characters on both sides.
    pub fn tag(&self, text: &str) -> Vec<TermSpan> {
        let bytes = text.as_bytes();
        let mut spans = Vec::new();

        for mat in self.automaton.find_iter(text) {
            if !on_word_boundary(bytes, mat.start(), mat.end()) {
                continue;
            }
            let entry = &self.entries[mat.pattern().as_usize()];
            spans.push(TermSpan {
                start: mat.start(),
                end: mat.end(),
                label: entry.label,
                canonical: entry.canonical.clone(),
                factor_cm: entry.factor_cm,
            });
        }

        spans
    }

    /// Conversion factor to centimeters for a canonical unit name.
    pub fn factor_cm(&self, unit: &str) -> Option<f64> {
        self.factors_cm.get(unit).copied()
    }
}

/// A word character for boundary purposes.
fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric()
}

fn on_word_boundary(bytes: &[u8], start: usize, end: usize) -> bool {
    let before_ok = start == 0 || !is_word_byte(bytes[start - 1]);
    let after_ok = end >= bytes.len() || !is_word_byte(bytes[end]);
    before_ok && after_ok
}

/// Parse one term table, appending its rows to `patterns`/`entries`.
///
/// Required columns: `pattern`, `label`. `replace` defaults to the pattern
/// itself; `factor_cm`, when present and non-empty, must parse as a float.
fn parse_table(
    name: &str,
    content: &str,
    patterns: &mut Vec<String>,
    entries: &mut Vec<TermEntry>,
) -> Result<()> {
    let mut lines = content.lines().enumerate();

    let (_, header) = lines
        .next()
        .ok_or_else(|| FloratraitError::Vocabulary(format!("{name}: empty table")))?;
    let headers: Vec<&str> = header.split(',').map(str::trim).collect();

    let col_idx = |col: &str| headers.iter().position(|h| *h == col);
    let pattern_idx = col_idx("pattern")
        .ok_or_else(|| FloratraitError::Vocabulary(format!("{name}: missing pattern column")))?;
    let label_idx = col_idx("label")
        .ok_or_else(|| FloratraitError::Vocabulary(format!("{name}: missing label column")))?;
    let replace_idx = col_idx("replace");
    let factor_idx = col_idx("factor_cm");

    let mut added = 0usize;
    for (line_no, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let cols: Vec<&str> = line.split(',').map(str::trim).collect();

        let pattern = cols.get(pattern_idx).copied().unwrap_or("");
        let label_text = cols.get(label_idx).copied().unwrap_or("");
        if pattern.is_empty() || label_text.is_empty() {
            return Err(FloratraitError::Vocabulary(format!(
                "{name}:{}: empty pattern or label",
                line_no + 1
            )));
        }

        let label = TermLabel::from_table_label(label_text).ok_or_else(|| {
            FloratraitError::Vocabulary(format!(
                "{name}:{}: unknown label {label_text:?}",
                line_no + 1
            ))
        })?;

        let canonical = replace_idx
            .and_then(|i| cols.get(i))
            .filter(|s| !s.is_empty())
            .unwrap_or(&pattern)
            .to_lowercase();

        let factor_cm = match factor_idx.and_then(|i| cols.get(i)).filter(|s| !s.is_empty()) {
            Some(raw) => Some(raw.parse::<f64>().map_err(|_| {
                FloratraitError::Vocabulary(format!(
                    "{name}:{}: bad factor_cm {raw:?}",
                    line_no + 1
                ))
            })?),
            None => None,
        };

        let lowered = pattern.to_lowercase();
        if patterns.contains(&lowered) {
            debug!(pattern = %lowered, table = name, "duplicate vocabulary pattern skipped");
            continue;
        }

        patterns.push(lowered);
        entries.push(TermEntry {
            label,
            canonical,
            factor_cm,
        });
        added += 1;
    }

    debug!(table = name, terms = added, "term table parsed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vocabulary {
        Vocabulary::builtin().unwrap()
    }

    #[test]
    fn builtin_tables_compile() {
        let v = vocab();
        assert_eq!(v.factor_cm("mm"), Some(0.1));
        assert_eq!(v.factor_cm("m"), Some(100.0));
        assert_eq!(v.factor_cm("in"), Some(2.54));
        assert_eq!(v.factor_cm("furlong"), None);
    }

    #[test]
    fn labels_round_trip_through_table_names() {
        for label in [
            TermLabel::Unit,
            TermLabel::Dim,
            TermLabel::Leaf,
            TermLabel::LeafPart,
            TermLabel::LeafDuration,
            TermLabel::Fruit,
            TermLabel::FruitType,
            TermLabel::FruitPart,
            TermLabel::Seed,
            TermLabel::SeedPart,
            TermLabel::OtherPart,
            TermLabel::Shape,
        ] {
            assert_eq!(TermLabel::from_table_label(label.as_str()), Some(label));
        }
        assert_eq!(TermLabel::from_table_label("stem"), None);
    }

    #[test]
    fn tags_units_and_dims() {
        let v = vocab();
        let spans = v.tag("10-30 mm wide");
        let labels: Vec<_> = spans.iter().map(|s| (s.label, s.canonical.as_str())).collect();
        assert_eq!(
            labels,
            vec![(TermLabel::Unit, "mm"), (TermLabel::Dim, "width")]
        );
    }

    #[test]
    fn matching_is_case_insensitive_with_replace() {
        let v = vocab();
        let spans = v.tag("Cypselae tan to brown");
        assert_eq!(spans[0].label, TermLabel::FruitType);
        assert_eq!(spans[0].canonical, "cypsela");
    }

    #[test]
    fn diam_with_period_matches_longest() {
        let v = vocab();
        let spans = v.tag("6-9 mm diam.,");
        let dim = spans.iter().find(|s| s.label == TermLabel::Dim).unwrap();
        assert_eq!(dim.canonical, "diameter");
        assert_eq!(&"6-9 mm diam.,"[dim.start..dim.end], "diam.");
    }

    #[test]
    fn unit_inside_a_word_does_not_fire() {
        let v = vocab();
        // "in" inside "margin", "m" inside "from"
        let spans = v.tag("margin entire from base");
        assert!(spans.iter().all(|s| s.label != TermLabel::Unit));
    }

    #[test]
    fn hyphenated_compounds_expose_their_halves() {
        let v = vocab();
        let spans = v.tag("blades oblong-ovate");
        let shapes: Vec<_> = spans
            .iter()
            .filter(|s| s.label == TermLabel::Shape)
            .map(|s| s.canonical.as_str())
            .collect();
        assert_eq!(shapes, vec!["oblong", "ovate"]);
    }

    #[test]
    fn missing_column_is_fatal() {
        let mut patterns = Vec::new();
        let mut entries = Vec::new();
        let err = parse_table(
            "broken.csv",
            "term,label\nleaf,leaf",
            &mut patterns,
            &mut entries,
        )
        .unwrap_err();
        assert!(matches!(err, FloratraitError::Vocabulary(_)));
    }

    #[test]
    fn bad_factor_is_fatal() {
        let mut patterns = Vec::new();
        let mut entries = Vec::new();
        let err = parse_table(
            "broken.csv",
            "pattern,label,replace,factor_cm\nmm,unit_length,mm,ten",
            &mut patterns,
            &mut entries,
        )
        .unwrap_err();
        assert!(matches!(err, FloratraitError::Vocabulary(_)));
    }
}
