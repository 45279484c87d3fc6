//! Treatment and metadata-panel inputs.
//!
//! Both are produced by an HTML-to-text extraction step outside this
//! workspace: a treatment is the description prose pre-split into
//! (leading term → remainder) fragments, in page order; the panel carries
//! the Phenology/Habitat/Elevation lines.

use floratrait_grammar::normalise;
use serde::{Deserialize, Serialize};

/// Ordered (leading term → fragment text) pairs for one taxon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Treatment {
    pairs: Vec<(String, String)>,
}

impl Treatment {
    pub fn new() -> Self {
        Treatment::default()
    }

    pub fn push(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.pairs.push((key.into(), text.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, t)| (k.as_str(), t.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl FromIterator<(String, String)> for Treatment {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Treatment {
            pairs: iter.into_iter().collect(),
        }
    }
}

/// The page's metadata panel lines, keyed "Phenology"/"Habitat"/"Elevation".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfoPanel {
    fields: Vec<(String, String)>,
}

impl InfoPanel {
    pub fn new() -> Self {
        InfoPanel::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.push((key.into(), value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl FromIterator<(String, String)> for InfoPanel {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        InfoPanel {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Derive the taxon name from a page's file stem: underscores become
/// spaces, the first letter is capitalized, hybrid crosses fold to "x".
pub fn taxon_from_stem(stem: &str) -> String {
    let name = stem.replace('_', " ");
    let name = normalise(&name);
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => name,
    }
}
