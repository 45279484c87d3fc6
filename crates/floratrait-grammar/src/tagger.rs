//! Lexicon-driven trait tagging: shape, fruit type, leaf duration.
//!
//! Pure dictionary lookup with no numeric component. Multiple hits in one
//! text are reported as "|"-joined alternatives in first-seen order after
//! canonicalization, with the dispatch key's own hit (when the key itself
//! is in vocabulary) leading.

use crate::lexicon::{TermLabel, TermSpan, Vocabulary};

/// All hits of `label` in `text`, in order.
pub fn label_spans(vocab: &Vocabulary, label: TermLabel, text: &str) -> Vec<TermSpan> {
    vocab
        .tag(text)
        .into_iter()
        .filter(|span| span.label == label)
        .collect()
}

/// Canonicalized hits of `label` in `key` then `text`, deduplicated and
/// joined with " | ". Empty when nothing matches.
pub fn vocab_hits(vocab: &Vocabulary, label: TermLabel, key: Option<&str>, text: &str) -> String {
    let mut hits: Vec<String> = Vec::new();

    let mut push = |canonical: &str| {
        if !hits.iter().any(|h| h == canonical) {
            hits.push(canonical.to_string());
        }
    };

    if let Some(key) = key {
        for span in label_spans(vocab, label, key) {
            push(&span.canonical);
        }
    }
    for span in label_spans(vocab, label, text) {
        push(&span.canonical);
    }

    hits.join(" | ")
}
