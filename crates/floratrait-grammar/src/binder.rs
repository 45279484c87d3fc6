//! Part-size binding: stamping a plant-part label onto a measurement.
//!
//! One left-to-right pass per clause (clauses end at ";" and "."): the most
//! recent part-bearing term binds the next size span, then clears. A size
//! with no pending part may instead take a part term immediately following
//! it; otherwise it stays bare. Sub-part bindings (petiole, midvein, beak,
//! hilum, pedicel, …) exist mostly to absorb their measurements so a trait
//! function never mistakes them for the organ's own size.

use crate::lexicon::{TermLabel, TermSpan};
use crate::pipeline::Annotation;
use crate::size::Size;
use crate::token::TokenKind;
use serde::Serialize;

/// A size bound to a named plant part.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartSize {
    /// Canonical part name ("leaf", "petiole", "fruit", "seed", "hilum", …).
    pub part: String,
    pub size: Size,
    pub start: usize,
    pub end: usize,
}

impl PartSize {
    pub fn units(&self) -> Option<&str> {
        self.size.units()
    }
}

/// The part label a term binds. Fruit-type terms name the taxon's fruit
/// itself ("Cypselae 4-5 mm" measures the fruit), so they bind "fruit";
/// everything else binds its canonical form.
fn part_name(term: &TermSpan) -> String {
    match term.label {
        TermLabel::Fruit | TermLabel::FruitType => "fruit".to_string(),
        _ => term.canonical.clone(),
    }
}

/// Bind sizes to part terms. Returns (bound, bare) with the original order
/// preserved in each; a size consumed by a binding is not reported bare.
pub(crate) fn bind(annotation: &Annotation, sizes: Vec<Size>) -> (Vec<PartSize>, Vec<Size>) {
    let tokens = &annotation.tokens;
    let mut bound = Vec::new();
    let mut bare = Vec::new();

    let mut pending: Option<&TermSpan> = None;
    let mut sizes = sizes.into_iter().peekable();
    let mut j = 0;

    while j < tokens.len() {
        // A size span starting here resolves against the pending part.
        if let Some(size) = sizes.next_if(|s| s.first_token == j) {
            j = size.end_token;

            if let Some(term) = pending.take() {
                bound.push(PartSize {
                    part: part_name(term),
                    start: term.start,
                    end: size.end,
                    size,
                });
            } else if let Some((term_idx, term)) =
                annotation.term_at(j).filter(|(_, t)| t.label.is_part())
            {
                // Trailing part: "2-3 mm beaks".
                let end = term.end;
                let part = part_name(term);
                let start = size.start;
                j = annotation.skip_term(j, term_idx);
                bound.push(PartSize {
                    part,
                    size,
                    start,
                    end,
                });
            } else {
                bare.push(size);
            }
            continue;
        }

        if let Some((term_idx, term)) = annotation.term_at(j) {
            if term.label.is_part() {
                // Most recent part term wins.
                pending = Some(term);
            }
            j = annotation.skip_term(j, term_idx);
            continue;
        }

        match tokens[j].kind {
            TokenKind::Semicolon | TokenKind::Period => pending = None,
            _ => {}
        }
        j += 1;
    }

    (bound, bare)
}
