//! The compiled grammar and its staged parse.
//!
//! Stage order follows the recognition hierarchy: normalize → tokenize →
//! lexicon tagging → ranges → sizes → part binding, with the vocabulary
//! taggers reported alongside. Later stages absorb the spans of earlier
//! ones, so the parse output holds only top-level entities.
//!
//! A `Grammar` is built once and shared read-only; parsing holds no
//! mutable state, so pages can be processed on parallel workers.

use crate::binder::{self, PartSize};
use crate::lexicon::{TermLabel, TermSpan, Vocabulary};
use crate::normalise::normalise;
use crate::range::find_ranges;
use crate::size::{find_sizes, Size};
use crate::tagger;
use crate::token::{tokenize, Token};
use floratrait_common::Result;

/// Token stream plus vocabulary spans over one normalized text.
pub(crate) struct Annotation {
    pub tokens: Vec<Token>,
    pub terms: Vec<TermSpan>,
    /// For each token, the index of the term span covering it.
    token_term: Vec<Option<usize>>,
}

impl Annotation {
    pub fn new(vocab: &Vocabulary, text: &str) -> Self {
        let tokens = tokenize(text);
        let terms = vocab.tag(text);

        let mut token_term = vec![None; tokens.len()];
        let mut ti = 0;
        for (i, token) in tokens.iter().enumerate() {
            while ti < terms.len() && terms[ti].end <= token.start {
                ti += 1;
            }
            if ti < terms.len()
                && token.start >= terms[ti].start
                && token.end <= terms[ti].end
            {
                token_term[i] = Some(ti);
            }
        }

        Annotation {
            tokens,
            terms,
            token_term,
        }
    }

    /// The term span covering token `i`, if any.
    pub fn term_at(&self, i: usize) -> Option<(usize, &TermSpan)> {
        let idx = *self.token_term.get(i)?;
        idx.map(|idx| (idx, &self.terms[idx]))
    }

    /// First token index past every token of term `term_idx`.
    pub fn skip_term(&self, mut i: usize, term_idx: usize) -> usize {
        while self.token_term.get(i) == Some(&Some(term_idx)) {
            i += 1;
        }
        i
    }
}

/// One top-level entity in a parsed text.
#[derive(Debug, Clone, PartialEq)]
pub enum Ent {
    Size(Size),
    PartSize(PartSize),
    Shape(TermSpan),
    FruitType(TermSpan),
    LeafDuration(TermSpan),
}

impl Ent {
    fn start(&self) -> usize {
        match self {
            Ent::Size(size) => size.start,
            Ent::PartSize(part) => part.start,
            Ent::Shape(span) | Ent::FruitType(span) | Ent::LeafDuration(span) => span.start,
        }
    }
}

/// The result of parsing one text fragment.
#[derive(Debug, Clone)]
pub struct Parse {
    /// The normalized text all entity offsets index into.
    pub text: String,
    /// Entities in source order.
    pub ents: Vec<Ent>,
}

impl Parse {
    /// First part-bound size with the given canonical part name.
    pub fn part_size(&self, part: &str) -> Option<&PartSize> {
        self.ents.iter().find_map(|ent| match ent {
            Ent::PartSize(ps) if ps.part == part => Some(ps),
            _ => None,
        })
    }

    /// First size not bound to any part.
    pub fn first_size(&self) -> Option<&Size> {
        self.ents.iter().find_map(|ent| match ent {
            Ent::Size(size) => Some(size),
            _ => None,
        })
    }

    /// The size a trait function should use: the part-bound match when one
    /// exists, the first bare size otherwise.
    pub fn size_for(&self, part: &str) -> Option<&Size> {
        self.part_size(part)
            .map(|ps| &ps.size)
            .or_else(|| self.first_size())
    }
}

/// The compiled recognition grammar: an immutable vocabulary plus the
/// staged recognizers. Construct once, pass by reference.
pub struct Grammar {
    vocab: Vocabulary,
}

impl Grammar {
    pub fn new(vocab: Vocabulary) -> Self {
        Grammar { vocab }
    }

    /// Grammar over the built-in term tables.
    pub fn builtin() -> Result<Self> {
        Ok(Grammar::new(Vocabulary::builtin()?))
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Run the full layered parse over one text fragment.
    pub fn parse(&self, text: &str) -> Parse {
        let text = normalise(text);
        let annotation = Annotation::new(&self.vocab, &text);

        let ranges = find_ranges(&annotation.tokens);
        let sizes = find_sizes(&annotation, &ranges);
        let (bound, bare) = binder::bind(&annotation, sizes);

        let mut ents: Vec<Ent> = Vec::new();
        ents.extend(bound.into_iter().map(Ent::PartSize));
        ents.extend(bare.into_iter().map(Ent::Size));
        for span in &annotation.terms {
            match span.label {
                TermLabel::Shape => ents.push(Ent::Shape(span.clone())),
                TermLabel::FruitType => ents.push(Ent::FruitType(span.clone())),
                TermLabel::LeafDuration => ents.push(Ent::LeafDuration(span.clone())),
                _ => {}
            }
        }
        ents.sort_by_key(Ent::start);

        Parse { text, ents }
    }

    /// Canonicalized "|"-joined hits of `label` over `key` and `text`.
    pub fn vocab_hits(&self, label: TermLabel, key: Option<&str>, text: &str) -> String {
        let text = normalise(text);
        tagger::vocab_hits(&self.vocab, label, key, &text)
    }
}
