//! floratrait-grammar — Rule-based trait recognition for botanical treatments.
//!
//! A layered grammar over tokenized treatment prose:
//! normalizer → tokenizer → vocabulary lexicon → numeric range recognizer →
//! size composer → part-size binders, with shape/fruit-type/leaf-duration
//! tagging alongside. Later stages absorb the spans of earlier ones, so a
//! measurement consumed by a part-bound size is never reported twice.
//!
//! Everything is pure in-memory computation over a string; the compiled
//! [`Grammar`] is shared read-only across pages.

pub mod binder;
pub mod lexicon;
pub mod normalise;
pub mod pipeline;
pub mod range;
pub mod size;
pub mod tagger;
pub mod token;

pub use binder::PartSize;
pub use lexicon::{TermLabel, TermSpan, Vocabulary};
pub use normalise::normalise;
pub use pipeline::{Ent, Grammar, Parse};
pub use size::Size;

pub use floratrait_common::{Axis, Dimension, FloratraitError, Result};
