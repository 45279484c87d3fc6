//! floratrait-treatment — Treatment dispatch and record assembly.
//!
//! Walks the keyed sentence fragments of one taxon's treatment, dispatches
//! each fragment to the trait operations registered for its leading term,
//! and assembles one flat [`Record`] per specimen. The metadata panel
//! (Phenology/Habitat/Elevation) is parsed after dispatch and overwrites
//! its fields unconditionally.

pub mod dispatch;
pub mod reduce;
pub mod treatment;

pub use dispatch::TraitOp;
pub use reduce::{Extractor, Page};
pub use treatment::{taxon_from_stem, InfoPanel, Treatment};

pub use floratrait_common::{Record, Result};
