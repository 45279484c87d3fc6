//! floratrait-common — Shared types and errors used across all floratrait crates.

pub mod dimension;
pub mod error;
pub mod record;

pub use dimension::{Axis, Dimension};
pub use error::{FloratraitError, Result};
pub use record::Record;
