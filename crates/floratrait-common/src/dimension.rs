//! Measured-axis primitives shared by the grammar and the treatment reducer.

use serde::{Deserialize, Serialize};

/// Semantic axis of a measurement.
///
/// `Height` appears in prose as "tall"/"high" and is treated as a synonym
/// of `Length` when looking up plant height and fruit length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Length,
    Width,
    Thickness,
    Diameter,
    Height,
}

impl Axis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Length => "length",
            Axis::Width => "width",
            Axis::Thickness => "thickness",
            Axis::Diameter => "diameter",
            Axis::Height => "height",
        }
    }

    /// Parse a canonical axis name as it appears in the dim term table.
    pub fn from_name(name: &str) -> Option<Axis> {
        match name {
            "length" => Some(Axis::Length),
            "width" => Some(Axis::Width),
            "thickness" => Some(Axis::Thickness),
            "diameter" => Some(Axis::Diameter),
            "height" => Some(Axis::Height),
            _ => None,
        }
    }
}

/// One measured axis with up to four numeric bounds.
///
/// `min`/`max` are the rarer outlier bounds written in nested parentheses
/// in treatment prose; `low`/`high` are the typical range. A dimension is
/// meaningful only when at least one bound is set.
///
/// `start`/`end` are byte offsets into the normalized source text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub dim: Option<Axis>,
    pub units: Option<String>,
    pub min: Option<f64>,
    pub low: Option<f64>,
    pub high: Option<f64>,
    pub max: Option<f64>,
    pub start: usize,
    pub end: usize,
}

impl Dimension {
    pub fn has_value(&self) -> bool {
        self.min.is_some() || self.low.is_some() || self.high.is_some() || self.max.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_round_trips_through_name() {
        for axis in [
            Axis::Length,
            Axis::Width,
            Axis::Thickness,
            Axis::Diameter,
            Axis::Height,
        ] {
            assert_eq!(Axis::from_name(axis.as_str()), Some(axis));
        }
        assert_eq!(Axis::from_name("girth"), None);
    }

    #[test]
    fn empty_dimension_has_no_value() {
        assert!(!Dimension::default().has_value());

        let dim = Dimension {
            low: Some(0.0),
            ..Dimension::default()
        };
        assert!(dim.has_value());
    }
}
