//! Size composition: ranges joined by crosses into dimensioned measurements.
//!
//! A size span is one or more range groups separated by "x", each group
//! `range+ unit* dim*`, with at least the final kept group carrying an
//! explicit unit. "4-11 x 2.5-8 cm" yields two dimensions (length, width)
//! both in cm.

use crate::lexicon::{TermLabel, Vocabulary};
use crate::pipeline::Annotation;
use crate::range::RangeMatch;
use crate::token::TokenKind;
use floratrait_common::{Axis, Dimension};
use serde::Serialize;
use tracing::debug;

/// An ordered run of dimensions found in one contiguous numeric span.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Size {
    pub dims: Vec<Dimension>,
    pub start: usize,
    pub end: usize,
    #[serde(skip)]
    pub(crate) first_token: usize,
    #[serde(skip)]
    pub(crate) end_token: usize,
}

impl Size {
    /// The unit shared by the span, taken from its first dimension.
    pub fn units(&self) -> Option<&str> {
        self.dims.iter().find_map(|d| d.units.as_deref())
    }

    /// The dimension for the first of the given axes, if present.
    pub fn dim(&self, axes: &[Axis]) -> Option<&Dimension> {
        self.dims
            .iter()
            .find(|d| d.dim.map(|a| axes.contains(&a)).unwrap_or(false))
    }

    /// Convert every bound of every dimension to centimeters, rounding to
    /// three decimals. Returns `None` when a unit has no known factor; the
    /// caller drops the candidate and carries on.
    pub fn convert_to_cm(&self, vocab: &Vocabulary) -> Option<Size> {
        let mut converted = self.clone();
        for dim in &mut converted.dims {
            let units = dim.units.as_deref().unwrap_or("cm");
            let Some(factor) = vocab.factor_cm(units) else {
                debug!(units, "size dropped: no conversion factor");
                return None;
            };
            for bound in [&mut dim.min, &mut dim.low, &mut dim.high, &mut dim.max] {
                if let Some(value) = bound {
                    *value = round3(*value * factor);
                }
            }
            dim.units = Some("cm".to_string());
        }
        Some(converted)
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// One range group while composing.
struct Group {
    bounds: RangeMatch,
    units: Option<String>,
    factor: Option<f64>,
    axis: Option<Axis>,
    start: usize,
    end: usize,
    first_token: usize,
    end_token: usize,
    /// Index into `ranges` of the group's first range.
    range_index: usize,
}

/// Compose all sizes from the recognized ranges, leftmost and greedy.
pub(crate) fn find_sizes(annotation: &Annotation, ranges: &[RangeMatch]) -> Vec<Size> {
    let mut sizes = Vec::new();
    let mut ri = 0;

    while ri < ranges.len() {
        match compose_at(annotation, ranges, ri) {
            Some((size, next_ri)) => {
                sizes.push(size);
                ri = next_ri;
            }
            None => ri += 1,
        }
    }

    sizes
}

/// Try to compose a size starting at range `ri`. On success returns the
/// size and the index of the first range it did not consume.
fn compose_at(
    annotation: &Annotation,
    ranges: &[RangeMatch],
    ri: usize,
) -> Option<(Size, usize)> {
    let tokens = &annotation.tokens;
    let mut groups: Vec<Group> = Vec::new();
    let mut cur = new_group(&ranges[ri], ri);
    let mut next_range = ri + 1;
    let mut j = ranges[ri].end_token;

    loop {
        // Another range directly adjacent extends the current group; its
        // bounds win ("1x" glued notations produce these).
        if next_range < ranges.len() && ranges[next_range].first_token == j {
            let r = &ranges[next_range];
            cur.bounds = r.clone();
            cur.end = r.end;
            cur.end_token = r.end_token;
            j = r.end_token;
            next_range += 1;
            continue;
        }

        // Unit or axis qualifier attached to the group.
        if let Some((term_idx, term)) = annotation.term_at(j) {
            match term.label {
                TermLabel::Unit => {
                    cur.units = Some(term.canonical.clone());
                    cur.factor = term.factor_cm;
                }
                TermLabel::Dim => {
                    cur.axis = Axis::from_name(&term.canonical);
                }
                _ => break,
            }
            cur.end = term.end;
            j = annotation.skip_term(j, term_idx);
            cur.end_token = j;
            continue;
        }

        // A cross followed immediately by a range opens the next group.
        if tokens.get(j).map(|t| t.kind) == Some(TokenKind::Cross)
            && next_range < ranges.len()
            && ranges[next_range].first_token == j + 1
        {
            groups.push(cur);
            cur = new_group(&ranges[next_range], next_range);
            j = ranges[next_range].end_token;
            next_range += 1;
            continue;
        }

        break;
    }
    groups.push(cur);

    // Trailing unit-less groups are not part of the size; the final kept
    // group must name its unit.
    while groups.last().map(|g| g.units.is_none()).unwrap_or(false) {
        groups.pop();
    }
    let last = groups.last()?;
    let next_ri = ranges[last.range_index..]
        .iter()
        .position(|r| r.first_token >= last.end_token)
        .map(|p| last.range_index + p)
        .unwrap_or(ranges.len());

    // Units of unit-less groups default to the first explicit unit.
    let default_units = groups
        .iter()
        .find_map(|g| g.units.clone())
        .unwrap_or_else(|| "cm".to_string());
    let default_factor = groups
        .iter()
        .find_map(|g| g.factor)
        .or_else(|| if default_units == "cm" { Some(1.0) } else { None });

    // Every unit must be convertible or the whole candidate is dropped.
    for group in &groups {
        if group.units.is_some() && group.factor.is_none() {
            debug!(units = ?group.units, "size rejected: unknown unit");
            return None;
        }
    }
    if default_factor.is_none() {
        debug!(units = %default_units, "size rejected: unknown unit");
        return None;
    }

    // Unlabeled axes take the next unused default, in order.
    let used: Vec<Axis> = groups.iter().filter_map(|g| g.axis).collect();
    let mut defaults = [Axis::Length, Axis::Width, Axis::Thickness]
        .into_iter()
        .filter(|a| !used.contains(a));

    let mut dims = Vec::with_capacity(groups.len());
    for group in &groups {
        let axis = match group.axis {
            Some(axis) => axis,
            None => match defaults.next() {
                Some(axis) => axis,
                None => {
                    debug!("size rejected: more groups than axes");
                    return None;
                }
            },
        };
        dims.push(Dimension {
            dim: Some(axis),
            units: Some(group.units.clone().unwrap_or_else(|| default_units.clone())),
            min: group.bounds.min,
            low: group.bounds.low,
            high: group.bounds.high,
            max: group.bounds.max,
            start: group.start,
            end: group.end,
        });
    }

    let size = Size {
        start: groups[0].start,
        end: groups[groups.len() - 1].end,
        first_token: groups[0].first_token,
        end_token: groups[groups.len() - 1].end_token,
        dims,
    };
    Some((size, next_ri))
}

fn new_group(range: &RangeMatch, range_index: usize) -> Group {
    Group {
        bounds: range.clone(),
        units: None,
        factor: None,
        axis: None,
        start: range.start,
        end: range.end,
        first_token: range.first_token,
        end_token: range.end_token,
        range_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Annotation;
    use crate::range::find_ranges;

    fn parse_sizes(text: &str) -> Vec<Size> {
        let vocab = Vocabulary::builtin().unwrap();
        let annotation = Annotation::new(&vocab, text);
        let ranges = find_ranges(&annotation.tokens);
        find_sizes(&annotation, &ranges)
    }

    fn axes(size: &Size) -> Vec<Axis> {
        size.dims.iter().filter_map(|d| d.dim).collect()
    }

    #[test]
    fn single_number_with_unit() {
        let sizes = parse_sizes("10 mm");
        assert_eq!(sizes.len(), 1);
        let dim = &sizes[0].dims[0];
        assert_eq!(dim.low, Some(10.0));
        assert_eq!(dim.high, None);
        assert_eq!(dim.units.as_deref(), Some("mm"));
        assert_eq!(dim.dim, Some(Axis::Length));
    }

    #[test]
    fn values_over_a_thousand() {
        let sizes = parse_sizes("Elevation: 0-3600 m");
        assert_eq!(sizes.len(), 1);
        let dim = &sizes[0].dims[0];
        assert_eq!(dim.low, Some(0.0));
        assert_eq!(dim.high, Some(3600.0));
        assert_eq!(dim.units.as_deref(), Some("m"));
    }

    #[test]
    fn full_outlier_notation() {
        let sizes = parse_sizes("(10-)30-60(-180+)[-250] cm");
        assert_eq!(sizes.len(), 1);
        let dim = &sizes[0].dims[0];
        assert_eq!(
            (dim.min, dim.low, dim.high, dim.max),
            (Some(10.0), Some(30.0), Some(60.0), Some(180.0))
        );
        assert_eq!(dim.units.as_deref(), Some("cm"));
    }

    #[test]
    fn width_only_notation() {
        let text = "0.8-2.5 mm wide";
        let sizes = parse_sizes(text);
        assert_eq!(sizes.len(), 1);
        let dim = &sizes[0].dims[0];
        assert_eq!(dim.dim, Some(Axis::Width));
        assert_eq!(dim.low, Some(0.8));
        assert_eq!(dim.high, Some(2.5));
        // The qualifier is part of the span.
        assert_eq!(&text[sizes[0].start..sizes[0].end], "0.8-2.5 mm wide");
    }

    #[test]
    fn diameter_qualifier() {
        let sizes = parse_sizes("6-9 mm diam.,");
        assert_eq!(sizes.len(), 1);
        assert_eq!(sizes[0].dims[0].dim, Some(Axis::Diameter));
    }

    #[test]
    fn two_groups_default_to_length_then_width() {
        let sizes = parse_sizes("4-11 x 2.5-8 cm");
        assert_eq!(sizes.len(), 1);
        assert_eq!(axes(&sizes[0]), vec![Axis::Length, Axis::Width]);
        // The first group inherits the trailing unit.
        assert_eq!(sizes[0].dims[0].units.as_deref(), Some("cm"));
    }

    #[test]
    fn three_groups_with_glued_cross() {
        let sizes = parse_sizes("(2.5-)2.8-3.5(-4.5) x 1x 1.6-2.2 mm");
        assert_eq!(sizes.len(), 1);
        let size = &sizes[0];
        assert_eq!(axes(size), vec![Axis::Length, Axis::Width, Axis::Thickness]);
        assert_eq!(
            (size.dims[0].min, size.dims[0].low, size.dims[0].high, size.dims[0].max),
            (Some(2.5), Some(2.8), Some(3.5), Some(4.5))
        );
        assert_eq!(size.dims[1].low, Some(1.0));
        assert_eq!(size.dims[1].high, None);
        assert_eq!(size.dims[2].low, Some(1.6));
        assert_eq!(size.dims[2].high, Some(2.2));
        for dim in &size.dims {
            assert_eq!(dim.units.as_deref(), Some("mm"));
        }
    }

    #[test]
    fn explicit_axis_leaves_the_default_pool() {
        let sizes = parse_sizes("9-12 cm long x 0.3-0.6 cm diam.");
        assert_eq!(sizes.len(), 1);
        assert_eq!(axes(&sizes[0]), vec![Axis::Length, Axis::Diameter]);
    }

    #[test]
    fn range_without_unit_is_not_a_size() {
        assert!(parse_sizes("lobes 3-5, spreading").is_empty());
    }

    #[test]
    fn trailing_unitless_group_is_trimmed() {
        let sizes = parse_sizes("4-11 cm x 2.5-8");
        assert_eq!(sizes.len(), 1);
        assert_eq!(sizes[0].dims.len(), 1);
        assert_eq!(sizes[0].dims[0].low, Some(4.0));
    }

    #[test]
    fn close_paren_breaks_unit_attachment() {
        // "(veins 2-4) cm" — the unit is outside the parenthetical.
        assert!(parse_sizes("2-4) cm").is_empty());
    }

    #[test]
    fn conversion_to_cm_rounds_to_three_decimals() {
        let vocab = Vocabulary::builtin().unwrap();
        let sizes = parse_sizes("13-37 x 7-32 mm");
        let converted = sizes[0].convert_to_cm(&vocab).unwrap();
        assert_eq!(converted.dims[0].low, Some(1.3));
        assert_eq!(converted.dims[0].high, Some(3.7));
        assert_eq!(converted.dims[1].low, Some(0.7));
        assert_eq!(converted.dims[1].high, Some(3.2));
        assert_eq!(converted.dims[0].units.as_deref(), Some("cm"));
        // Original is untouched.
        assert_eq!(sizes[0].dims[0].units.as_deref(), Some("mm"));
    }

    #[test]
    fn mm_to_cm_and_back_round_trips() {
        let sizes = parse_sizes("2-3(-4) mm");
        let vocab = Vocabulary::builtin().unwrap();
        let converted = sizes[0].convert_to_cm(&vocab).unwrap();
        for (dim, cm) in sizes[0].dims.iter().zip(&converted.dims) {
            for (orig, conv) in [
                (dim.low, cm.low),
                (dim.high, cm.high),
                (dim.max, cm.max),
            ] {
                if let (Some(orig), Some(conv)) = (orig, conv) {
                    assert!((conv * 10.0 - orig).abs() < 1e-9);
                }
            }
        }
    }
}
