//! Numeric range recognition over token sequences.
//!
//! Treatment prose writes ranges with nested parenthetical outliers:
//! "(5-)10-30(-50)" means typical 10-30, rarely down to 5 or up to 50.
//! The recognizer fills the four slots (min, low, high, max) positionally:
//! the outermost non-parenthesized pair is always low/high, a leading
//! parenthesized number is min, trailing parenthesized or bracketed groups
//! fill max. Numbers beyond the four slots are consumed but dropped, and a
//! trailing "+" is absorbed by the preceding slot without creating a bound.

use crate::token::{Token, TokenKind};

/// One recognized range. `start`/`end` are byte offsets, `first_token`/
/// `end_token` the half-open token index range it consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeMatch {
    pub min: Option<f64>,
    pub low: Option<f64>,
    pub high: Option<f64>,
    pub max: Option<f64>,
    pub start: usize,
    pub end: usize,
    pub first_token: usize,
    pub end_token: usize,
}

/// Find all ranges in a token stream, leftmost and non-overlapping.
pub fn find_ranges(tokens: &[Token]) -> Vec<RangeMatch> {
    let mut ranges = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        match match_at(tokens, i) {
            Some(m) => {
                i = m.end_token;
                ranges.push(m);
            }
            None => i += 1,
        }
    }

    ranges
}

fn kind(tokens: &[Token], i: usize) -> Option<TokenKind> {
    tokens.get(i).map(|t| t.kind)
}

/// Try to match a range starting exactly at token `i`.
fn match_at(tokens: &[Token], i: usize) -> Option<RangeMatch> {
    let mut j = i;
    let mut min = None;

    // Leading "(N-)" outlier.
    if kind(tokens, j) == Some(TokenKind::Open) {
        let lead = match_lead_group(tokens, j)?;
        min = Some(lead.0);
        j = lead.1;
    }

    // The required first main number.
    let low_token = tokens.get(j).filter(|t| t.kind == TokenKind::Number)?;
    let low = low_token.value;
    j += 1;

    // "- N [+]" second main number.
    let mut high = None;
    if kind(tokens, j) == Some(TokenKind::Dash)
        && kind(tokens, j + 1) == Some(TokenKind::Number)
    {
        high = tokens[j + 1].value;
        j += 2;
    }

    // Open-ended "+" after the last main number; no bound created.
    if kind(tokens, j) == Some(TokenKind::Plus) {
        j += 1;
    }

    // Trailing "(-N[+])" / "[-N[+]]" outlier groups. The first fills max;
    // the numbers of any further groups are dropped (truncate-to-four).
    let mut max = None;
    while let Some((value, next)) = match_trail_group(tokens, j) {
        if max.is_none() {
            max = Some(value);
        }
        j = next;
    }

    Some(RangeMatch {
        min,
        low,
        high,
        max,
        start: tokens[i].start,
        end: tokens[j - 1].end,
        first_token: i,
        end_token: j,
    })
}

/// "( N -* )" — returns (value, next_token). The caller must see a number
/// right after, so a bare parenthesized range "(5-8)" is not a lead group.
fn match_lead_group(tokens: &[Token], i: usize) -> Option<(f64, usize)> {
    let mut j = i + 1;
    let value = tokens.get(j).filter(|t| t.kind == TokenKind::Number)?.value?;
    j += 1;
    while kind(tokens, j) == Some(TokenKind::Dash) {
        j += 1;
    }
    if kind(tokens, j) != Some(TokenKind::Close) {
        return None;
    }
    j += 1;
    // A following number is what makes this a leading outlier.
    if kind(tokens, j) != Some(TokenKind::Number) {
        return None;
    }
    Some((value, j))
}

/// "( -* N [+] )" — returns (value, next_token).
fn match_trail_group(tokens: &[Token], i: usize) -> Option<(f64, usize)> {
    if kind(tokens, i) != Some(TokenKind::Open) {
        return None;
    }
    let mut j = i + 1;
    while kind(tokens, j) == Some(TokenKind::Dash) {
        j += 1;
    }
    let value = tokens.get(j).filter(|t| t.kind == TokenKind::Number)?.value?;
    j += 1;
    if kind(tokens, j) == Some(TokenKind::Plus) {
        j += 1;
    }
    if kind(tokens, j) != Some(TokenKind::Close) {
        return None;
    }
    Some((value, j + 1))
}
