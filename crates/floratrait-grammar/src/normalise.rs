//! Text cleanup applied before tokenization.
//!
//! Flora pages arrive with mojibake from double-decoded UTF-8, a zoo of
//! dash code points used interchangeably for ranges, and typographic
//! glyphs the grammar folds to ASCII. All operations are idempotent:
//! normalising already-clean text returns it unchanged.

use regex::Regex;
use std::sync::OnceLock;

/// Common UTF-8-decoded-as-Latin-1 byte sequences seen in scraped pages.
/// Three-character sequences first: they share prefixes with the shorter
/// ones.
const MOJIBAKE: &[(&str, &str)] = &[
    ("â€“", "–"),
    ("â€”", "—"),
    ("â€˜", "'"),
    ("â€™", "'"),
    ("â€œ", "\""),
    ("â€\u{9d}", "\""),
    ("Ã—", "×"),
    ("Â±", "±"),
    ("Âµ", "µ"),
    ("Â°", "°"),
    ("Â ", " "),
];

fn dash_run_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Hyphen-minus, hyphen, non-breaking hyphen, figure dash, en dash,
        // em dash, horizontal bar and the minus sign all mark ranges.
        Regex::new(r"[-\u{2010}\u{2011}\u{2012}\u{2013}\u{2014}\u{2015}\u{2212}]+").unwrap()
    })
}

/// Clean one treatment string. Order matters: mojibake repair first, then
/// glyph folding, so a repaired "Ã—" still becomes the ASCII cross.
pub fn normalise(text: &str) -> String {
    let mut text = text.to_string();

    for (broken, fixed) in MOJIBAKE {
        if text.contains(broken) {
            text = text.replace(broken, fixed);
        }
    }

    // Soft hyphens are line-break artifacts, not range dashes.
    text = text.replace('\u{00ad}', "");
    text = dash_run_regex().replace_all(&text, "-").into_owned();
    text = text.replace('±', "+/-");
    text = text.replace('×', "x");
    text = text.replace('\u{00a0}', " ");

    text
}
