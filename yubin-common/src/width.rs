//! Full-width / half-width conversion for the ASCII block
//!
//! Registry text mixes `1` and `１`. Range arithmetic works on folded
//! (half-width) digits and output is re-widened.

const FULLWIDTH_OFFSET: u32 = 0xFEE0;
const IDEOGRAPHIC_SPACE: char = '\u{3000}';

/// Fold full-width ASCII (U+FF01..U+FF5E) and the ideographic space to half-width
pub fn fold(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - FULLWIDTH_OFFSET).unwrap_or(c),
            IDEOGRAPHIC_SPACE => ' ',
            _ => c,
        })
        .collect()
}

/// Widen printable ASCII and space to their full-width forms
pub fn widen(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '!'..='~' => char::from_u32(c as u32 + FULLWIDTH_OFFSET).unwrap_or(c),
            ' ' => IDEOGRAPHIC_SPACE,
            _ => c,
        })
        .collect()
}
