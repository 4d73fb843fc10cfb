//! Unicode-to-ASCII folding.
//!
//! `spec.md` treats ASCII folding as an out-of-scope collaborator ("assume
//! a function `fold_ascii(c) -> sequence_of_chars`... available"). This
//! module is that collaborator: it decomposes a character with Unicode
//! canonical decomposition (`unicode-normalization`, the crate
//! `BraedenCu-trie-semantic-search` and `lukascobbler-basic_trie` both use
//! for the same purpose), drops combining marks, and maps the handful of
//! letters with no canonical decomposition (ß, the Scandinavian/Germanic
//! ligatures) through a small static table.
//!
//! Folding a single character can expand into more than one ASCII
//! character (`ß` -> `"ss"`, `æ` -> `"ae"`), which is why callers that need
//! to keep track of original positions (the highlighter) must fold
//! character-by-character rather than just lowercasing the whole string
//! with a library call.

use unicode_normalization::UnicodeNormalization;

/// Characters with no canonical Unicode decomposition into a base letter,
/// mapped to their closest ASCII transliteration.
fn fold_special(c: char) -> Option<&'static str> {
    Some(match c {
        'ß' => "ss",
        'æ' => "ae",
        'Æ' => "AE",
        'œ' => "oe",
        'Œ' => "OE",
        'ø' => "o",
        'Ø' => "O",
        'đ' => "d",
        'Đ' => "D",
        'ð' => "d",
        'Ð' => "D",
        'þ' => "th",
        'Þ' => "TH",
        'ł' => "l",
        'Ł' => "L",
        '\u{0131}' => "i", // dotless i
        _ => return None,
    })
}

/// Folds one character to its ASCII equivalent, expanding into a short
/// sequence of ASCII characters when necessary. Characters that are
/// already ASCII, or have no known transliteration, are returned as-is.
pub fn fold_ascii(c: char) -> impl Iterator<Item = char> {
    if c.is_ascii() {
        return FoldedChars::Single(Some(c));
    }
    if let Some(special) = fold_special(c) {
        return FoldedChars::Multi(special.chars());
    }
    // Canonical decomposition (e.g. 'á' -> 'a' + combining acute accent),
    // keeping only the non-combining part of the decomposition.
    let mut base = None;
    for decomposed in c.nfd() {
        if !is_combining_mark(decomposed) {
            base = Some(decomposed);
            break;
        }
    }
    FoldedChars::Single(Some(base.unwrap_or(c)))
}

/// Folds an entire string, applying [`fold_ascii`] to every character.
pub fn fold_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        out.extend(fold_ascii(c));
    }
    out
}

fn is_combining_mark(c: char) -> bool {
    // Combining Diacritical Marks and friends; covers everything NFD
    // produces for the Latin-1/Latin-Extended folding this crate cares
    // about.
    matches!(c as u32,
        0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF | 0x20D0..=0x20FF | 0xFE20..=0xFE2F)
}

enum FoldedChars {
    Single(Option<char>),
    Multi(std::str::Chars<'static>),
}

impl Iterator for FoldedChars {
    type Item = char;
    fn next(&mut self) -> Option<char> {
        match self {
            FoldedChars::Single(c) => c.take(),
            FoldedChars::Multi(chars) => chars.next(),
        }
    }
}
