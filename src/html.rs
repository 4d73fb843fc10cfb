//! The "simple tag" dialect recognized by the HTML-mode highlighter:
//! `</?[a-z]+>` — a balanced open or close tag with a lowercase name, no
//! attributes, no self-closing empty tags. Attributes, uppercase names,
//! comments, CDATA, and entities are not recognized and are treated as
//! literal text (a known limitation, not a bug — `spec.md` §9).

use regex::Regex;
use std::sync::OnceLock;

fn simple_tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"</?[a-z]+>").expect("simple tag pattern is valid"))
}

/// Returns the byte ranges of every simple tag in `s`, in order.
pub fn tag_ranges(s: &str) -> impl Iterator<Item = std::ops::Range<usize>> + '_ {
    simple_tag_pattern().find_iter(s).map(|m| m.range())
}

/// Strips every simple tag out of `s`, returning the tag-free text.
pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut cursor = 0;
    for range in tag_ranges(s) {
        out.push_str(&s[cursor..range.start]);
        cursor = range.end;
    }
    out.push_str(&s[cursor..]);
    out
}
