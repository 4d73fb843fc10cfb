//! Subword highlighting (component C3) and the immutable highlighted
//! result value (component C5).
//!
//! The highlighter aligns a normalized, optionally HTML-stripped view of
//! a string with the original string through a position map, so
//! highlights always land on the original bytes even after lowercasing,
//! Unicode folding, or tag stripping shifted everything around.

use std::collections::HashSet;
use std::ops::Range;

use regex::Regex;

use crate::error::{Error, Result};
use crate::fold::fold_ascii;
use crate::html;
use crate::splitter::DEFAULT_SUBWORD_PATTERN;

/// A highlighted span `(start, length)` within a [`HighlightedString`]'s
/// value, in byte offsets. `start` can never be negative — `usize`
/// already rules that precondition out at the type level — but a
/// non-positive `length` is still a programmer error and fails fast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Highlight {
    pub start: usize,
    pub length: usize,
}

impl Highlight {
    pub fn new(start: usize, length: usize) -> Self {
        assert!(length >= 1, "Highlight length must be positive, got {length}");
        Highlight { start, length }
    }

    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// Whether a [`HighlightSegment`] is part of a query match or plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Tag {
    Plain,
    Highlighted,
}

/// A contiguous run of a [`HighlightedString`]'s value, tagged
/// highlighted or not. Segments partition the value: they are ordered,
/// disjoint, and concatenate back to it exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HighlightSegment {
    pub text: String,
    pub tag: Tag,
}

impl HighlightSegment {
    pub fn is_highlighted(&self) -> bool {
        matches!(self.tag, Tag::Highlighted)
    }
}

/// An original string plus a non-overlapping, length-bounded set of
/// [`Highlight`]s, resolvable to a segment list via [`Self::segments`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightedString {
    value: String,
    highlights: Vec<Highlight>,
}

impl HighlightedString {
    /// Builds a `HighlightedString`, clipping highlights to the value's
    /// length and sorting them by ascending start, descending length (the
    /// order `spec.md` §3 requires).
    pub fn new(value: impl Into<String>, mut highlights: Vec<Highlight>) -> Self {
        let value = value.into();
        let len = value.len();
        highlights.retain_mut(|h| {
            h.start = h.start.min(len);
            h.length = h.length.min(len.saturating_sub(h.start));
            h.length > 0
        });
        highlights.sort_by(|a, b| a.start.cmp(&b.start).then(b.length.cmp(&a.length)));
        HighlightedString { value, highlights }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn highlights(&self) -> &[Highlight] {
        &self.highlights
    }

    /// Splits the value into alternating plain/highlighted segments.
    /// Concatenating every segment's text reproduces the value exactly;
    /// no two adjacent segments share a tag.
    pub fn segments(&self) -> Vec<HighlightSegment> {
        if self.value.is_empty() {
            return Vec::new();
        }
        let len = self.value.len();
        let mut result: Vec<HighlightSegment> = Vec::new();
        let mut cursor = 0usize;

        for h in &self.highlights {
            let start = h.start.min(len);
            let end = h.end().min(len);
            if end <= cursor {
                // Fully before the cursor: an overlapping/redundant entry.
                continue;
            }
            let start = start.max(cursor);
            if start > cursor {
                push_segment(&mut result, &self.value[cursor..start], Tag::Plain);
            }
            if end > start {
                push_segment(&mut result, &self.value[start..end], Tag::Highlighted);
                cursor = end;
            }
        }
        if cursor < len {
            push_segment(&mut result, &self.value[cursor..], Tag::Plain);
        }
        result
    }
}

fn push_segment(result: &mut Vec<HighlightSegment>, text: &str, tag: Tag) {
    if text.is_empty() {
        return;
    }
    if let Some(last) = result.last_mut() {
        if last.tag == tag {
            last.text.push_str(text);
            return;
        }
    }
    result.push(HighlightSegment { text: text.to_string(), tag });
}

/// Text or HTML highlighting mode (`spec.md` §4.3/§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightMode {
    Text,
    Html,
}

/// Produces a [`HighlightedString`] for a raw value and a set of query
/// words, honoring Unicode case/diacritic folding and, in HTML mode,
/// simple inline tags.
///
/// HTML mode only recognizes the simple tag dialect `</?[a-z]+>`
/// (`crate::html`); malformed or attribute-bearing tags are treated as
/// literal text and may end up spanning a highlight's `<`/`>` — a known
/// limitation, not a bug (`spec.md` §9).
pub struct SubwordHighlighter {
    subword_pattern: Regex,
}

impl Default for SubwordHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl SubwordHighlighter {
    pub fn new() -> Self {
        SubwordHighlighter {
            subword_pattern: Regex::new(DEFAULT_SUBWORD_PATTERN).expect("default pattern is valid"),
        }
    }

    pub fn with_pattern(pattern: &str) -> Result<Self> {
        Ok(SubwordHighlighter {
            subword_pattern: Regex::new(pattern).map_err(Error::InvalidPattern)?,
        })
    }

    pub fn highlight(
        &self,
        value: Option<&str>,
        query_words: &HashSet<String>,
        mode: HighlightMode,
    ) -> HighlightedString {
        let value = value.unwrap_or("");
        if value.trim().is_empty() || query_words.is_empty() {
            return HighlightedString::new(value.to_string(), Vec::new());
        }

        // Longest-first, then lexicographic ascending, so longer query
        // words mask shorter ones that start at the same position.
        let mut sorted_words: Vec<&String> = query_words.iter().collect();
        sorted_words.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let html_mode = mode == HighlightMode::Html;
        let (normalized, position_map) = build_normalized(value, html_mode);

        let mut raw_spans: Vec<(usize, usize)> = Vec::new();
        let mut next_allowed = 0usize;
        for m in self.subword_pattern.find_iter(&normalized) {
            let start = m.start();
            if start < next_allowed {
                continue;
            }
            for word in &sorted_words {
                if normalized[start..].starts_with(word.as_str()) {
                    raw_spans.push((start, word.len()));
                    next_allowed = start + word.len();
                    break;
                }
            }
        }

        let mut highlights = Vec::new();
        for (start, length) in raw_spans {
            let orig_start = position_map[start];
            let orig_end = position_map[start + length];
            if orig_end <= orig_start {
                continue;
            }
            if html_mode {
                highlights.extend(carve_html_tags(value, orig_start, orig_end));
            } else {
                highlights.push(Highlight::new(orig_start, orig_end - orig_start));
            }
        }

        HighlightedString::new(value.to_string(), highlights)
    }
}

/// Subdivides the span `value[start..end]` at every simple HTML tag it
/// contains, excluding the tag spans themselves. A single "H2S"-style
/// match that only lines up in the tag-stripped view can cover tags in
/// the original (e.g. `H<sub>2</sub>S`); this keeps those tags out of
/// the resulting highlight runs.
fn carve_html_tags(value: &str, start: usize, end: usize) -> Vec<Highlight> {
    let mut result = Vec::new();
    let mut cursor = start;
    for tag in html::tag_ranges(&value[start..end]) {
        let tag_start = start + tag.start;
        let tag_end = start + tag.end;
        if tag_start > cursor {
            result.push(Highlight::new(cursor, tag_start - cursor));
        }
        cursor = tag_end;
    }
    if cursor < end {
        result.push(Highlight::new(cursor, end - cursor));
    }
    result
}

/// Builds the lowercased, ASCII-folded (and, in HTML mode, tag-stripped)
/// view of `value`, together with a position map of length
/// `|normalized| + 1` translating a byte offset in the normalized view
/// back to the original value.
///
/// Every normalized character produced while folding one original
/// character maps to the byte offset *past* that original character
/// (`spec.md` §4.3 bullet 4); since a normalized position used for a
/// match boundary is always the cumulative count of characters
/// consumed so far, this means `position_map[i]` is exactly the original
/// offset at which the `i`-th normalized character's underlying content
/// begins (or the whole normalized prefix ends, at `i == |normalized|`).
/// A value with no folding, no case change, and no tags collapses this
/// into the identity map, so there is no need for the separate
/// unnormalized code path `spec.md` describes as an optimization.
fn build_normalized(value: &str, html_mode: bool) -> (String, Vec<usize>) {
    let mut normalized = String::with_capacity(value.len());
    let mut map = Vec::with_capacity(value.len() + 1);
    map.push(0);

    let tag_ranges: Vec<Range<usize>> = if html_mode {
        html::tag_ranges(value).collect()
    } else {
        Vec::new()
    };
    let mut tag_iter = tag_ranges.into_iter().peekable();

    let mut chars = value.char_indices().peekable();
    while let Some(&(idx, _)) = chars.peek() {
        if let Some(tag) = tag_iter.peek().cloned() {
            if tag.start == idx {
                while let Some(&(ci, _)) = chars.peek() {
                    if ci >= tag.end {
                        break;
                    }
                    chars.next();
                }
                tag_iter.next();
                continue;
            }
        }
        let (idx, c) = chars.next().unwrap();
        let past = idx + c.len_utf8();
        for lowered in c.to_lowercase() {
            for folded in fold_ascii(lowered) {
                normalized.push(folded);
                map.push(past);
            }
        }
    }
    (normalized, map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::splitter::{string_splitter, WordSplitter};

    fn words(s: &str) -> HashSet<String> {
        // Mirrors how `PrefixIndex` feeds a query through the word
        // splitter before handing the words to the highlighter.
        string_splitter().split(s)
    }

    fn plain(text: &str) -> HighlightSegment {
        HighlightSegment { text: text.to_string(), tag: Tag::Plain }
    }
    fn hi(text: &str) -> HighlightSegment {
        HighlightSegment { text: text.to_string(), tag: Tag::Highlighted }
    }

    #[test]
    fn empty_query_returns_value_unhighlighted() {
        let highlighter = SubwordHighlighter::new();
        let result = highlighter.highlight(Some("hello world"), &HashSet::new(), HighlightMode::Text);
        assert_eq!(result.value(), "hello world");
        assert!(result.highlights().is_empty());
    }

    #[test]
    fn whitespace_only_value_is_untouched() {
        let highlighter = SubwordHighlighter::new();
        let result = highlighter.highlight(Some("   "), &words("anything"), HighlightMode::Text);
        assert_eq!(result.value(), "   ");
        assert!(result.highlights().is_empty());
    }

    #[test]
    fn diacritics_fold_for_matching_but_highlight_original() {
        let highlighter = SubwordHighlighter::new();
        let result = highlighter.highlight(
            Some("García Coruña"),
            &words("garcia cöruná"),
            HighlightMode::Text,
        );
        assert_eq!(result.segments(), vec![hi("García"), plain(" "), hi("Coruña")]);
    }

    #[test]
    fn eszett_folds_and_expands_length() {
        let highlighter = SubwordHighlighter::new();
        let result = highlighter.highlight(
            Some("Der Haß ist krass ohne Maß."),
            &words("kraß mass"),
            HighlightMode::Text,
        );
        assert_eq!(
            result.segments(),
            vec![
                plain("Der Haß ist "),
                hi("krass"),
                plain(" ohne "),
                hi("Maß"),
                plain("."),
            ]
        );
    }

    #[test]
    fn html_mode_highlights_across_simple_tags() {
        let highlighter = SubwordHighlighter::new();
        let result = highlighter.highlight(
            Some("<i>Tag1 <b>Tag2</b></i>"),
            &words("TAG"),
            HighlightMode::Html,
        );
        assert_eq!(
            result.segments(),
            vec![
                plain("<i>"),
                hi("Tag"),
                plain("1 <b>"),
                hi("Tag"),
                plain("2</b></i>"),
            ]
        );
    }

    #[test]
    fn html_mode_carves_a_match_split_by_tags() {
        let highlighter = SubwordHighlighter::new();
        let result = highlighter.highlight(
            Some("H<sub>2</sub>O H<sub>2</sub>SO<sub>4</sub>"),
            &words("H2S"),
            HighlightMode::Html,
        );
        assert_eq!(
            result.segments(),
            vec![
                plain("H<sub>2</sub>O "),
                hi("H"),
                plain("<sub>"),
                hi("2"),
                plain("</sub>"),
                hi("S"),
                plain("O<sub>4</sub>"),
            ]
        );
    }

    #[test]
    fn hyphen_is_a_word_boundary() {
        let highlighter = SubwordHighlighter::new();
        let result = highlighter.highlight(
            Some("Hans-Dieter Meier"),
            &words("Hans-Dieter Meier"),
            HighlightMode::Text,
        );
        assert_eq!(
            result.segments(),
            vec![hi("Hans"), plain("-"), hi("Dieter"), plain(" "), hi("Meier")]
        );
    }

    #[test]
    fn segments_round_trip_the_original_value() {
        let highlighter = SubwordHighlighter::new();
        let value = "Der Herr der Ringe - Die Gefährten / J. R. R. Tolkien";
        let result = highlighter.highlight(Some(value), &words("herr tolkien"), HighlightMode::Text);
        let rebuilt: String = result.segments().into_iter().map(|s| s.text).collect();
        assert_eq!(rebuilt, value);
    }
}
