//! Word derivation (component C2).
//!
//! Converts a model, or a raw query string, into a duplicate-free set of
//! normalized words. The default implementation — lowercase, optional
//! ASCII folding, then a subword regular expression — is
//! [`StringWordSplitter`]; it is generic over the projection from an
//! input type `T` to the string it indexes, mirroring how the teacher
//! keeps its autocompleter generic over the string source rather than
//! hard-coding a single model shape.

use std::collections::HashSet;

use regex::Regex;

use crate::error::{Error, Result};
use crate::fold::fold_str;

/// The default subword pattern from `spec.md` §4.2/§6.
pub const DEFAULT_SUBWORD_PATTERN: &str = "[a-z0-9]+";

/// Derives a set of normalized words from a value of type `T`.
///
/// Implementations are expected to be pure and side-effect-free; the
/// engine calls this once per model at rebuild time and once per query.
pub trait WordSplitter<T: ?Sized> {
    /// Returns the normalized words extracted from `input`. Returns the
    /// empty set when the input yields no string or the string contains
    /// no pattern matches — never an error.
    fn split(&self, input: &T) -> HashSet<String>;
}

/// Default [`WordSplitter`]: lowercase, fold, then match `subword_pattern`.
pub struct StringWordSplitter<T: ?Sized> {
    projection: Box<dyn Fn(&T) -> Option<String> + Send + Sync>,
    pattern: Regex,
    normalize_unicode: bool,
}

impl<T: ?Sized> StringWordSplitter<T> {
    /// Builds a splitter with the default subword pattern (`[a-z0-9]+`)
    /// and Unicode normalization enabled.
    pub fn new(projection: impl Fn(&T) -> Option<String> + Send + Sync + 'static) -> Self {
        Self {
            projection: Box::new(projection),
            pattern: Regex::new(DEFAULT_SUBWORD_PATTERN).expect("default pattern is valid"),
            normalize_unicode: true,
        }
    }

    /// Builds a splitter with a caller-supplied subword pattern. This is
    /// the crate's only fallible constructor: an invalid regular
    /// expression is caller input, not a programmer error, so it is
    /// reported as a [`Error`] rather than panicking.
    pub fn with_pattern(
        projection: impl Fn(&T) -> Option<String> + Send + Sync + 'static,
        pattern: &str,
    ) -> Result<Self> {
        Ok(Self {
            projection: Box::new(projection),
            pattern: Regex::new(pattern).map_err(Error::InvalidPattern)?,
            normalize_unicode: true,
        })
    }

    /// Toggles ASCII folding (default on), builder-style.
    pub fn normalize(mut self, normalize_unicode: bool) -> Self {
        self.normalize_unicode = normalize_unicode;
        self
    }
}

impl<T: ?Sized> WordSplitter<T> for StringWordSplitter<T> {
    fn split(&self, input: &T) -> HashSet<String> {
        let Some(raw) = (self.projection)(input) else {
            return HashSet::new();
        };
        let lowered = raw.to_lowercase();
        let normalized = if self.normalize_unicode {
            fold_str(&lowered)
        } else {
            lowered
        };
        self.pattern
            .find_iter(&normalized)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

/// A convenience splitter over plain strings (used for query tokenization
/// when the model-side splitter's projection isn't applicable).
pub fn string_splitter() -> StringWordSplitter<str> {
    StringWordSplitter::new(|s: &str| Some(s.to_string()))
}
