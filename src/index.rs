//! The prefix index engine (component C4): owns the model list, the
//! word -> model-id inverted map, and the prefix -> words trie, and
//! answers conjunctive `search`/`search_exact` queries against whichever
//! [`IndexSnapshot`] is current.
//!
//! Rebuilds are atomic: a fresh snapshot is built in isolation (no shared
//! mutable state with the one currently published) and then swapped in
//! with a single [`arc_swap::ArcSwap`] store, the facility
//! `helix-editor-helix` uses throughout its workspace for exactly this
//! "readers never observe a half-built generation" shape (e.g. its
//! syntax-highlighting configuration reloads). Readers call
//! [`PrefixIndex::search_stream`] (or any of its callers), which loads
//! the current snapshot once via `Arc` and keeps using that `Arc` for
//! the lifetime of the returned iterator — a later rebuild cannot affect
//! a stream already in flight.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;

use crate::highlight::{HighlightMode, HighlightedString, SubwordHighlighter};
use crate::splitter::{string_splitter, StringWordSplitter, WordSplitter};
use crate::trie::Trie;

type ModelId = usize;

/// The immutable triple (model list, inverted word map, prefix trie)
/// representing one generation of the index. Never mutated after
/// construction; [`PrefixIndex`] only ever replaces the whole thing.
struct IndexSnapshot<M> {
    models: Vec<M>,
    inverted: HashMap<String, HashSet<ModelId>>,
    trie: Trie<HashSet<String>>,
}

impl<M> IndexSnapshot<M> {
    fn empty() -> Self {
        IndexSnapshot {
            models: Vec::new(),
            inverted: HashMap::new(),
            trie: Trie::new(),
        }
    }

    fn word_ids_prefix(&self, query_word: &str) -> HashSet<ModelId> {
        match self.trie.get_data(query_word) {
            None => HashSet::new(),
            Some(full_words) => {
                let mut ids = HashSet::new();
                for word in full_words {
                    if let Some(set) = self.inverted.get(word) {
                        ids.extend(set.iter().copied());
                    }
                }
                ids
            }
        }
    }

    fn word_ids_exact(&self, query_word: &str) -> HashSet<ModelId> {
        self.inverted.get(query_word).cloned().unwrap_or_default()
    }

    /// Resolves a query to the set of model ids it selects, or `None` if
    /// the query imposes no filter at all (absent query, or a query that
    /// splits to no words — both mean "match everything").
    fn resolve(&self, query: Option<&str>, query_splitter: &dyn WordSplitter<str>, exact: bool) -> Option<HashSet<ModelId>> {
        let query = query?;
        let words = query_splitter.split(query);
        let mut words = words.into_iter();
        let first = words.next()?;

        let word_ids = |w: &str| if exact { self.word_ids_exact(w) } else { self.word_ids_prefix(w) };

        let mut acc = word_ids(&first);
        for word in words {
            if acc.is_empty() {
                break;
            }
            let next = word_ids(&word);
            acc = acc.intersection(&next).copied().collect();
        }
        Some(acc)
    }
}

/// Lazy, ordered stream of models matching a query, bound to the
/// snapshot it was created from rather than to `PrefixIndex` itself.
pub struct SearchStream<M> {
    snapshot: Arc<IndexSnapshot<M>>,
    filter: Option<HashSet<ModelId>>,
    cursor: ModelId,
}

impl<M: Clone> Iterator for SearchStream<M> {
    type Item = M;

    fn next(&mut self) -> Option<M> {
        while self.cursor < self.snapshot.models.len() {
            let id = self.cursor;
            self.cursor += 1;
            if self.filter.as_ref().map_or(true, |ids| ids.contains(&id)) {
                return Some(self.snapshot.models[id].clone());
            }
        }
        None
    }
}

/// Owns the current index generation and answers queries against it.
///
/// `M` must be `Clone` because [`SearchStream`] yields owned models that
/// outlive any particular snapshot generation — a cheap bound in
/// practice, since models are typically small records or already
/// reference-counted by the caller.
pub struct PrefixIndex<M: Send + Sync + 'static> {
    data_splitter: Box<dyn WordSplitter<M> + Send + Sync>,
    query_splitter: Box<dyn WordSplitter<str> + Send + Sync>,
    highlighter: SubwordHighlighter,
    snapshot: ArcSwap<IndexSnapshot<M>>,
}

impl<M: Clone + Send + Sync + 'static> PrefixIndex<M> {
    /// Builds an empty index using `data_splitter` to derive words from
    /// each model. The query splitter defaults to the same
    /// lowercase+fold+`[a-z0-9]+` behavior as
    /// [`StringWordSplitter`]'s default, and the highlighter to
    /// [`SubwordHighlighter::new`]; both can be overridden with
    /// [`Self::with_query_splitter`]/[`Self::with_highlighter`].
    pub fn new(data_splitter: impl WordSplitter<M> + Send + Sync + 'static) -> Self {
        PrefixIndex {
            data_splitter: Box::new(data_splitter),
            query_splitter: Box::new(string_splitter()),
            highlighter: SubwordHighlighter::new(),
            snapshot: ArcSwap::new(Arc::new(IndexSnapshot::empty())),
        }
    }

    pub fn with_query_splitter(mut self, query_splitter: impl WordSplitter<str> + Send + Sync + 'static) -> Self {
        self.query_splitter = Box::new(query_splitter);
        self
    }

    pub fn with_highlighter(mut self, highlighter: SubwordHighlighter) -> Self {
        self.highlighter = highlighter;
        self
    }

    /// Rebuilds the index from `models`, assigning ids by enumeration
    /// order, then atomically publishes the new snapshot. Existing
    /// readers holding a stream from the prior snapshot are unaffected.
    pub fn create_index(&self, models: Vec<M>) {
        let start = Instant::now();
        let model_count = models.len();

        let mut inverted: HashMap<String, HashSet<ModelId>> = HashMap::new();
        for (id, model) in models.iter().enumerate() {
            for word in self.data_splitter.split(model) {
                inverted.entry(word).or_default().insert(id);
            }
        }

        let mut prefixes: HashMap<String, HashSet<String>> = HashMap::new();
        for word in inverted.keys() {
            // Char boundaries, not raw byte offsets: the default splitter
            // only ever emits ASCII words, but `StringWordSplitter::with_pattern`
            // lets a caller supply a pattern (e.g. `\w+` under regex's
            // default Unicode mode) that matches multi-byte words, and
            // `fold_ascii` doesn't guarantee an ASCII result for every
            // script (Cyrillic has no decomposition and isn't in the
            // transliteration table). Slicing on byte offsets there would
            // panic mid-character.
            let ends = word.char_indices().map(|(i, _)| i).skip(1).chain([word.len()]);
            for end in ends {
                prefixes
                    .entry(word[..end].to_string())
                    .or_default()
                    .insert(word.clone());
            }
        }

        // Ascending length then lexicographic: minimizes intermediate
        // splits during the build (`spec.md` §4.4 step 4 / §9).
        let mut keys: Vec<String> = prefixes.keys().cloned().collect();
        keys.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));

        let mut trie = Trie::new();
        for key in keys {
            let words = prefixes.remove(&key).expect("key collected from this map");
            trie.insert(&key, words);
        }

        let distinct_words = inverted.len();
        let snapshot = IndexSnapshot { models, inverted, trie };
        self.snapshot.store(Arc::new(snapshot));

        log::debug!(
            "prefixdex: rebuilt index with {model_count} models, {distinct_words} distinct words in {:?}",
            start.elapsed()
        );
    }

    fn load(&self) -> Arc<IndexSnapshot<M>> {
        self.snapshot.load_full()
    }

    /// Streams every model whose words satisfy `query` as a conjunction
    /// of prefix matches. `None` (or a query with no extractable words)
    /// matches every model.
    pub fn search_stream(&self, query: Option<&str>) -> SearchStream<M> {
        let snapshot = self.load();
        let filter = snapshot.resolve(query, self.query_splitter.as_ref(), false);
        SearchStream { snapshot, filter, cursor: 0 }
    }

    /// As [`Self::search_stream`], but matches query words exactly
    /// rather than as prefixes.
    pub fn search_exact_stream(&self, query: Option<&str>) -> SearchStream<M> {
        let snapshot = self.load();
        let filter = snapshot.resolve(query, self.query_splitter.as_ref(), true);
        SearchStream { snapshot, filter, cursor: 0 }
    }

    pub fn search(&self, query: Option<&str>) -> Vec<M> {
        self.search_stream(query).collect()
    }

    /// Bounded variant of [`Self::search`] (`spec.md` §6).
    pub fn search_bounded(&self, query: Option<&str>, max_size: usize) -> Vec<M> {
        self.search_stream(query).take(max_size).collect()
    }

    pub fn search_exact(&self, query: Option<&str>) -> Vec<M> {
        self.search_exact_stream(query).collect()
    }

    pub fn get_all(&self) -> Vec<M> {
        self.search_stream(None).collect()
    }

    pub fn len(&self) -> usize {
        self.load().models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Splits `query` with the query splitter and highlights `value`
    /// against the resulting words in text mode. A `None`/empty query
    /// yields `value` with no highlights.
    pub fn get_highlighted(&self, value: Option<&str>, query: Option<&str>) -> HighlightedString {
        let words = self.query_words(query);
        self.highlighter.highlight(value, &words, HighlightMode::Text)
    }

    /// As [`Self::get_highlighted`], but in HTML mode: simple inline tags
    /// in `value` are skipped rather than highlighted over.
    pub fn get_highlighted_html(&self, value: Option<&str>, query: Option<&str>) -> HighlightedString {
        let words = self.query_words(query);
        self.highlighter.highlight(value, &words, HighlightMode::Html)
    }

    fn query_words(&self, query: Option<&str>) -> HashSet<String> {
        query.map(|q| self.query_splitter.split(q)).unwrap_or_default()
    }

    /// A transparent stream transformer: filters `search_stream`'s
    /// output by `predicate`. Composing two filters (by calling `.filter`
    /// again on the resulting iterator) is a conjunction, since it's
    /// just `Iterator::filter` underneath — there is no separate
    /// decorator type to maintain (`spec.md` §9).
    pub fn filter<'a>(&'a self, query: Option<&str>, predicate: impl Fn(&M) -> bool + 'a) -> impl Iterator<Item = M> + 'a {
        self.search_stream(query).filter(move |m| predicate(m))
    }

    /// A transparent stream transformer: projects `search_stream`'s
    /// output through `projection`.
    pub fn map<'a, R>(&'a self, query: Option<&str>, projection: impl Fn(M) -> R + 'a) -> impl Iterator<Item = R> + 'a {
        self.search_stream(query).map(projection)
    }
}

/// Convenience constructor for the common case of indexing plain
/// strings with the default [`StringWordSplitter`].
pub fn string_index() -> PrefixIndex<String> {
    PrefixIndex::new(StringWordSplitter::new(|s: &String| Some(s.clone())))
}
