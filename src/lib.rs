//! In-memory prefix-search index with Unicode-aware subword highlighting.
//!
//! [`index::PrefixIndex`] owns a list of models plus a radix [`trie::Trie`]
//! over every prefix of every word they contain, rebuilt wholesale and
//! swapped in atomically so readers never observe a half-built
//! generation. [`splitter::WordSplitter`] derives normalized words from a
//! model or a query string; [`highlight::SubwordHighlighter`] re-finds
//! those words in a value string and reports where to highlight them,
//! in either plain text or simple-HTML mode.
//!
//! ```
//! use prefixdex::index::PrefixIndex;
//! use prefixdex::splitter::StringWordSplitter;
//!
//! let index = PrefixIndex::new(StringWordSplitter::new(|s: &String| Some(s.clone())));
//! index.create_index(vec![
//!     "Der Herr der Ringe".to_string(),
//!     "Der kleine Hobbit".to_string(),
//! ]);
//! assert_eq!(index.search(Some("ring")), vec!["Der Herr der Ringe".to_string()]);
//! ```

pub mod error;
pub mod fold;
pub mod highlight;
pub mod html;
pub mod index;
pub mod splitter;
pub mod trie;

pub use error::{Error, Result};
pub use highlight::{Highlight, HighlightMode, HighlightSegment, HighlightedString, SubwordHighlighter, Tag};
pub use index::{string_index, PrefixIndex, SearchStream};
pub use splitter::{string_splitter, StringWordSplitter, WordSplitter};
pub use trie::Trie;
