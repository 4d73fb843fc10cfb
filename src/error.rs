//! Crate-wide error type.
//!
//! The only fallible public entry point in `prefixdex` is constructing a
//! [`crate::splitter::StringWordSplitter`] from a caller-supplied subword
//! pattern. Everything else is either total (lookups on absent data return
//! `None`/empty collections) or a programmer error that fails fast via
//! `assert!`/`debug_assert!`, matching the invariant-violation style the
//! trie and matching-set code in the teacher crate already use.

use thiserror::Error;

/// Errors that can be returned from `prefixdex`'s public API.
#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied subword or tag pattern failed to compile.
    #[error("invalid subword pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
