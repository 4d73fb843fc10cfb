//! Randomized property tests for the prefix trie, covering the
//! universally-quantified invariants (every inserted word is contained
//! exactly, every prefix of an inserted word is at least `contains_prefix`,
//! insertion order doesn't affect the resulting tree's query answers).

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;

use prefixdex::Trie;

const ALPHABET: &[u8] = b"abcdefgh";

fn random_word(rng: &mut impl Rng, max_len: usize) -> String {
    let len = rng.gen_range(1..=max_len);
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

fn prefixes_of(word: &str) -> impl Iterator<Item = &str> {
    (1..=word.len()).map(move |i| &word[..i])
}

#[test]
fn every_inserted_word_is_contained_with_its_payload() {
    let mut rng = rand::thread_rng();
    let mut expected: HashMap<String, u32> = HashMap::new();
    let mut trie: Trie<u32> = Trie::new();

    for i in 0..300u32 {
        let word = random_word(&mut rng, 6);
        trie.insert(&word, i);
        expected.insert(word, i);
    }

    for (word, payload) in &expected {
        assert!(trie.contains(word), "expected {word:?} to be contained");
        assert_eq!(trie.get_data(word), Some(payload));
    }
}

#[test]
fn every_prefix_of_an_inserted_word_is_a_contained_prefix() {
    let mut rng = rand::thread_rng();
    let mut trie: Trie<()> = Trie::new();
    let mut words = HashSet::new();

    for _ in 0..200 {
        let word = random_word(&mut rng, 7);
        trie.insert(&word, ());
        words.insert(word);
    }

    for word in &words {
        for prefix in prefixes_of(word) {
            assert!(
                trie.contains_prefix(prefix),
                "expected {prefix:?} (a prefix of {word:?}) to be a contained prefix"
            );
        }
    }
}

#[test]
fn insertion_order_does_not_affect_query_results() {
    let mut rng = rand::thread_rng();
    let mut words: Vec<String> = (0..150).map(|_| random_word(&mut rng, 6)).collect();
    words.sort();
    words.dedup();

    let mut ascending: Trie<usize> = Trie::new();
    for (i, word) in words.iter().enumerate() {
        ascending.insert(word, i);
    }

    let mut shuffled_words = words.clone();
    shuffled_words.shuffle(&mut rng);
    let mut shuffled: Trie<usize> = Trie::new();
    for word in &shuffled_words {
        let i = words.iter().position(|w| w == word).unwrap();
        shuffled.insert(word, i);
    }

    for word in &words {
        assert_eq!(ascending.contains(word), shuffled.contains(word));
        assert_eq!(ascending.get_data(word), shuffled.get_data(word));
    }
}

#[test]
fn delete_removes_exact_match_without_disturbing_longer_words() {
    let mut rng = rand::thread_rng();
    let mut trie: Trie<u32> = Trie::new();
    let mut words: Vec<String> = (0..100).map(|_| random_word(&mut rng, 6)).collect();
    words.sort();
    words.dedup();
    for (i, word) in words.iter().enumerate() {
        trie.insert(word, i as u32);
    }

    // Delete every word that is itself a prefix of some other inserted word.
    let prefixes: Vec<&String> = words
        .iter()
        .filter(|w| words.iter().any(|other| other != *w && other.starts_with(w.as_str())))
        .collect();

    for word in &prefixes {
        trie.delete(word);
    }
    for word in &prefixes {
        assert!(!trie.contains(word));
        assert_eq!(trie.get_data(word), None);
        // Still reachable as a path, since a longer word depends on it.
        assert!(trie.contains_prefix(word));
    }
    for word in &words {
        if !prefixes.contains(&word) {
            assert!(trie.contains(word));
        }
    }
}

#[test]
fn absorbing_the_same_word_twice_keeps_a_single_entry() {
    let mut trie: Trie<u32> = Trie::new();
    trie.insert("overlap", 1);
    trie.insert("overlap", 2);
    assert_eq!(trie.get_data("overlap"), Some(&2));
    assert_eq!(trie.depth(), "overlap".len());
}
