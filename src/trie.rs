//! Compact radix/patricia trie (component C1).
//!
//! Nodes live in a [`slab::Slab`] arena and reference each other only by
//! index — first-child and next-sibling links, no parent pointer — the
//! way the teacher crate keeps its autocompletion trie acyclic and
//! trivially ownable by the containing `Trie` rather than reaching for
//! `Rc`/`RefCell` nodes. Sibling lists are kept sorted by ascending first
//! edge byte; every operation that walks a sibling list relies on that
//! invariant.
//!
//! Edge labels are raw bytes, not Unicode scalar values: comparisons and
//! splits happen byte-by-byte. With the default word splitter
//! (`[a-z0-9]+`) every key is ASCII, so byte and scalar-value indexing
//! coincide, but a caller-supplied splitter pattern can emit multi-byte
//! UTF-8 words too; the trie itself has no opinion on that; it just
//! matches and splits bytes. Callers that reconstruct strings from
//! sub-slices of a key are responsible for only ever slicing on char
//! boundaries (`crate::index` enumerates prefixes with `char_indices`
//! for exactly this reason).

use debug_print::debug_println;
use slab::Slab;
use std::cmp::Ordering;

type NodeId = usize;
const ROOT: NodeId = 0;

/// An edge label. Single-byte labels are stored inline with no
/// allocation — the "interned single-element label buffer" optimization
/// `spec.md` calls out — since `Copy` already gives us that for free
/// without needing to share a buffer across nodes.
#[derive(Clone, Debug)]
enum EdgeLabel {
    Empty,
    One(u8),
    Many(Box<[u8]>),
}

impl EdgeLabel {
    fn from_bytes(bytes: &[u8]) -> Self {
        match bytes.len() {
            0 => EdgeLabel::Empty,
            1 => EdgeLabel::One(bytes[0]),
            _ => EdgeLabel::Many(bytes.into()),
        }
    }

    fn as_bytes(&self) -> &[u8] {
        match self {
            EdgeLabel::Empty => &[],
            EdgeLabel::One(b) => std::slice::from_ref(b),
            EdgeLabel::Many(b) => b,
        }
    }

    fn len(&self) -> usize {
        self.as_bytes().len()
    }

    fn first_byte(&self) -> Option<u8> {
        self.as_bytes().first().copied()
    }
}

struct Node<P> {
    label: EdgeLabel,
    payload: Option<P>,
    inserted: bool,
    first_child: Option<NodeId>,
    next_sibling: Option<NodeId>,
}

impl<P> Node<P> {
    fn leaf(label: &[u8], payload: P) -> Self {
        Node {
            label: EdgeLabel::from_bytes(label),
            payload: Some(payload),
            inserted: true,
            first_child: None,
            next_sibling: None,
        }
    }
}

/// Result of descending the trie along a word's bytes.
enum Descent {
    /// The word was consumed exactly at a node boundary.
    Exhausted(NodeId),
    /// The word was consumed strictly inside `node`'s edge label (it
    /// names a valid prefix, but no node exists at that exact point).
    MidEdge(NodeId),
    /// No path in the trie matches the word at all.
    NotFound,
}

/// A radix/patricia tree mapping strings to an arbitrary payload.
///
/// Not thread-safe for concurrent mutation: callers (here, the
/// [`crate::index::PrefixIndex`] rebuild path) must build a fresh tree in
/// isolation and hand the finished, immutable tree to readers.
pub struct Trie<P> {
    nodes: Slab<Node<P>>,
}

impl<P> Default for Trie<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Trie<P> {
    pub fn new() -> Self {
        let mut nodes = Slab::new();
        let root = nodes.insert(Node {
            label: EdgeLabel::Empty,
            payload: None,
            inserted: false,
            first_child: None,
            next_sibling: None,
        });
        debug_assert_eq!(root, ROOT);
        Trie { nodes }
    }

    /// Inserts `word` with `payload`, overwriting any previous payload
    /// stored at that exact key. Splits edges as needed (see module docs
    /// for the four insertion actions from `spec.md` §4.1).
    pub fn insert(&mut self, word: &str, payload: P) {
        self.update_or_insert(word, move |_| payload);
    }

    /// Inserts `payload` keyed by `source[start_index..end_index]`.
    /// Fails fast (via `assert!`) when `end_index < start_index`: an
    /// invalid range is a programmer error, not recoverable input.
    pub fn insert_substring(&mut self, source: &str, start_index: usize, end_index: usize, payload: P) {
        assert!(
            end_index >= start_index,
            "insert_substring: end_index ({end_index}) < start_index ({start_index})"
        );
        self.insert(&source[start_index..end_index], payload);
    }

    /// Inserts `word`, computing its payload from the previous payload (or
    /// `None` if the key was absent) via `f`. Generalizes `insert`.
    pub fn update_or_insert(&mut self, word: &str, f: impl FnOnce(Option<P>) -> P) {
        if word.is_empty() {
            let prev = self.nodes[ROOT].payload.take();
            self.nodes[ROOT].payload = Some(f(prev));
            self.nodes[ROOT].inserted = true;
            return;
        }

        let bytes = word.as_bytes();
        let mut cur = ROOT;
        let mut offset = 0usize;
        let mut f = Some(f);

        loop {
            let rest = &bytes[offset..];
            debug_assert!(!rest.is_empty());

            match self.find_child_slot(cur, rest[0]) {
                ChildSlot::Match(child) => {
                    let label_len = self.nodes[child].label.len();
                    let common = common_prefix_len(self.nodes[child].label.as_bytes(), rest);
                    if common == label_len && common == rest.len() {
                        // Absorb.
                        let prev = self.nodes[child].payload.take();
                        let f = f.take().unwrap();
                        self.nodes[child].payload = Some(f(prev));
                        self.nodes[child].inserted = true;
                        debug_println!("trie: absorbed {word:?} at existing node");
                        return;
                    } else if common == label_len {
                        // Extend: consume this whole edge and descend.
                        cur = child;
                        offset += common;
                        continue;
                    } else {
                        // Split edge at `common`.
                        let f = f.take().unwrap();
                        self.split_edge(child, common, &rest[common..], f);
                        debug_println!("trie: split edge inserting {word:?}");
                        return;
                    }
                }
                ChildSlot::InsertBefore { parent, prev_sibling, next } => {
                    let f = f.take().unwrap();
                    let leaf = self.nodes.insert(Node::leaf(rest, f(None)));
                    self.nodes[leaf].next_sibling = next;
                    match prev_sibling {
                        Some(prev) => self.nodes[prev].next_sibling = Some(leaf),
                        None => self.nodes[parent].first_child = Some(leaf),
                    }
                    debug_println!("trie: new sibling for {word:?}");
                    return;
                }
            }
        }
    }

    /// Splits `child`'s edge after `common` bytes of its label, so that a
    /// new word ending in `remaining_word` (the part of the inserted word
    /// past the common prefix) fits either exactly at the split point or
    /// as a new sibling leaf under it.
    fn split_edge(&mut self, child: NodeId, common: usize, remaining_word: &[u8], f: impl FnOnce(Option<P>) -> P) {
        let old_label = self.nodes[child].label.as_bytes().to_vec();
        let old_payload = self.nodes[child].payload.take();
        let old_inserted = self.nodes[child].inserted;
        let old_first_child = self.nodes[child].first_child;

        let remainder = Node {
            label: EdgeLabel::from_bytes(&old_label[common..]),
            payload: old_payload,
            inserted: old_inserted,
            first_child: old_first_child,
            next_sibling: None,
        };
        let remainder_id = self.nodes.insert(remainder);

        // `child` is reused as the split node: its slot in the parent's
        // sibling chain (first_child / next_sibling) stays untouched.
        self.nodes[child].label = EdgeLabel::from_bytes(&old_label[..common]);

        if remaining_word.is_empty() {
            // The inserted word ends exactly at the split point.
            self.nodes[child].payload = Some(f(None));
            self.nodes[child].inserted = true;
            self.nodes[child].first_child = Some(remainder_id);
        } else {
            self.nodes[child].payload = None;
            self.nodes[child].inserted = false;
            let new_leaf_id = self.nodes.insert(Node::leaf(remaining_word, f(None)));

            let remainder_byte = old_label[common];
            let leaf_byte = remaining_word[0];
            debug_assert_ne!(remainder_byte, leaf_byte);
            if remainder_byte < leaf_byte {
                self.nodes[remainder_id].next_sibling = Some(new_leaf_id);
                self.nodes[child].first_child = Some(remainder_id);
            } else {
                self.nodes[new_leaf_id].next_sibling = Some(remainder_id);
                self.nodes[child].first_child = Some(new_leaf_id);
            }
        }
    }

    /// Finds, among `parent`'s children (sorted by ascending first byte),
    /// the child whose label starts with `first_byte`, or the position
    /// where such a child would need to be inserted.
    fn find_child_slot(&self, parent: NodeId, first_byte: u8) -> ChildSlot {
        let mut prev_sibling = None;
        let mut cursor = self.nodes[parent].first_child;
        while let Some(node_id) = cursor {
            match self.nodes[node_id].label.first_byte().unwrap().cmp(&first_byte) {
                Ordering::Equal => return ChildSlot::Match(node_id),
                Ordering::Greater => {
                    return ChildSlot::InsertBefore {
                        parent,
                        prev_sibling,
                        next: Some(node_id),
                    }
                }
                Ordering::Less => {
                    prev_sibling = Some(node_id);
                    cursor = self.nodes[node_id].next_sibling;
                }
            }
        }
        ChildSlot::InsertBefore { parent, prev_sibling, next: None }
    }

    fn descend(&self, word: &str) -> Descent {
        if word.is_empty() {
            return Descent::Exhausted(ROOT);
        }
        let bytes = word.as_bytes();
        let mut cur = ROOT;
        let mut offset = 0;
        loop {
            let rest = &bytes[offset..];
            let child = match self.find_child_slot(cur, rest[0]) {
                ChildSlot::Match(child) => child,
                ChildSlot::InsertBefore { .. } => return Descent::NotFound,
            };
            let label = self.nodes[child].label.as_bytes();
            let common = common_prefix_len(label, rest);
            if common < label.len() && common < rest.len() {
                return Descent::NotFound;
            }
            if common == rest.len() && common < label.len() {
                return Descent::MidEdge(child);
            }
            debug_assert_eq!(common, label.len());
            if common == rest.len() {
                return Descent::Exhausted(child);
            }
            cur = child;
            offset += common;
        }
    }

    /// Returns whether `word` is a prefix that the trie has a path for
    /// (possibly ending mid-edge), i.e. some inserted word has `word` as
    /// a prefix of itself or is itself a prefix of `word`'s descent path.
    pub fn contains_prefix(&self, word: &str) -> bool {
        !matches!(self.descend(word), Descent::NotFound)
    }

    /// Returns whether `word` was inserted exactly (at a node boundary,
    /// marked `inserted`).
    pub fn contains(&self, word: &str) -> bool {
        matches!(self.descend(word), Descent::Exhausted(node) if self.nodes[node].inserted)
    }

    /// Returns the payload stored for `word`, if it was inserted exactly.
    pub fn get_data(&self, word: &str) -> Option<&P> {
        match self.descend(word) {
            Descent::Exhausted(node) if self.nodes[node].inserted => self.nodes[node].payload.as_ref(),
            _ => None,
        }
    }

    /// Clears `word`'s payload and `inserted` flag, without restructuring
    /// the tree (a node that no longer terminates any word may remain as
    /// a bare split point).
    pub fn delete(&mut self, word: &str) {
        if let Descent::Exhausted(node) = self.descend(word) {
            self.nodes[node].payload = None;
            self.nodes[node].inserted = false;
        }
    }

    /// Invokes `visitor` on the root and every node visited while
    /// descending `word`. Stops cleanly when `word` is exhausted or a
    /// mismatch occurs. When `include_prefix_match` is set, a final
    /// mid-edge match (the word ends partway through a child's label) is
    /// also visited.
    pub fn walk_path(&self, word: &str, mut visitor: impl FnMut(&P) , include_prefix_match: bool) {
        let _ = include_prefix_match;
        if let Some(p) = self.nodes[ROOT].payload.as_ref() {
            visitor(p);
        }
        if word.is_empty() {
            return;
        }
        let bytes = word.as_bytes();
        let mut cur = ROOT;
        let mut offset = 0;
        loop {
            let rest = &bytes[offset..];
            let child = match self.find_child_slot(cur, rest[0]) {
                ChildSlot::Match(child) => child,
                ChildSlot::InsertBefore { .. } => return,
            };
            let label = self.nodes[child].label.as_bytes();
            let common = common_prefix_len(label, rest);
            if common < label.len() && common < rest.len() {
                return;
            }
            if common == rest.len() {
                if common == label.len() || include_prefix_match {
                    if let Some(p) = self.nodes[child].payload.as_ref() {
                        visitor(p);
                    }
                }
                return;
            }
            if let Some(p) = self.nodes[child].payload.as_ref() {
                visitor(p);
            }
            cur = child;
            offset += common;
        }
    }

    /// Length of the longest root-to-leaf path, in edge-concatenation
    /// (byte) terms.
    pub fn depth(&self) -> usize {
        self.depth_from(ROOT, 0)
    }

    fn depth_from(&self, node: NodeId, acc: usize) -> usize {
        let acc = acc + self.nodes[node].label.len();
        let mut max_depth = acc;
        let mut child = self.nodes[node].first_child;
        while let Some(id) = child {
            max_depth = max_depth.max(self.depth_from(id, acc));
            child = self.nodes[id].next_sibling;
        }
        max_depth
    }
}

enum ChildSlot {
    Match(NodeId),
    InsertBefore {
        parent: NodeId,
        prev_sibling: Option<NodeId>,
        next: Option<NodeId>,
    },
}

fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}
