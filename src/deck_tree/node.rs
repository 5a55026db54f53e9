use std::fmt;

use crate::deck_tree::raw::RawDeckNode;
use crate::deck_tree::DeckId;

/// Position of a node inside its [`DeckTree`](crate::deck_tree::DeckTree) arena.
///
/// Only meaningful for the tree that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(usize);

impl NodeIndex {
    /// The root of every tree sits at index 0.
    pub const ROOT: NodeIndex = NodeIndex(0);

    pub(crate) const fn new(index: usize) -> Self {
        NodeIndex(index)
    }

    pub const fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeIndex({})", self.0)
    }
}

/// A deck, or the synthetic root above the top-level decks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckNode {
    did: DeckId,
    full_deck_name: String,
    last_name_component: String,
    level: i32,
    new_count: u32,
    learn_count: u32,
    review_count: u32,
    collapsed: bool,
    filtered: bool,
    pub(crate) parent: Option<NodeIndex>,
    pub(crate) children: Vec<NodeIndex>,
}

impl DeckNode {
    pub(crate) fn from_raw(raw: &RawDeckNode, full_deck_name: String, parent: Option<NodeIndex>) -> Self {
        Self {
            did: raw.deck_id,
            full_deck_name,
            last_name_component: raw.name.clone(),
            level: raw.level,
            new_count: raw.new_count,
            learn_count: raw.learn_count,
            review_count: raw.review_count,
            collapsed: raw.collapsed,
            filtered: raw.filtered,
            parent,
            children: Vec::with_capacity(raw.children.len()),
        }
    }

    pub fn did(&self) -> DeckId {
        self.did
    }

    /// `::`-joined path from the top-level deck down to this one. Empty for
    /// the synthetic root.
    pub fn full_deck_name(&self) -> &str {
        &self.full_deck_name
    }

    pub fn last_name_component(&self) -> &str {
        &self.last_name_component
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    /// Zero-based display depth. Top-level decks are at depth 0.
    pub fn depth(&self) -> i32 {
        self.level - 1
    }

    pub fn is_synthetic_deck(&self) -> bool {
        self.level <= 0
    }

    pub fn new_count(&self) -> u32 {
        self.new_count
    }

    pub fn learn_count(&self) -> u32 {
        self.learn_count
    }

    pub fn review_count(&self) -> u32 {
        self.review_count
    }

    pub fn collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn filtered(&self) -> bool {
        self.filtered
    }

    pub fn parent_index(&self) -> Option<NodeIndex> {
        self.parent
    }

    pub fn child_indices(&self) -> &[NodeIndex] {
        &self.children
    }

    /// Whether the deck had something to study when the snapshot was taken.
    ///
    /// May report `false` for a deck whose learning cards become due shortly
    /// after the snapshot, so a `false` only holds as of snapshot time. A
    /// `true` is never wrong for the snapshot it came from.
    pub fn has_cards_ready_to_study(&self) -> bool {
        self.review_count > 0 || self.new_count > 0 || self.learn_count > 0
    }

    pub fn total_due(&self) -> u32 {
        self.new_count
            .saturating_add(self.learn_count)
            .saturating_add(self.review_count)
    }

    /// Local change only; the caller persists it if needed.
    pub fn set_collapsed(&mut self, collapsed: bool) {
        self.collapsed = collapsed;
    }

    /// Flips `collapsed` and returns the new value.
    pub fn toggle_collapsed(&mut self) -> bool {
        self.collapsed = !self.collapsed;
        self.collapsed
    }
}
