use serde::{Deserialize, Serialize};

use crate::constants::{SYNTHETIC_ROOT_ID, SYNTHETIC_ROOT_LEVEL};
use crate::deck_tree::DeckId;

/// One node of the nested snapshot produced by the collection backend.
///
/// `name` is the node's own leaf name, never a path. Counts already include
/// every descendant. The backend is trusted to hand over a well-formed tree:
/// levels increase by one per step and ids are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDeckNode {
    pub deck_id: DeckId,
    pub name: String,
    #[serde(default)]
    pub collapsed: bool,
    #[serde(default)]
    pub filtered: bool,
    pub level: i32,
    #[serde(default)]
    pub new_count: u32,
    #[serde(default)]
    pub learn_count: u32,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub children: Vec<RawDeckNode>,
}

impl RawDeckNode {
    pub fn new(deck_id: DeckId, name: impl Into<String>, level: i32) -> Self {
        Self {
            deck_id,
            name: name.into(),
            level,
            ..Default::default()
        }
    }

    /// Synthetic root holding `children` as top-level decks. Its counts are
    /// the saturating sum of the children's, as the backend reports them.
    pub fn synthetic_root(children: Vec<RawDeckNode>) -> Self {
        let mut root = Self::new(SYNTHETIC_ROOT_ID, "", SYNTHETIC_ROOT_LEVEL);
        for child in &children {
            root.add_counts(child);
        }
        root.children = children;
        root
    }

    /// Adds `other`'s counts to this node's, saturating at `u32::MAX`.
    pub fn add_counts(&mut self, other: &RawDeckNode) {
        self.new_count = self.new_count.saturating_add(other.new_count);
        self.learn_count = self.learn_count.saturating_add(other.learn_count);
        self.review_count = self.review_count.saturating_add(other.review_count);
    }

    pub fn with_counts(mut self, new_count: u32, learn_count: u32, review_count: u32) -> Self {
        self.new_count = new_count;
        self.learn_count = learn_count;
        self.review_count = review_count;
        self
    }

    pub fn with_children(mut self, children: Vec<RawDeckNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }

    pub fn with_filtered(mut self, filtered: bool) -> Self {
        self.filtered = filtered;
        self
    }

    /// Number of raw nodes in this subtree, self included.
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(RawDeckNode::subtree_len)
            .sum::<usize>()
    }
}
