use crate::constants::DECK_NAME_SEPARATOR;
use crate::deck_tree::node::{DeckNode, NodeIndex};
use crate::deck_tree::raw::RawDeckNode;
use crate::deck_tree::tree::DeckTree;

impl DeckTree {
    /// Builds a tree from a backend snapshot. The top raw node becomes the
    /// root of the arena.
    ///
    /// The snapshot is taken as-is: inconsistent levels or duplicate ids come
    /// out exactly as they went in. See [`DeckTree::check_consistency`].
    pub fn from_raw(raw: &RawDeckNode) -> Self {
        let mut nodes = Vec::with_capacity(raw.subtree_len());
        push_subtree(&mut nodes, raw, None, raw.name.clone());
        DeckTree::from_nodes(nodes)
    }

    /// Builds a tree from a root-less list of top-level decks by placing them
    /// under a synthetic root.
    pub fn from_top_level(top_level: Vec<RawDeckNode>) -> Self {
        Self::from_raw(&RawDeckNode::synthetic_root(top_level))
    }
}

impl From<RawDeckNode> for DeckTree {
    fn from(raw: RawDeckNode) -> Self {
        DeckTree::from_raw(&raw)
    }
}

impl From<&RawDeckNode> for DeckTree {
    fn from(raw: &RawDeckNode) -> Self {
        DeckTree::from_raw(raw)
    }
}

/// Full name of a child deck. Children of a nameless node (the synthetic
/// root) keep their bare leaf name.
pub fn join_deck_name(parent_full_name: &str, leaf: &str) -> String {
    if parent_full_name.is_empty() {
        leaf.to_string()
    } else {
        format!("{parent_full_name}{DECK_NAME_SEPARATOR}{leaf}")
    }
}

fn push_subtree(
    nodes: &mut Vec<DeckNode>,
    raw: &RawDeckNode,
    parent: Option<NodeIndex>,
    full_deck_name: String,
) -> NodeIndex {
    let index = NodeIndex::new(nodes.len());
    nodes.push(DeckNode::from_raw(raw, full_deck_name, parent));

    for child in &raw.children {
        let child_name = join_deck_name(nodes[index.get()].full_deck_name(), &child.name);
        let child_index = push_subtree(nodes, child, Some(index), child_name);
        nodes[index.get()].children.push(child_index);
    }

    index
}
