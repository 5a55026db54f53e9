use std::iter::FusedIterator;

use crate::deck_tree::node::NodeIndex;
use crate::deck_tree::tree::{DeckNodeRef, DeckTree};

/// Pre-order walk over a subtree, synthetic nodes included.
pub(crate) struct PreOrder<'a> {
    tree: &'a DeckTree,
    stack: Vec<NodeIndex>,
}

impl<'a> PreOrder<'a> {
    pub(crate) fn new(tree: &'a DeckTree, start: NodeIndex) -> Self {
        Self {
            tree,
            stack: vec![start],
        }
    }
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = DeckNodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let node = self.tree.node_at(index);
        // reversed so the first child is popped next
        self.stack.extend(node.child_indices().iter().rev().copied());
        Some(DeckNodeRef::new(self.tree, index))
    }
}

impl FusedIterator for PreOrder<'_> {}

/// Lazy pre-order iterator over real decks: parent before children,
/// children in snapshot order, synthetic root skipped.
///
/// Each call to `iter()` starts over from the same snapshot.
pub struct Iter<'a> {
    inner: PreOrder<'a>,
}

impl<'a> Iter<'a> {
    pub(crate) fn new(tree: &'a DeckTree, start: NodeIndex) -> Self {
        Self {
            inner: PreOrder::new(tree, start),
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = DeckNodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.by_ref().find(|node| !node.is_synthetic_deck())
    }
}

impl FusedIterator for Iter<'_> {}

#[cfg(test)]
mod tests {
    use crate::deck_tree::raw::RawDeckNode;

    use super::*;

    #[test]
    fn pre_order_includes_root_first() {
        let tree = DeckTree::from_top_level(vec![
            RawDeckNode::new(1, "A", 1).with_children(vec![RawDeckNode::new(2, "B", 2)]),
            RawDeckNode::new(3, "C", 1),
        ]);
        let all: Vec<_> = PreOrder::new(&tree, NodeIndex::ROOT).map(|n| n.did()).collect();
        assert_eq!(all, vec![0, 1, 2, 3]);
    }

    #[test]
    fn empty_collection_yields_nothing() {
        let tree = DeckTree::from_top_level(Vec::new());
        assert_eq!(tree.iter().count(), 0);
        assert!(tree.is_empty());
    }

    #[test]
    fn iterator_is_fused() {
        let tree = DeckTree::from_top_level(vec![RawDeckNode::new(1, "A", 1)]);
        let mut it = tree.iter();
        assert!(it.next().is_some());
        assert!(it.next().is_none());
        assert!(it.next().is_none());
    }
}
