use std::fmt;
use std::ops::Deref;

use crate::deck_tree::iter::{Iter, PreOrder};
use crate::deck_tree::node::{DeckNode, NodeIndex};
use crate::deck_tree::DeckId;

/// Arena owning every node of one snapshot. Index 0 is the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckTree {
    nodes: Vec<DeckNode>,
}

impl DeckTree {
    /// `nodes` must be non-empty with the root first; only the builder
    /// creates trees.
    pub(crate) fn from_nodes(nodes: Vec<DeckNode>) -> Self {
        debug_assert!(!nodes.is_empty(), "a deck tree always has a root");
        Self { nodes }
    }

    pub(crate) fn node_at(&self, index: NodeIndex) -> &DeckNode {
        &self.nodes[index.get()]
    }

    pub fn root(&self) -> DeckNodeRef<'_> {
        DeckNodeRef::new(self, NodeIndex::ROOT)
    }

    pub fn get(&self, index: NodeIndex) -> Option<DeckNodeRef<'_>> {
        (index.get() < self.nodes.len()).then(|| DeckNodeRef::new(self, index))
    }

    pub fn get_mut(&mut self, index: NodeIndex) -> Option<&mut DeckNode> {
        self.nodes.get_mut(index.get())
    }

    /// Pre-order search from the root, root included.
    pub fn find(&self, did: DeckId) -> Option<DeckNodeRef<'_>> {
        self.root().find(did)
    }

    /// Mutable access to the node with `did`, for changing its collapse flag.
    pub fn find_mut(&mut self, did: DeckId) -> Option<&mut DeckNode> {
        let index = self.find(did)?.index();
        self.get_mut(index)
    }

    /// Every real deck in pre-order; the synthetic root is skipped.
    pub fn iter(&self) -> Iter<'_> {
        self.root().iter()
    }

    pub fn for_each<'a, F>(&'a self, f: F)
    where
        F: FnMut(DeckNodeRef<'a>),
    {
        self.root().for_each(f)
    }

    /// Number of real decks in the snapshot.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| !n.is_synthetic_deck()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of the root's counts, i.e. everything due in the collection.
    pub fn total_due(&self) -> u32 {
        self.root().total_due()
    }
}

impl<'a> IntoIterator for &'a DeckTree {
    type Item = DeckNodeRef<'a>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Borrowed handle on a node that can navigate the rest of its tree.
#[derive(Clone, Copy)]
pub struct DeckNodeRef<'a> {
    tree: &'a DeckTree,
    index: NodeIndex,
}

impl<'a> DeckNodeRef<'a> {
    pub(crate) fn new(tree: &'a DeckTree, index: NodeIndex) -> Self {
        Self { tree, index }
    }

    pub fn index(&self) -> NodeIndex {
        self.index
    }

    pub fn tree(&self) -> &'a DeckTree {
        self.tree
    }

    pub fn node(&self) -> &'a DeckNode {
        self.tree.node_at(self.index)
    }

    pub fn parent(&self) -> Option<DeckNodeRef<'a>> {
        self.node()
            .parent_index()
            .map(|index| DeckNodeRef::new(self.tree, index))
    }

    pub fn children(&self) -> impl DoubleEndedIterator<Item = DeckNodeRef<'a>> + ExactSizeIterator + 'a {
        let tree = self.tree;
        self.node()
            .child_indices()
            .iter()
            .map(move |&index| DeckNodeRef::new(tree, index))
    }

    pub fn has_children(&self) -> bool {
        !self.node().child_indices().is_empty()
    }

    /// Parent, grandparent and so on up to and including the root.
    pub fn ancestors(&self) -> impl Iterator<Item = DeckNodeRef<'a>> + 'a {
        std::iter::successors(self.parent(), |node| node.parent())
    }

    /// True when no ancestor is collapsed, i.e. the deck would be shown in an
    /// unfiltered deck list.
    pub fn is_viewable(&self) -> bool {
        self.ancestors().all(|ancestor| !ancestor.collapsed())
    }

    /// Pre-order search of this node and its descendants.
    pub fn find(&self, did: DeckId) -> Option<DeckNodeRef<'a>> {
        PreOrder::new(self.tree, self.index).find(|node| node.did() == did)
    }

    /// This node (unless synthetic) and all real descendants, pre-order.
    pub fn iter(&self) -> Iter<'a> {
        Iter::new(self.tree, self.index)
    }

    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(DeckNodeRef<'a>),
    {
        for node in self.iter() {
            f(node);
        }
    }

    /// Ids of this deck and every deck below it.
    pub fn subtree_ids(&self) -> Vec<DeckId> {
        PreOrder::new(self.tree, self.index)
            .filter(|node| !node.is_synthetic_deck())
            .map(|node| node.did())
            .collect()
    }
}

impl<'a> Deref for DeckNodeRef<'a> {
    type Target = DeckNode;

    fn deref(&self) -> &Self::Target {
        self.node()
    }
}

impl fmt::Debug for DeckNodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeckNodeRef")
            .field("index", &self.index)
            .field("did", &self.did())
            .field("full_deck_name", &self.full_deck_name())
            .finish()
    }
}

impl PartialEq for DeckNodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.index == other.index
    }
}

impl Eq for DeckNodeRef<'_> {}

#[cfg(test)]
mod tests {
    use crate::deck_tree::raw::RawDeckNode;

    use super::*;

    /// A(1) { B(2) { D(4) }, C(3) }, E(5)
    fn sample() -> DeckTree {
        DeckTree::from_top_level(vec![
            RawDeckNode::new(1, "A", 1).with_children(vec![
                RawDeckNode::new(2, "B", 2).with_children(vec![RawDeckNode::new(4, "D", 3)]),
                RawDeckNode::new(3, "C", 2),
            ]),
            RawDeckNode::new(5, "E", 1),
        ])
    }

    #[test]
    fn find_hits_and_misses() {
        let tree = sample();
        assert_eq!(tree.find(4).map(|n| n.full_deck_name().to_string()), Some("A::B::D".into()));
        assert!(tree.find(99).is_none());
        assert_eq!(tree.find(0).map(|n| n.index()), Some(NodeIndex::ROOT));
    }

    #[test]
    fn find_from_node_only_searches_its_subtree() {
        let tree = sample();
        let b = tree.find(2).unwrap();
        assert!(b.find(4).is_some());
        assert!(b.find(3).is_none());
        assert_eq!(b.find(2), Some(b));
    }

    #[test]
    fn iter_skips_root_and_is_pre_order() {
        let tree = sample();
        let ids: Vec<_> = tree.iter().map(|n| n.did()).collect();
        assert_eq!(ids, vec![1, 2, 4, 3, 5]);
        assert_eq!(tree.len(), 5);

        let again: Vec<_> = (&tree).into_iter().map(|n| n.did()).collect();
        assert_eq!(again, ids);
    }

    #[test]
    fn for_each_matches_iter_order() {
        let tree = sample();
        let mut seen = Vec::new();
        tree.for_each(|n| seen.push(n.did()));
        assert_eq!(seen, vec![1, 2, 4, 3, 5]);

        let mut under_a = Vec::new();
        tree.find(1).unwrap().for_each(|n| under_a.push(n.did()));
        assert_eq!(under_a, vec![1, 2, 4, 3]);
    }

    #[test]
    fn find_mut_changes_only_the_local_flag() {
        let mut tree = sample();
        let node = tree.find_mut(2).expect("deck 2");
        assert!(node.toggle_collapsed());
        assert!(tree.find(2).unwrap().collapsed());
        assert!(!tree.find(1).unwrap().collapsed());
    }

    #[test]
    fn viewable_requires_expanded_ancestors() {
        let mut tree = sample();
        tree.find_mut(1).unwrap().set_collapsed(true);
        assert!(tree.find(1).unwrap().is_viewable());
        assert!(!tree.find(2).unwrap().is_viewable());
        assert!(!tree.find(4).unwrap().is_viewable());
        assert!(tree.find(5).unwrap().is_viewable());
    }

    #[test]
    fn ancestors_walk_up_to_root() {
        let tree = sample();
        let chain: Vec<_> = tree.find(4).unwrap().ancestors().map(|n| n.did()).collect();
        assert_eq!(chain, vec![2, 1, 0]);
    }

    #[test]
    fn subtree_ids_cover_descendants() {
        let tree = sample();
        assert_eq!(tree.find(1).unwrap().subtree_ids(), vec![1, 2, 4, 3]);
        assert_eq!(tree.find(5).unwrap().subtree_ids(), vec![5]);
        assert_eq!(tree.root().subtree_ids(), vec![1, 2, 4, 3, 5]);
    }

    #[test]
    fn get_rejects_foreign_index() {
        let tree = sample();
        assert!(tree.get(NodeIndex::new(100)).is_none());
        assert!(tree.get(NodeIndex::new(1)).is_some());
    }
}
