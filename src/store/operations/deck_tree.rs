use crate::constants::DECK_NAME_SEPARATOR;
use crate::deck_tree::{CollapseScope, DeckCollapseStore, DeckId, DeckTreeSource, RawDeckNode};
use crate::store::operations::decks::{is_ancestor_name, DeckRecord};
use crate::store::{Store, StoreError};

impl Store {
    /// Nested snapshot of every deck under a synthetic root. With
    /// `include_counts` each node carries its own counts plus those of all
    /// its subdecks; without, every count is zero.
    pub fn build_raw_deck_tree(
        &self,
        include_counts: bool,
        scope: CollapseScope,
    ) -> Result<RawDeckNode, StoreError> {
        let decks = self.list_decks()?;
        tracing::debug!(decks = decks.len(), include_counts, ?scope, "Building deck tree snapshot");
        Ok(nest_decks(&decks, include_counts, scope))
    }
}

impl DeckTreeSource for Store {
    type Error = StoreError;

    fn deck_tree(&self, include_counts: bool) -> Result<RawDeckNode, StoreError> {
        self.build_raw_deck_tree(include_counts, CollapseScope::Reviewer)
    }
}

impl DeckCollapseStore for Store {
    type Error = StoreError;

    fn set_deck_collapsed(
        &self,
        did: DeckId,
        collapsed: bool,
        scope: CollapseScope,
    ) -> Result<(), StoreError> {
        self.set_deck_collapsed_flag(did, collapsed, scope)?;
        Ok(())
    }
}

/// Folds a pre-ordered deck list (parents before children) into a nested
/// snapshot.
///
/// `stack` holds the open path from the root; a finished node is folded into
/// its parent, adding its subtree counts. A deck whose parent record is
/// missing hangs off its nearest existing ancestor.
fn nest_decks(decks: &[DeckRecord], include_counts: bool, scope: CollapseScope) -> RawDeckNode {
    let mut stack: Vec<(String, RawDeckNode)> =
        vec![(String::new(), RawDeckNode::synthetic_root(Vec::new()))];

    for deck in decks {
        while stack.len() > 1 && !is_ancestor_name(&stack[stack.len() - 1].0, &deck.name) {
            fold_top(&mut stack);
        }

        let parent_name = &stack[stack.len() - 1].0;
        let leaf = if parent_name.is_empty() {
            deck.name.as_str()
        } else {
            &deck.name[parent_name.len() + DECK_NAME_SEPARATOR.len()..]
        };

        let mut node = RawDeckNode::new(deck.id, leaf, stack.len() as i32)
            .with_collapsed(deck.collapsed_in(scope))
            .with_filtered(deck.filtered);
        if include_counts {
            node = node.with_counts(deck.counts.new, deck.counts.learn, deck.counts.review);
        }
        stack.push((deck.name.clone(), node));
    }

    while stack.len() > 1 {
        fold_top(&mut stack);
    }

    let (_, root) = stack.pop().unwrap_or_default();
    root
}

fn fold_top(stack: &mut Vec<(String, RawDeckNode)>) {
    let Some((_, child)) = stack.pop() else {
        return;
    };
    if let Some((_, parent)) = stack.last_mut() {
        parent.add_counts(&child);
        parent.children.push(child);
    }
}
