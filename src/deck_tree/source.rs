use serde::{Deserialize, Serialize};

use crate::deck_tree::raw::RawDeckNode;
use crate::deck_tree::tree::DeckTree;
use crate::deck_tree::DeckId;

/// Which screen a collapse flag belongs to. The deck list and the card
/// browser remember expansion separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollapseScope {
    #[default]
    Reviewer,
    Browser,
}

/// Backend that can hand out a nested snapshot of the collection's decks.
pub trait DeckTreeSource {
    type Error;

    /// One complete snapshot. With `include_counts` false every count is
    /// zero, which is cheaper for callers that only need names.
    fn deck_tree(&self, include_counts: bool) -> Result<RawDeckNode, Self::Error>;

    /// Fresh tree with due counts.
    fn deck_due_tree(&self) -> Result<DeckTree, Self::Error> {
        Ok(DeckTree::from_raw(&self.deck_tree(true)?))
    }
}

/// Backend that persists a deck's collapse flag.
///
/// A saved value shows up in the next snapshot; trees that were already
/// built are not touched.
pub trait DeckCollapseStore {
    type Error;

    fn set_deck_collapsed(
        &self,
        did: DeckId,
        collapsed: bool,
        scope: CollapseScope,
    ) -> Result<(), Self::Error>;
}
