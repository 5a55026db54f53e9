use std::collections::HashSet;

use thiserror::Error;

use crate::constants::DECK_NAME_SEPARATOR;
use crate::deck_tree::builder::join_deck_name;
use crate::deck_tree::iter::PreOrder;
use crate::deck_tree::node::NodeIndex;
use crate::deck_tree::tree::DeckTree;
use crate::deck_tree::DeckId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("duplicate deck id {did}")]
    DuplicateDeckId { did: DeckId },
    #[error("deck {did} has level {level}, expected {expected}")]
    LevelMismatch {
        did: DeckId,
        level: i32,
        expected: i32,
    },
    #[error("deck {did} has invalid name component {name:?}")]
    InvalidNameComponent { did: DeckId, name: String },
    #[error("deck {did} is named {actual:?}, expected {expected:?}")]
    PathMismatch {
        did: DeckId,
        actual: String,
        expected: String,
    },
}

impl DeckTree {
    /// Checks the snapshot invariants: unique ids, levels growing by one per
    /// step, plain leaf names and `::`-joined paths.
    ///
    /// The builder never calls this; snapshots are trusted. It exists for
    /// tests and debugging tools.
    pub fn check_consistency(&self) -> Result<(), TreeError> {
        let mut seen = HashSet::new();

        for node in PreOrder::new(self, NodeIndex::ROOT) {
            if !seen.insert(node.did()) {
                return Err(TreeError::DuplicateDeckId { did: node.did() });
            }

            let Some(parent) = node.parent() else {
                continue;
            };

            let expected = parent.level() + 1;
            if node.level() != expected {
                return Err(TreeError::LevelMismatch {
                    did: node.did(),
                    level: node.level(),
                    expected,
                });
            }

            let leaf = node.last_name_component();
            if leaf.is_empty() || leaf.contains(DECK_NAME_SEPARATOR) {
                return Err(TreeError::InvalidNameComponent {
                    did: node.did(),
                    name: leaf.to_string(),
                });
            }

            let expected = join_deck_name(parent.full_deck_name(), leaf);
            if node.full_deck_name() != expected {
                return Err(TreeError::PathMismatch {
                    did: node.did(),
                    actual: node.full_deck_name().to_string(),
                    expected,
                });
            }
        }

        Ok(())
    }
}
