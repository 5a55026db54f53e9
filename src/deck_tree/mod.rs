//! Deck tree snapshot built from the collection backend.
//!
//! A [`DeckTree`] is a point-in-time view of the collection's decks with
//! their new/learning/review counts already aggregated over each subtree by
//! the backend. Nodes live in a single arena owned by the tree and refer to
//! their parent and children by [`NodeIndex`], so a parent link never keeps
//! anything alive on its own.
//!
//! The tree is rebuilt from a fresh snapshot whenever current counts are
//! needed. Only the `collapsed` flag is mutable, and changing it does not
//! persist anything: persist through a [`DeckCollapseStore`].

pub mod builder;
pub mod display;
pub mod iter;
pub mod node;
pub mod raw;
pub mod source;
pub mod tree;
pub mod validate;

pub use display::{DeckTreeView, DisplayDeckNode, FlattenedDeckList};
pub use iter::Iter;
pub use node::{DeckNode, NodeIndex};
pub use raw::RawDeckNode;
pub use source::{CollapseScope, DeckCollapseStore, DeckTreeSource};
pub use tree::{DeckNodeRef, DeckTree};
pub use validate::TreeError;

/// Deck identifier as handed out by the collection backend.
pub type DeckId = i64;
