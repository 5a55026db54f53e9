pub mod collection;
pub mod deck_tree;
pub mod decks;
