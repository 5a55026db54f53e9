use deckpicker_backend::deck_tree::{DeckId, RawDeckNode};
use deckpicker_backend::store::operations::decks::{DeckCounts, DeckRecord};
use deckpicker_backend::store::Store;

/// Creates `name` (and any missing parents) and sets its own counts.
pub fn seed_deck(store: &Store, name: &str, counts: (u32, u32, u32)) -> DeckRecord {
    let deck = store.create_deck(name, false).expect("create seed deck");
    store
        .set_deck_counts(deck.id, DeckCounts::new(counts.0, counts.1, counts.2))
        .expect("set seed counts")
}

/// Spanish (3 new, 2 review) with Verbs (2 new, 1 learn), French with no
/// cards, plus the default deck created by migrations.
pub fn seed_languages(store: &Store) -> (DeckRecord, DeckRecord, DeckRecord) {
    let spanish = seed_deck(store, "Spanish", (3, 0, 2));
    let verbs = seed_deck(store, "Spanish::Verbs", (2, 1, 0));
    let french = seed_deck(store, "French", (0, 0, 0));
    (spanish, verbs, french)
}

pub fn leaf(deck_id: DeckId, name: &str, level: i32) -> RawDeckNode {
    RawDeckNode::new(deck_id, name, level)
}
