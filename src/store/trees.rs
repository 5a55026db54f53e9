pub const DECKS: &str = "decks";
pub const DECK_NAMES: &str = "deck_names";
pub const COLLECTION_CONFIG: &str = "collection_config";
