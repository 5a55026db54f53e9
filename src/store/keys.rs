use crate::deck_tree::DeckId;

pub const SCHEMA_VERSION_KEY: &str = "_meta:version";
pub const CURRENT_DECK_KEY: &str = "curDeck";
pub const NEXT_DECK_ID_KEY: &str = "nextDeckId";

/// Zero-padded so that keys sort by id. Negative ids have no key.
pub fn deck_key(deck_id: DeckId) -> Option<String> {
    (deck_id >= 0).then(|| format!("{deck_id:020}"))
}

/// Deck names are unique ignoring case.
pub fn deck_name_key(name: &str) -> String {
    format!("name:{}", name.to_lowercase())
}

pub fn encode_deck_id(deck_id: DeckId) -> [u8; 8] {
    deck_id.to_be_bytes()
}

pub fn decode_deck_id(raw: &[u8]) -> Option<DeckId> {
    let bytes: [u8; 8] = raw.try_into().ok()?;
    Some(DeckId::from_be_bytes(bytes))
}
