use crate::deck_tree::DeckId;

/// Separator between the components of a full deck name
pub const DECK_NAME_SEPARATOR: &str = "::";

/// Id of the deck every collection starts with; it cannot be deleted
pub const DEFAULT_DECK_ID: DeckId = 1;

/// Name of the default deck
pub const DEFAULT_DECK_NAME: &str = "Default";

/// Id carried by the synthetic root of a deck tree snapshot
pub const SYNTHETIC_ROOT_ID: DeckId = 0;

/// Level of the synthetic root; real decks start at level 1
pub const SYNTHETIC_ROOT_LEVEL: i32 = 0;

/// Maximum length of a full deck name, in bytes
pub const MAX_DECK_NAME_LEN: usize = 512;

/// Default maximum length of a deck list filter
pub const DEFAULT_FILTER_MAX_LEN: usize = 200;
