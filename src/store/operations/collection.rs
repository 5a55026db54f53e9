use crate::constants::DEFAULT_DECK_ID;
use crate::deck_tree::DeckId;
use crate::store::keys;
use crate::store::{Store, StoreError};

impl Store {
    /// The selected deck, or the default deck when none is selected or the
    /// selected one no longer exists.
    pub fn get_current_deck_id(&self) -> Result<DeckId, StoreError> {
        match self.stored_current_deck_id()? {
            Some(deck_id) if self.get_deck(deck_id)?.is_some() => Ok(deck_id),
            _ => Ok(DEFAULT_DECK_ID),
        }
    }

    pub fn set_current_deck_id(&self, deck_id: DeckId) -> Result<(), StoreError> {
        if self.get_deck(deck_id)?.is_none() {
            return Err(StoreError::not_found("deck", deck_id));
        }
        self.collection_config
            .insert(keys::CURRENT_DECK_KEY.as_bytes(), &keys::encode_deck_id(deck_id))?;
        Ok(())
    }

    pub(crate) fn stored_current_deck_id(&self) -> Result<Option<DeckId>, StoreError> {
        match self.collection_config.get(keys::CURRENT_DECK_KEY.as_bytes())? {
            Some(raw) => Ok(keys::decode_deck_id(&raw)),
            None => Ok(None),
        }
    }

    /// Allocates the next deck id. Ids only grow and never reuse the default
    /// deck's id.
    pub(crate) fn next_deck_id(&self) -> Result<DeckId, StoreError> {
        let updated = self
            .collection_config
            .update_and_fetch(keys::NEXT_DECK_ID_KEY.as_bytes(), |old| {
                let last = old
                    .and_then(keys::decode_deck_id)
                    .unwrap_or(DEFAULT_DECK_ID)
                    .max(DEFAULT_DECK_ID);
                Some(keys::encode_deck_id(last + 1).to_vec())
            })?;

        updated
            .as_deref()
            .and_then(keys::decode_deck_id)
            .ok_or_else(|| StoreError::Corrupt {
                entity: "collection_config".to_string(),
                key: keys::NEXT_DECK_ID_KEY.to_string(),
            })
    }
}
