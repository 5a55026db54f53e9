use crate::constants::DEFAULT_DECK_ID;
use crate::store::keys::SCHEMA_VERSION_KEY;
use crate::store::operations::decks::DeckRecord;
use crate::store::{Store, StoreError};

type MigrationFn = fn(&Store) -> Result<(), StoreError>;

fn migrations() -> Vec<(&'static str, MigrationFn)> {
    vec![("001_default_deck", m001_default_deck)]
}

/// Applies every migration newer than the stored schema version.
///
/// Each migration must be idempotent: a crash between running it and
/// recording its version means it runs again on the next start. The version
/// is recorded after every step and never moves backwards.
pub fn run(store: &Store) -> Result<(), StoreError> {
    let current = get_current_version(store)?;

    for (index, (name, func)) in migrations().iter().enumerate() {
        let version = (index + 1) as u32;
        if version > current {
            tracing::info!(version, name, "Running migration");
            func(store)?;
            set_version(store, version)?;
            tracing::info!(version, name, "Migration complete");
        } else {
            tracing::debug!(version, name, "Migration already applied, skipping");
        }
    }

    Ok(())
}

pub fn get_current_version(store: &Store) -> Result<u32, StoreError> {
    match store.collection_config.get(SCHEMA_VERSION_KEY.as_bytes())? {
        Some(raw) => {
            let bytes: [u8; 4] = raw.as_ref().try_into().map_err(|_| StoreError::Corrupt {
                entity: "collection_config".to_string(),
                key: SCHEMA_VERSION_KEY.to_string(),
            })?;
            Ok(u32::from_be_bytes(bytes))
        }
        None => Ok(0),
    }
}

pub fn set_version(store: &Store, version: u32) -> Result<(), StoreError> {
    let current = get_current_version(store)?;
    if version < current {
        return Err(StoreError::Migration {
            version,
            message: format!("Refuse to downgrade from {} to {}", current, version),
        });
    }

    store
        .collection_config
        .insert(SCHEMA_VERSION_KEY.as_bytes(), &version.to_be_bytes())?;
    Ok(())
}

fn m001_default_deck(store: &Store) -> Result<(), StoreError> {
    if store.get_deck(DEFAULT_DECK_ID)?.is_none() {
        store.upsert_deck(&DeckRecord::default_deck())?;
    }
    Ok(())
}
