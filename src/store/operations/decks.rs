use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sled::transaction::{abort, ConflictableTransactionError, ConflictableTransactionResult};
use sled::Transactional;

use crate::constants::{DECK_NAME_SEPARATOR, DEFAULT_DECK_ID, DEFAULT_DECK_NAME};
use crate::deck_tree::{CollapseScope, DeckId};
use crate::store::keys;
use crate::store::{Store, StoreError};
use crate::validation::normalize_deck_name;

/// Per-deck counts handed over by the scheduler, excluding subdecks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckCounts {
    pub new: u32,
    pub learn: u32,
    pub review: u32,
}

impl DeckCounts {
    pub fn new(new: u32, learn: u32, review: u32) -> Self {
        Self { new, learn, review }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckRecord {
    pub id: DeckId,
    /// Full `::`-separated name.
    pub name: String,
    #[serde(default)]
    pub collapsed: bool,
    #[serde(default)]
    pub browser_collapsed: bool,
    #[serde(default)]
    pub filtered: bool,
    #[serde(default)]
    pub counts: DeckCounts,
    pub mtime: DateTime<Utc>,
}

impl DeckRecord {
    pub fn new(id: DeckId, name: impl Into<String>, filtered: bool) -> Self {
        Self {
            id,
            name: name.into(),
            collapsed: false,
            browser_collapsed: false,
            filtered,
            counts: DeckCounts::default(),
            mtime: Utc::now(),
        }
    }

    pub fn default_deck() -> Self {
        Self::new(DEFAULT_DECK_ID, DEFAULT_DECK_NAME, false)
    }

    pub fn parent_name(&self) -> Option<&str> {
        self.name
            .rsplit_once(DECK_NAME_SEPARATOR)
            .map(|(parent, _)| parent)
    }

    pub fn collapsed_in(&self, scope: CollapseScope) -> bool {
        match scope {
            CollapseScope::Reviewer => self.collapsed,
            CollapseScope::Browser => self.browser_collapsed,
        }
    }

    /// Case-insensitive sort key: decks sort by component, so every parent
    /// comes right before its subdecks.
    pub fn sort_key(&self) -> Vec<String> {
        self.name
            .split(DECK_NAME_SEPARATOR)
            .map(str::to_lowercase)
            .collect()
    }
}

impl Store {
    pub fn get_deck(&self, deck_id: DeckId) -> Result<Option<DeckRecord>, StoreError> {
        let Some(key) = keys::deck_key(deck_id) else {
            return Ok(None);
        };
        match self.decks.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    /// Looks a deck up by full name, ignoring case and spacing around `::`.
    pub fn get_deck_by_name(&self, name: &str) -> Result<Option<DeckRecord>, StoreError> {
        let Ok(name) = normalize_deck_name(name) else {
            return Ok(None);
        };
        let name_key = keys::deck_name_key(&name);
        let Some(raw) = self.deck_names.get(name_key.as_bytes())? else {
            return Ok(None);
        };
        let deck_id = keys::decode_deck_id(&raw).ok_or_else(|| StoreError::Corrupt {
            entity: "deck_name".to_string(),
            key: name_key.clone(),
        })?;
        self.get_deck(deck_id)
    }

    /// All decks, parents first, siblings sorted by name.
    pub fn list_decks(&self) -> Result<Vec<DeckRecord>, StoreError> {
        let mut decks = Vec::new();
        for item in self.decks.iter() {
            let (_, v) = item?;
            decks.push(Self::deserialize::<DeckRecord>(&v)?);
        }
        decks.sort_by_cached_key(DeckRecord::sort_key);
        Ok(decks)
    }

    /// Writes a deck record and its name index entry in one transaction.
    /// Fails with `Conflict` when another deck already owns the name.
    pub fn upsert_deck(&self, deck: &DeckRecord) -> Result<(), StoreError> {
        let deck_key = keys::deck_key(deck.id)
            .ok_or_else(|| StoreError::Validation(format!("Invalid deck id {}", deck.id)))?;
        let name_key = keys::deck_name_key(&deck.name);
        let deck_bytes = Self::serialize(deck)?;
        let id_bytes = keys::encode_deck_id(deck.id);

        (&self.decks, &self.deck_names)
            .transaction(
                |(tx_decks, tx_names)| -> ConflictableTransactionResult<(), StoreError> {
                    if let Some(owner) = tx_names.get(name_key.as_bytes())? {
                        if owner.as_ref() != id_bytes.as_slice() {
                            return abort(StoreError::Conflict {
                                entity: "deck_name".to_string(),
                                key: deck.name.clone(),
                            });
                        }
                    }
                    if let Some(previous) = tx_decks.get(deck_key.as_bytes())? {
                        let previous: DeckRecord = Self::deserialize(&previous)
                            .map_err(ConflictableTransactionError::Abort)?;
                        let previous_key = keys::deck_name_key(&previous.name);
                        if previous_key != name_key {
                            tx_names.remove(previous_key.as_bytes())?;
                        }
                    }
                    tx_names.insert(name_key.as_bytes(), &id_bytes[..])?;
                    tx_decks.insert(deck_key.as_bytes(), deck_bytes.as_slice())?;
                    Ok(())
                },
            )
            .map_err(Self::transaction_error)
    }

    /// Creates a deck, adding any missing parents along the way. An existing
    /// deck with the same name (ignoring case) is returned unchanged, also
    /// when a concurrent request created it first.
    ///
    /// Parents reuse the spelling of decks that already exist, so creating
    /// `spanish::Verbs` under `Spanish` yields `Spanish::Verbs`.
    pub fn create_deck(&self, name: &str, filtered: bool) -> Result<DeckRecord, StoreError> {
        let name = normalize_deck_name(name).map_err(|e| StoreError::Validation(e.to_string()))?;
        let components: Vec<&str> = name.split(DECK_NAME_SEPARATOR).collect();
        let (leaf, parents) = components
            .split_last()
            .ok_or_else(|| StoreError::Validation("Deck name is required".to_string()))?;

        let mut resolved = String::new();
        for component in parents {
            let candidate = join_name(&resolved, component);
            let parent = match self.get_deck_by_name(&candidate)? {
                Some(existing) => existing,
                None => self.insert_new_deck(&candidate, false)?,
            };
            if parent.filtered {
                return Err(StoreError::Validation(format!(
                    "Filtered deck '{}' cannot have subdecks",
                    parent.name
                )));
            }
            resolved = parent.name;
        }

        let full_name = join_name(&resolved, leaf);
        if let Some(existing) = self.get_deck_by_name(&full_name)? {
            return Ok(existing);
        }
        self.insert_new_deck(&full_name, filtered)
    }

    /// Replaces the scheduler-provided counts of a single deck.
    pub fn set_deck_counts(
        &self,
        deck_id: DeckId,
        counts: DeckCounts,
    ) -> Result<DeckRecord, StoreError> {
        self.update_deck(deck_id, |deck| deck.counts = counts)
    }

    pub fn set_deck_collapsed_flag(
        &self,
        deck_id: DeckId,
        collapsed: bool,
        scope: CollapseScope,
    ) -> Result<DeckRecord, StoreError> {
        self.update_deck(deck_id, |deck| match scope {
            CollapseScope::Reviewer => deck.collapsed = collapsed,
            CollapseScope::Browser => deck.browser_collapsed = collapsed,
        })
    }

    /// Removes the given decks together with all of their subdecks in one
    /// transaction and returns how many decks were removed.
    pub fn remove_decks(&self, deck_ids: &[DeckId]) -> Result<usize, StoreError> {
        let decks = self.list_decks()?;
        let roots: Vec<String> = decks
            .iter()
            .filter(|deck| deck_ids.contains(&deck.id))
            .map(|deck| deck.name.to_lowercase())
            .collect();
        let doomed: Vec<&DeckRecord> = decks
            .iter()
            .filter(|deck| {
                let name = deck.name.to_lowercase();
                roots
                    .iter()
                    .any(|root| *root == name || is_ancestor_name(root, &name))
            })
            .collect();

        if deck_ids.contains(&DEFAULT_DECK_ID) || doomed.iter().any(|d| d.id == DEFAULT_DECK_ID) {
            return Err(StoreError::Validation(
                "The default deck cannot be deleted".to_string(),
            ));
        }

        let mut removals = Vec::with_capacity(doomed.len());
        for deck in &doomed {
            if let Some(deck_key) = keys::deck_key(deck.id) {
                removals.push((deck_key, keys::deck_name_key(&deck.name)));
            }
        }

        (&self.decks, &self.deck_names)
            .transaction(
                |(tx_decks, tx_names)| -> ConflictableTransactionResult<(), StoreError> {
                    for (deck_key, name_key) in &removals {
                        tx_decks.remove(deck_key.as_bytes())?;
                        tx_names.remove(name_key.as_bytes())?;
                    }
                    Ok(())
                },
            )
            .map_err(Self::transaction_error)?;

        let current = self.stored_current_deck_id()?;
        if current.is_some_and(|id| doomed.iter().any(|d| d.id == id)) {
            self.set_current_deck_id(DEFAULT_DECK_ID)?;
        }

        let removed = removals.len();
        tracing::info!(removed, requested = deck_ids.len(), "Removed decks");
        Ok(removed)
    }

    fn update_deck<F>(&self, deck_id: DeckId, apply: F) -> Result<DeckRecord, StoreError>
    where
        F: FnOnce(&mut DeckRecord),
    {
        let mut deck = self
            .get_deck(deck_id)?
            .ok_or_else(|| StoreError::not_found("deck", deck_id))?;
        apply(&mut deck);
        deck.mtime = Utc::now();
        self.upsert_deck(&deck)?;
        Ok(deck)
    }

    /// Inserts a fresh deck, or returns the deck that claimed `name` first.
    fn insert_new_deck(&self, name: &str, filtered: bool) -> Result<DeckRecord, StoreError> {
        let deck = DeckRecord::new(self.next_deck_id()?, name, filtered);
        match self.upsert_deck(&deck) {
            Ok(()) => {
                tracing::debug!(deck_id = deck.id, name = %deck.name, filtered, "Created deck");
                Ok(deck)
            }
            Err(StoreError::Conflict { .. }) => {
                tracing::debug!(name, "Deck name claimed concurrently, reusing it");
                self.get_deck_by_name(name)?
                    .ok_or_else(|| StoreError::not_found("deck", name))
            }
            Err(e) => Err(e),
        }
    }
}

/// Whether `ancestor` is a strict `::`-prefix of `name`.
pub(crate) fn is_ancestor_name(ancestor: &str, name: &str) -> bool {
    name.strip_prefix(ancestor)
        .is_some_and(|rest| rest.starts_with(DECK_NAME_SEPARATOR))
}

fn join_name(parent: &str, leaf: &str) -> String {
    if parent.is_empty() {
        leaf.to_string()
    } else {
        format!("{parent}{DECK_NAME_SEPARATOR}{leaf}")
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use crate::deck_tree::DeckTree;

    use super::*;

    fn open_store(dir: &tempfile::TempDir) -> Store {
        let store = Store::open(dir.path().join("decks.sled").to_str().unwrap()).unwrap();
        store.run_migrations().unwrap();
        store
    }

    #[test]
    fn create_adds_missing_parents() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);

        let verbs = store.create_deck("Spanish::Grammar::Verbs", false).unwrap();
        assert_eq!(verbs.name, "Spanish::Grammar::Verbs");
        assert_eq!(verbs.parent_name(), Some("Spanish::Grammar"));
        assert!(store.get_deck_by_name("spanish").unwrap().is_some());
        assert!(store.get_deck_by_name("Spanish :: Grammar").unwrap().is_some());
        assert_eq!(store.list_decks().unwrap().len(), 4);
    }

    #[test]
    fn create_is_idempotent_and_reuses_parent_spelling() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);

        let first = store.create_deck("Spanish", false).unwrap();
        let again = store.create_deck("SPANISH", false).unwrap();
        assert_eq!(first.id, again.id);

        let verbs = store.create_deck("spanish::Verbs", false).unwrap();
        assert_eq!(verbs.name, "Spanish::Verbs");
    }

    #[test]
    fn filtered_decks_cannot_have_children() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);

        store.create_deck("Due Today", true).unwrap();
        let err = store.create_deck("Due Today::More", false).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn list_puts_parents_before_children() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);

        store.create_deck("b::z", false).unwrap();
        store.create_deck("A b", false).unwrap();
        store.create_deck("a::c", false).unwrap();

        let names: Vec<_> = store.list_decks().unwrap().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["a", "a::c", "A b", "b", "b::z", "Default"]);
    }

    #[test]
    fn default_deck_cannot_be_removed() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);

        let err = store.remove_decks(&[DEFAULT_DECK_ID]).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn removing_current_deck_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);

        let deck = store.create_deck("Temp", false).unwrap();
        store.set_current_deck_id(deck.id).unwrap();
        assert_eq!(store.remove_decks(&[deck.id, 999]).unwrap(), 1);
        assert_eq!(store.get_current_deck_id().unwrap(), DEFAULT_DECK_ID);
    }

    #[test]
    fn collapse_flags_are_scoped() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);

        let deck = store.create_deck("A", false).unwrap();
        let updated = store
            .set_deck_collapsed_flag(deck.id, true, CollapseScope::Browser)
            .unwrap();
        assert!(updated.collapsed_in(CollapseScope::Browser));
        assert!(!updated.collapsed_in(CollapseScope::Reviewer));

        let err = store
            .set_deck_collapsed_flag(12345, true, CollapseScope::Reviewer)
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn removing_a_middle_deck_takes_its_subdecks() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);

        let leaf = store.create_deck("A::B::C", false).unwrap();
        let middle = store.get_deck_by_name("A::B").unwrap().unwrap();
        let sibling = store.create_deck("A::Bx", false).unwrap();

        assert_eq!(store.remove_decks(&[middle.id]).unwrap(), 2);
        assert!(store.get_deck(leaf.id).unwrap().is_none());
        assert!(store.get_deck_by_name("A::B::C").unwrap().is_none());
        assert!(store.get_deck(sibling.id).unwrap().is_some());

        let names: Vec<_> = store.list_decks().unwrap().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["A", "A::Bx", "Default"]);

        let raw = store
            .build_raw_deck_tree(true, CollapseScope::Reviewer)
            .unwrap();
        let tree = DeckTree::from_raw(&raw);
        assert_eq!(tree.check_consistency(), Ok(()));
    }

    #[test]
    fn removed_name_can_be_reused() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);

        let first = store.create_deck("Temp::Child", false).unwrap();
        let parent = store.get_deck_by_name("Temp").unwrap().unwrap();
        store.remove_decks(&[parent.id]).unwrap();

        let again = store.create_deck("temp::child", false).unwrap();
        assert_ne!(again.id, first.id);
        assert_eq!(again.name, "temp::child");
    }

    #[test]
    fn renaming_onto_a_taken_name_conflicts() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);

        store.create_deck("Spanish", false).unwrap();
        let mut french = store.create_deck("French", false).unwrap();
        french.name = "SPANISH".to_string();

        let err = store.upsert_deck(&french).unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
        assert_eq!(store.get_deck_by_name("french").unwrap().unwrap().id, french.id);
    }

    #[test]
    fn concurrent_creates_share_one_deck() {
        let dir = tempdir().unwrap();
        let store = std::sync::Arc::new(open_store(&dir));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || store.create_deck("Race::Leaf", false).unwrap().id)
            })
            .collect();
        let ids: Vec<DeckId> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(ids.iter().all(|id| *id == ids[0]));
        let names: Vec<_> = store.list_decks().unwrap().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["Default", "Race", "Race::Leaf"]);
    }

    #[test]
    fn negative_ids_are_never_found_or_stored() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);

        assert!(store.get_deck(-1).unwrap().is_none());
        let err = store.upsert_deck(&DeckRecord::new(-3, "Negative", false)).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(store.get_deck(0).unwrap().is_none());
    }
}
