//! Input checks shared by the store and the deck routes.

use crate::constants::{DECK_NAME_SEPARATOR, MAX_DECK_NAME_LEN};

/// Normalises a full deck name: each `::` component is trimmed and none may
/// be empty. `" Spanish ::Verbs "` becomes `"Spanish::Verbs"`.
pub fn normalize_deck_name(name: &str) -> Result<String, &'static str> {
    if name.trim().is_empty() {
        return Err("Deck name is required");
    }

    let mut components = Vec::new();
    for component in name.split(DECK_NAME_SEPARATOR) {
        let component = component.trim();
        if component.is_empty() {
            return Err("Deck name contains an empty component");
        }
        if component.chars().any(char::is_control) {
            return Err("Deck name contains control characters");
        }
        components.push(component);
    }

    let normalized = components.join(DECK_NAME_SEPARATOR);
    if normalized.len() > MAX_DECK_NAME_LEN {
        return Err("Deck name is too long");
    }
    Ok(normalized)
}

/// Trims a deck list filter. Blank filters mean "no filter".
pub fn normalize_filter(filter: Option<&str>, max_len: usize) -> Result<Option<String>, &'static str> {
    let Some(filter) = filter.map(str::trim).filter(|f| !f.is_empty()) else {
        return Ok(None);
    };
    if filter.chars().count() > max_len {
        return Err("Filter is too long");
    }
    Ok(Some(filter.to_string()))
}
