use serde::Serialize;

use crate::constants::DEFAULT_DECK_ID;
use crate::deck_tree::tree::{DeckNodeRef, DeckTree};
use crate::deck_tree::DeckId;

/// One row of the deck list as rendered by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayDeckNode {
    pub did: DeckId,
    pub full_deck_name: String,
    pub last_deck_name_component: String,
    pub depth: i32,
    pub collapsed: bool,
    pub can_collapse: bool,
    pub filtered: bool,
    pub new_count: u32,
    pub learn_count: u32,
    pub review_count: u32,
    pub is_selected: bool,
}

impl DisplayDeckNode {
    pub fn from_node(node: DeckNodeRef<'_>, selected_did: Option<DeckId>) -> Self {
        Self {
            did: node.did(),
            full_deck_name: node.full_deck_name().to_string(),
            last_deck_name_component: node.last_name_component().to_string(),
            depth: node.depth(),
            collapsed: node.collapsed(),
            can_collapse: node.has_children(),
            filtered: node.filtered(),
            new_count: node.new_count(),
            learn_count: node.learn_count(),
            review_count: node.review_count(),
            is_selected: selected_did == Some(node.did()),
        }
    }
}

/// The deck tree flattened into display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlattenedDeckList {
    pub data: Vec<DisplayDeckNode>,
    pub has_sub_decks: bool,
}

/// Nested serialisable view of a subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckTreeView {
    pub did: DeckId,
    pub name: String,
    pub full_deck_name: String,
    pub level: i32,
    pub depth: i32,
    pub new_count: u32,
    pub learn_count: u32,
    pub review_count: u32,
    pub collapsed: bool,
    pub filtered: bool,
    pub ready_to_study: bool,
    pub children: Vec<DeckTreeView>,
}

impl From<DeckNodeRef<'_>> for DeckTreeView {
    fn from(node: DeckNodeRef<'_>) -> Self {
        Self {
            did: node.did(),
            name: node.last_name_component().to_string(),
            full_deck_name: node.full_deck_name().to_string(),
            level: node.level(),
            depth: node.depth(),
            new_count: node.new_count(),
            learn_count: node.learn_count(),
            review_count: node.review_count(),
            collapsed: node.collapsed(),
            filtered: node.filtered(),
            ready_to_study: node.has_cards_ready_to_study(),
            children: node.children().map(DeckTreeView::from).collect(),
        }
    }
}

impl DeckTree {
    /// Decks to show for `filter`, in display order.
    ///
    /// A deck whose own name contains the filter (case-insensitive) is shown
    /// with all of its visible subdecks. Otherwise it is shown only when some
    /// descendant matched, and collapsed decks are not searched. Without a
    /// filter this is every deck that is not hidden under a collapsed parent.
    pub fn filter_and_flatten(&self, filter: Option<&str>) -> Vec<DeckNodeRef<'_>> {
        let pattern = filter
            .map(|f| f.trim().to_lowercase())
            .filter(|f| !f.is_empty());
        let mut out = Vec::new();
        filter_and_flatten_into(self.root(), pattern.as_deref(), &mut out);
        out
    }

    pub fn filter_and_flatten_display(
        &self,
        filter: Option<&str>,
        selected_did: Option<DeckId>,
    ) -> Vec<DisplayDeckNode> {
        self.filter_and_flatten(filter)
            .into_iter()
            .map(|node| DisplayDeckNode::from_node(node, selected_did))
            .collect()
    }

    pub fn flattened_deck_list(
        &self,
        filter: Option<&str>,
        selected_did: Option<DeckId>,
    ) -> FlattenedDeckList {
        FlattenedDeckList {
            data: self.filter_and_flatten_display(filter, selected_did),
            has_sub_decks: self.has_sub_decks(),
        }
    }

    /// Whether any top-level deck has subdecks.
    pub fn has_sub_decks(&self) -> bool {
        self.root().children().any(|deck| deck.has_children())
    }

    /// True for a fresh collection holding only the default deck.
    pub fn only_has_default_deck(&self) -> bool {
        let mut top_level = self.root().children();
        match (top_level.next(), top_level.next()) {
            (Some(only), None) => only.did() == DEFAULT_DECK_ID,
            _ => false,
        }
    }

    pub fn view(&self) -> DeckTreeView {
        DeckTreeView::from(self.root())
    }
}

fn name_matches(node: &DeckNodeRef<'_>, pattern: Option<&str>) -> bool {
    match pattern {
        None => true,
        Some(pattern) => node.last_name_component().to_lowercase().contains(pattern),
    }
}

fn filter_and_flatten_into<'a>(
    node: DeckNodeRef<'a>,
    pattern: Option<&str>,
    out: &mut Vec<DeckNodeRef<'a>>,
) {
    if !node.is_synthetic_deck() && name_matches(&node, pattern) {
        push_visible(node, out);
        return;
    }

    if node.collapsed() {
        return;
    }

    // Tentatively list this deck; drop it again if no descendant matched.
    let tentative = !node.is_synthetic_deck();
    if tentative {
        out.push(node);
    }
    let start = out.len();
    for child in node.children() {
        filter_and_flatten_into(child, pattern, out);
    }
    if tentative && out.len() == start {
        out.pop();
    }
}

fn push_visible<'a>(node: DeckNodeRef<'a>, out: &mut Vec<DeckNodeRef<'a>>) {
    out.push(node);
    if !node.collapsed() {
        for child in node.children() {
            push_visible(child, out);
        }
    }
}
