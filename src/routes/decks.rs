use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_DECK_ID;
use crate::deck_tree::{
    CollapseScope, DeckCollapseStore, DeckId, DeckTree, DeckTreeSource, DeckTreeView,
    FlattenedDeckList,
};
use crate::extractors::JsonBody;
use crate::response::{created, ok, AppError};
use crate::state::AppState;
use crate::validation::normalize_filter;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_decks).post(create_deck))
        .route("/tree", get(deck_tree))
        .route("/current", put(set_current_deck))
        .route("/:id", get(get_deck).delete(delete_deck))
        .route("/:id/toggle-collapse", post(toggle_collapse))
}

fn deck_not_found(deck_id: DeckId) -> AppError {
    AppError::not_found(&format!("Deck {deck_id} not found"))
}

#[derive(Debug, Deserialize)]
struct TreeQuery {
    counts: Option<bool>,
}

async fn deck_tree(
    Query(q): Query<TreeQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let raw = state.store().deck_tree(q.counts.unwrap_or(true))?;
    Ok(ok(DeckTree::from_raw(&raw).view()))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    filter: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeckListResponse {
    decks: FlattenedDeckList,
    cards_due: u32,
    only_has_default_deck: bool,
    current_deck_id: DeckId,
}

async fn list_decks(
    Query(q): Query<ListQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let filter = normalize_filter(q.filter.as_deref(), state.config().deck_list.filter_max_len)
        .map_err(|msg| AppError::bad_request("DECK_FILTER_INVALID", msg))?;

    let tree = state.store().deck_due_tree()?;
    let current_deck_id = state.store().get_current_deck_id()?;
    let decks = tree.flattened_deck_list(filter.as_deref(), Some(current_deck_id));
    tracing::debug!(rows = decks.data.len(), filter = ?filter, "Listed decks");

    Ok(ok(DeckListResponse {
        decks,
        cards_due: tree.total_due(),
        only_has_default_deck: tree.only_has_default_deck(),
        current_deck_id,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateDeckRequest {
    name: String,
    #[serde(default)]
    filtered: bool,
}

async fn create_deck(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateDeckRequest>,
) -> Result<impl IntoResponse, AppError> {
    let deck = state.store().create_deck(&req.name, req.filtered)?;
    tracing::info!(deck_id = deck.id, name = %deck.name, "Deck created");
    Ok(created(deck))
}

async fn get_deck(
    Path(deck_id): Path<DeckId>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let tree = state.store().deck_due_tree()?;
    let node = tree
        .find(deck_id)
        .filter(|node| !node.is_synthetic_deck())
        .ok_or_else(|| deck_not_found(deck_id))?;
    Ok(ok(DeckTreeView::from(node)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToggleCollapseResponse {
    deck_id: DeckId,
    collapsed: bool,
}

async fn toggle_collapse(
    Path(deck_id): Path<DeckId>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let mut tree = state.store().deck_due_tree()?;
    let node = tree
        .find_mut(deck_id)
        .filter(|node| !node.is_synthetic_deck())
        .ok_or_else(|| deck_not_found(deck_id))?;

    let collapsed = node.toggle_collapsed();
    state
        .store()
        .set_deck_collapsed(deck_id, collapsed, CollapseScope::Reviewer)?;
    tracing::info!(deck_id, collapsed, "Deck collapse toggled");

    Ok(ok(ToggleCollapseResponse { deck_id, collapsed }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetCurrentDeckRequest {
    deck_id: DeckId,
}

async fn set_current_deck(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SetCurrentDeckRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.store().set_current_deck_id(req.deck_id)?;
    Ok(ok(serde_json::json!({ "currentDeckId": req.deck_id })))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteDeckResponse {
    deck_name: String,
    decks_deleted: usize,
}

async fn delete_deck(
    Path(deck_id): Path<DeckId>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    if deck_id == DEFAULT_DECK_ID {
        return Err(AppError::bad_request(
            "DECK_DEFAULT_PROTECTED",
            "The default deck cannot be deleted",
        ));
    }

    let tree = DeckTree::from_raw(&state.store().deck_tree(false)?);
    let node = tree
        .find(deck_id)
        .filter(|node| !node.is_synthetic_deck())
        .ok_or_else(|| deck_not_found(deck_id))?;

    let deck_name = node.full_deck_name().to_string();
    let decks_deleted = state.store().remove_decks(&node.subtree_ids())?;
    tracing::info!(deck_id, name = %deck_name, decks_deleted, "Deck deleted");

    Ok(ok(DeleteDeckResponse {
        deck_name,
        decks_deleted,
    }))
}
