//! Field deletion handlers.

use super::save::require_token;
use crate::{error::EnvelopeError, AppError, AppState};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use fieldgrid_core::constants::is_internal_key;
use fieldgrid_core::models::post::PostId;
use fieldgrid_core::sync::SaveResponse;
use fieldgrid_core::MetaHost;
use serde::Deserialize;

/// Query string carrying the anti-forgery token.
#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    #[serde(default)]
    pub token: String,
}

fn editable_key(key: &str) -> Result<&str, AppError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(AppError::BadRequest("Field key must not be empty".to_string()));
    }
    if is_internal_key(key) {
        return Err(AppError::BadRequest(format!(
            "Field '{}' is internal and cannot be deleted",
            key
        )));
    }
    Ok(key)
}

/// Delete one field from one post.
///
/// # Arguments
/// - `state`: Application state.
/// - `post_id`, `key`: Target cell from the path.
/// - `query`: Token query.
///
/// # Returns
/// A success envelope whose count is 1 when an entry was removed.
///
/// # Errors
/// Returns a failure envelope for a bad token, an internal key, an unknown
/// post (404), a post the caller may not edit, or a store failure.
pub async fn delete_post_field(
    State(state): State<AppState>,
    Path((post_id, key)): Path<(PostId, String)>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<SaveResponse>, EnvelopeError> {
    require_token(&state, &query.token)?;
    let key = editable_key(&key)?;
    if state.db.posts.get(post_id)?.is_none() {
        return Err(AppError::NotFound(format!("Post {} not found", post_id)).into());
    }
    if !state.db.can_edit(post_id)? {
        return Err(AppError::Forbidden(format!("Cannot edit post {}", post_id)).into());
    }

    let removed = state.db.delete_field(post_id, key)?;
    let message = if removed {
        format!("Deleted '{}' from post {}", key, post_id)
    } else {
        format!("Post {} has no field '{}'", post_id, key)
    };
    Ok(Json(SaveResponse::saved(usize::from(removed), message)))
}

/// Delete a field key from every post.
///
/// # Arguments
/// - `state`: Application state.
/// - `key`: Field key from the path.
/// - `query`: Token query.
///
/// # Returns
/// A success envelope with the number of entries removed.
///
/// # Errors
/// Returns a failure envelope for a bad token, an internal key, or a store
/// failure.
pub async fn delete_field_everywhere(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<SaveResponse>, EnvelopeError> {
    require_token(&state, &query.token)?;
    let key = editable_key(&key)?;
    let removed = state.db.delete_field_everywhere(key)?;
    Ok(Json(SaveResponse::saved(
        removed,
        format!("Deleted '{}' from {} post(s)", key, removed),
    )))
}
