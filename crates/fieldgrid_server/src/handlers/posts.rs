//! Post and post-type handlers used to seed the embedded host.

use crate::{error::HttpError, AppError, AppState};
use axum::{extract::State, Json};
use fieldgrid_core::constants::is_internal_key;
use fieldgrid_core::models::post::{
    CreatePostRequest, PostRecord, PostStatus, PostTypeDescriptor,
};
use fieldgrid_core::MetaHost;

/// List registered post types.
///
/// # Returns
/// All post types as JSON, ordered by name.
///
/// # Errors
/// Returns an error if listing fails.
pub async fn list_post_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<PostTypeDescriptor>>, HttpError> {
    Ok(Json(state.db.list_post_types()?))
}

/// Register (or replace) a post type.
///
/// # Arguments
/// - `state`: Application state.
/// - `req`: Post type descriptor.
///
/// # Returns
/// The stored descriptor as JSON.
///
/// # Errors
/// Returns an error if the name is blank or persistence fails.
pub async fn register_post_type(
    State(state): State<AppState>,
    Json(mut req): Json<PostTypeDescriptor>,
) -> Result<Json<PostTypeDescriptor>, HttpError> {
    req.name = req.name.trim().to_string();
    if req.label.trim().is_empty() {
        req.label = req.name.clone();
    }
    state.db.posts.register_type(&req)?;
    tracing::info!(post_type = %req.name, "Registered post type");
    Ok(Json(req))
}

/// Create a post with initial meta and optional field labels.
///
/// # Arguments
/// - `state`: Application state.
/// - `req`: Post creation payload.
///
/// # Returns
/// The stored post row as JSON.
///
/// # Errors
/// Returns an error if validation or persistence fails.
pub async fn create_post(
    State(state): State<AppState>,
    Json(req): Json<CreatePostRequest>,
) -> Result<Json<PostRecord>, HttpError> {
    for (key, label) in &req.labels {
        if is_internal_key(key) {
            return Err(AppError::BadRequest(format!(
                "Cannot label internal field '{}'",
                key
            ))
            .into());
        }
        state.db.meta.set_label(key, label.trim())?;
    }

    let record = state.db.create_post(
        &req.title,
        req.status.unwrap_or(PostStatus::Publish),
        req.post_type.as_deref().unwrap_or("post"),
        req.editable.unwrap_or(true),
        &req.meta,
    )?;
    tracing::debug!(post_id = record.id, "Created post");
    Ok(Json(record))
}
