//! Grid page handler.

use crate::{error::HttpError, AppState};
use axum::{
    extract::{Query, State},
    Json,
};
use fieldgrid_core::grid::build_grid;
use fieldgrid_core::models::grid::{GridPage, GridQuery};

/// Build one page of the post×field grid.
///
/// # Arguments
/// - `state`: Application state.
/// - `query`: `post_type` (`all` or a type name) and 1-based `page`.
///
/// # Returns
/// The grid page as JSON. Empty pages are successful responses.
///
/// # Errors
/// Returns an error if the host store fails.
pub async fn get_grid(
    State(state): State<AppState>,
    Query(query): Query<GridQuery>,
) -> Result<Json<GridPage>, HttpError> {
    let grid = build_grid(
        state.db.as_ref(),
        &query.filter(),
        query.page(),
        state.config.page_size,
    )?;
    Ok(Json(grid))
}
