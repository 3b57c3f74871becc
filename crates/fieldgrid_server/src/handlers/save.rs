//! Token issuance and the batched save endpoint.

use crate::{error::EnvelopeError, AppError, AppState};
use axum::{body::Bytes, extract::State, Json};
use fieldgrid_core::sync::{apply_batch, SaveRequest, SaveResponse, TokenResponse};

/// Issue an anti-forgery token.
///
/// # Returns
/// The token and its lifetime in seconds.
pub async fn issue_token(State(state): State<AppState>) -> Json<TokenResponse> {
    Json(TokenResponse {
        token: state.tokens.issue(),
        expires_in: state.tokens.ttl().as_secs(),
    })
}

/// Verify a presented token.
///
/// # Errors
/// Returns `Forbidden` when the token is unknown or expired.
pub(crate) fn require_token(state: &AppState, token: &str) -> Result<(), AppError> {
    if state.tokens.verify(token) {
        Ok(())
    } else {
        Err(AppError::Forbidden("Invalid or expired token".to_string()))
    }
}

/// Save one batch of `{post: {field: value}}` edits.
///
/// The whole body is decoded before anything is written, so a malformed
/// payload changes nothing.
///
/// # Arguments
/// - `state`: Application state.
/// - `body`: JSON [`SaveRequest`].
///
/// # Returns
/// A success envelope carrying the number of fields whose stored value
/// changed.
///
/// # Errors
/// Returns a failure envelope with 400 for a malformed body, 403 for a bad
/// token, and 500 when the store fails part-way.
pub async fn save_batch(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SaveResponse>, EnvelopeError> {
    let request: SaveRequest = serde_json::from_slice(&body)
        .map_err(|err| AppError::BadRequest(format!("Malformed save payload: {}", err)))?;
    require_token(&state, &request.token)?;

    let report = apply_batch(state.db.as_ref(), &request.data)?;
    tracing::info!(
        posts = request.data.post_count(),
        saved = report.saved,
        deleted = report.deleted,
        unchanged = report.unchanged,
        skipped = report.skipped,
        "Saved batch"
    );
    Ok(Json(SaveResponse::saved(
        report.saved,
        format!("Saved {} field(s)", report.saved),
    )))
}
