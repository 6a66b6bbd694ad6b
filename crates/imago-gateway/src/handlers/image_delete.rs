use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::auth::models::Principal;
use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DeleteImageResponse {
    pub success: bool,
    pub message: String,
}

/// Delete one of the caller's images by storage key.
///
/// Ownership is checked against the principal before the store is touched;
/// the matching CDN invalidation runs in the background.
#[tracing::instrument(skip(state), fields(user_id = %principal.user_id, key = %key))]
pub async fn delete_image(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(key): Path<String>,
) -> Result<Json<DeleteImageResponse>, HttpAppError> {
    state
        .ingest_service()
        .delete_user_image(&principal, &key)
        .await?;

    Ok(Json(DeleteImageResponse {
        success: true,
        message: "Image deleted successfully".to_string(),
    }))
}
