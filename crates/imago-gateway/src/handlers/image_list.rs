use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::auth::models::Principal;
use crate::error::HttpAppError;
use crate::services::ingest::ImageEntry;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ListImagesResponse {
    pub success: bool,
    pub images: Vec<ImageEntry>,
    pub count: usize,
}

/// List all of the caller's images with their CDN URLs.
#[tracing::instrument(skip(state), fields(user_id = %principal.user_id))]
pub async fn list_images(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<ListImagesResponse>, HttpAppError> {
    let images = state.ingest_service().list_user_images(&principal).await?;

    Ok(Json(ListImagesResponse {
        success: true,
        count: images.len(),
        images,
    }))
}
