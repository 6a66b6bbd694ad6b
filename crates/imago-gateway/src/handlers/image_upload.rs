use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use imago_core::{AppError, PipelineOutcome};

use crate::auth::models::Principal;
use crate::error::HttpAppError;
use crate::services::ingest::UploadedImage;
use crate::state::AppState;

/// Upload image handler
///
/// Accepts a multipart form with an `image` file field and an optional
/// `productName` text field used as the enhancement subject hint, then
/// delegates to the ingestion pipeline. Degraded outcomes (enhancement
/// failed) are still HTTP 200; the `message` field explains what happened.
#[tracing::instrument(skip(state, multipart), fields(user_id = %principal.user_id))]
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    multipart: Multipart,
) -> Result<Json<PipelineOutcome>, HttpAppError> {
    let upload = extract_upload(multipart).await?;

    tracing::info!(
        file_name = %upload.file_name,
        content_type = %upload.content_type,
        size = upload.data.len(),
        "Starting image upload"
    );

    let outcome = state.ingest_service().ingest(&principal, upload).await?;

    Ok(Json(outcome))
}

/// Pull the image file and optional product name out of the multipart form.
/// Exactly one `image` field is accepted.
async fn extract_upload(mut multipart: Multipart) -> Result<UploadedImage, AppError> {
    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut subject_hint: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidArgument(format!("Failed to read multipart form: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            "image" => {
                if file.is_some() {
                    return Err(AppError::InvalidArgument(
                        "Multiple image fields are not allowed; send exactly one field named 'image'"
                            .to_string(),
                    ));
                }
                let file_name = field.file_name().unwrap_or("unknown").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(|e| {
                    AppError::InvalidArgument(format!("Failed to read image data: {}", e))
                })?;
                file = Some((file_name, content_type, data.to_vec()));
            }
            "productName" => {
                let value = field.text().await.map_err(|e| {
                    AppError::InvalidArgument(format!("Failed to read productName: {}", e))
                })?;
                if !value.trim().is_empty() {
                    subject_hint = Some(value);
                }
            }
            _ => {}
        }
    }

    let (file_name, content_type, data) =
        file.ok_or_else(|| AppError::InvalidArgument("No image file provided".to_string()))?;

    Ok(UploadedImage {
        file_name,
        content_type,
        data,
        subject_hint,
    })
}
