//! Image ingestion pipeline
//!
//! Drives one upload through its states:
//! received → original stored → enhancement attempted → completed.
//!
//! Only validation and the original-store write can fail the request.
//! Enhancement and the enhanced-copy write can only downgrade the result;
//! upload availability must not depend on the enhancement model's uptime.
//! That split is encoded in the return types: the fatal steps use `?`, the
//! best-effort steps produce an [EnhancementStep].

use std::sync::Arc;

use chrono::Utc;
use imago_core::{AppError, ObjectKind, PipelineOutcome, StoredObject, UploadValidator};
use imago_rpc::{EnhancementRequest, ImageEnhancer};
use imago_storage::{keys, Cdn, Storage};
use serde::Serialize;

use crate::auth::models::Principal;

const MSG_ENHANCED: &str = "Image uploaded and enhanced successfully";
const MSG_DEGRADED: &str = "Image uploaded successfully. Enhancement failed - please try again";

/// One validated upload moving through the pipeline.
#[derive(Debug)]
pub struct UploadedImage {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
    pub subject_hint: Option<String>,
}

/// A key/URL pair from a listing.
#[derive(Debug, Clone, Serialize)]
pub struct ImageEntry {
    pub key: String,
    pub url: String,
}

/// Outcome of the best-effort enhancement steps.
enum EnhancementStep {
    Enhanced(StoredObject),
    Degraded,
}

/// Orchestrates uploads, listings, and deletions against the object store,
/// the CDN front, and the enhancement service.
pub struct IngestService {
    storage: Arc<dyn Storage>,
    cdn: Arc<dyn Cdn>,
    enhancer: Arc<dyn ImageEnhancer>,
    validator: UploadValidator,
}

impl IngestService {
    pub fn new(
        storage: Arc<dyn Storage>,
        cdn: Arc<dyn Cdn>,
        enhancer: Arc<dyn ImageEnhancer>,
        validator: UploadValidator,
    ) -> Self {
        Self {
            storage,
            cdn,
            enhancer,
            validator,
        }
    }

    /// Run one upload through the pipeline.
    #[tracing::instrument(skip(self, upload), fields(user_id = %principal.user_id, file_name = %upload.file_name))]
    pub async fn ingest(
        &self,
        principal: &Principal,
        upload: UploadedImage,
    ) -> Result<PipelineOutcome, AppError> {
        // 1. Validate fully before any write; the store must never receive a
        //    rejected upload.
        self.validator
            .validate_all(&upload.file_name, &upload.content_type, upload.data.len())?;

        // 2. Store the original. Fatal on failure: there is nothing to serve yet.
        let original = self
            .store_object(
                principal,
                ObjectKind::Original,
                &upload.file_name,
                &upload.content_type,
                upload.data.clone(),
            )
            .await?;

        // 3. CDN URL for the original; pure.
        let original_url = self.cdn.url_for(&original.key);

        // 4–5. Enhancement is best-effort: any failure degrades the outcome.
        let step = self.enhance_and_store(principal, upload, &original).await;

        Ok(match step {
            EnhancementStep::Enhanced(enhanced) => {
                let enhanced_url = self.cdn.url_for(&enhanced.key);
                PipelineOutcome {
                    original,
                    enhanced: Some(enhanced),
                    original_url,
                    enhanced_url: Some(enhanced_url),
                    degraded: false,
                    message: MSG_ENHANCED.to_string(),
                }
            }
            EnhancementStep::Degraded => PipelineOutcome {
                original,
                enhanced: None,
                original_url,
                enhanced_url: None,
                degraded: true,
                message: MSG_DEGRADED.to_string(),
            },
        })
    }

    /// List the caller's images. The prefix is derived from the principal,
    /// never from client input, so cross-user listing is impossible by
    /// construction.
    pub async fn list_user_images(&self, principal: &Principal) -> Result<Vec<ImageEntry>, AppError> {
        let prefix = keys::user_prefix(&principal.user_id);
        let object_keys = self.storage.list_by_prefix(&prefix).await?;

        Ok(object_keys
            .into_iter()
            .map(|key| {
                let url = self.cdn.url_for(&key);
                ImageEntry { key, url }
            })
            .collect())
    }

    /// Delete one of the caller's images and invalidate its cached copies.
    ///
    /// A key outside the caller's namespace is PermissionDenied, not
    /// NotFound: the error must not reveal whether another user's key exists.
    pub async fn delete_user_image(
        &self,
        principal: &Principal,
        key: &str,
    ) -> Result<(), AppError> {
        if !keys::owned_by(key, &principal.user_id) {
            tracing::warn!(
                user_id = %principal.user_id,
                key = %key,
                "Blocked delete outside caller namespace"
            );
            return Err(AppError::PermissionDenied(
                "key is outside the caller's namespace".to_string(),
            ));
        }

        self.storage.delete(key).await?;
        self.spawn_invalidation(vec![key.to_string()]);

        Ok(())
    }

    async fn store_object(
        &self,
        principal: &Principal,
        kind: ObjectKind,
        file_name: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<StoredObject, AppError> {
        let key = keys::build_object_key(&principal.user_id, kind, file_name);
        let size = data.len() as i64;

        let outcome = self.storage.put(&key, data, content_type).await?;
        let url = self.cdn.url_for(&key);

        tracing::info!(user_id = %principal.user_id, key = %key, kind = %kind, "Stored object");

        Ok(StoredObject {
            key,
            url,
            user_id: principal.user_id.clone(),
            kind,
            file_name: keys::sanitize_file_name(file_name),
            content_type: content_type.to_string(),
            size_bytes: size,
            uploaded_at: Utc::now(),
            etag: outcome.etag,
        })
    }

    /// Steps 4–5: call the enhancement service and persist its output.
    /// Errors are absorbed into a degraded outcome, never propagated.
    async fn enhance_and_store(
        &self,
        principal: &Principal,
        upload: UploadedImage,
        original: &StoredObject,
    ) -> EnhancementStep {
        let request = EnhancementRequest {
            image_data: upload.data,
            mime_type: upload.content_type.clone(),
            subject_hint: upload.subject_hint.unwrap_or_default(),
        };

        let enhanced = match self.enhancer.process_image(request).await {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    original_key = %original.key,
                    "Enhancement failed, serving original only"
                );
                return EnhancementStep::Degraded;
            }
        };

        match self
            .store_object(
                principal,
                ObjectKind::Enhanced,
                &upload.file_name,
                &enhanced.mime_type,
                enhanced.image_data,
            )
            .await
        {
            Ok(object) => EnhancementStep::Enhanced(object),
            Err(err) => {
                // Enhancement bytes are not cached for a later retry; the
                // caller may re-invoke ingestion instead.
                tracing::warn!(
                    error = %err,
                    original_key = %original.key,
                    "Failed to store enhanced copy, serving original only"
                );
                EnhancementStep::Degraded
            }
        }
    }

    /// Fire-and-forget CDN invalidation. Failure is logged, never surfaced:
    /// the object is already gone from the origin and edge caches expire on
    /// their own.
    fn spawn_invalidation(&self, invalidation_keys: Vec<String>) {
        let cdn = self.cdn.clone();
        tokio::spawn(async move {
            if let Err(err) = cdn.invalidate(&invalidation_keys).await {
                tracing::warn!(
                    error = %err,
                    keys = ?invalidation_keys,
                    "CDN invalidation failed"
                );
            }
        });
    }
}
