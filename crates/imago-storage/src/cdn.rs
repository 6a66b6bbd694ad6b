//! CDN front: maps storage keys to publicly cacheable URLs and purges edge
//! caches when objects are deleted.
//!
//! URL mapping is pure; invalidation goes through the CloudFront API.
//! Callers must never block a user-facing response on invalidation
//! completion; the gateway dispatches it as a background task.

use crate::traits::{StorageError, StorageResult};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_cloudfront::types::{InvalidationBatch, Paths};
use uuid::Uuid;

/// CDN abstraction: deterministic URL mapping plus cache invalidation.
#[async_trait]
pub trait Cdn: Send + Sync {
    /// Public URL for a storage key. Pure; no network call.
    fn url_for(&self, key: &str) -> String;

    /// Request invalidation of the given keys at edge locations. Returns the
    /// invalidation id. Asynchronous on the CDN side; completion is not
    /// awaited anywhere in the request path.
    async fn invalidate(&self, keys: &[String]) -> StorageResult<String>;
}

/// CloudFront-backed CDN front.
pub struct CloudFrontCdn {
    client: Option<aws_sdk_cloudfront::Client>,
    distribution_id: Option<String>,
    domain: String,
}

impl CloudFrontCdn {
    /// Create a CloudFront CDN front.
    ///
    /// With no distribution id configured, URL mapping still works and
    /// invalidation becomes a logged no-op (caches expire naturally).
    pub async fn new(domain: String, distribution_id: Option<String>) -> Self {
        let client = if distribution_id.is_some() {
            let aws_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
            Some(aws_sdk_cloudfront::Client::new(&aws_config))
        } else {
            tracing::warn!("CDN_DISTRIBUTION_ID not set; cache invalidation disabled");
            None
        };

        CloudFrontCdn {
            client,
            distribution_id,
            domain,
        }
    }
}

#[async_trait]
impl Cdn for CloudFrontCdn {
    fn url_for(&self, key: &str) -> String {
        format!("https://{}/{}", self.domain, key.trim_start_matches('/'))
    }

    async fn invalidate(&self, keys: &[String]) -> StorageResult<String> {
        let (Some(client), Some(distribution_id)) = (&self.client, &self.distribution_id) else {
            tracing::debug!(count = keys.len(), "No CDN distribution configured, skipping invalidation");
            return Ok("skipped".to_string());
        };

        // CloudFront invalidation paths must start with /
        let items: Vec<String> = keys
            .iter()
            .map(|key| format!("/{}", key.trim_start_matches('/')))
            .collect();

        let paths = Paths::builder()
            .quantity(items.len() as i32)
            .set_items(Some(items.clone()))
            .build()
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        let batch = InvalidationBatch::builder()
            .caller_reference(format!("imago-{}", Uuid::new_v4()))
            .paths(paths)
            .build()
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        let result = client
            .create_invalidation()
            .distribution_id(distribution_id)
            .invalidation_batch(batch)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    distribution_id = %distribution_id,
                    paths = ?items,
                    "CloudFront invalidation failed"
                );
                StorageError::BackendError(e.to_string())
            })?;

        let invalidation_id = result
            .invalidation()
            .map(|inv| inv.id().to_string())
            .unwrap_or_default();

        tracing::info!(
            invalidation_id = %invalidation_id,
            distribution_id = %distribution_id,
            count = keys.len(),
            "CloudFront invalidation created"
        );

        Ok(invalidation_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_url_for_is_pure_mapping() {
        let cdn = CloudFrontCdn::new("cdn.example.com".to_string(), None).await;
        assert_eq!(
            cdn.url_for("users/u1/original/a.jpg"),
            "https://cdn.example.com/users/u1/original/a.jpg"
        );
        assert_eq!(
            cdn.url_for("/users/u1/original/a.jpg"),
            "https://cdn.example.com/users/u1/original/a.jpg"
        );
    }

    #[tokio::test]
    async fn test_invalidate_without_distribution_is_noop() {
        let cdn = CloudFrontCdn::new("cdn.example.com".to_string(), None).await;
        let id = cdn
            .invalidate(&["users/u1/original/a.jpg".to_string()])
            .await
            .expect("invalidate");
        assert_eq!(id, "skipped");
    }
}
