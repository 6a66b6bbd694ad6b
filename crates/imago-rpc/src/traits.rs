//! Trait seams for the RPC clients.
//!
//! The middleware and the ingestion pipeline depend on these traits instead
//! of concrete clients, so the long-lived channel handles stay injected
//! dependencies and tests can substitute fakes.

use async_trait::async_trait;
use imago_core::AppError;

/// Result of a remote token validation.
#[derive(Debug, Clone)]
pub struct TokenValidation {
    pub valid: bool,
    pub user_id: String,
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub message: String,
}

/// Validates bearer tokens against the authentication service.
#[async_trait]
pub trait TokenValidator: Send + Sync {
    async fn validate_token(&self, token: &str) -> Result<TokenValidation, AppError>;
}

/// An enhancement invocation. Ephemeral; the result is immediately persisted
/// as a stored object by the pipeline, never kept around.
#[derive(Debug, Clone)]
pub struct EnhancementRequest {
    pub image_data: Vec<u8>,
    pub mime_type: String,
    pub subject_hint: String,
}

#[derive(Debug, Clone)]
pub struct EnhancementResult {
    pub image_data: Vec<u8>,
    pub mime_type: String,
    pub message: String,
}

/// Invokes the image enhancement service.
#[async_trait]
pub trait ImageEnhancer: Send + Sync {
    async fn process_image(&self, request: EnhancementRequest)
        -> Result<EnhancementResult, AppError>;
}
