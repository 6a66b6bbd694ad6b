//! Storage abstraction trait
//!
//! This module defines the Storage trait that all object-store backends must
//! implement. The pipeline and handlers work against `Arc<dyn Storage>` so
//! tests can substitute fakes.

use async_trait::async_trait;
use imago_core::StorageBackend;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for imago_core::AppError {
    fn from(err: StorageError) -> Self {
        use imago_core::AppError;

        match err {
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::InvalidKey(msg) => AppError::InvalidArgument(msg),
            StorageError::UploadFailed(msg)
            | StorageError::DownloadFailed(msg)
            | StorageError::DeleteFailed(msg)
            | StorageError::BackendError(msg) => {
                AppError::Unavailable(format!("object store: {}", msg))
            }
            StorageError::IoError(err) => AppError::Internal(format!("IO error: {}", err)),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
        }
    }
}

/// Metadata returned by a successful put.
#[derive(Debug, Clone, Default)]
pub struct PutOutcome {
    pub etag: Option<String>,
    pub size_bytes: u64,
}

/// Object store abstraction.
///
/// Backends are dumb blob stores: key construction and the per-user
/// ownership rules live in the [crate::keys] module and in the callers.
/// A put to an existing key overwrites it; callers never reuse keys because
/// every generated key carries a unique suffix.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write an object. Writes set a content type and a long cache lifetime
    /// where the backend supports it, since objects are immutable once
    /// written.
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str)
        -> StorageResult<PutOutcome>;

    /// Read an object's bytes. Missing keys yield `StorageError::NotFound`.
    async fn get(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// List all keys under a prefix.
    async fn list_by_prefix(&self, prefix: &str) -> StorageResult<Vec<String>>;

    /// Delete an object. Missing keys yield `StorageError::NotFound` where
    /// the backend can tell.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
