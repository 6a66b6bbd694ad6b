use crate::traits::{PutOutcome, Storage, StorageError, StorageResult};
use async_trait::async_trait;
use imago_core::StorageBackend;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
///
/// Used for development and tests; keys map directly to paths under the
/// configured base directory.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage instance rooted at `base_path`.
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage { base_path })
    }

    /// Convert a storage key to a filesystem path.
    ///
    /// Keys produced by the gateway never contain traversal sequences, but a
    /// key arriving from a client (delete) could; reject anything that would
    /// resolve outside the base directory.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.is_empty()
            || storage_key.starts_with('/')
            || storage_key
                .split('/')
                .any(|segment| segment.is_empty() || segment == "." || segment == "..")
        {
            return Err(StorageError::InvalidKey(storage_key.to_string()));
        }

        Ok(self.base_path.join(storage_key))
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Collect all file keys under `dir`, relative to the base path.
    async fn collect_keys(&self, dir: PathBuf, keys: &mut Vec<String>) -> StorageResult<()> {
        let mut pending = vec![dir];

        while let Some(current) = pending.pop() {
            let mut entries = match fs::read_dir(&current).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(StorageError::IoError(e)),
            };

            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                } else if let Ok(relative) = path.strip_prefix(&self.base_path) {
                    keys.push(relative.to_string_lossy().replace('\\', "/"));
                }
            }
        }

        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> StorageResult<PutOutcome> {
        let path = self.key_to_path(key)?;
        self.ensure_parent_dir(&path).await?;

        let size = data.len() as u64;
        let mut file = fs::File::create(&path)
            .await
            .map_err(|e| StorageError::UploadFailed(format!("{}: {}", path.display(), e)))?;
        file.write_all(&data)
            .await
            .map_err(|e| StorageError::UploadFailed(format!("{}: {}", path.display(), e)))?;
        file.flush()
            .await
            .map_err(|e| StorageError::UploadFailed(format!("{}: {}", path.display(), e)))?;

        tracing::info!(key = %key, size_bytes = size, "Local put successful");

        Ok(PutOutcome {
            etag: None,
            size_bytes: size,
        })
    }

    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(key)?;

        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::DownloadFailed(format!(
                "{}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn list_by_prefix(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let dir = self.key_to_path(prefix.trim_end_matches('/'))?;
        let prefix_normalized = prefix.trim_end_matches('/');

        let mut keys = Vec::new();
        self.collect_keys(dir, &mut keys).await?;
        // Strip anything outside the prefix (collect_keys walks whole subtrees)
        keys.retain(|k| {
            k.strip_prefix(prefix_normalized)
                .is_some_and(|rest| rest.starts_with('/'))
        });
        keys.sort();

        Ok(keys)
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(key = %key, "Local delete successful");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "{}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_storage() -> (tempfile::TempDir, LocalStorage) {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = LocalStorage::new(dir.path()).await.expect("storage");
        (dir, storage)
    }

    #[tokio::test]
    async fn test_put_get_delete_roundtrip() {
        let (_dir, storage) = test_storage().await;

        let outcome = storage
            .put("users/u1/original/a.jpg", b"bytes".to_vec(), "image/jpeg")
            .await
            .expect("put");
        assert_eq!(outcome.size_bytes, 5);

        let data = storage.get("users/u1/original/a.jpg").await.expect("get");
        assert_eq!(data, b"bytes");

        storage.delete("users/u1/original/a.jpg").await.expect("delete");
        assert!(matches!(
            storage.get("users/u1/original/a.jpg").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let (_dir, storage) = test_storage().await;
        assert!(matches!(
            storage.get("users/u1/original/missing.jpg").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let (_dir, storage) = test_storage().await;
        assert!(matches!(
            storage.delete("users/u1/original/missing.jpg").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_by_prefix_scopes_to_user() {
        let (_dir, storage) = test_storage().await;

        storage
            .put("users/u1/original/a.jpg", b"a".to_vec(), "image/jpeg")
            .await
            .unwrap();
        storage
            .put("users/u1/enhanced/b.jpg", b"b".to_vec(), "image/jpeg")
            .await
            .unwrap();
        storage
            .put("users/u2/original/c.jpg", b"c".to_vec(), "image/jpeg")
            .await
            .unwrap();

        let keys = storage.list_by_prefix("users/u1/").await.expect("list");
        assert_eq!(
            keys,
            vec![
                "users/u1/enhanced/b.jpg".to_string(),
                "users/u1/original/a.jpg".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_list_prefix_does_not_match_sibling_users() {
        let (_dir, storage) = test_storage().await;

        storage
            .put("users/u1/original/a.jpg", b"a".to_vec(), "image/jpeg")
            .await
            .unwrap();
        storage
            .put("users/u10/original/b.jpg", b"b".to_vec(), "image/jpeg")
            .await
            .unwrap();

        let keys = storage.list_by_prefix("users/u1/").await.expect("list");
        assert_eq!(keys, vec!["users/u1/original/a.jpg".to_string()]);
    }

    #[tokio::test]
    async fn test_traversal_keys_are_rejected() {
        let (_dir, storage) = test_storage().await;

        for key in ["../outside.jpg", "/etc/passwd", "users/../../x", ""] {
            assert!(
                matches!(storage.get(key).await, Err(StorageError::InvalidKey(_))),
                "key {:?} should be rejected",
                key
            );
        }
    }
}
