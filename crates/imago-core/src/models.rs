//! Domain models shared across the gateway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Which rendition of an upload an object holds.
///
/// The kind is part of the storage key (`users/{user}/{kind}/...`), so
/// originals and enhanced copies never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Original,
    Enhanced,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Original => "original",
            ObjectKind::Enhanced => "enhanced",
        }
    }
}

impl Display for ObjectKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// A stored blob plus the metadata the gateway reports back to clients.
///
/// Objects are immutable once written; enhancement produces a new object
/// under the `enhanced` kind rather than overwriting the original.
#[derive(Debug, Clone, Serialize)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
    pub user_id: String,
    pub kind: ObjectKind,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub uploaded_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

/// The externally visible result of one ingestion.
///
/// `enhanced` is `None` and `degraded` is `true` exactly when enhancement (or
/// the enhanced-copy write) failed; the original is always present.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub original: StoredObject,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enhanced: Option<StoredObject>,
    pub original_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enhanced_url: Option<String>,
    pub degraded: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_kind_str() {
        assert_eq!(ObjectKind::Original.as_str(), "original");
        assert_eq!(ObjectKind::Enhanced.to_string(), "enhanced");
    }

    #[test]
    fn test_stored_object_serializes_kind_lowercase() {
        let object = StoredObject {
            key: "users/u1/original/chair_abc.jpg".to_string(),
            url: "https://cdn.example.com/users/u1/original/chair_abc.jpg".to_string(),
            user_id: "u1".to_string(),
            kind: ObjectKind::Original,
            file_name: "chair.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            size_bytes: 42,
            uploaded_at: Utc::now(),
            etag: None,
        };
        let json = serde_json::to_value(&object).expect("serialize");
        assert_eq!(json.get("kind").and_then(|v| v.as_str()), Some("original"));
        // etag is omitted when absent
        assert!(json.get("etag").is_none());
    }
}
