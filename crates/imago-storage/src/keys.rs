//! Object key construction and ownership checks.
//!
//! Every key the gateway writes has the shape
//! `users/{user_id}/{kind}/{stem}_{suffix}{ext}`. The sanitized stem keeps
//! keys readable; the UUID suffix guarantees two uploads never collide even
//! with identical filenames; the user prefix is the isolation boundary.

use imago_core::ObjectKind;
use uuid::Uuid;

const MAX_STEM_LENGTH: usize = 128;

/// Prefix that namespaces all of one user's objects.
pub fn user_prefix(user_id: &str) -> String {
    format!("users/{}/", user_id)
}

/// Prefix for one rendition kind of one user's objects.
pub fn kind_prefix(user_id: &str, kind: ObjectKind) -> String {
    format!("users/{}/{}/", user_id, kind)
}

/// Whether `key` lies inside the caller's namespace. Used on every
/// externally supplied key before a read or delete.
pub fn owned_by(key: &str, user_id: &str) -> bool {
    key.starts_with(&user_prefix(user_id))
}

/// Build a fresh, namespaced object key for an upload.
pub fn build_object_key(user_id: &str, kind: ObjectKind, file_name: &str) -> String {
    let sanitized = sanitize_file_name(file_name);
    let (stem, extension) = split_extension(&sanitized);
    format!(
        "users/{}/{}/{}_{}{}",
        user_id,
        kind,
        stem,
        Uuid::new_v4(),
        extension
    )
}

/// Sanitize a client-supplied filename: drop any path components, strip
/// control characters, and map everything outside `[A-Za-z0-9._-]` to `_`.
/// An empty or fully-stripped name falls back to "file".
pub fn sanitize_file_name(file_name: &str) -> String {
    let basename = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);

    let sanitized: String = basename
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_STEM_LENGTH)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = sanitized.trim_matches('.');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Split `name.ext` into (`name`, `.ext`), lowercasing the extension.
/// Names without an extension return an empty extension part.
fn split_extension(name: &str) -> (&str, String) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
            (stem, format!(".{}", ext.to_lowercase()))
        }
        _ => (name, String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_namespaced_by_user_and_kind() {
        let key = build_object_key("u1", ObjectKind::Original, "chair.jpg");
        assert!(key.starts_with("users/u1/original/chair_"));
        assert!(key.ends_with(".jpg"));

        let enhanced = build_object_key("u1", ObjectKind::Enhanced, "chair.jpg");
        assert!(enhanced.starts_with("users/u1/enhanced/chair_"));
    }

    #[test]
    fn test_identical_uploads_never_collide() {
        let a = build_object_key("u1", ObjectKind::Original, "chair.jpg");
        let b = build_object_key("u1", ObjectKind::Original, "chair.jpg");
        assert_ne!(a, b);
    }

    #[test]
    fn test_sanitize_strips_path_components() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("/absolute/path.png"), "path.png");
        assert_eq!(sanitize_file_name("dir\\evil.jpg"), "evil.jpg");
    }

    #[test]
    fn test_sanitize_strips_control_characters() {
        assert_eq!(sanitize_file_name("ch\x00air\n.jpg"), "chair.jpg");
    }

    #[test]
    fn test_sanitize_maps_special_characters() {
        assert_eq!(sanitize_file_name("my photo (1).jpg"), "my_photo__1_.jpg");
        assert_eq!(sanitize_file_name("käsebrot.png"), "käsebrot.png");
    }

    #[test]
    fn test_sanitize_empty_falls_back() {
        assert_eq!(sanitize_file_name(""), "file");
        assert_eq!(sanitize_file_name("..."), "file");
    }

    #[test]
    fn test_malicious_name_cannot_escape_namespace() {
        // A filename full of traversal syntax still lands under the caller's prefix.
        let key = build_object_key("u1", ObjectKind::Original, "../../users/u2/original/x.jpg");
        assert!(key.starts_with("users/u1/original/"));
        assert!(!key.contains(".."));
    }

    #[test]
    fn test_owned_by() {
        assert!(owned_by("users/u1/original/a.jpg", "u1"));
        assert!(!owned_by("users/u2/original/a.jpg", "u1"));
        // Prefix match must not bleed across user ids that share a prefix.
        assert!(!owned_by("users/u10/original/a.jpg", "u1"));
        assert!(!owned_by("other/u1/a.jpg", "u1"));
    }

    #[test]
    fn test_extension_is_lowercased_and_preserved() {
        let key = build_object_key("u1", ObjectKind::Original, "PHOTO.JPG");
        assert!(key.ends_with(".jpg"));

        let bare = build_object_key("u1", ObjectKind::Original, "noextension");
        assert!(bare.starts_with("users/u1/original/noextension_"));
        assert!(!bare.contains('.'));
    }
}
