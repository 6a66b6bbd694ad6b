//! Upload validation.
//!
//! Validation runs to completion before the pipeline performs any store
//! write; a rejected upload must never reach the object store.

use crate::error::AppError;
use std::path::Path;

/// Size limit and allow-lists for uploads.
#[derive(Debug, Clone)]
pub struct UploadLimits {
    pub max_file_size: usize,
    pub allowed_extensions: Vec<String>,
    pub allowed_content_types: Vec<String>,
}

/// Validation errors for uploaded files
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid file extension: {extension} (allowed: {allowed:?})")]
    InvalidExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Invalid content type: {content_type} (allowed: {allowed:?})")]
    InvalidContentType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("Content type {content_type} does not match extension {extension}")]
    ContentTypeMismatch {
        content_type: String,
        extension: String,
    },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Empty file")]
    EmptyFile,
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::InvalidArgument(err.to_string())
    }
}

/// Upload validator
///
/// Checks size, extension, and declared content type against configured
/// allow-lists, plus a cross-check that the declared content type matches
/// what the extension implies (spoofed Content-Type headers are rejected).
pub struct UploadValidator {
    limits: UploadLimits,
}

impl UploadValidator {
    pub fn new(limits: UploadLimits) -> Self {
        Self { limits }
    }

    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.limits.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.limits.max_file_size,
            });
        }

        Ok(())
    }

    pub fn validate_extension(&self, filename: &str) -> Result<String, ValidationError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .ok_or_else(|| ValidationError::InvalidFilename(filename.to_string()))?;

        if !self.limits.allowed_extensions.contains(&extension) {
            return Err(ValidationError::InvalidExtension {
                extension,
                allowed: self.limits.allowed_extensions.clone(),
            });
        }

        Ok(extension)
    }

    pub fn validate_content_type(&self, content_type: &str) -> Result<(), ValidationError> {
        let normalized = normalize_mime_type(content_type).to_lowercase();

        if !self
            .limits
            .allowed_content_types
            .iter()
            .any(|ct| ct.to_lowercase() == normalized)
        {
            return Err(ValidationError::InvalidContentType {
                content_type: content_type.to_string(),
                allowed: self.limits.allowed_content_types.clone(),
            });
        }

        Ok(())
    }

    /// Reject declared content types that cannot belong to the file's
    /// extension. Unknown extensions skip the cross-check; they already fail
    /// the allow-list check above.
    pub fn validate_extension_content_type_match(
        &self,
        extension: &str,
        content_type: &str,
    ) -> Result<(), ValidationError> {
        let normalized = normalize_mime_type(content_type).to_lowercase();

        let expected: &[&str] = match extension {
            "jpg" | "jpeg" => &["image/jpeg", "image/jpg"],
            "png" => &["image/png"],
            "webp" => &["image/webp"],
            "gif" => &["image/gif"],
            _ => return Ok(()),
        };

        if !expected.iter().any(|ct| *ct == normalized) {
            return Err(ValidationError::ContentTypeMismatch {
                content_type: content_type.to_string(),
                extension: extension.to_string(),
            });
        }

        Ok(())
    }

    /// Validate every aspect of an upload. Order matters only for error
    /// reporting; no check has side effects.
    pub fn validate_all(
        &self,
        filename: &str,
        content_type: &str,
        file_size: usize,
    ) -> Result<(), ValidationError> {
        self.validate_file_size(file_size)?;
        let extension = self.validate_extension(filename)?;
        self.validate_content_type(content_type)?;
        self.validate_extension_content_type_match(&extension, content_type)?;
        Ok(())
    }
}

/// Normalize MIME type by stripping parameters (e.g. "image/jpeg; charset=utf-8" -> "image/jpeg").
fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
}
