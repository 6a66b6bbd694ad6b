//! Error types module
//!
//! All failures that cross a component boundary are expressed as `AppError`.
//! Transport-level errors from the RPC clients and backend errors from the
//! object store are translated into this taxonomy at the layer that produced
//! them; nothing above that layer inspects raw tonic or object_store types.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like unavailable dependencies
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Gateway-level error taxonomy.
///
/// The variant set mirrors the statuses a remote dependency can report plus
/// the gateway's own failure modes. `Internal` is the default for anything
/// that does not map cleanly.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Deadline exceeded: {0}")]
    DeadlineExceeded(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, sensitive, log_level).
/// client_message stays per-variant for dynamic content.
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, bool, LogLevel) {
    match err {
        AppError::InvalidArgument(_) => (400, "INVALID_ARGUMENT", false, false, LogLevel::Debug),
        AppError::Unauthenticated(_) => (401, "UNAUTHENTICATED", false, false, LogLevel::Debug),
        AppError::PermissionDenied(_) => (403, "PERMISSION_DENIED", false, false, LogLevel::Warn),
        AppError::NotFound(_) => (404, "NOT_FOUND", false, false, LogLevel::Debug),
        AppError::AlreadyExists(_) => (409, "ALREADY_EXISTS", false, false, LogLevel::Debug),
        AppError::ResourceExhausted(_) => (429, "RESOURCE_EXHAUSTED", true, false, LogLevel::Warn),
        AppError::Unavailable(_) => (503, "UNAVAILABLE", true, true, LogLevel::Error),
        AppError::DeadlineExceeded(_) => (504, "DEADLINE_EXCEEDED", true, true, LogLevel::Error),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", true, true, LogLevel::Error),
        AppError::InternalWithSource { .. } => (500, "INTERNAL_ERROR", true, true, LogLevel::Error),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::InvalidArgument(_) => "InvalidArgument",
            AppError::Unauthenticated(_) => "Unauthenticated",
            AppError::PermissionDenied(_) => "PermissionDenied",
            AppError::NotFound(_) => "NotFound",
            AppError::AlreadyExists(_) => "AlreadyExists",
            AppError::ResourceExhausted(_) => "ResourceExhausted",
            AppError::Unavailable(_) => "Unavailable",
            AppError::DeadlineExceeded(_) => "DeadlineExceeded",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    pub fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    pub fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    pub fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    /// Whether details must be hidden from clients (5xx-equivalent kinds).
    pub fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).3
    }

    pub fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).4
    }

    /// Client-facing message. Sensitive variants never echo upstream error
    /// text; the detailed message is reserved for logs.
    pub fn client_message(&self) -> String {
        match self {
            AppError::InvalidArgument(msg)
            | AppError::Unauthenticated(msg)
            | AppError::PermissionDenied(msg)
            | AppError::NotFound(msg)
            | AppError::AlreadyExists(msg)
            | AppError::ResourceExhausted(msg) => msg.clone(),
            AppError::Unavailable(_) => "A backing service is unavailable".to_string(),
            AppError::DeadlineExceeded(_) => "A backing service timed out".to_string(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }

    /// Get detailed error information including the source chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_invalid_argument() {
        let err = AppError::InvalidArgument("bad extension".to_string());
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_ARGUMENT");
        assert!(!err.is_recoverable());
        assert!(!err.is_sensitive());
        assert_eq!(err.client_message(), "bad extension");
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_permission_denied() {
        let err = AppError::PermissionDenied("key outside caller namespace".to_string());
        assert_eq!(err.http_status_code(), 403);
        assert_eq!(err.error_code(), "PERMISSION_DENIED");
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_sensitive_variants_redact_client_message() {
        let unavailable = AppError::Unavailable("connect refused: 10.0.0.3:50051".to_string());
        assert!(unavailable.is_sensitive());
        assert!(!unavailable.client_message().contains("10.0.0.3"));

        let internal = AppError::Internal("response encoding failed".to_string());
        assert_eq!(internal.client_message(), "Internal server error");
    }

    #[test]
    fn test_detailed_message_includes_source_chain() {
        let source = anyhow::anyhow!("root cause").context("mid layer");
        let err = AppError::from(source);
        let details = err.detailed_message();
        assert!(details.contains("Caused by"));
        assert!(details.contains("root cause"));
        assert_eq!(err.http_status_code(), 500);
    }
}
