//! Transport status translation.
//!
//! The single place where remote RPC status codes become gateway taxonomy
//! errors. A pure lookup so it stays exhaustive and testable in isolation;
//! callers above the client layer never see `tonic` types.

use imago_core::AppError;
use tonic::{Code, Status};

/// Translate an RPC-level status from `service` into the gateway taxonomy.
/// Codes with no direct counterpart collapse to `Internal`.
pub fn app_error_from_status(service: &str, status: Status) -> AppError {
    let message = format!("{}: {}", service, status.message());

    match status.code() {
        Code::InvalidArgument => AppError::InvalidArgument(message),
        Code::AlreadyExists => AppError::AlreadyExists(message),
        Code::NotFound => AppError::NotFound(message),
        Code::Unauthenticated => AppError::Unauthenticated(message),
        Code::PermissionDenied => AppError::PermissionDenied(message),
        Code::ResourceExhausted => AppError::ResourceExhausted(message),
        Code::Unavailable => AppError::Unavailable(message),
        Code::DeadlineExceeded => AppError::DeadlineExceeded(message),
        _ => AppError::Internal(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(code: Code) -> &'static str {
        app_error_from_status("test service", Status::new(code, "boom")).error_type()
    }

    #[test]
    fn test_direct_mappings() {
        assert_eq!(kind(Code::InvalidArgument), "InvalidArgument");
        assert_eq!(kind(Code::AlreadyExists), "AlreadyExists");
        assert_eq!(kind(Code::NotFound), "NotFound");
        assert_eq!(kind(Code::Unauthenticated), "Unauthenticated");
        assert_eq!(kind(Code::PermissionDenied), "PermissionDenied");
        assert_eq!(kind(Code::ResourceExhausted), "ResourceExhausted");
        assert_eq!(kind(Code::Unavailable), "Unavailable");
        assert_eq!(kind(Code::DeadlineExceeded), "DeadlineExceeded");
    }

    #[test]
    fn test_unmapped_codes_default_to_internal() {
        assert_eq!(kind(Code::Internal), "Internal");
        assert_eq!(kind(Code::Unknown), "Internal");
        assert_eq!(kind(Code::Cancelled), "Internal");
        assert_eq!(kind(Code::Aborted), "Internal");
        assert_eq!(kind(Code::DataLoss), "Internal");
        assert_eq!(kind(Code::FailedPrecondition), "Internal");
        assert_eq!(kind(Code::OutOfRange), "Internal");
        assert_eq!(kind(Code::Unimplemented), "Internal");
    }

    #[test]
    fn test_message_names_the_service() {
        let err = app_error_from_status("auth service", Status::unavailable("connect refused"));
        assert!(err.to_string().contains("auth service"));
    }
}
