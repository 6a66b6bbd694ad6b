//! Bearer-token authentication middleware.
//!
//! Extracts the bearer credential, validates it against the auth service,
//! and injects the resolved [Principal] into the request extensions. Runs
//! before every handler that touches per-user resources; requests that fail
//! here never reach business logic or the object store.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use imago_core::AppError;
use imago_rpc::TokenValidator;

use crate::auth::models::{Principal, UserRole};
use crate::error::HttpAppError;

#[derive(Clone)]
pub struct AuthState {
    pub validator: Arc<dyn TokenValidator>,
}

/// Extract the token from an `Authorization: Bearer <token>` header.
/// Anything other than exactly two space-separated parts with a `Bearer`
/// scheme is rejected before any RPC is made.
fn parse_bearer(header: Option<&str>) -> Result<&str, AppError> {
    let header = header.ok_or_else(|| AppError::Unauthenticated("missing authorization".to_string()))?;

    let parts: Vec<&str> = header.split(' ').collect();
    if parts.len() != 2 || parts[0] != "Bearer" || parts[1].is_empty() {
        return Err(AppError::Unauthenticated(
            "malformed authorization header".to_string(),
        ));
    }

    Ok(parts[1])
}

pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = match parse_bearer(header) {
        Ok(token) => token,
        Err(err) => return HttpAppError(err).into_response(),
    };

    let validation = match auth_state.validator.validate_token(token).await {
        Ok(validation) => validation,
        Err(err) => {
            // RPC failure: Unavailable (or whatever the remote status mapped to)
            return HttpAppError(err).into_response();
        }
    };

    if !validation.valid {
        tracing::debug!(message = %validation.message, "Token rejected by auth service");
        return HttpAppError(AppError::Unauthenticated("invalid token".to_string()))
            .into_response();
    }

    let principal = Principal {
        user_id: validation.user_id,
        email: validation.email,
        role: UserRole::parse(&validation.role),
    };

    request.extensions_mut().insert(principal);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{body::Body, http::Request as HttpRequest, http::StatusCode, routing::get, Router};
    use imago_rpc::TokenValidation;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    struct FakeValidator {
        calls: AtomicUsize,
        valid: bool,
    }

    #[async_trait]
    impl TokenValidator for FakeValidator {
        async fn validate_token(&self, _token: &str) -> Result<TokenValidation, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(TokenValidation {
                valid: self.valid,
                user_id: "u1".to_string(),
                email: "u1@example.com".to_string(),
                role: "user".to_string(),
                exp: 0,
                message: String::new(),
            })
        }
    }

    fn test_router(validator: Arc<FakeValidator>) -> Router {
        let auth_state = Arc::new(AuthState {
            validator: validator.clone(),
        });

        async fn whoami(principal: Principal) -> String {
            principal.user_id
        }

        Router::new()
            .route("/whoami", get(whoami))
            .layer(axum::middleware::from_fn_with_state(
                auth_state,
                auth_middleware,
            ))
    }

    fn request(auth_header: Option<&str>) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().uri("/whoami");
        if let Some(value) = auth_header {
            builder = builder.header("Authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_parse_bearer() {
        assert!(parse_bearer(None).is_err());
        assert!(parse_bearer(Some("")).is_err());
        assert!(parse_bearer(Some("Basic dXNlcg==")).is_err());
        assert!(parse_bearer(Some("Bearer")).is_err());
        assert!(parse_bearer(Some("Bearer ")).is_err());
        assert!(parse_bearer(Some("Bearer a b")).is_err());
        assert!(parse_bearer(Some("bearer token")).is_err());
        assert_eq!(parse_bearer(Some("Bearer token123")).unwrap(), "token123");
    }

    #[tokio::test]
    async fn test_missing_header_rejected_without_rpc() {
        let validator = Arc::new(FakeValidator {
            calls: AtomicUsize::new(0),
            valid: true,
        });
        let response = test_router(validator.clone())
            .oneshot(request(None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(validator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_basic_scheme_rejected_without_rpc() {
        let validator = Arc::new(FakeValidator {
            calls: AtomicUsize::new(0),
            valid: true,
        });
        let response = test_router(validator.clone())
            .oneshot(request(Some("Basic xyz")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(validator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_token_is_unauthenticated() {
        let validator = Arc::new(FakeValidator {
            calls: AtomicUsize::new(0),
            valid: false,
        });
        let response = test_router(validator.clone())
            .oneshot(request(Some("Bearer expired")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(validator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_valid_token_injects_principal() {
        let validator = Arc::new(FakeValidator {
            calls: AtomicUsize::new(0),
            valid: true,
        });
        let response = test_router(validator.clone())
            .oneshot(request(Some("Bearer good")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"u1");
    }
}
