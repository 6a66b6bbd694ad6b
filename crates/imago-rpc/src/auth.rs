//! Client for the authentication microservice.

use std::time::Duration;

use async_trait::async_trait;
use tonic::transport::{Channel, Endpoint};
use tonic::Request;

use crate::proto::auth::auth_service_client::AuthServiceClient;
use crate::proto::auth::{
    AuthResponse, GetProfileRequest, LoginRequest, RefreshTokenRequest, RegisterRequest,
    UserProfileResponse, ValidateTokenRequest,
};
use crate::status::app_error_from_status;
use crate::traits::{TokenValidation, TokenValidator};
use imago_core::AppError;

const SERVICE_NAME: &str = "auth service";

/// Typed client wrapping the RPC channel to the auth service.
///
/// The channel is established lazily and multiplexes all in-flight calls, so
/// one client is shared across the whole process. Cloning is cheap.
#[derive(Clone)]
pub struct AuthClient {
    client: AuthServiceClient<Channel>,
    rpc_timeout: Duration,
    validate_timeout: Duration,
}

impl AuthClient {
    /// Create a client for the auth service at `endpoint`
    /// (e.g. "http://auth-service:50051").
    ///
    /// `rpc_timeout` bounds register/login/refresh/profile calls;
    /// `validate_timeout` is the tighter bound for token validation, which
    /// sits on the critical path of every authenticated request.
    pub fn connect(
        endpoint: String,
        rpc_timeout: Duration,
        validate_timeout: Duration,
    ) -> Result<Self, AppError> {
        tracing::info!(endpoint = %endpoint, "Connecting to auth service");

        let channel = Endpoint::from_shared(endpoint.clone())
            .map_err(|e| {
                AppError::Internal(format!("invalid auth service endpoint {}: {}", endpoint, e))
            })?
            .connect_lazy();

        Ok(AuthClient {
            client: AuthServiceClient::new(channel),
            rpc_timeout,
            validate_timeout,
        })
    }

    fn request_with_deadline<T>(&self, message: T, timeout: Duration) -> Request<T> {
        let mut request = Request::new(message);
        request.set_timeout(timeout);
        request
    }

    pub async fn register(
        &self,
        email: String,
        password: String,
        first_name: String,
        last_name: String,
        role: String,
    ) -> Result<AuthResponse, AppError> {
        tracing::debug!(email = %email, role = %role, "Sending register request to auth service");

        let message = RegisterRequest {
            email,
            password,
            first_name,
            last_name,
            role,
        };

        let mut client = self.client.clone();
        let response = client
            .register(self.request_with_deadline(message, self.rpc_timeout))
            .await
            .map_err(|status| app_error_from_status(SERVICE_NAME, status))?;

        Ok(response.into_inner())
    }

    pub async fn login(&self, email: String, password: String) -> Result<AuthResponse, AppError> {
        tracing::debug!(email = %email, "Sending login request to auth service");

        let message = LoginRequest { email, password };

        let mut client = self.client.clone();
        let response = client
            .login(self.request_with_deadline(message, self.rpc_timeout))
            .await
            .map_err(|status| app_error_from_status(SERVICE_NAME, status))?;

        Ok(response.into_inner())
    }

    pub async fn refresh_token(&self, refresh_token: String) -> Result<AuthResponse, AppError> {
        tracing::debug!(
            token = %token_preview(&refresh_token),
            "Sending token refresh request to auth service"
        );

        let message = RefreshTokenRequest { refresh_token };

        let mut client = self.client.clone();
        let response = client
            .refresh_token(self.request_with_deadline(message, self.rpc_timeout))
            .await
            .map_err(|status| app_error_from_status(SERVICE_NAME, status))?;

        Ok(response.into_inner())
    }

    pub async fn get_profile(&self, user_id: String) -> Result<UserProfileResponse, AppError> {
        tracing::debug!(user_id = %user_id, "Sending get profile request to auth service");

        let message = GetProfileRequest { user_id };

        let mut client = self.client.clone();
        let response = client
            .get_profile(self.request_with_deadline(message, self.rpc_timeout))
            .await
            .map_err(|status| app_error_from_status(SERVICE_NAME, status))?;

        Ok(response.into_inner())
    }
}

#[async_trait]
impl TokenValidator for AuthClient {
    async fn validate_token(&self, token: &str) -> Result<TokenValidation, AppError> {
        tracing::debug!(
            token = %token_preview(token),
            "Sending token validation request to auth service"
        );

        let message = ValidateTokenRequest {
            token: token.to_string(),
        };

        let mut client = self.client.clone();
        let response = client
            .validate_token(self.request_with_deadline(message, self.validate_timeout))
            .await
            .map_err(|status| app_error_from_status(SERVICE_NAME, status))?
            .into_inner();

        tracing::debug!(
            valid = response.valid,
            user_id = %response.user_id,
            role = %response.role,
            "Token validation response received"
        );

        Ok(TokenValidation {
            valid: response.valid,
            user_id: response.user_id,
            email: response.email,
            role: response.role,
            exp: response.exp,
            message: response.message,
        })
    }
}

/// Short non-reversible preview for logging; tokens are never logged whole.
fn token_preview(token: &str) -> String {
    let prefix: String = token.chars().take(8).collect();
    format!("{}…", prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_preview_truncates() {
        let preview = token_preview("eyJhbGciOiJIUzI1NiJ9.secret.part");
        assert_eq!(preview, "eyJhbGci…");
        assert!(!preview.contains("secret"));
    }

    #[test]
    fn test_connect_rejects_invalid_endpoint() {
        let result = AuthClient::connect(
            "not a uri".to_string(),
            Duration::from_secs(30),
            Duration::from_secs(10),
        );
        assert!(result.is_err());
    }
}
