//! Auth passthrough handlers.
//!
//! Thin JSON bridges from the HTTP surface to the auth service RPCs. Request
//! shape is validated here; credential checking itself is entirely the auth
//! service's concern.

use std::sync::Arc;

use axum::{extract::State, Json};
use imago_core::AppError;
use imago_rpc::proto::auth::{AuthResponse, TokenData, UserData, UserProfileResponse};
use serde::{Deserialize, Serialize};

use crate::auth::models::Principal;
use crate::error::HttpAppError;
use crate::state::AppState;

const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshBody {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBody {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub is_active: bool,
}

impl From<UserData> for UserBody {
    fn from(user: UserData) -> Self {
        UserBody {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            is_active: user.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBody {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

impl From<TokenData> for TokenBody {
    fn from(tokens: TokenData) -> Self {
        TokenBody {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            token_type: tokens.token_type,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponseBody {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<TokenBody>,
}

impl From<AuthResponse> for AuthResponseBody {
    fn from(response: AuthResponse) -> Self {
        AuthResponseBody {
            success: response.success,
            message: response.message,
            user: response.user_data.map(UserBody::from),
            tokens: response.token_data.map(TokenBody::from),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponseBody {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserBody>,
}

fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidArgument(format!("{} is required", field)));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(AppError::InvalidArgument("Invalid email format".to_string()));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::InvalidArgument(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterBody>,
) -> Result<Json<AuthResponseBody>, HttpAppError> {
    require("email", &body.email)?;
    require("password", &body.password)?;
    require("firstName", &body.first_name)?;
    require("lastName", &body.last_name)?;
    validate_email(&body.email)?;
    validate_password(&body.password)?;

    let response = state
        .auth_client
        .register(
            body.email,
            body.password,
            body.first_name,
            body.last_name,
            body.role.unwrap_or_else(|| "user".to_string()),
        )
        .await?;

    Ok(Json(response.into()))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginBody>,
) -> Result<Json<AuthResponseBody>, HttpAppError> {
    require("email", &body.email)?;
    require("password", &body.password)?;
    validate_email(&body.email)?;

    let response = state.auth_client.login(body.email, body.password).await?;

    Ok(Json(response.into()))
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshBody>,
) -> Result<Json<AuthResponseBody>, HttpAppError> {
    require("refreshToken", &body.refresh_token)?;

    let response = state.auth_client.refresh_token(body.refresh_token).await?;

    Ok(Json(response.into()))
}

/// Return the caller's profile. The user id comes from the authenticated
/// principal, never from client input.
pub async fn profile(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<ProfileResponseBody>, HttpAppError> {
    let response: UserProfileResponse = state
        .auth_client
        .get_profile(principal.user_id)
        .await?;

    Ok(Json(ProfileResponseBody {
        success: response.success,
        message: response.message,
        user: response.user_data.map(UserBody::from),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("user@sub.example.com").is_ok());
        assert!(validate_email("userexample.com").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@nodot").is_err());
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_require_rejects_blank() {
        assert!(require("email", "  ").is_err());
        assert!(require("email", "a@b.co").is_ok());
    }
}
