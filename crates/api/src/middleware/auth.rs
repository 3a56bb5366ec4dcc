//! Access-token extractors for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use authgate_core::error::{CoreError, UnauthorizedReason};
use authgate_core::types::UserId;

use crate::error::AppError;
use crate::state::AppState;

/// Raw access token from the `Authorization` header.
///
/// Accepts both `Bearer <token>` and a bare token. The token is not verified.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
        if token.is_empty() {
            return Err(missing_token());
        }

        Ok(Self(token.to_string()))
    }
}

/// Authenticated user from a valid, unexpired access token.
///
/// Only the token itself is checked; whether a session still exists is not.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: UserId,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let user_id = state.engine.authenticate(&token)?;
        Ok(Self { user_id })
    }
}

fn missing_token() -> AppError {
    AppError::Core(CoreError::Unauthorized(
        UnauthorizedReason::InvalidAccessToken,
    ))
}
