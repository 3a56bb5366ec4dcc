//! Handlers for token issue, refresh, logout and identity lookup.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use authgate_core::error::CoreError;
use authgate_core::types::UserId;
use authgate_core::TokenPair;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, BearerToken};
use crate::middleware::client::ClientInfo;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query string for `POST /auth/token`.
#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub user_id: Option<String>,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: UserId,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /auth/token?user_id=<uuid>
///
/// Start a session for the user and return a fresh token pair. Any session
/// the user already had is replaced.
pub async fn token(
    State(state): State<AppState>,
    client: ClientInfo,
    Query(query): Query<TokenQuery>,
) -> AppResult<Json<TokenPair>> {
    let raw = query
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CoreError::Validation("user_id is required".into()))?;

    let user_id: UserId = raw
        .parse()
        .map_err(|_| CoreError::Validation("user_id must be a UUID".into()))?;

    let pair = state
        .engine
        .issue(user_id, &client.user_agent, &client.ip)
        .await?;

    Ok(Json(pair))
}

/// POST /auth/refresh
///
/// Exchange an access token and its refresh secret for a new pair. A refresh
/// secret is accepted at most once.
pub async fn refresh(
    State(state): State<AppState>,
    client: ClientInfo,
    body: Result<Json<RefreshRequest>, JsonRejection>,
) -> AppResult<Json<TokenPair>> {
    let Json(input) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;

    if input.access_token.trim().is_empty() || input.refresh_token.trim().is_empty() {
        return Err(CoreError::Validation(
            "access_token and refresh_token are required".into(),
        )
        .into());
    }

    let pair = state
        .engine
        .refresh(
            &input.access_token,
            &input.refresh_token,
            &client.user_agent,
            &client.ip,
        )
        .await?;

    Ok(Json(pair))
}

/// POST /auth/logout
///
/// Revoke every session of the token's user.
pub async fn logout(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> AppResult<Json<MessageResponse>> {
    state.engine.logout(&token).await?;
    Ok(Json(MessageResponse {
        message: "logout successful",
    }))
}

/// GET /me
pub async fn me(user: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: user.user_id,
    })
}
