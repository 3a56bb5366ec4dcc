//! Issue, refresh and logout: the refresh-token rotation protocol.
//!
//! Every refresh is evaluated from scratch against the store:
//!
//! ```text
//! parse access -> lookup session -> expiry -> secret -> user-agent -> consume -> ip -> mint
//! ```
//!
//! Expiry, secret and user-agent failures revoke the session before the error
//! is returned. An IP change only raises a [`SecurityAlert`]. A successful
//! refresh deletes the old session and mints a replacement, so every refresh
//! secret works at most once.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::error::{CoreError, IssueError, UnauthorizedReason};
use crate::notify::{SecurityAlert, SecurityNotifier};
use crate::refresh::RefreshSecretManager;
use crate::session::{NewSession, Session, SessionStore};
use crate::token::TokenCodec;
use crate::types::UserId;

/// Lifetimes for minted tokens.
#[derive(Debug, Clone, Copy)]
pub struct RotationSettings {
    /// Access-token lifetime.
    pub token_ttl: chrono::Duration,
    /// Session (refresh secret) lifetime.
    pub refresh_ttl: chrono::Duration,
}

/// An access token and the refresh secret bound to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct RotationEngine {
    codec: TokenCodec,
    secrets: RefreshSecretManager,
    store: Arc<dyn SessionStore>,
    notifier: Arc<dyn SecurityNotifier>,
    settings: RotationSettings,
}

impl RotationEngine {
    pub fn new(
        codec: TokenCodec,
        secrets: RefreshSecretManager,
        store: Arc<dyn SessionStore>,
        notifier: Arc<dyn SecurityNotifier>,
        settings: RotationSettings,
    ) -> Self {
        Self {
            codec,
            secrets,
            store,
            notifier,
            settings,
        }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn settings(&self) -> RotationSettings {
        self.settings
    }

    /// Mint a token pair for `user_id` and persist its session.
    ///
    /// Nothing is returned unless the session was stored.
    pub async fn issue(
        &self,
        user_id: UserId,
        user_agent: &str,
        ip: &str,
    ) -> Result<TokenPair, CoreError> {
        let pair = self
            .mint(user_id, user_agent, ip)
            .await
            .map_err(CoreError::Issuance)?;

        tracing::info!(user_id = %user_id, "Issued token pair");
        Ok(pair)
    }

    /// Exchange a valid pair for a new one, consuming the old session.
    pub async fn refresh(
        &self,
        access_token: &str,
        refresh_secret: &str,
        user_agent: &str,
        ip: &str,
    ) -> Result<TokenPair, CoreError> {
        let user_id = self
            .codec
            .parse(access_token)
            .map_err(|_| refused(None, UnauthorizedReason::InvalidAccessToken))?;

        let session = self
            .store
            .find_latest_by_user(user_id)
            .await?
            .ok_or_else(|| refused(Some(user_id), UnauthorizedReason::SessionNotFound))?;

        if self.secrets.check_expiry(session.expires_at).is_err() {
            return Err(self.revoke(&session, UnauthorizedReason::Expired).await);
        }

        if self
            .secrets
            .verify(refresh_secret, &session.refresh_token_hash)
            .is_err()
        {
            return Err(self.revoke(&session, UnauthorizedReason::SecretMismatch).await);
        }

        if session.user_agent != user_agent {
            return Err(self
                .revoke(&session, UnauthorizedReason::UserAgentMismatch)
                .await);
        }

        // Only the caller whose delete removes the row may rotate; a
        // concurrent refresh of the same session sees `false` here.
        if !self.store.delete(session.id).await? {
            return Err(refused(Some(user_id), UnauthorizedReason::SessionNotFound));
        }

        // Alert only for a rotation that is actually going ahead.
        if session.ip != ip {
            tracing::warn!(
                user_id = %user_id,
                old_ip = %session.ip,
                new_ip = %ip,
                "Refresh from a new IP address"
            );
            self.notifier.notify(SecurityAlert::ip_changed(
                user_id,
                session.ip.as_str(),
                ip,
                user_agent,
            ));
        }

        let pair = self
            .mint(user_id, user_agent, ip)
            .await
            .map_err(|e| {
                tracing::error!(
                    user_id = %user_id,
                    error = %e,
                    "Re-issuance failed after old session was consumed"
                );
                CoreError::Rotation(e)
            })?;

        tracing::info!(user_id = %user_id, "Rotated token pair");
        Ok(pair)
    }

    /// Remove every session belonging to the token's subject.
    pub async fn logout(&self, access_token: &str) -> Result<u64, CoreError> {
        let user_id = self.authenticate(access_token)?;
        let removed = self.store.delete_all_by_user(user_id).await?;

        tracing::info!(user_id = %user_id, removed, "Logged out");
        Ok(removed)
    }

    /// Verify an access token and return its subject.
    pub fn authenticate(&self, access_token: &str) -> Result<UserId, CoreError> {
        self.codec
            .parse(access_token)
            .map_err(|_| refused(None, UnauthorizedReason::InvalidAccessToken))
    }

    async fn mint(
        &self,
        user_id: UserId,
        user_agent: &str,
        ip: &str,
    ) -> Result<TokenPair, IssueError> {
        let access_token = self.codec.issue(user_id, self.settings.token_ttl)?;
        let generated = self.secrets.generate()?;

        let now = Utc::now();
        self.store
            .create(NewSession {
                user_id,
                refresh_token_hash: generated.hash,
                user_agent: user_agent.to_string(),
                ip: ip.to_string(),
                created_at: now,
                expires_at: now + self.settings.refresh_ttl,
            })
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token: generated.secret,
        })
    }

    /// Delete `session` and build the refusal for `reason`.
    async fn revoke(&self, session: &Session, reason: UnauthorizedReason) -> CoreError {
        match self.store.delete(session.id).await {
            Ok(_) => {
                tracing::warn!(
                    user_id = %session.user_id,
                    session_id = %session.id,
                    reason = %reason,
                    "Refresh refused; session revoked"
                );
                CoreError::Unauthorized(reason)
            }
            Err(e) => {
                tracing::error!(
                    user_id = %session.user_id,
                    session_id = %session.id,
                    reason = %reason,
                    error = %e,
                    "Refresh refused but session could not be revoked"
                );
                CoreError::Persistence(e)
            }
        }
    }
}

fn refused(user_id: Option<UserId>, reason: UnauthorizedReason) -> CoreError {
    match user_id {
        Some(user_id) => {
            tracing::warn!(user_id = %user_id, reason = %reason, "Token request refused")
        }
        None => tracing::warn!(reason = %reason, "Token request refused"),
    }
    CoreError::Unauthorized(reason)
}
