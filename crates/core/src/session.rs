//! Server-side session records and the storage contract behind them.
//!
//! A session exists for every live refresh secret. The store keeps at most one
//! session per user: [`SessionStore::create`] replaces whatever the user had.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::types::{SessionId, Timestamp, UserId};

/// A stored session. `refresh_token_hash` is the only trace of the secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    pub refresh_token_hash: String,
    pub user_agent: String,
    pub ip: String,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

/// Input for [`SessionStore::create`].
#[derive(Debug, Clone)]
pub struct NewSession {
    pub user_id: UserId,
    pub refresh_token_hash: String,
    pub user_agent: String,
    pub ip: String,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),

    #[error("session store query failed: {0}")]
    Query(String),
}

/// Persistence contract for sessions.
///
/// Deletes are idempotent: removing nothing is not an error.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a session, replacing any existing sessions for the same user.
    async fn create(&self, session: NewSession) -> Result<Session, StoreError>;

    /// The most recently created session for `user_id`.
    async fn find_latest_by_user(&self, user_id: UserId) -> Result<Option<Session>, StoreError>;

    /// Delete one session. Returns `true` only if this call removed the row,
    /// so concurrent callers can tell which of them consumed it.
    async fn delete(&self, id: SessionId) -> Result<bool, StoreError>;

    /// Delete every session for `user_id`, returning how many were removed.
    async fn delete_all_by_user(&self, user_id: UserId) -> Result<u64, StoreError>;

    /// Delete sessions whose `expires_at` is before `now`.
    async fn delete_expired(&self, now: Timestamp) -> Result<u64, StoreError>;

    /// Cheap reachability probe.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Process-local [`SessionStore`], used by tests and single-node development.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<Vec<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Insert a session as-is, bypassing the one-per-user replacement.
    pub async fn insert_raw(&self, session: Session) {
        self.sessions.write().await.push(session);
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, input: NewSession) -> Result<Session, StoreError> {
        let session = Session {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            refresh_token_hash: input.refresh_token_hash,
            user_agent: input.user_agent,
            ip: input.ip,
            created_at: input.created_at,
            expires_at: input.expires_at,
        };

        let mut sessions = self.sessions.write().await;
        sessions.retain(|s| s.user_id != session.user_id);
        sessions.push(session.clone());
        Ok(session)
    }

    async fn find_latest_by_user(&self, user_id: UserId) -> Result<Option<Session>, StoreError> {
        let sessions = self.sessions.read().await;
        // `max_by_key` keeps the last maximum, so insertion order breaks ties.
        Ok(sessions
            .iter()
            .filter(|s| s.user_id == user_id)
            .max_by_key(|s| s.created_at)
            .cloned())
    }

    async fn delete(&self, id: SessionId) -> Result<bool, StoreError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|s| s.id != id);
        Ok(sessions.len() < before)
    }

    async fn delete_all_by_user(&self, user_id: UserId) -> Result<u64, StoreError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|s| s.user_id != user_id);
        Ok((before - sessions.len()) as u64)
    }

    async fn delete_expired(&self, now: Timestamp) -> Result<u64, StoreError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|s| s.expires_at >= now);
        Ok((before - sessions.len()) as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
