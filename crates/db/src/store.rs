//! [`SessionStore`] implementation over PostgreSQL.

use async_trait::async_trait;
use authgate_core::session::{NewSession, Session, SessionStore, StoreError};
use authgate_core::types::{SessionId, Timestamp, UserId};

use crate::models::session::CreateSession;
use crate::repositories::SessionRepo;
use crate::DbPool;

#[derive(Debug, Clone)]
pub struct PgSessionStore {
    pool: DbPool,
}

impl PgSessionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, session: NewSession) -> Result<Session, StoreError> {
        let input = CreateSession::from(session);
        let row = SessionRepo::create(&self.pool, &input)
            .await
            .map_err(store_error)?;
        Ok(row.into())
    }

    async fn find_latest_by_user(&self, user_id: UserId) -> Result<Option<Session>, StoreError> {
        let row = SessionRepo::find_latest_by_user(&self.pool, user_id)
            .await
            .map_err(store_error)?;
        Ok(row.map(Session::from))
    }

    async fn delete(&self, id: SessionId) -> Result<bool, StoreError> {
        SessionRepo::delete(&self.pool, id).await.map_err(store_error)
    }

    async fn delete_all_by_user(&self, user_id: UserId) -> Result<u64, StoreError> {
        SessionRepo::delete_all_for_user(&self.pool, user_id)
            .await
            .map_err(store_error)
    }

    async fn delete_expired(&self, now: Timestamp) -> Result<u64, StoreError> {
        SessionRepo::delete_expired(&self.pool, now)
            .await
            .map_err(store_error)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await.map_err(store_error)
    }
}

/// Split connection-level failures from query failures.
fn store_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => {
            tracing::error!(error = %err, "Session store unavailable");
            StoreError::Unavailable(err.to_string())
        }
        other => {
            tracing::error!(error = %other, "Session store query failed");
            StoreError::Query(other.to_string())
        }
    }
}
