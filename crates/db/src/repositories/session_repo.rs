//! Repository for the `sessions` table.

use authgate_core::types::{SessionId, Timestamp, UserId};
use sqlx::PgPool;

use crate::models::session::{CreateSession, SessionRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, refresh_token_hash, user_agent, ip, created_at, expires_at";

/// Provides CRUD operations for sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Replace the user's sessions with a new one, returning the created row.
    ///
    /// The delete and insert share a transaction so a user never ends up with
    /// zero or two sessions from this call.
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<SessionRow, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(input.user_id)
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "INSERT INTO sessions (user_id, refresh_token_hash, user_agent, ip, created_at, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, SessionRow>(&query)
            .bind(input.user_id)
            .bind(&input.refresh_token_hash)
            .bind(&input.user_agent)
            .bind(&input.ip)
            .bind(input.created_at)
            .bind(input.expires_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row)
    }

    /// Find the most recently created session for a user.
    pub async fn find_latest_by_user(
        pool: &PgPool,
        user_id: UserId,
    ) -> Result<Option<SessionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sessions
             WHERE user_id = $1
             ORDER BY created_at DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, SessionRow>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a single session. Returns `true` if this call removed the row.
    pub async fn delete(pool: &PgPool, id: SessionId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete all sessions for a user. Returns the count of deleted rows.
    pub async fn delete_all_for_user(pool: &PgPool, user_id: UserId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete sessions that expired before `now`. Returns the count of deleted rows.
    pub async fn delete_expired(pool: &PgPool, now: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < $1")
            .bind(now)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
