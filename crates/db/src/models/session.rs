//! Session row model and insert DTO.

use authgate_core::session::{NewSession, Session};
use authgate_core::types::{SessionId, Timestamp, UserId};
use sqlx::FromRow;

/// A row from the `sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub id: SessionId,
    pub user_id: UserId,
    pub refresh_token_hash: String,
    pub user_agent: String,
    pub ip: String,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            id: row.id,
            user_id: row.user_id,
            refresh_token_hash: row.refresh_token_hash,
            user_agent: row.user_agent,
            ip: row.ip,
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}

/// DTO for inserting a session.
pub struct CreateSession {
    pub user_id: UserId,
    pub refresh_token_hash: String,
    pub user_agent: String,
    pub ip: String,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

impl From<NewSession> for CreateSession {
    fn from(input: NewSession) -> Self {
        CreateSession {
            user_id: input.user_id,
            refresh_token_hash: input.refresh_token_hash,
            user_agent: input.user_agent,
            ip: input.ip,
            created_at: input.created_at,
            expires_at: input.expires_at,
        }
    }
}
