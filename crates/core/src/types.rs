/// Subjects are identified by UUID.
pub type UserId = uuid::Uuid;

/// Session primary keys are UUIDs generated at creation.
pub type SessionId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
